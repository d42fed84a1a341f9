use super::score::RankedColor;
use crate::cli::ThemeMode;
use crate::color::Color;
use crate::error::Diagnostics;
use crate::palette::SemanticPalette;

/// Required contrast between bg-primary and text-primary.
const TEXT_PRIMARY_CONTRAST: f32 = 4.5;
const TEXT_SECONDARY_CONTRAST: f32 = 3.0;
const TEXT_TERTIARY_CONTRAST: f32 = 2.0;

/// Required contrast between accent-primary and bg-primary.
const ACCENT_CONTRAST: f32 = 3.0;

/// Minimum HSL saturation for accent candidates.
const ACCENT_MIN_SATURATION: f32 = 0.4;

/// Minimum ΔE between the two accents before the secondary is synthesized.
const ACCENT_SEPARATION: f32 = 15.0;

/// Minimum pairwise ΔE among the key roles during harmony validation.
const KEY_ROLE_SEPARATION: f32 = 10.0;

/// ANSI slot targets for dark themes: optional hue, then (normal, bright)
/// lightness. Light themes swap the pair so bright slots sit low.
const ANSI_TARGETS: [(Option<f32>, f32, f32); 8] = [
    (None, 8.0, 40.0),         // black / bright black
    (Some(0.0), 45.0, 60.0),   // red
    (Some(120.0), 45.0, 60.0), // green
    (Some(50.0), 55.0, 70.0),  // yellow
    (Some(230.0), 45.0, 60.0), // blue
    (Some(300.0), 45.0, 60.0), // magenta
    (Some(190.0), 50.0, 65.0), // cyan
    (None, 80.0, 95.0),        // white / bright white
];

/// ΔE radius inside which an extracted color may stand in for an ANSI slot.
const ANSI_MATCH_DELTA_E: f32 = 25.0;

/// Classify the ranked colors into the full 29-role semantic palette.
///
/// Roles the image cannot supply are synthesized from what it can; harmony
/// validation then repairs contrast and separation violations, warning if
/// three passes were not enough.
pub fn assign_roles(
    ranked: &[RankedColor],
    mode: ThemeMode,
    diags: &mut Diagnostics,
) -> SemanticPalette {
    let pool: Vec<RankedColor> = if ranked.is_empty() {
        vec![neutral_seed(mode)]
    } else {
        ranked.to_vec()
    };

    let bgs = assign_backgrounds(&pool, mode);
    let mut texts = assign_texts(&pool, &bgs, mode);
    let (mut accent_primary, accent_secondary) = assign_accents(&pool, bgs[0]);
    let (mut error, mut warning, mut success) = assign_status(&pool, accent_primary);
    let ansi = assign_ansi(&pool, mode, bgs[0]);

    harmonize(
        bgs[0],
        &mut texts[0],
        &mut accent_primary,
        &mut error,
        &mut warning,
        &mut success,
        mode,
        diags,
    );

    // Borders mirror other roles, so they are fixed after harmony.
    let border_active = texts[0];
    let border_inactive = bgs[1];

    SemanticPalette::new(
        [
            bgs[0],
            bgs[1],
            bgs[2],
            texts[0],
            texts[1],
            texts[2],
            accent_primary,
            accent_secondary,
            error,
            warning,
            success,
            border_active,
            border_inactive,
        ],
        ansi,
    )
}

fn neutral_seed(mode: ThemeMode) -> RankedColor {
    let l = match mode {
        ThemeMode::Dark => 30.0,
        ThemeMode::Light => 75.0,
    };
    RankedColor {
        color: Color::from_lab(l, 0.0, 0.0),
        share: 1.0,
        coverage: 1.0,
        uniqueness: 1.0,
        chroma: 0.0,
        lightness_balance: 1.0,
        score: 1.0,
    }
}

/// Score candidates inside the theme's lightness window on coverage,
/// neutrality, and contrast potential; synthesize missing tiers by pushing
/// the primary's lightness toward mid-gray.
fn assign_backgrounds(pool: &[RankedColor], mode: ThemeMode) -> [Color; 3] {
    let white = Color::from_rgb(255, 255, 255);
    let black = Color::from_rgb(0, 0, 0);

    let in_window = |l: f32| match mode {
        ThemeMode::Dark => l <= 45.0,
        ThemeMode::Light => l >= 55.0,
    };

    let mut scored: Vec<(f32, Color)> = pool
        .iter()
        .filter(|c| in_window(c.color.lab().0))
        .map(|c| {
            let (_, s, _) = c.color.hsl();
            let neutrality = 1.0 - s;
            let contrast_potential = Color::contrast_ratio(&c.color, &white)
                .max(Color::contrast_ratio(&c.color, &black))
                / 21.0;
            (
                0.4 * c.coverage + 0.3 * neutrality + 0.3 * contrast_potential,
                c.color,
            )
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut bgs: Vec<Color> = scored.into_iter().take(3).map(|(_, c)| c).collect();

    if bgs.is_empty() {
        // Nothing in the window at all: drag the best-covered color into it.
        let base = pool[0].color;
        let l = match mode {
            ThemeMode::Dark => 12.0,
            ThemeMode::Light => 94.0,
        };
        bgs.push(base.with_lightness(l));
    }
    while bgs.len() < 3 {
        let (l, _, _) = bgs[0].lab();
        let step = 10.0 * bgs.len() as f32;
        let toward_mid = if l <= 50.0 { l + step } else { l - step };
        bgs.push(bgs[0].with_lightness(toward_mid.clamp(0.0, 100.0)));
    }

    [bgs[0], bgs[1], bgs[2]]
}

/// For each background tier, take the first candidate (brightest-first on
/// dark themes, darkest-first on light) that clears the tier's contrast
/// threshold, synthesizing from the most extreme candidate otherwise.
fn assign_texts(pool: &[RankedColor], bgs: &[Color; 3], mode: ThemeMode) -> [Color; 3] {
    let mut candidates: Vec<Color> = pool.iter().map(|c| c.color).collect();
    candidates.sort_by(|a, b| {
        let (la, _, _) = a.lab();
        let (lb, _, _) = b.lab();
        match mode {
            ThemeMode::Dark => lb.partial_cmp(&la),
            ThemeMode::Light => la.partial_cmp(&lb),
        }
        .unwrap_or(std::cmp::Ordering::Equal)
    });

    let thresholds = [
        TEXT_PRIMARY_CONTRAST,
        TEXT_SECONDARY_CONTRAST,
        TEXT_TERTIARY_CONTRAST,
    ];
    let extreme = candidates[0];

    let mut texts = [extreme; 3];
    for (i, (bg, threshold)) in bgs.iter().zip(thresholds).enumerate() {
        texts[i] = candidates
            .iter()
            .copied()
            .find(|c| Color::contrast_ratio(c, bg) >= threshold)
            .unwrap_or_else(|| synthesize_text(extreme, *bg, threshold, mode));
    }

    // Gentle temperature match: a warm background tints the primary text
    // warm, a cool one tints it cool.
    let (_, _, bg_b) = bgs[0].lab();
    if bg_b > 8.0 {
        let (l, _, _) = texts[0].lab();
        texts[0] = texts[0].shift_ab(0.0, 6.0).with_lightness(l - 2.0);
    } else if bg_b < -8.0 {
        let (l, _, _) = texts[0].lab();
        texts[0] = texts[0].shift_ab(0.0, -6.0).with_lightness(l + 2.0);
    }

    texts
}

fn synthesize_text(base: Color, bg: Color, threshold: f32, mode: ThemeMode) -> Color {
    let step = match mode {
        ThemeMode::Dark => 10.0,
        ThemeMode::Light => -10.0,
    };
    let mut current = base;
    for _ in 0..12 {
        if Color::contrast_ratio(&current, &bg) >= threshold {
            break;
        }
        let (l, _, _) = current.lab();
        if (step > 0.0 && l >= 100.0) || (step < 0.0 && l <= 0.0) {
            break;
        }
        current = current.with_lightness(l + step);
    }
    current
}

/// Vibrant-color selection: saturated candidates with workable contrast,
/// scored on saturation, contrast, uniqueness, and coverage. The secondary
/// must sit at least ΔE 15 away or is derived by a 150° hue rotation.
fn assign_accents(pool: &[RankedColor], bg_primary: Color) -> (Color, Color) {
    let mut scored: Vec<(f32, Color)> = pool
        .iter()
        .filter_map(|c| {
            let (_, s, _) = c.color.hsl();
            let contrast = Color::contrast_ratio(&c.color, &bg_primary);
            if s < ACCENT_MIN_SATURATION || contrast < ACCENT_CONTRAST {
                return None;
            }
            let score =
                0.35 * s + 0.25 * (contrast / 21.0) + 0.25 * c.uniqueness + 0.15 * c.coverage;
            Some((score, c.color))
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let primary = scored.first().map(|(_, c)| *c).unwrap_or_else(|| {
        // No vibrant candidate: fall back to the most chromatic color.
        pool.iter()
            .max_by(|a, b| {
                a.color
                    .chroma()
                    .partial_cmp(&b.color.chroma())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("pool is non-empty")
            .color
    });

    let secondary = scored
        .iter()
        .skip(1)
        .map(|(_, c)| *c)
        .find(|c| c.delta_e(&primary) >= ACCENT_SEPARATION)
        .unwrap_or_else(|| {
            let (h, s, l) = primary.hsl();
            Color::from_hsl(h + 150.0, s, l)
        });

    (primary, secondary)
}

/// Status roles pick the palette candidate nearest the conventional hue,
/// synthesizing from accent-primary when the image offers nothing in range.
fn assign_status(pool: &[RankedColor], accent_primary: Color) -> (Color, Color, Color) {
    let error = status_color(pool, accent_primary, 340.0, 20.0, 0.0);
    let warning = status_color(pool, accent_primary, 35.0, 55.0, 45.0);
    let success = status_color(pool, accent_primary, 100.0, 140.0, 120.0);
    (error, warning, success)
}

/// Near-neutral colors read as surfaces, not signals, so status candidates
/// need real saturation.
const STATUS_MIN_SATURATION: f32 = 0.3;

fn status_color(
    pool: &[RankedColor],
    accent_primary: Color,
    window_lo: f32,
    window_hi: f32,
    target_hue: f32,
) -> Color {
    pool.iter()
        .filter(|c| {
            let (h, s, _) = c.color.hsl();
            s >= STATUS_MIN_SATURATION && hue_in_window(h, window_lo, window_hi)
        })
        .min_by(|a, b| {
            let da = hue_distance(a.color.hsl().0, target_hue);
            let db = hue_distance(b.color.hsl().0, target_hue);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|c| c.color)
        .unwrap_or_else(|| {
            let (_, _, l) = accent_primary.hsl();
            Color::from_hsl(target_hue, 0.7, l)
        })
}

/// Hue-bucket ANSI assignment. Chromatic slots take the closest-hue
/// extracted color when it sits within ΔE 25 of the slot target, otherwise
/// the target itself; the black/white slots derive from the background hue.
fn assign_ansi(pool: &[RankedColor], mode: ThemeMode, bg_primary: Color) -> [Color; 16] {
    let (bg_hue, _, _) = bg_primary.hsl();
    let mut slots = [bg_primary; 16];

    for (pair, (hue, l_dark_normal, l_dark_bright)) in ANSI_TARGETS.iter().enumerate() {
        let (l_normal, l_bright) = match mode {
            ThemeMode::Dark => (*l_dark_normal, *l_dark_bright),
            ThemeMode::Light => (*l_dark_bright, *l_dark_normal),
        };
        for (slot, target_l) in [(pair, l_normal), (pair + 8, l_bright)] {
            slots[slot] = match hue {
                None => Color::from_hsl(bg_hue, 0.08, 0.5).with_lightness(target_l),
                Some(target_hue) => {
                    let target = Color::from_hsl(*target_hue, 0.7, 0.5).with_lightness(target_l);
                    pool.iter()
                        .filter(|c| c.color.hsl().1 > 0.05)
                        .min_by(|a, b| {
                            let da = hue_distance(a.color.hsl().0, *target_hue);
                            let db = hue_distance(b.color.hsl().0, *target_hue);
                            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                        })
                        .map(|c| c.color)
                        .filter(|c| c.delta_e(&target) <= ANSI_MATCH_DELTA_E)
                        .unwrap_or(target)
                }
            };
        }
    }

    slots
}

/// Post-assignment repair: contrast floors for text and accent against the
/// primary background, pairwise ΔE separation among the key roles. Up to
/// three passes; a residual violation is a warning, never a failure.
#[allow(clippy::too_many_arguments)]
fn harmonize(
    bg_primary: Color,
    text_primary: &mut Color,
    accent_primary: &mut Color,
    error: &mut Color,
    warning: &mut Color,
    success: &mut Color,
    mode: ThemeMode,
    diags: &mut Diagnostics,
) {
    let step = match mode {
        ThemeMode::Dark => 10.0,
        ThemeMode::Light => -10.0,
    };

    for _ in 0..3 {
        let mut clean = true;

        if Color::contrast_ratio(&bg_primary, text_primary) < TEXT_PRIMARY_CONTRAST {
            *text_primary = nudge_l(*text_primary, step);
            clean = false;
        }
        if Color::contrast_ratio(accent_primary, &bg_primary) < ACCENT_CONTRAST {
            *accent_primary = nudge_l(*accent_primary, step);
            clean = false;
        }

        let mut key_roles = [
            bg_primary,
            *accent_primary,
            *error,
            *warning,
            *success,
        ];
        for i in 0..key_roles.len() {
            for j in (i + 1)..key_roles.len() {
                if key_roles[i].delta_e(&key_roles[j]) < KEY_ROLE_SEPARATION {
                    let (li, _, _) = key_roles[i].lab();
                    let (lj, _, _) = key_roles[j].lab();
                    let away = if lj >= li { 10.0 } else { -10.0 };
                    key_roles[j] = nudge_l(key_roles[j], away);
                    clean = false;
                }
            }
        }
        *accent_primary = key_roles[1];
        *error = key_roles[2];
        *warning = key_roles[3];
        *success = key_roles[4];

        if clean {
            return;
        }
    }

    let residual = Color::contrast_ratio(&bg_primary, text_primary) < TEXT_PRIMARY_CONTRAST
        || Color::contrast_ratio(accent_primary, &bg_primary) < ACCENT_CONTRAST
        || {
            let key_roles = [bg_primary, *accent_primary, *error, *warning, *success];
            key_roles.iter().enumerate().any(|(i, a)| {
                key_roles[i + 1..]
                    .iter()
                    .any(|b| a.delta_e(b) < KEY_ROLE_SEPARATION)
            })
        };
    if residual {
        diags.warn("harmony validation could not satisfy all constraints after three passes");
    }
}

fn nudge_l(color: Color, step: f32) -> Color {
    let (l, _, _) = color.lab();
    color.with_lightness((l + step).clamp(0.0, 100.0))
}

fn hue_distance(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Circular hue window membership; `lo > hi` means the window wraps 0°.
fn hue_in_window(h: f32, lo: f32, hi: f32) -> bool {
    if lo <= hi {
        (lo..=hi).contains(&h)
    } else {
        h >= lo || h <= hi
    }
}
