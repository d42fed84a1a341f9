use crate::color::Color;
use crate::palette::SemanticPalette;
use crate::pipeline::score::RankedColor;

/// A truecolor terminal swatch for `color`.
fn swatch(color: &Color) -> String {
    let [r, g, b] = color.rgb();
    format!("\x1b[48;2;{r};{g};{b}m   \x1b[0m")
}

/// Print the ranked extraction result, one swatch per color (`--preview`).
pub fn print_ranked(colors: &[RankedColor]) {
    println!("Extracted colors:");
    for ranked in colors {
        let (h, s, l) = ranked.color.hsl();
        println!(
            "  {} {}  share {:4.1}%  score {:.3}",
            swatch(&ranked.color),
            ranked.color,
            ranked.share * 100.0,
            ranked.score
        );
        tracing::debug!(
            "H: {h:6.2}  S: {s:4.2}  L: {l:4.2}  coverage {:.3}  uniqueness {:.3}  chroma {:.3}",
            ranked.coverage,
            ranked.uniqueness,
            ranked.chroma
        );
    }
}

/// Print the assigned palette grouped by role family, after the palette is
/// frozen and before rendering.
pub fn print_palette(palette: &SemanticPalette) {
    let groups: [(&str, &[&str]); 5] = [
        ("backgrounds", &["bg-primary", "bg-secondary", "bg-tertiary"]),
        ("texts      ", &["text-primary", "text-secondary", "text-tertiary"]),
        ("accents    ", &["accent-primary", "accent-secondary"]),
        ("status     ", &["error-color", "warning-color", "success-color"]),
        ("borders    ", &["border-active", "border-inactive"]),
    ];
    for (label, roles) in groups {
        let row: String = roles
            .iter()
            .filter_map(|r| palette.get(r))
            .map(|c| swatch(&c))
            .collect();
        println!("  {label} {row}");
    }
    for half in [0..8usize, 8..16] {
        let row: String = half.clone().map(|i| swatch(&palette.ansi(i))).collect();
        println!("  ansi {:2}-{:2} {row}", half.start, half.end - 1);
    }
}
