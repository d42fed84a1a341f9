use std::path::{Path, PathBuf};

use luminol::cli::{Quality, ThemeMode};
use luminol::color::Color;
use luminol::config::{AppConfig, ColorBinding, Config, GlobalConfig};
use luminol::engine::{self, RunOptions};
use luminol::error::Diagnostics;
use luminol::format::ColorFormat;
use luminol::palette::{ANSI_ROLES, UI_ROLES};
use luminol::render;
use luminol::transform::{Transform, TransformKind};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("luminol-integration").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn create_dark_photo(path: &Path) {
    let img = image::RgbImage::from_fn(96, 64, |x, y| {
        let r = ((x * 40) / 96) as u8;
        let g = ((y * 30) / 64) as u8 + 5;
        let b = 30 + ((x + y) % 25) as u8;
        image::Rgb([r, g, b])
    });
    img.save(path).unwrap();
}

fn create_light_photo(path: &Path) {
    let img = image::RgbImage::from_fn(96, 64, |x, y| {
        let r = 195 + ((x * 55) / 96) as u8;
        let g = 190 + ((y * 55) / 64) as u8;
        let b = 180 + (((x + y) * 30) / 160).min(70) as u8;
        image::Rgb([r, g, b])
    });
    img.save(path).unwrap();
}

fn create_colorful_photo(path: &Path) {
    let img = image::RgbImage::from_fn(128, 96, |x, y| {
        match ((x / 32) + (y / 32) * 4) % 6 {
            0 => image::Rgb([25, 28, 40]),
            1 => image::Rgb([200, 90, 70]),
            2 => image::Rgb([90, 180, 160]),
            3 => image::Rgb([230, 220, 200]),
            4 => image::Rgb([70, 110, 200]),
            _ => image::Rgb([40, 45, 60]),
        }
    });
    img.save(path).unwrap();
}

fn build_palette(image: &Path, theme: Option<ThemeMode>) -> luminol::SemanticPalette {
    let options = RunOptions {
        image: image.to_path_buf(),
        theme_override: theme,
        quality: Quality::Balanced,
        dry_run: true,
    };
    let config = Config::default();
    let mut diags = Diagnostics::new();
    engine::build_palette(&options, &config, &mut diags).unwrap()
}

fn app(name: &str, syntax: &str, format: ColorFormat) -> AppConfig {
    AppConfig {
        name: name.into(),
        output_file: format!("{name}.conf"),
        color_format: format,
        syntax: syntax.into(),
        template: None,
        remap_colors: false,
        colors: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Pipeline invariants
// ---------------------------------------------------------------------------

#[test]
fn every_palette_has_all_29_roles() {
    let dir = fixture_dir("roles");
    let path = dir.join("wall.png");
    create_colorful_photo(&path);

    let palette = build_palette(&path, None);
    for role in UI_ROLES.iter().chain(ANSI_ROLES.iter()) {
        assert!(palette.get(role).is_some(), "role {role} missing");
    }
}

#[test]
fn text_contrast_invariant_holds() {
    let dir = fixture_dir("contrast");
    for (name, builder) in [
        ("dark.png", create_dark_photo as fn(&Path)),
        ("light.png", create_light_photo),
        ("colorful.png", create_colorful_photo),
    ] {
        let path = dir.join(name);
        builder(&path);

        let options = RunOptions {
            image: path.clone(),
            theme_override: None,
            quality: Quality::Balanced,
            dry_run: true,
        };
        let mut diags = Diagnostics::new();
        let palette = engine::build_palette(&options, &Config::default(), &mut diags).unwrap();

        let bg = palette.get("bg-primary").unwrap();
        let text = palette.get("text-primary").unwrap();
        let ratio = Color::contrast_ratio(&bg, &text);
        assert!(
            ratio >= 4.5 || !diags.is_empty(),
            "{name}: contrast {ratio:.2} below 4.5 with no harmony warning"
        );
    }
}

#[test]
fn pipeline_is_deterministic() {
    let dir = fixture_dir("determinism");
    let path = dir.join("wall.png");
    create_colorful_photo(&path);

    let config = app("rofi", "*{{name}: {color};}", ColorFormat::Hex8);
    let first = render::render_default(&config, &build_palette(&path, None));
    let second = render::render_default(&config, &build_palette(&path, None));
    assert_eq!(first, second, "identical input must render identical bytes");
}

#[test]
fn theme_override_wins_over_image_luminance() {
    let dir = fixture_dir("override");
    let path = dir.join("dark.png");
    create_dark_photo(&path);

    let light = build_palette(&path, Some(ThemeMode::Light));
    let (l, _, _) = light.get("bg-primary").unwrap().lab();
    assert!(l >= 55.0, "forced light theme should pick a light background, got L={l}");
}

#[test]
fn auto_theme_follows_image_luminance() {
    let dir = fixture_dir("auto");
    let dark_path = dir.join("dark.png");
    let light_path = dir.join("light.png");
    create_dark_photo(&dark_path);
    create_light_photo(&light_path);

    let (dark_l, _, _) = build_palette(&dark_path, None).get("bg-primary").unwrap().lab();
    let (light_l, _, _) = build_palette(&light_path, None).get("bg-primary").unwrap().lab();
    assert!(dark_l < light_l, "dark image bg L={dark_l}, light image bg L={light_l}");
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn default_mode_rofi_line_shape() {
    let dir = fixture_dir("rofi");
    let path = dir.join("wall.png");
    create_dark_photo(&path);
    let palette = build_palette(&path, Some(ThemeMode::Dark));

    let config = app("rofi", "*{{name}: {color};}", ColorFormat::Hex8);
    let out = render::render_default(&config, &palette);

    let first = out.lines().next().unwrap();
    let expected = format!(
        "*{{bg-primary: {};}}",
        ColorFormat::Hex8.emit(&palette.get("bg-primary").unwrap())
    );
    assert_eq!(first, expected);
    assert!(first.starts_with("*{bg-primary: #"));
    assert!(first.ends_with("ff;}"), "palette colors are opaque: {first}");
    assert_eq!(out.lines().count(), 13);
}

#[test]
fn custom_mapping_hyprland_brightens_accent() {
    let dir = fixture_dir("hyprland");
    let path = dir.join("wall.png");
    create_colorful_photo(&path);
    let palette = build_palette(&path, Some(ThemeMode::Dark));

    let mut config = app("hyprland", "${name} = {color}", ColorFormat::Rgba);
    config.remap_colors = true;
    config.colors = vec![ColorBinding {
        name: "active-border".into(),
        source: "accent-primary".into(),
        transforms: vec![Transform {
            kind: TransformKind::Brightness,
            value: 1.2,
        }],
    }];

    let mut diags = Diagnostics::new();
    let out = render::render_custom(&config, &palette, &mut diags).unwrap();
    assert!(diags.is_empty(), "1.2 is in range: {:?}", diags.warnings());

    let line = out.lines().next().unwrap();
    assert!(line.starts_with("$active-border = rgba("), "got: {line}");
    assert!(line.ends_with(", 1.00)"), "got: {line}");

    let accent = palette.get("accent-primary").unwrap();
    let (_, _, l_before) = accent.hsl();
    // Parse the emitted channels back and compare lightness
    let body = line.strip_prefix("$active-border = ").unwrap();
    let (r, g, b, _) = ColorFormat::Rgba.parse(body).unwrap();
    let (_, _, l_after) = Color::from_rgb(r, g, b).hsl();
    assert!(
        l_after > l_before - 0.01,
        "brightness 1.2 must not darken: {l_before} → {l_after}"
    );
}

#[test]
fn template_mode_semantic_replaces_known_and_keeps_unknown() {
    let dir = fixture_dir("template-semantic");
    let image = dir.join("wall.png");
    create_colorful_photo(&image);
    let palette = build_palette(&image, Some(ThemeMode::Dark));

    let template_path = dir.join("theme.conf");
    std::fs::write(&template_path, "frame = \"{accent-primary}\"\nicon = \"{unknown}\"\n").unwrap();

    let mut config = app("semantic", "{placeholder}", ColorFormat::Hex6);
    config.template = Some(template_path.display().to_string());

    let mut diags = Diagnostics::new();
    let out = render::render_app(&config, &palette, &mut diags).unwrap();

    let accent = ColorFormat::Hex6.emit(&palette.get("accent-primary").unwrap());
    assert!(out.contains(&format!("frame = \"{accent}\"")), "got: {out}");
    assert!(out.contains("icon = \"{unknown}\""), "unknown placeholder must survive: {out}");
}

#[test]
fn template_mode_custom_applies_opacity() {
    let dir = fixture_dir("template-custom");
    let image = dir.join("wall.png");
    create_colorful_photo(&image);
    let palette = build_palette(&image, Some(ThemeMode::Dark));

    let template_path = dir.join("dunst.conf");
    std::fs::write(&template_path, "frame_color = @frame\n").unwrap();

    let mut config = app("dunst", "@placeholder", ColorFormat::Hex8);
    config.template = Some(template_path.display().to_string());
    config.remap_colors = true;
    config.colors = vec![ColorBinding {
        name: "frame".into(),
        source: "accent-primary".into(),
        transforms: vec![Transform {
            kind: TransformKind::Opacity,
            value: 0.8,
        }],
    }];

    let mut diags = Diagnostics::new();
    let out = render::render_app(&config, &palette, &mut diags).unwrap();

    let expected = ColorFormat::Hex8.emit(&palette.get("accent-primary").unwrap().with_alpha(0.8));
    assert_eq!(out, format!("frame_color = {expected}\n"));
    assert!(out.trim_end().ends_with("cc"), "0.8 alpha is 0xcc: {out}");
}

#[test]
fn out_of_range_brightness_clamps_to_white_with_warning() {
    let dir = fixture_dir("clamp");
    let image = dir.join("wall.png");
    create_dark_photo(&image);
    let palette = build_palette(&image, Some(ThemeMode::Dark));

    let mut config = app("clamp", "{name} {color}", ColorFormat::Hex6);
    config.remap_colors = true;
    config.colors = vec![ColorBinding {
        name: "blown".into(),
        source: "text-primary".into(),
        transforms: vec![Transform {
            kind: TransformKind::Brightness,
            value: 5.0,
        }],
    }];

    let mut diags = Diagnostics::new();
    let out = render::render_custom(&config, &palette, &mut diags).unwrap();
    assert_eq!(diags.len(), 1, "clamp warning expected: {:?}", diags.warnings());
    assert_eq!(out.trim_end(), "blown #ffffff", "brightness 3.0 saturates lightness to white");
}

#[test]
fn remap_without_colors_table_exits_with_config_error() {
    let mut diags = Diagnostics::new();
    let err = Config::parse(
        r#"
[waybar]
enabled = true
color-format = "hex6"
output-file = "colors.css"
syntax = "@define-color {name} {color};"
remap-colors = true
"#,
        &mut diags,
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("waybar"), "diagnostic must name the app: {err}");
}

// ---------------------------------------------------------------------------
// Driver behavior
// ---------------------------------------------------------------------------

#[test]
fn run_writes_output_files_atomically_resolved() {
    let dir = fixture_dir("run-write");
    let image = dir.join("wall.png");
    create_colorful_photo(&image);

    let out_path = dir.join("out").join("rofi.rasi");
    let mut rofi = app("rofi", "*{{name}: {color};}", ColorFormat::Hex6);
    rofi.output_file = out_path.display().to_string();

    let config = Config {
        global: GlobalConfig::default(),
        apps: vec![rofi],
    };
    let options = RunOptions {
        image,
        theme_override: None,
        quality: Quality::Fast,
        dry_run: false,
    };

    let mut diags = Diagnostics::new();
    engine::run(&options, &config, &mut diags).unwrap();

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(written.lines().count(), 13);
    assert!(written.starts_with("*{bg-primary: #"));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = fixture_dir("dry-run");
    let image = dir.join("wall.png");
    create_dark_photo(&image);

    let out_path = dir.join("never.css");
    let mut waybar = app("waybar", "{name} {color}", ColorFormat::Rgb);
    waybar.output_file = out_path.display().to_string();

    let config = Config {
        global: GlobalConfig::default(),
        apps: vec![waybar],
    };
    let options = RunOptions {
        image,
        theme_override: None,
        quality: Quality::Fast,
        dry_run: true,
    };

    let mut diags = Diagnostics::new();
    engine::run(&options, &config, &mut diags).unwrap();
    assert!(!out_path.exists(), "dry-run must not write files");
}

#[test]
fn missing_image_fails_with_image_error() {
    let options = RunOptions {
        image: PathBuf::from("/nonexistent/wall.png"),
        theme_override: None,
        quality: Quality::Fast,
        dry_run: true,
    };
    let mut diags = Diagnostics::new();
    let err = engine::run(&options, &Config::default(), &mut diags).unwrap_err();
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn unknown_binding_source_fails_during_render() {
    let dir = fixture_dir("bad-source");
    let image = dir.join("wall.png");
    create_dark_photo(&image);

    let mut broken = app("broken", "{name} {color}", ColorFormat::Hex6);
    broken.remap_colors = true;
    broken.colors = vec![ColorBinding {
        name: "x".into(),
        source: "not-a-role".into(),
        transforms: Vec::new(),
    }];

    let config = Config {
        global: GlobalConfig::default(),
        apps: vec![broken],
    };
    let options = RunOptions {
        image,
        theme_override: None,
        quality: Quality::Fast,
        dry_run: true,
    };

    let mut diags = Diagnostics::new();
    let err = engine::run(&options, &config, &mut diags).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("not-a-role"), "got: {err}");
}
