use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use crate::cli::{Quality, ThemeMode};
use crate::config::Config;
use crate::error::{Diagnostics, LuminolError};
use crate::palette::SemanticPalette;
use crate::pipeline::{assign, detect, extract, sample, score};
use crate::{actions, logging, output, paths, preview, render};

/// Per-invocation knobs resolved from the CLI.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub image: PathBuf,
    pub theme_override: Option<ThemeMode>,
    pub quality: Quality,
    pub dry_run: bool,
}

/// One full run: wallpaper command, extraction pipeline, per-app rendering,
/// reload commands. Recoverable problems land in `diags`; the first fatal
/// error aborts.
pub fn run(options: &RunOptions, config: &Config, diags: &mut Diagnostics) -> Result<(), LuminolError> {
    logging::clear_old_logs();
    let log_dir = if config.global.log_output && !options.dry_run {
        logging::create_run_log_dir()
    } else {
        None
    };

    // The wallpaper goes up first so the screen and the generated files
    // change together; a failing setter aborts before any file is touched.
    if !options.dry_run {
        if let Some(command) = &config.global.wallpaper_command {
            actions::apply_wallpaper(command, &options.image, config.global.use_shell, log_dir.as_deref())?;
        }
    }

    let palette = build_palette(options, config, diags)?;
    preview::print_palette(&palette);

    warn_on_colliding_outputs(config, diags);

    for app in &config.apps {
        let content = render::render_app(app, &palette, diags)?;
        if options.dry_run {
            tracing::info!(app = %app.name, "dry-run: output not written");
            continue;
        }
        let path = paths::resolve_output(&app.name, &app.output_file);
        output::write_atomic(&path, &content)?;
    }

    if !options.dry_run {
        actions::run_reload_commands(
            &config.global.reload_commands,
            config.global.use_shell,
            log_dir.as_deref(),
            diags,
        );
    }

    Ok(())
}

/// The color pipeline alone: sample → cluster → rank → classify → assign.
pub fn build_palette(
    options: &RunOptions,
    config: &Config,
    diags: &mut Diagnostics,
) -> Result<SemanticPalette, LuminolError> {
    tracing::info!(image = %options.image.display(), "extracting colors");
    let start = Instant::now();

    let samples = sample::sample_image(&options.image, options.quality)?;
    let clusters = extract::extract_clusters(&samples, options.quality);
    let ranked = score::rank_clusters(&clusters, samples.total_weight);
    let mode = detect::classify_theme(&clusters, options.theme_override, config.global.theme_type);

    tracing::info!(
        ?mode,
        clusters = clusters.len(),
        ranked = ranked.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "extraction finished"
    );

    Ok(assign::assign_roles(&ranked, mode, diags))
}

/// `--preview`: run extraction and ranking only, print the swatches.
pub fn preview_colors(image: &std::path::Path, quality: Quality) -> Result<(), LuminolError> {
    let start = Instant::now();
    let samples = sample::sample_image(image, quality)?;
    let clusters = extract::extract_clusters(&samples, quality);
    let ranked = score::rank_clusters(&clusters, samples.total_weight);
    preview::print_ranked(&ranked);
    tracing::info!(elapsed_ms = start.elapsed().as_millis(), "color extraction finished");
    Ok(())
}

/// Two apps writing the same resolved path would race; flag it as a
/// configuration warning, the later writer wins.
fn warn_on_colliding_outputs(config: &Config, diags: &mut Diagnostics) {
    let mut seen = HashSet::new();
    for app in &config.apps {
        let path = paths::resolve_output(&app.name, &app.output_file);
        if !seen.insert(path.clone()) {
            diags.warn(format!(
                "[{}] writes to {}, which another app also writes",
                app.name,
                path.display()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, GlobalConfig};
    use crate::format::ColorFormat;

    fn app(name: &str, output_file: &str) -> AppConfig {
        AppConfig {
            name: name.into(),
            output_file: output_file.into(),
            color_format: ColorFormat::Hex6,
            syntax: "{name} {color}".into(),
            template: None,
            remap_colors: false,
            colors: Vec::new(),
        }
    }

    #[test]
    fn distinct_outputs_do_not_warn() {
        let config = Config {
            global: GlobalConfig::default(),
            apps: vec![app("a", "/tmp/luminol-a.css"), app("b", "/tmp/luminol-b.css")],
        };
        let mut diags = Diagnostics::new();
        warn_on_colliding_outputs(&config, &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn colliding_outputs_warn_once_per_duplicate() {
        let config = Config {
            global: GlobalConfig::default(),
            apps: vec![
                app("a", "/tmp/luminol-same.css"),
                app("b", "/tmp/luminol-same.css"),
            ],
        };
        let mut diags = Diagnostics::new();
        warn_on_colliding_outputs(&config, &mut diags);
        assert_eq!(diags.len(), 1);
        assert!(diags.warnings()[0].contains("[b]"));
    }
}
