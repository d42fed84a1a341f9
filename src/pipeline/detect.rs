use super::extract::Cluster;
use crate::cli::ThemeMode;
use crate::config::ThemePreference;

/// Weighted mean lightness above this is unambiguously a light image.
const LIGHT_THRESHOLD: f32 = 60.0;

/// Weighted mean lightness below this is unambiguously a dark image.
const DARK_THRESHOLD: f32 = 40.0;

/// Decide the theme. A CLI override wins outright, then an explicit config
/// preference; otherwise the decision falls to the luminance distribution.
pub fn classify_theme(
    clusters: &[Cluster],
    cli_override: Option<ThemeMode>,
    preference: ThemePreference,
) -> ThemeMode {
    if let Some(mode) = cli_override {
        return mode;
    }
    match preference {
        ThemePreference::Light => ThemeMode::Light,
        ThemePreference::Dark => ThemeMode::Dark,
        ThemePreference::Auto => auto_classify(clusters),
    }
}

/// Coverage-weighted mean L decides clear cases; the ambiguous middle band
/// defers to the dominant cluster.
fn auto_classify(clusters: &[Cluster]) -> ThemeMode {
    if clusters.is_empty() {
        return ThemeMode::Dark;
    }

    let total: f64 = clusters.iter().map(|c| c.weight as f64).sum();
    let mean_l =
        (clusters.iter().map(|c| c.centroid.l as f64 * c.weight as f64).sum::<f64>() / total) as f32;
    let variance = clusters
        .iter()
        .map(|c| c.weight as f64 * (c.centroid.l as f64 - mean_l as f64).powi(2))
        .sum::<f64>()
        / total;
    tracing::debug!(mean_l, stddev = variance.sqrt(), "luminance distribution");

    if mean_l > LIGHT_THRESHOLD {
        ThemeMode::Light
    } else if mean_l < DARK_THRESHOLD {
        ThemeMode::Dark
    } else {
        let dominant = clusters
            .iter()
            .max_by_key(|c| c.weight)
            .expect("clusters is non-empty");
        if dominant.centroid.l > 50.0 {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::Lab;

    fn cluster(l: f32, weight: u64) -> Cluster {
        Cluster {
            centroid: Lab::new(l, 0.0, 0.0),
            weight,
        }
    }

    #[test]
    fn cli_override_beats_everything() {
        let clusters = vec![cluster(95.0, 1000)];
        let mode = classify_theme(&clusters, Some(ThemeMode::Dark), ThemePreference::Light);
        assert_eq!(mode, ThemeMode::Dark);
    }

    #[test]
    fn config_preference_beats_auto() {
        let clusters = vec![cluster(95.0, 1000)];
        let mode = classify_theme(&clusters, None, ThemePreference::Dark);
        assert_eq!(mode, ThemeMode::Dark);
    }

    #[test]
    fn bright_image_is_light() {
        let clusters = vec![cluster(85.0, 800), cluster(70.0, 200)];
        assert_eq!(classify_theme(&clusters, None, ThemePreference::Auto), ThemeMode::Light);
    }

    #[test]
    fn dim_image_is_dark() {
        let clusters = vec![cluster(15.0, 800), cluster(35.0, 200)];
        assert_eq!(classify_theme(&clusters, None, ThemePreference::Auto), ThemeMode::Dark);
    }

    #[test]
    fn ambiguous_band_uses_dominant_cluster() {
        // Mean L ≈ 50 either way; only the dominant cluster differs
        let dominant_dark = vec![cluster(30.0, 501), cluster(70.0, 499)];
        assert_eq!(
            classify_theme(&dominant_dark, None, ThemePreference::Auto),
            ThemeMode::Dark
        );
        let dominant_light = vec![cluster(30.0, 499), cluster(70.0, 501)];
        assert_eq!(
            classify_theme(&dominant_light, None, ThemePreference::Auto),
            ThemeMode::Light
        );
    }

    #[test]
    fn weights_shift_the_mean() {
        // Light pixels dominate by weight
        let clusters = vec![cluster(80.0, 900), cluster(20.0, 100)];
        assert_eq!(classify_theme(&clusters, None, ThemePreference::Auto), ThemeMode::Light);
    }

    #[test]
    fn empty_clusters_default_to_dark() {
        assert_eq!(classify_theme(&[], None, ThemePreference::Auto), ThemeMode::Dark);
    }
}
