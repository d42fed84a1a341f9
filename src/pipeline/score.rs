use super::extract::Cluster;
use crate::color::{delta_e, Color};

/// Ranking keeps at most this many colors for role assignment.
pub const MAX_RANKED: usize = 12;

/// A cluster promoted to a scored, rankable color.
#[derive(Debug, Clone, Copy)]
pub struct RankedColor {
    pub color: Color,
    /// Raw share of total sample weight, in [0, 1].
    pub share: f32,
    /// Log-normalized coverage sub-score.
    pub coverage: f32,
    pub uniqueness: f32,
    pub chroma: f32,
    pub lightness_balance: f32,
    pub score: f32,
}

/// Score clusters on coverage, uniqueness, chroma, and lightness balance,
/// then keep the best [`MAX_RANKED`] in descending score order.
pub fn rank_clusters(clusters: &[Cluster], total_weight: u64) -> Vec<RankedColor> {
    let log_total = ((1 + total_weight) as f32).ln().max(f32::EPSILON);

    let mut ranked: Vec<RankedColor> = clusters
        .iter()
        .enumerate()
        .map(|(i, cluster)| {
            let coverage = ((1 + cluster.weight) as f32).ln() / log_total;

            let uniqueness = clusters
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| delta_e(cluster.centroid, other.centroid))
                .fold(f32::MAX, f32::min);
            // A lone cluster has nothing to collide with.
            let uniqueness = if uniqueness == f32::MAX {
                1.0
            } else {
                (uniqueness / 50.0).clamp(0.0, 1.0)
            };

            let chroma_raw =
                (cluster.centroid.a.powi(2) + cluster.centroid.b.powi(2)).sqrt();
            let chroma = (chroma_raw / 140.0).clamp(0.0, 1.0);

            let lightness_balance =
                (1.0 - (cluster.centroid.l - 50.0).abs() / 50.0).clamp(0.0, 1.0);

            let score = 0.35 * coverage.clamp(0.0, 1.0)
                + 0.25 * uniqueness
                + 0.25 * chroma
                + 0.15 * lightness_balance;

            RankedColor {
                color: Color::from_lab_raw(cluster.centroid),
                share: cluster.weight as f32 / total_weight.max(1) as f32,
                coverage: coverage.clamp(0.0, 1.0),
                uniqueness,
                chroma,
                lightness_balance,
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(MAX_RANKED);
    ranked
}
