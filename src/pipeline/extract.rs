use palette::Lab;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::sample::{SampleSet, WeightedPoint};
use crate::cli::Quality;
use crate::color::delta_e;

/// Cluster count before merging; the merge pass typically leaves 5-8.
pub const K: usize = 8;

/// Iteration stops once no centroid moves further than this (ΔE).
const CONVERGENCE_SHIFT: f32 = 0.5;

/// Centroids closer than this after convergence describe the same color.
const MERGE_DELTA_E: f32 = 12.0;

/// A dominant color: Lab centroid plus the sample weight it covers.
#[derive(Debug, Clone, Copy)]
pub struct Cluster {
    pub centroid: Lab,
    pub weight: u64,
}

/// Run weighted k-means++ over the Lab sample points.
///
/// The RNG seed derives from the image dimensions, so identical image bytes
/// always produce identical clusters. Returns clusters sorted by weight
/// descending.
pub fn extract_clusters(samples: &SampleSet, quality: Quality) -> Vec<Cluster> {
    let points = &samples.points;
    if points.is_empty() {
        return Vec::new();
    }

    // Degenerate images with fewer distinct colors than k skip clustering
    // entirely: one cluster per unique color.
    if let Some(mut clusters) = unique_clusters(points) {
        clusters.sort_by(|a, b| b.weight.cmp(&a.weight));
        return clusters;
    }

    let seed = ((samples.width as u64) << 32) | samples.height as u64;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = seed_centroids(points, K, &mut rng);

    for _ in 0..quality.max_iterations() {
        let (sums, weights, farthest) = assign_points(points, &centroids);

        let mut max_shift_sq = 0.0f32;
        for (i, centroid) in centroids.iter_mut().enumerate() {
            let updated = if weights[i] == 0 {
                // Reseed an empty cluster to the point farthest from every
                // centroid, matching the farthest-point restart strategy.
                points[farthest].lab
            } else {
                let w = weights[i] as f64;
                Lab::new(
                    (sums[i][0] / w) as f32,
                    (sums[i][1] / w) as f32,
                    (sums[i][2] / w) as f32,
                )
            };
            let shift_sq = dist_sq(*centroid, updated);
            max_shift_sq = max_shift_sq.max(shift_sq);
            *centroid = updated;
        }

        if max_shift_sq < CONVERGENCE_SHIFT * CONVERGENCE_SHIFT {
            break;
        }
    }

    // Final assignment for accurate coverage, then drop degenerate clusters.
    let (_, weights, _) = assign_points(points, &centroids);
    let mut clusters: Vec<Cluster> = centroids
        .into_iter()
        .zip(weights)
        .filter(|(c, w)| *w > 0 && c.l.is_finite() && c.a.is_finite() && c.b.is_finite())
        .map(|(centroid, weight)| Cluster { centroid, weight })
        .collect();

    merge_close_clusters(&mut clusters);
    clusters.sort_by(|a, b| b.weight.cmp(&a.weight));
    clusters
}

/// One assignment pass: per-centroid weighted Lab sums and weights, plus the
/// index of the point farthest from its nearest centroid.
fn assign_points(points: &[WeightedPoint], centroids: &[Lab]) -> (Vec<[f64; 3]>, Vec<u64>, usize) {
    let mut sums = vec![[0.0f64; 3]; centroids.len()];
    let mut weights = vec![0u64; centroids.len()];
    let mut farthest = (0usize, -1.0f32);

    for (idx, point) in points.iter().enumerate() {
        let (nearest, dist_sq) = nearest_centroid(centroids, point.lab);
        let w = point.weight as f64;
        sums[nearest][0] += point.lab.l as f64 * w;
        sums[nearest][1] += point.lab.a as f64 * w;
        sums[nearest][2] += point.lab.b as f64 * w;
        weights[nearest] += point.weight as u64;
        if dist_sq > farthest.1 {
            farthest = (idx, dist_sq);
        }
    }

    (sums, weights, farthest.0)
}

/// k-means++ seeding: the first centroid is weight-proportional, each later
/// one is drawn with probability ∝ weight · D² to the nearest chosen centroid.
fn seed_centroids(points: &[WeightedPoint], k: usize, rng: &mut StdRng) -> Vec<Lab> {
    let total_weight: f64 = points.iter().map(|p| p.weight as f64).sum();
    let first = pick_by_cumulative(points, rng, total_weight, |_, p| p.weight as f64);
    let mut centroids = vec![points[first].lab];

    while centroids.len() < k {
        let scores: Vec<f64> = points
            .iter()
            .map(|p| p.weight as f64 * nearest_centroid(&centroids, p.lab).1 as f64)
            .collect();
        let total: f64 = scores.iter().sum();
        if total <= f64::EPSILON {
            break;
        }
        let idx = pick_by_cumulative(points, rng, total, |i, _| scores[i]);
        centroids.push(points[idx].lab);
    }

    centroids
}

fn pick_by_cumulative(
    points: &[WeightedPoint],
    rng: &mut StdRng,
    total: f64,
    score: impl Fn(usize, &WeightedPoint) -> f64,
) -> usize {
    let target = rng.gen_range(0.0..total);
    let mut acc = 0.0;
    for (i, point) in points.iter().enumerate() {
        acc += score(i, point);
        if acc > target {
            return i;
        }
    }
    points.len() - 1
}

fn nearest_centroid(centroids: &[Lab], point: Lab) -> (usize, f32) {
    let mut best = (0usize, f32::MAX);
    for (i, centroid) in centroids.iter().enumerate() {
        let d = dist_sq(*centroid, point);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn dist_sq(a: Lab, b: Lab) -> f32 {
    (a.l - b.l).powi(2) + (a.a - b.a).powi(2) + (a.b - b.b).powi(2)
}

/// Merge every cluster pair closer than the ΔE threshold by weighted
/// centroid average, repeating until all survivors are distinct.
fn merge_close_clusters(clusters: &mut Vec<Cluster>) {
    let mut i = 0;
    while i < clusters.len() {
        let mut j = i + 1;
        while j < clusters.len() {
            if delta_e(clusters[i].centroid, clusters[j].centroid) < MERGE_DELTA_E {
                let (a, b) = (clusters[i], clusters[j]);
                let total = (a.weight + b.weight) as f64;
                let wa = a.weight as f64 / total;
                let wb = b.weight as f64 / total;
                clusters[i] = Cluster {
                    centroid: Lab::new(
                        (a.centroid.l as f64 * wa + b.centroid.l as f64 * wb) as f32,
                        (a.centroid.a as f64 * wa + b.centroid.a as f64 * wb) as f32,
                        (a.centroid.b as f64 * wa + b.centroid.b as f64 * wb) as f32,
                    ),
                    weight: a.weight + b.weight,
                };
                clusters.remove(j);
                // Restart the inner scan: the merged centroid moved.
                j = i + 1;
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

/// Exact-color clusters for images with at most k distinct colors.
/// Returns `None` as soon as more than k are seen, signaling the caller to
/// run full k-means.
fn unique_clusters(points: &[WeightedPoint]) -> Option<Vec<Cluster>> {
    let mut clusters: Vec<((u32, u32, u32), Cluster)> = Vec::new();
    for point in points {
        let key = (
            point.lab.l.to_bits(),
            point.lab.a.to_bits(),
            point.lab.b.to_bits(),
        );
        match clusters.iter_mut().find(|(k, _)| *k == key) {
            Some((_, cluster)) => cluster.weight += point.weight as u64,
            None => {
                if clusters.len() == K {
                    return None;
                }
                clusters.push((
                    key,
                    Cluster {
                        centroid: point.lab,
                        weight: point.weight as u64,
                    },
                ));
            }
        }
    }
    Some(clusters.into_iter().map(|(_, c)| c).collect())
}
