use std::path::Path;

use image::imageops;
use image::{Rgba, RgbaImage};
use palette::{IntoColor, Lab, Srgb};

use crate::cli::Quality;
use crate::error::LuminolError;

/// Hard input cap; larger wallpapers are rejected before decoding.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// The stride is chosen so the sample count lands near this target.
const TARGET_SAMPLES: u64 = 40_000;

/// Gaussian blur sigma; just enough to attenuate JPEG/PNG noise.
const BLUR_SIGMA: f32 = 1.0;

/// Pixels more transparent than this carry no color information.
const MIN_ALPHA: u8 = 128;

/// A Lab point with its sampling multiplicity.
#[derive(Debug, Clone, Copy)]
pub struct WeightedPoint {
    pub lab: Lab,
    pub weight: u32,
}

/// The sampler's output: weighted Lab points plus image metadata the rest
/// of the pipeline needs (dimensions seed the k-means RNG).
#[derive(Debug, Clone)]
pub struct SampleSet {
    pub points: Vec<WeightedPoint>,
    pub total_weight: u64,
    pub width: u32,
    pub height: u32,
}

/// Load an image and reduce it to weighted Lab sample points: decode,
/// area-averaging downscale, light blur, strided sampling with
/// center-weighted multiplicity.
pub fn sample_image(path: &Path, quality: Quality) -> Result<SampleSet, LuminolError> {
    let meta = std::fs::metadata(path).map_err(|e| LuminolError::Image {
        path: path.to_path_buf(),
        message: format!("cannot read image: {e}"),
    })?;
    if meta.len() > MAX_IMAGE_BYTES {
        return Err(LuminolError::Image {
            path: path.to_path_buf(),
            message: format!(
                "image is {} bytes, above the {} MiB limit",
                meta.len(),
                MAX_IMAGE_BYTES / (1024 * 1024)
            ),
        });
    }

    let img = image::open(path).map_err(|e| LuminolError::Image {
        path: path.to_path_buf(),
        message: format!("decode failed: {e} (supported formats: PNG, JPEG, WebP)"),
    })?;

    let rgba = downscale_area(&img.to_rgba8(), quality.max_dimension());
    let rgba = imageops::blur(&rgba, BLUR_SIGMA);
    let (width, height) = rgba.dimensions();

    let set = collect_samples(&rgba);
    if set.points.is_empty() {
        return Err(LuminolError::Image {
            path: path.to_path_buf(),
            message: "image has no opaque pixels to sample".into(),
        });
    }

    tracing::debug!(
        width,
        height,
        samples = set.points.len(),
        total_weight = set.total_weight,
        "image sampled"
    );
    Ok(set)
}

/// Aspect-preserving area-averaging downscale so max(width, height) fits
/// `max_dim`; images already small enough pass through untouched.
///
/// Each destination pixel is the plain mean of every source pixel its cell
/// covers (a box filter). The `image` crate ships no area-average
/// `FilterType`, so the kernel lives here.
fn downscale_area(src: &RgbaImage, max_dim: u32) -> RgbaImage {
    let (width, height) = src.dimensions();
    let longest = width.max(height);
    if longest <= max_dim {
        return src.clone();
    }

    let scale = max_dim as f64 / longest as f64;
    let new_width = ((width as f64 * scale).round() as u32).max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);

    RgbaImage::from_fn(new_width, new_height, |dx, dy| {
        let x0 = (dx as u64 * width as u64 / new_width as u64) as u32;
        let x1 = (((dx as u64 + 1) * width as u64).div_ceil(new_width as u64) as u32).min(width);
        let y0 = (dy as u64 * height as u64 / new_height as u64) as u32;
        let y1 = (((dy as u64 + 1) * height as u64).div_ceil(new_height as u64) as u32).min(height);

        let mut sums = [0u64; 4];
        for y in y0..y1 {
            for x in x0..x1 {
                let pixel = src.get_pixel(x, y);
                for (sum, channel) in sums.iter_mut().zip(pixel.0) {
                    *sum += channel as u64;
                }
            }
        }
        let count = ((x1 - x0) as u64 * (y1 - y0) as u64).max(1);
        Rgba(sums.map(|sum| ((sum + count / 2) / count) as u8))
    })
}

/// Strided sampling pass. Pixels with alpha < 128 are skipped; retained
/// pixels get multiplicity max(1, round(3·(1 − 0.3·d))) where d is the
/// distance to the image center normalized by the half-diagonal.
fn collect_samples(rgba: &RgbaImage) -> SampleSet {
    let (width, height) = rgba.dimensions();
    let pixel_count = width as u64 * height as u64;
    let stride = ((pixel_count as f64 / TARGET_SAMPLES as f64).sqrt().ceil() as u32).max(1);

    let cx = (width.saturating_sub(1)) as f32 / 2.0;
    let cy = (height.saturating_sub(1)) as f32 / 2.0;
    let half_diagonal = (cx * cx + cy * cy).sqrt().max(1.0);

    let mut points = Vec::new();
    let mut total_weight = 0u64;
    for y in (0..height).step_by(stride as usize) {
        for x in (0..width).step_by(stride as usize) {
            let pixel = rgba.get_pixel(x, y);
            if pixel[3] < MIN_ALPHA {
                continue;
            }
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let d = (dx * dx + dy * dy).sqrt() / half_diagonal;
            let weight = ((3.0 * (1.0 - 0.3 * d)).round() as u32).max(1);

            let srgb: Srgb<f32> = Srgb::new(pixel[0], pixel[1], pixel[2]).into_format();
            points.push(WeightedPoint {
                lab: srgb.into_color(),
                weight,
            });
            total_weight += weight as u64;
        }
    }

    SampleSet {
        points,
        total_weight,
        width,
        height,
    }
}
