//! Visual comparison of rendered images
//!
//! Pixels are normalized to `[0, 1]`. MSE and PSNR are computed directly;
//! structural similarity sits behind [`ImageSimilarity`] so alternative
//! implementations can be swapped in.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::VisualError;

/// Side length of the default SSIM window
pub const DEFAULT_WINDOW: u32 = 7;

const C1: f64 = 0.01 * 0.01;
const C2: f64 = 0.03 * 0.03;

/// Similarity index between two equally sized RGB images
pub trait ImageSimilarity: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Similarity in `[-1, 1]`, 1 meaning identical
    fn similarity(&self, a: &RgbImage, b: &RgbImage) -> Result<f64, VisualError>;
}

/// SSIM over every fully contained square window, per channel, averaged
///
/// Uses sample (N-1) variances and the usual stabilizers for a data range
/// of 1.
#[derive(Debug, Clone, Copy)]
pub struct WindowedSimilarity {
    window: u32,
}

impl Default for WindowedSimilarity {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl WindowedSimilarity {
    /// Window side length, at least 2
    #[must_use]
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(2),
        }
    }

    fn channel_ssim(&self, a: &RgbImage, b: &RgbImage, channel: usize) -> f64 {
        let (width, height) = a.dimensions();
        let w = self.window;
        let n = f64::from(w * w);

        let mut total = 0.0;
        let mut windows = 0_u64;
        for top in 0..=height - w {
            for left in 0..=width - w {
                let (mut sum_a, mut sum_b) = (0.0, 0.0);
                let (mut sum_aa, mut sum_bb, mut sum_ab) = (0.0, 0.0, 0.0);
                for y in top..top + w {
                    for x in left..left + w {
                        let pa = f64::from(a.get_pixel(x, y)[channel]) / 255.0;
                        let pb = f64::from(b.get_pixel(x, y)[channel]) / 255.0;
                        sum_a += pa;
                        sum_b += pb;
                        sum_aa += pa * pa;
                        sum_bb += pb * pb;
                        sum_ab += pa * pb;
                    }
                }
                let mean_a = sum_a / n;
                let mean_b = sum_b / n;
                let var_a = (sum_aa - n * mean_a * mean_a) / (n - 1.0);
                let var_b = (sum_bb - n * mean_b * mean_b) / (n - 1.0);
                let cov = (sum_ab - n * mean_a * mean_b) / (n - 1.0);

                total += ((2.0 * mean_a * mean_b + C1) * (2.0 * cov + C2))
                    / ((mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2));
                windows += 1;
            }
        }
        total / windows as f64
    }
}

impl ImageSimilarity for WindowedSimilarity {
    fn name(&self) -> &'static str {
        "ssim"
    }

    fn similarity(&self, a: &RgbImage, b: &RgbImage) -> Result<f64, VisualError> {
        ensure_same_shape(a, b)?;
        let (width, height) = a.dimensions();
        if width < self.window || height < self.window {
            return Err(VisualError::TooSmall {
                width,
                height,
                window: self.window,
            });
        }
        let sum: f64 = (0..3).map(|c| self.channel_ssim(a, b, c)).sum();
        Ok(sum / 3.0)
    }
}

fn ensure_same_shape(a: &RgbImage, b: &RgbImage) -> Result<(), VisualError> {
    if a.dimensions() == b.dimensions() {
        Ok(())
    } else {
        Err(VisualError::ShapeMismatch {
            ground_truth: shape_of(a),
            generated: shape_of(b),
        })
    }
}

/// `[height, width, channels]`
fn shape_of(image: &RgbImage) -> [u32; 3] {
    [image.height(), image.width(), 3]
}

/// Mean squared error over normalized channel values
pub fn mean_squared_error(a: &RgbImage, b: &RgbImage) -> Result<f64, VisualError> {
    ensure_same_shape(a, b)?;
    let count = a.as_raw().len();
    if count == 0 {
        return Ok(0.0);
    }
    let sum: f64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| {
            let d = (f64::from(x) - f64::from(y)) / 255.0;
            d * d
        })
        .sum();
    Ok(sum / count as f64)
}

/// PSNR in dB for a unit data range; infinite for identical images
#[must_use]
pub fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        f64::INFINITY
    } else {
        20.0 * (1.0 / mse.sqrt()).log10()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSummary {
    pub high_quality: bool,
    pub acceptable_quality: bool,
    pub visual_similarity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualScores {
    pub mse: f64,
    /// Written as `null` when infinite
    #[serde(with = "infinite_as_null")]
    pub psnr: f64,
    pub ssim: f64,
    pub image_shape: [u32; 3],
    pub summary: VisualSummary,
}

impl VisualScores {
    fn new(mse: f64, ssim: f64, image_shape: [u32; 3]) -> Self {
        let psnr = psnr_from_mse(mse);
        Self {
            mse,
            psnr,
            ssim,
            image_shape,
            summary: VisualSummary {
                high_quality: ssim > 0.8 && psnr > 20.0,
                acceptable_quality: ssim > 0.6 && psnr > 15.0,
                visual_similarity_score: ssim,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualFailure {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth_shape: Option<[u32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_shape: Option<[u32; 3]>,
}

impl From<VisualError> for VisualFailure {
    fn from(err: VisualError) -> Self {
        let (ground_truth_shape, generated_shape) = match &err {
            VisualError::ShapeMismatch {
                ground_truth,
                generated,
            } => (Some(*ground_truth), Some(*generated)),
            _ => (None, None),
        };
        Self {
            error: err.to_string(),
            ground_truth_shape,
            generated_shape,
        }
    }
}

/// Visual comparison result: scores, or the reason none could be computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisualMetrics {
    Computed(VisualScores),
    Failed(VisualFailure),
}

impl VisualMetrics {
    #[inline]
    #[must_use]
    pub fn scores(&self) -> Option<&VisualScores> {
        match self {
            Self::Computed(scores) => Some(scores),
            Self::Failed(_) => None,
        }
    }
}

/// Visual scorer over decoded images
pub struct VisualScorer {
    similarity: Box<dyn ImageSimilarity>,
}

impl fmt::Debug for VisualScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualScorer")
            .field("similarity", &self.similarity.name())
            .finish()
    }
}

impl Default for VisualScorer {
    fn default() -> Self {
        Self::new(WindowedSimilarity::default())
    }
}

impl VisualScorer {
    #[must_use]
    pub fn new(similarity: impl ImageSimilarity + 'static) -> Self {
        Self {
            similarity: Box::new(similarity),
        }
    }

    /// Scores, or the typed reason they could not be computed
    pub fn try_compute(&self, gt: &RgbImage, gen: &RgbImage) -> Result<VisualScores, VisualError> {
        let mse = mean_squared_error(gt, gen)?;
        let ssim = self.similarity.similarity(gt, gen)?;
        Ok(VisualScores::new(mse, ssim, shape_of(gt)))
    }

    #[must_use]
    pub fn compute_all_metrics(&self, gt: &RgbImage, gen: &RgbImage) -> VisualMetrics {
        into_metrics(self.try_compute(gt, gen))
    }

    /// Decode encoded images (PNG, JPEG, ...) and compare them
    #[must_use]
    pub fn compute_from_bytes(&self, gt: &[u8], gen: &[u8]) -> VisualMetrics {
        into_metrics(decode_image(gt).and_then(|a| {
            let b = decode_image(gen)?;
            self.try_compute(&a, &b)
        }))
    }

    /// Load both images from disk and compare them
    #[must_use]
    pub fn compute_from_paths(&self, gt: &Path, gen: &Path) -> VisualMetrics {
        into_metrics(open_image(gt).and_then(|a| {
            let b = open_image(gen)?;
            self.try_compute(&a, &b)
        }))
    }
}

fn into_metrics(result: Result<VisualScores, VisualError>) -> VisualMetrics {
    match result {
        Ok(scores) => VisualMetrics::Computed(scores),
        Err(err) => {
            tracing::warn!(error = %err, "visual metrics unavailable");
            VisualMetrics::Failed(err.into())
        }
    }
}

/// Decode image bytes to 8-bit RGB
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, VisualError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

fn open_image(path: &Path) -> Result<RgbImage, VisualError> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|source| VisualError::Load {
            path: path.to_path_buf(),
            source,
        })
}

mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, value: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(value))
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 8) as u8, (y * 8) as u8, ((x + y) * 4) as u8])
        })
    }

    #[test]
    fn identical_images_score_perfectly() {
        let img = gradient(16, 16);
        let scores = VisualScorer::default().try_compute(&img, &img).unwrap();
        assert_eq!(scores.mse, 0.0);
        assert!(scores.psnr.is_infinite());
        assert!((scores.ssim - 1.0).abs() < 1e-9);
        assert!(scores.summary.high_quality);
    }

    #[test]
    fn black_and_white_are_maximally_apart() {
        let black = solid(8, 8, [0, 0, 0]);
        let white = solid(8, 8, [255, 255, 255]);
        let scores = VisualScorer::default().try_compute(&black, &white).unwrap();
        assert!((scores.mse - 1.0).abs() < 1e-12);
        assert!(scores.psnr.abs() < 1e-9);
        assert!(scores.ssim < 0.01);
        assert!(!scores.summary.acceptable_quality);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let metrics = VisualScorer::default().compute_all_metrics(&solid(8, 8, [0; 3]), &solid(9, 8, [0; 3]));
        let VisualMetrics::Failed(failure) = metrics else {
            panic!("expected a failure");
        };
        assert_eq!(failure.ground_truth_shape, Some([8, 8, 3]));
        assert_eq!(failure.generated_shape, Some([8, 9, 3]));
    }

    #[test]
    fn tiny_images_cannot_be_windowed() {
        let img = solid(4, 4, [10, 20, 30]);
        let err = VisualScorer::default().try_compute(&img, &img).unwrap_err();
        assert!(matches!(err, VisualError::TooSmall { window: 7, .. }));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let metrics = VisualScorer::default().compute_from_bytes(b"not an image", b"nor this");
        assert!(metrics.scores().is_none());
    }

    #[test]
    fn infinite_psnr_serializes_as_null() {
        let img = gradient(8, 8);
        let metrics = VisualScorer::default().compute_all_metrics(&img, &img);
        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json["psnr"].is_null());
        let back: VisualMetrics = serde_json::from_value(json).unwrap();
        assert!(back.scores().unwrap().psnr.is_infinite());
    }
}
