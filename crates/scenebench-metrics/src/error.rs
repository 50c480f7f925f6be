//! Error types for visual scoring

use std::path::PathBuf;

/// Reasons visual metrics could not be computed
#[derive(Debug, thiserror::Error)]
pub enum VisualError {
    /// Image bytes could not be decoded
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Image file could not be opened or decoded
    #[error("failed to load image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Images differ in size; shapes are `[height, width, channels]`
    #[error("Image shape mismatch: {ground_truth:?} vs {generated:?}")]
    ShapeMismatch {
        ground_truth: [u32; 3],
        generated: [u32; 3],
    },

    /// Image is smaller than the similarity window
    #[error("image {width}x{height} is smaller than the {window}x{window} window")]
    TooSmall { width: u32, height: u32, window: u32 },
}

impl VisualError {
    /// Whether the inputs were readable but incomparable
    #[inline]
    #[must_use]
    pub fn is_incomparable(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. } | Self::TooSmall { .. })
    }
}
