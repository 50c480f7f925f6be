//! SceneBench Metrics - scoring generated scenes against ground truth
//!
//! Provides:
//! - [`StructuralScorer`]: counts, kinds, matched positions and colors
//! - [`SemanticScorer`]: intent preservation and hallucination checks
//! - [`VisualScorer`]: MSE, PSNR and windowed SSIM over rendered images
//! - [`Aggregator`]: a mergeable fold producing batch-level statistics
//!
//! All scorers are stateless and operate on decoded object lists, so they
//! can be shared freely across worker threads.
//!
//! # Example
//!
//! ```rust
//! use scenebench_metrics::StructuralScorer;
//! use scenebench_scene::{NamedColor, PrimitiveKind, Scene, SceneObject, Vec3};
//!
//! let text = Scene::new()
//!     .with_object(SceneObject::new("RedSphere_1", PrimitiveKind::Sphere, NamedColor::Red, Vec3::ZERO, 1.0))
//!     .encode();
//! let metrics = StructuralScorer::new().compute_all_metrics(&text, &text);
//! assert!(metrics.summary.exact_match);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod aggregate;
pub mod error;
pub mod evaluation;
pub mod semantic;
pub mod structural;
pub mod visual;

// Re-exports for convenience
pub use aggregate::{
    AggregateMetrics, Aggregator, RunningStats, StatSummary, StructuralAggregate,
};
pub use error::VisualError;
pub use evaluation::CaseEvaluation;
pub use semantic::{HallucinationCheck, IntentCheck, SemanticMetrics, SemanticScorer};
pub use structural::{StructuralMetrics, StructuralScorer};
pub use visual::{
    decode_image, ImageSimilarity, VisualMetrics, VisualScorer, VisualScores, WindowedSimilarity,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for scoring
    pub use crate::{
        Aggregator, CaseEvaluation, SemanticScorer, StructuralScorer, VisualMetrics, VisualScorer,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
