//! SceneBench Harness - batch evaluation of scene editors
//!
//! Provides:
//! - [`SceneEditor`] and [`Renderer`] collaborator traits, with
//!   [`ReplayEditor`] for recorded responses and [`OracleEditor`] for
//!   self-checks
//! - [`EvaluationRunner`]: parallel, order-preserving case evaluation
//! - [`EvaluationReport`]: JSON and Markdown reports
//! - [`HarnessConfig`]: YAML/JSON configuration
//! - [`generate_datasets`] / [`evaluate_dataset`]: the steps behind the CLI
//!
//! # Example
//!
//! ```rust
//! use scenebench_generator::{ComplexityTier, DatasetBuilder};
//! use scenebench_harness::{EvaluationRunner, OracleEditor};
//!
//! let dataset = DatasetBuilder::new(42).build(ComplexityTier::Simple, 4).unwrap();
//! let outcome = EvaluationRunner::new(OracleEditor).run(&dataset.test_cases);
//! assert_eq!(outcome.aggregate.successful_cases, 4);
//! assert_eq!(outcome.aggregate.semantic_correctness.accuracy, 1.0);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod collaborators;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod runner;

// Re-exports for convenience
pub use collaborators::{
    CameraAngle, EditorOutput, OracleEditor, Render, RenderQuality, Renderer, ReplayEditor,
    SceneEditor,
};
pub use config::{EvaluationConfig, GenerationConfig, HarnessConfig, TierCounts};
pub use error::{HarnessError, Result};
pub use pipeline::{evaluate_dataset, generate_datasets, GeneratedDataset};
pub use report::{EvaluationReport, ReportMetadata, ReportPaths};
pub use runner::{EvaluationRunner, RunOutcome};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running evaluations
    pub use crate::{
        EvaluationReport, EvaluationRunner, HarnessConfig, OracleEditor, ReplayEditor,
        SceneEditor,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
