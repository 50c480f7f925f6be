//! SceneBench Generator - seeded procedural edit cases
//!
//! Provides:
//! - A deterministic [`CaseGenerator`] producing (initial, target, operation)
//!   triples across three complexity tiers
//! - Typed edit operations with a stable JSON form
//! - A template-based [`Paraphraser`] writing natural-language instructions
//! - Dataset bundles with metadata, saved as JSON plus optional scene files
//!
//! # Example
//!
//! ```rust
//! use scenebench_generator::{CaseGenerator, ComplexityTier, OperationType};
//! use scenebench_scene::decode;
//!
//! let mut generator = CaseGenerator::new(42);
//! let edit = generator.generate(ComplexityTier::Simple);
//! assert_eq!(edit.operation.operation_type().tier(), ComplexityTier::Simple);
//!
//! let decoded = decode(&edit.target.encode());
//! assert!(edit.expected.is_satisfied_by(&decoded));
//! # let _ = OperationType::AddPrimitive;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod case;
pub mod dataset;
pub mod error;
pub mod expected;
pub mod generator;
pub mod operation;
pub mod prompt;

// Re-exports for convenience
pub use case::{ComplexityTier, GeneratedEdit, TestCase};
pub use dataset::{
    Dataset, DatasetBuilder, DatasetConfig, DatasetMetadata, DATASET_FILE_NAME, DATASET_VERSION,
    DEFAULT_PROMPT_VARIATIONS, SCENE_FILES_DIR,
};
pub use error::{DatasetError, Result};
pub use expected::{ExpectedCheck, ExpectedMetrics};
pub use generator::{CaseGenerator, GeneratorConfig, ObjectChoice};
pub use operation::{
    AddMultipleObjects, ChangeColor, ColorScheme, Composition, CompositionStep,
    CompositionalEdit, CreatePattern, DeleteObject, EditOperation, EditParams, MoveObject,
    ObjectSpec, OperationType, PatternLayout, ScaleObject,
};
pub use prompt::Paraphraser;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for generating cases
    pub use crate::{
        CaseGenerator, ComplexityTier, Dataset, DatasetBuilder, EditOperation, EditParams,
        OperationType, Paraphraser, TestCase,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
