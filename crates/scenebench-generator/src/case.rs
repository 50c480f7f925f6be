//! Complexity tiers, generated edits and test cases

use scenebench_scene::{ParseEnumError, Scene};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::expected::ExpectedMetrics;
use crate::operation::{EditOperation, OperationType};

/// Controls object count and operation repertoire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    Simple,
    Medium,
    Complex,
}

impl ComplexityTier {
    pub const ALL: [Self; 3] = [Self::Simple, Self::Medium, Self::Complex];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }

    /// Operations a case of this tier may carry
    #[must_use]
    pub const fn operations(&self) -> &'static [OperationType] {
        match self {
            Self::Simple => &[OperationType::AddPrimitive, OperationType::ChangeColor],
            Self::Medium => &[
                OperationType::MoveObject,
                OperationType::ScaleObject,
                OperationType::DeleteObject,
                OperationType::AddMultipleObjects,
            ],
            Self::Complex => &[OperationType::CreatePattern, OperationType::CompositionalEdit],
        }
    }
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplexityTier {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "medium" => Ok(Self::Medium),
            "complex" => Ok(Self::Complex),
            _ => Err(ParseEnumError::new("complexity tier", s)),
        }
    }
}

/// Output of the case generator before prompts are attached
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedEdit {
    pub id: String,
    pub complexity: ComplexityTier,
    pub initial: Scene,
    pub target: Scene,
    pub operation: EditOperation,
    pub expected: ExpectedMetrics,
    /// Placement had to reuse a colliding position
    pub degraded: bool,
}

/// A complete, independently evaluable test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub complexity: ComplexityTier,
    pub initial_scene: Scene,
    pub target_scene: Scene,
    pub initial_usd: String,
    pub target_usd: String,
    pub edit_operation: EditOperation,
    /// First entry of `prompt_variations`
    pub prompt: String,
    pub prompt_variations: Vec<String>,
    pub expected_metrics: ExpectedMetrics,
    #[serde(default)]
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth_render_path: Option<PathBuf>,
}

impl TestCase {
    /// Attach prompts to a generated edit and encode both scenes
    #[must_use]
    pub fn from_edit(edit: GeneratedEdit, prompt_variations: Vec<String>) -> Self {
        let prompt = prompt_variations
            .first()
            .cloned()
            .unwrap_or_else(|| edit.operation.description.clone());
        Self {
            initial_usd: edit.initial.encode(),
            target_usd: edit.target.encode(),
            id: edit.id,
            complexity: edit.complexity,
            initial_scene: edit.initial,
            target_scene: edit.target,
            edit_operation: edit.operation,
            prompt,
            prompt_variations,
            expected_metrics: edit.expected,
            degraded: edit.degraded,
            ground_truth_render_path: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        self.edit_operation.operation_type()
    }
}
