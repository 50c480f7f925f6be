//! Per-case evaluation records

use scenebench_generator::{ComplexityTier, OperationType, TestCase};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::semantic::SemanticMetrics;
use crate::structural::StructuralMetrics;
use crate::visual::VisualMetrics;

/// Everything measured for one test case
///
/// A failed case (the editor produced no scene) carries `error` and no
/// metrics; it still counts toward totals and the success rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseEvaluation {
    pub test_case_id: String,
    pub complexity: ComplexityTier,
    pub operation: OperationType,
    pub prompt: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock seconds spent by the editor
    pub latency_secs: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structural: Option<StructuralMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<SemanticMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualMetrics>,
    /// Saved renders of the generated scene, keyed by camera angle
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub render_paths: BTreeMap<String, PathBuf>,
}

impl CaseEvaluation {
    /// Successful case with structural and semantic metrics
    #[must_use]
    pub fn scored(
        case: &TestCase,
        latency_secs: f64,
        structural: StructuralMetrics,
        semantic: SemanticMetrics,
    ) -> Self {
        Self {
            success: true,
            structural: Some(structural),
            semantic: Some(semantic),
            ..Self::base(case, latency_secs)
        }
    }

    /// Case whose editor failed
    #[must_use]
    pub fn failed(case: &TestCase, latency_secs: f64, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            error: Some(if error.trim().is_empty() {
                "editor failed without an error message".to_string()
            } else {
                error
            }),
            ..Self::base(case, latency_secs)
        }
    }

    #[inline]
    #[must_use]
    pub fn with_visual(mut self, visual: VisualMetrics) -> Self {
        self.visual = Some(visual);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_render_path(mut self, angle: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.render_paths.insert(angle.into(), path.into());
        self
    }

    /// Composite structural score, when scored
    #[must_use]
    pub fn structural_score(&self) -> Option<f64> {
        self.structural
            .as_ref()
            .map(|s| s.summary.structural_similarity_score)
    }

    fn base(case: &TestCase, latency_secs: f64) -> Self {
        Self {
            test_case_id: case.id.clone(),
            complexity: case.complexity,
            operation: case.operation_type(),
            prompt: case.prompt.clone(),
            success: false,
            error: None,
            latency_secs,
            structural: None,
            semantic: None,
            visual: None,
            render_paths: BTreeMap::new(),
        }
    }
}
