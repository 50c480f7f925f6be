//! Harness configuration
//!
//! Loaded from YAML or JSON; every field has a default so partial files
//! are accepted. Command-line flags override file values.

use scenebench_generator::ComplexityTier;
use scenebench_metrics::structural::{DEFAULT_COLOR_THRESHOLD, DEFAULT_POSITION_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::collaborators::RenderQuality;
use crate::error::{HarnessError, Result};

/// Cases generated per tier when not configured
pub const DEFAULT_CASES_PER_TIER: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub generation: GenerationConfig,
    pub evaluation: EvaluationConfig,
}

/// Number of cases per complexity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierCounts {
    pub simple: usize,
    pub medium: usize,
    pub complex: usize,
}

impl Default for TierCounts {
    fn default() -> Self {
        Self::uniform(DEFAULT_CASES_PER_TIER)
    }
}

impl TierCounts {
    #[must_use]
    pub const fn uniform(count: usize) -> Self {
        Self {
            simple: count,
            medium: count,
            complex: count,
        }
    }

    #[must_use]
    pub const fn get(&self, tier: ComplexityTier) -> usize {
        match tier {
            ComplexityTier::Simple => self.simple,
            ComplexityTier::Medium => self.medium,
            ComplexityTier::Complex => self.complex,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub seed: u64,
    pub prompt_variations: usize,
    pub num_cases: TierCounts,
    /// Tiers generated by `generate --complexity all`
    pub complexities: Vec<ComplexityTier>,
    pub output_dir: PathBuf,
    /// Also write `<id>_initial.usda` / `<id>_target.usda` next to the dataset
    pub save_scene_files: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            prompt_variations: scenebench_generator::DEFAULT_PROMPT_VARIATIONS,
            num_cases: TierCounts::default(),
            complexities: ComplexityTier::ALL.to_vec(),
            output_dir: PathBuf::from("data/test_dataset"),
            save_scene_files: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Evaluate cases on the rayon pool
    pub parallel: bool,
    /// Evaluate only the first N cases
    pub limit: Option<usize>,
    pub output_dir: PathBuf,
    /// Where renders are saved; nothing is saved when unset
    pub renders_dir: Option<PathBuf>,
    pub render_quality: RenderQuality,
    pub position_threshold: f64,
    pub color_threshold: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            limit: None,
            output_dir: PathBuf::from("results"),
            renders_dir: None,
            render_quality: RenderQuality::default(),
            position_threshold: DEFAULT_POSITION_THRESHOLD,
            color_threshold: DEFAULT_COLOR_THRESHOLD,
        }
    }
}

impl EvaluationConfig {
    #[inline]
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_renders_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.renders_dir = Some(dir.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_render_quality(mut self, quality: RenderQuality) -> Self {
        self.render_quality = quality;
        self
    }
}

impl GenerationConfig {
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_prompt_variations(mut self, prompt_variations: usize) -> Self {
        self.prompt_variations = prompt_variations;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_num_cases(mut self, num_cases: TierCounts) -> Self {
        self.num_cases = num_cases;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_save_scene_files(mut self, save: bool) -> Self {
        self.save_scene_files = save;
        self
    }
}

impl HarnessConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_evaluation(mut self, evaluation: EvaluationConfig) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Load from a `.yaml`/`.yml` or `.json` file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| HarnessError::io_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let config: Self = match extension.as_deref() {
            Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => {
                return Err(HarnessError::config(format!(
                    "unsupported config format: {}",
                    path.display()
                )))
            }
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded harness config");
        Ok(config)
    }

    /// Reject values no run could use
    pub fn validate(&self) -> Result<()> {
        if self.generation.prompt_variations == 0 {
            return Err(HarnessError::config("prompt_variations must be at least 1"));
        }
        if self.generation.complexities.is_empty() {
            return Err(HarnessError::config("complexities must not be empty"));
        }
        for (name, value) in [
            ("position_threshold", self.evaluation.position_threshold),
            ("color_threshold", self.evaluation.color_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(HarnessError::config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.evaluation.limit == Some(0) {
            return Err(HarnessError::config("limit must be at least 1 when set"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_documented_values() {
        let config = HarnessConfig::default();
        assert_eq!(config.generation.seed, 42);
        assert_eq!(config.generation.prompt_variations, 3);
        assert_eq!(config.generation.num_cases.get(ComplexityTier::Medium), 50);
        assert_eq!(config.generation.complexities.len(), 3);
        assert!(config.evaluation.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "generation:\n  seed: 7\n  num_cases:\n    complex: 4\n";
        let config: HarnessConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.generation.seed, 7);
        assert_eq!(config.generation.num_cases.complex, 4);
        assert_eq!(config.generation.num_cases.simple, DEFAULT_CASES_PER_TIER);
        assert_eq!(config.evaluation, EvaluationConfig::default());
    }

    #[test]
    fn zero_variations_are_rejected() {
        let config = HarnessConfig::new()
            .with_generation(GenerationConfig::default().with_prompt_variations(0));
        assert!(matches!(config.validate(), Err(HarnessError::Config(_))));
    }

    #[test]
    fn non_positive_thresholds_are_rejected() {
        let mut config = HarnessConfig::new();
        config.evaluation.color_threshold = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("color_threshold"));
    }
}
