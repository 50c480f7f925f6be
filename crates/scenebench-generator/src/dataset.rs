//! Dataset bundles: generated cases plus run metadata
//!
//! On disk a dataset is one JSON document,
//! `{"metadata": {...}, "test_cases": [...]}`, optionally accompanied by the
//! raw scene text of every case under `usd_files/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::case::{ComplexityTier, TestCase};
use crate::error::{DatasetError, Result};
use crate::generator::{CaseGenerator, GeneratorConfig};
use crate::prompt::Paraphraser;

/// Dataset format version
pub const DATASET_VERSION: &str = "1.0";

/// File name of a saved dataset inside its tier directory
pub const DATASET_FILE_NAME: &str = "test_dataset.json";

/// Directory (relative to the dataset) holding per-case scene files
pub const SCENE_FILES_DIR: &str = "usd_files";

/// Default number of prompt variations per case
pub const DEFAULT_PROMPT_VARIATIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub prompt_variations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub version: String,
    pub complexity: ComplexityTier,
    pub num_test_cases: usize,
    pub generated_date: DateTime<Utc>,
    pub seed: u64,
    pub config: DatasetConfig,
}

/// A complete, self-contained dataset for one complexity tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: DatasetMetadata,
    pub test_cases: Vec<TestCase>,
}

impl Dataset {
    /// Load a dataset from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| DatasetError::io_error(path, e))?;
        let dataset: Self = serde_json::from_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            cases = dataset.test_cases.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Write pretty-printed JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DatasetError::io_error(parent, e))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|e| DatasetError::io_error(path, e))?;
        tracing::info!(path = %path.display(), cases = self.test_cases.len(), "saved dataset");
        Ok(())
    }

    /// Write `<id>_initial.usda` and `<id>_target.usda` for every case
    /// into `dir/usd_files`, returning that directory
    pub fn write_scene_files(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let scene_dir = dir.as_ref().join(SCENE_FILES_DIR);
        fs::create_dir_all(&scene_dir).map_err(|e| DatasetError::io_error(&scene_dir, e))?;

        for case in &self.test_cases {
            for (suffix, text) in [("initial", &case.initial_usd), ("target", &case.target_usd)] {
                let path = scene_dir.join(format!("{}_{suffix}.usda", case.id));
                fs::write(&path, text).map_err(|e| DatasetError::io_error(&path, e))?;
            }
        }
        tracing::info!(dir = %scene_dir.display(), "saved scene files");
        Ok(scene_dir)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }
}

/// Drives a [`CaseGenerator`] and a [`Paraphraser`] to build datasets
///
/// Building several tiers from one builder keeps object names unique
/// across all of them.
#[derive(Debug)]
pub struct DatasetBuilder {
    generator: CaseGenerator,
    paraphraser: Paraphraser,
    seed: u64,
    prompt_variations: usize,
}

impl DatasetBuilder {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(GeneratorConfig::default().with_seed(seed))
    }

    #[must_use]
    pub fn with_config(config: GeneratorConfig) -> Self {
        let seed = config.seed;
        Self {
            generator: CaseGenerator::with_config(config),
            paraphraser: Paraphraser::new(seed),
            seed,
            prompt_variations: DEFAULT_PROMPT_VARIATIONS,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_prompt_variations(mut self, prompt_variations: usize) -> Self {
        self.prompt_variations = prompt_variations;
        self
    }

    /// One test case of `tier`
    pub fn build_case(&mut self, tier: ComplexityTier) -> TestCase {
        let edit = self.generator.generate(tier);
        let variations = self
            .paraphraser
            .generate_prompt_variations(&edit.operation.params, self.prompt_variations);
        TestCase::from_edit(edit, variations)
    }

    /// `num_cases` cases of `tier`, stamped with the current time
    pub fn build(&mut self, tier: ComplexityTier, num_cases: usize) -> Result<Dataset> {
        self.build_at(tier, num_cases, Utc::now())
    }

    /// Like [`build`](Self::build) with a caller-supplied timestamp
    pub fn build_at(
        &mut self,
        tier: ComplexityTier,
        num_cases: usize,
        generated_date: DateTime<Utc>,
    ) -> Result<Dataset> {
        if num_cases == 0 {
            return Err(DatasetError::InvalidArgument(
                "number of test cases must be at least 1".into(),
            ));
        }
        if self.prompt_variations == 0 {
            return Err(DatasetError::InvalidArgument(
                "prompt variations must be at least 1".into(),
            ));
        }

        tracing::info!(%tier, num_cases, seed = self.seed, "generating dataset");
        let mut test_cases = Vec::with_capacity(num_cases);
        for i in 0..num_cases {
            let case = self.build_case(tier);
            tracing::debug!(id = %case.id, prompt = %case.prompt, "generated case");
            test_cases.push(case);
            if (i + 1) % 10 == 0 {
                tracing::info!("generated {}/{num_cases} test cases", i + 1);
            }
        }

        let degraded = test_cases.iter().filter(|c| c.degraded).count();
        if degraded > 0 {
            tracing::warn!(degraded, "some cases reuse colliding positions");
        }

        Ok(Dataset {
            metadata: DatasetMetadata {
                version: DATASET_VERSION.to_string(),
                complexity: tier,
                num_test_cases: test_cases.len(),
                generated_date,
                seed: self.seed,
                config: DatasetConfig {
                    prompt_variations: self.prompt_variations,
                },
            },
            test_cases,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn zero_cases_is_rejected() {
        let err = DatasetBuilder::new(42)
            .build(ComplexityTier::Simple, 0)
            .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidArgument(_)));
    }

    #[test]
    fn metadata_describes_the_run() {
        let dataset = DatasetBuilder::new(7)
            .with_prompt_variations(2)
            .build_at(ComplexityTier::Medium, 4, fixed_time())
            .unwrap();
        assert_eq!(dataset.metadata.version, "1.0");
        assert_eq!(dataset.metadata.num_test_cases, 4);
        assert_eq!(dataset.metadata.seed, 7);
        assert_eq!(dataset.metadata.config.prompt_variations, 2);
        assert!(dataset
            .test_cases
            .iter()
            .all(|c| c.prompt_variations.len() == 2 && c.prompt == c.prompt_variations[0]));
    }

    #[test]
    fn same_seed_same_dataset() {
        let a = DatasetBuilder::new(3)
            .build_at(ComplexityTier::Complex, 5, fixed_time())
            .unwrap();
        let b = DatasetBuilder::new(3)
            .build_at(ComplexityTier::Complex, 5, fixed_time())
            .unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
