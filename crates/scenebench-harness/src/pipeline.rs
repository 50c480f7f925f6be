//! End-to-end steps behind the `generate` and `evaluate` commands

use chrono::Utc;
use scenebench_generator::{ComplexityTier, Dataset, DatasetBuilder, DATASET_FILE_NAME};
use std::path::{Path, PathBuf};

use crate::config::GenerationConfig;
use crate::error::Result;
use crate::report::{EvaluationReport, ReportMetadata};
use crate::runner::EvaluationRunner;

/// Datasets written for one tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDataset {
    pub complexity: ComplexityTier,
    pub path: PathBuf,
    pub num_test_cases: usize,
    /// Directory holding per-case scene files, when written
    pub scene_files: Option<PathBuf>,
}

/// Generate one dataset per tier into `<output_dir>/<tier>/test_dataset.json`
///
/// A single builder serves every tier, so object names stay unique across
/// the whole run.
pub fn generate_datasets(
    config: &GenerationConfig,
    tiers: &[ComplexityTier],
) -> Result<Vec<GeneratedDataset>> {
    let mut builder =
        DatasetBuilder::new(config.seed).with_prompt_variations(config.prompt_variations);
    let generated_at = Utc::now();

    let mut written = Vec::with_capacity(tiers.len());
    for &tier in tiers {
        let dataset = builder.build_at(tier, config.num_cases.get(tier), generated_at)?;
        let dir = config.output_dir.join(tier.as_str());
        let path = dir.join(DATASET_FILE_NAME);
        dataset.save(&path)?;

        let scene_files = if config.save_scene_files {
            Some(dataset.write_scene_files(&dir)?)
        } else {
            None
        };
        tracing::info!(%tier, path = %path.display(), "dataset saved");

        written.push(GeneratedDataset {
            complexity: tier,
            path,
            num_test_cases: dataset.len(),
            scene_files,
        });
    }
    Ok(written)
}

/// Load a dataset and evaluate it with `runner`
pub fn evaluate_dataset(dataset_path: &Path, runner: &EvaluationRunner) -> Result<EvaluationReport> {
    tracing::info!(path = %dataset_path.display(), "loading dataset");
    let dataset = Dataset::load(dataset_path)?;
    Ok(evaluate_loaded(dataset_path, dataset, runner))
}

/// Evaluate an already loaded dataset
#[must_use]
pub fn evaluate_loaded(
    dataset_path: &Path,
    dataset: Dataset,
    runner: &EvaluationRunner,
) -> EvaluationReport {
    let outcome = runner.run(&dataset.test_cases);
    let metadata = ReportMetadata {
        dataset_path: dataset_path.to_path_buf(),
        dataset_metadata: Some(dataset.metadata),
        num_test_cases: outcome.results.len(),
        evaluation_date: Utc::now(),
        editor: runner.editor_name().to_string(),
        config: runner.config().clone(),
    };
    EvaluationReport::new(metadata, outcome)
}

/// Default renders directory for a report: `<output_dir>/<dataset stem>_renders`
#[must_use]
pub fn default_renders_dir(output_dir: &Path, dataset_path: &Path) -> PathBuf {
    let stem = dataset_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("evaluation");
    output_dir.join(format!("{stem}_renders"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_dir_is_named_after_the_dataset() {
        assert_eq!(
            default_renders_dir(Path::new("results"), Path::new("data/simple/test_dataset.json")),
            PathBuf::from("results/test_dataset_renders")
        );
    }
}
