//! Batch evaluation of test cases against a scene editor
//!
//! Each case is independent: the editor is timed, its scene scored
//! structurally and semantically, and, when images are available, the
//! perspective render compared visually. A failing case is recorded and
//! never aborts the batch.

use rayon::prelude::*;
use scenebench_generator::TestCase;
use scenebench_metrics::{
    AggregateMetrics, Aggregator, CaseEvaluation, SemanticScorer, StructuralScorer, VisualScorer,
};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::collaborators::{CameraAngle, EditorOutput, Renderer, SceneEditor};
use crate::config::EvaluationConfig;

/// View used for visual metrics
pub const VISUAL_METRICS_ANGLE: CameraAngle = CameraAngle::Perspective;

/// Per-case results in input order plus the batch aggregate
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub results: Vec<CaseEvaluation>,
    pub aggregate: AggregateMetrics,
}

/// Drives a [`SceneEditor`] over a dataset and scores every answer
pub struct EvaluationRunner {
    editor: Box<dyn SceneEditor>,
    renderer: Option<Box<dyn Renderer>>,
    config: EvaluationConfig,
    structural: StructuralScorer,
    semantic: SemanticScorer,
    visual: VisualScorer,
}

impl std::fmt::Debug for EvaluationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationRunner")
            .field("editor", &self.editor.name())
            .field("renderer", &self.renderer.as_ref().map(|r| r.name()))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EvaluationRunner {
    #[must_use]
    pub fn new(editor: impl SceneEditor + 'static) -> Self {
        Self::with_config(editor, EvaluationConfig::default())
    }

    #[must_use]
    pub fn with_config(editor: impl SceneEditor + 'static, config: EvaluationConfig) -> Self {
        let structural = StructuralScorer::new()
            .with_position_threshold(config.position_threshold)
            .with_color_threshold(config.color_threshold);
        Self {
            editor: Box::new(editor),
            renderer: None,
            config,
            structural,
            semantic: SemanticScorer::new(),
            visual: VisualScorer::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    #[inline]
    #[must_use]
    pub fn with_visual_scorer(mut self, visual: VisualScorer) -> Self {
        self.visual = visual;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    #[must_use]
    pub fn editor_name(&self) -> &str {
        self.editor.name()
    }

    /// Evaluate `cases` (truncated to the configured limit)
    #[must_use]
    pub fn run(&self, cases: &[TestCase]) -> RunOutcome {
        let cases = match self.config.limit {
            Some(limit) if limit < cases.len() => {
                tracing::info!(limit, "limiting evaluation");
                &cases[..limit]
            }
            _ => cases,
        };
        tracing::info!(
            cases = cases.len(),
            editor = self.editor.name(),
            parallel = self.config.parallel,
            "starting evaluation"
        );

        let results: Vec<CaseEvaluation> = if self.config.parallel {
            cases.par_iter().map(|case| self.evaluate_case(case)).collect()
        } else {
            cases.iter().map(|case| self.evaluate_case(case)).collect()
        };

        let aggregator = if self.config.parallel {
            results
                .par_iter()
                .fold(Aggregator::new, |mut acc, case| {
                    acc.push(case);
                    acc
                })
                .reduce(Aggregator::new, Aggregator::merge)
        } else {
            results.iter().collect()
        };
        let aggregate = aggregator.finish();

        tracing::info!(
            successful = aggregate.successful_cases,
            failed = aggregate.failed_cases,
            "evaluation finished"
        );
        RunOutcome { results, aggregate }
    }

    /// Evaluate a single case
    #[must_use]
    pub fn evaluate_case(&self, case: &TestCase) -> CaseEvaluation {
        tracing::debug!(case = %case.id, prompt = %case.prompt, "evaluating");

        let started = Instant::now();
        let edited = self.editor.edit(case);
        let latency = started.elapsed().as_secs_f64();

        let output = match edited {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(case = %case.id, error = %err, "editor failed");
                return CaseEvaluation::failed(case, latency, err.to_string());
            }
        };

        let structural = self
            .structural
            .compute_all_metrics(&case.target_usd, &output.scene_text);
        let semantic = self.semantic.compute_all_metrics(
            &case.edit_operation.params,
            &case.target_usd,
            &output.scene_text,
        );
        tracing::debug!(
            case = %case.id,
            structural = structural.summary.structural_similarity_score,
            semantic = semantic.summary.semantically_correct,
            "scored"
        );

        let evaluation = CaseEvaluation::scored(case, latency, structural, semantic);
        self.attach_renders(case, &output, evaluation)
    }

    fn attach_renders(
        &self,
        case: &TestCase,
        output: &EditorOutput,
        mut evaluation: CaseEvaluation,
    ) -> CaseEvaluation {
        let generated = match output.renders.get(&VISUAL_METRICS_ANGLE) {
            Some(bytes) => Some(Cow::Borrowed(bytes.as_slice())),
            None => self.render(&case.id, &output.scene_text).map(Cow::Owned),
        };
        let ground_truth = self.ground_truth_render(case);

        if let (Some(gt), Some(gen)) = (&ground_truth, &generated) {
            evaluation = evaluation.with_visual(self.visual.compute_from_bytes(gt, gen));
        }

        let Some(dir) = &self.config.renders_dir else {
            return evaluation;
        };
        let mut saved = Vec::new();
        for (angle, bytes) in &output.renders {
            saved.push(("generated", *angle, Cow::Borrowed(bytes.as_slice())));
        }
        if let Some(bytes) = generated.filter(|_| !output.renders.contains_key(&VISUAL_METRICS_ANGLE)) {
            saved.push(("generated", VISUAL_METRICS_ANGLE, bytes));
        }
        if let Some(bytes) = ground_truth {
            saved.push(("ground_truth", VISUAL_METRICS_ANGLE, bytes));
        }
        if let Some(bytes) = self.render(&case.id, &case.initial_usd) {
            saved.push(("input", VISUAL_METRICS_ANGLE, Cow::Owned(bytes)));
        }

        for (role, angle, bytes) in saved {
            if let Some(path) = save_render(dir, &case.id, angle, role, &bytes) {
                evaluation = evaluation.with_render_path(render_key(role, angle), path);
            }
        }
        evaluation
    }

    fn render(&self, case_id: &str, scene_text: &str) -> Option<Vec<u8>> {
        let renderer = self.renderer.as_ref()?;
        match renderer.render(scene_text, self.config.render_quality, VISUAL_METRICS_ANGLE) {
            Ok(render) => {
                tracing::debug!(
                    case = case_id,
                    secs = render.render_time.as_secs_f64(),
                    "rendered"
                );
                Some(render.bytes)
            }
            Err(err) => {
                tracing::warn!(case = case_id, error = %err, "render failed");
                None
            }
        }
    }

    /// Renderer output for the target scene, else the dataset's stored render
    fn ground_truth_render(&self, case: &TestCase) -> Option<Cow<'static, [u8]>> {
        if let Some(bytes) = self.render(&case.id, &case.target_usd) {
            return Some(Cow::Owned(bytes));
        }
        let path = case.ground_truth_render_path.as_ref()?;
        match fs::read(path) {
            Ok(bytes) => Some(Cow::Owned(bytes)),
            Err(err) => {
                tracing::warn!(case = %case.id, path = %path.display(), error = %err, "ground truth render unreadable");
                None
            }
        }
    }
}

/// Key under which a saved render is recorded, e.g. `generated_perspective`
#[must_use]
pub fn render_key(role: &str, angle: CameraAngle) -> String {
    format!("{role}_{angle}")
}

/// File name of a saved render, e.g. `simple_0001_perspective_generated.png`
#[must_use]
pub fn render_file_name(case_id: &str, angle: CameraAngle, role: &str) -> String {
    format!("{case_id}_{angle}_{role}.png")
}

fn save_render(
    dir: &Path,
    case_id: &str,
    angle: CameraAngle,
    role: &str,
    bytes: &[u8],
) -> Option<PathBuf> {
    let path = dir.join(render_file_name(case_id, angle, role));
    let written = fs::create_dir_all(dir).and_then(|()| fs::write(&path, bytes));
    match written {
        Ok(()) => Some(path),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "could not save render");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::OracleEditor;
    use scenebench_generator::{ComplexityTier, DatasetBuilder};

    #[test]
    fn render_names_follow_case_angle_role() {
        assert_eq!(
            render_file_name("simple_0001", CameraAngle::Top, "ground_truth"),
            "simple_0001_top_ground_truth.png"
        );
        assert_eq!(render_key("input", CameraAngle::Front), "input_front");
    }

    #[test]
    fn limit_truncates_in_order() {
        let mut builder = DatasetBuilder::new(5);
        let cases: Vec<_> = (0..4).map(|_| builder.build_case(ComplexityTier::Simple)).collect();
        let runner = EvaluationRunner::with_config(
            OracleEditor,
            EvaluationConfig::default().with_limit(Some(2)),
        );
        let outcome = runner.run(&cases);
        let ids: Vec<_> = outcome.results.iter().map(|r| r.test_case_id.as_str()).collect();
        assert_eq!(ids, vec![cases[0].id.as_str(), cases[1].id.as_str()]);
        assert_eq!(outcome.aggregate.total_cases, 2);
    }

    #[test]
    fn oracle_without_renderer_has_no_visual_metrics() {
        let case = DatasetBuilder::new(9).build_case(ComplexityTier::Complex);
        let evaluation = EvaluationRunner::new(OracleEditor).evaluate_case(&case);
        assert!(evaluation.success);
        assert!(evaluation.visual.is_none());
        assert!(evaluation.render_paths.is_empty());
    }
}
