//! Whole-batch evaluation through the runner, reports and pipeline

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use pretty_assertions::assert_eq;
use scenebench_generator::{ComplexityTier, Dataset, DatasetBuilder, TestCase};
use scenebench_harness::pipeline::{evaluate_loaded, generate_datasets};
use scenebench_harness::{
    CameraAngle, EvaluationConfig, EvaluationReport, EvaluationRunner, GenerationConfig,
    HarnessError, OracleEditor, Render, RenderQuality, Renderer, ReplayEditor, TierCounts,
};
use scenebench_metrics::CaseEvaluation;
use scenebench_test_utils::{assert_close, assert_unique_names};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// Flat gray image whose level encodes the object count
struct CountingRenderer;

impl Renderer for CountingRenderer {
    fn name(&self) -> &str {
        "counting"
    }

    fn render(
        &self,
        scene_text: &str,
        _quality: RenderQuality,
        _angle: CameraAngle,
    ) -> scenebench_harness::Result<Render> {
        let objects = scenebench_scene::decode(scene_text).len();
        let level = u8::try_from((objects * 20).min(255)).unwrap_or(u8::MAX);
        Ok(Render {
            bytes: png(level),
            render_time: Duration::from_millis(1),
        })
    }
}

struct BrokenRenderer;

impl Renderer for BrokenRenderer {
    fn name(&self) -> &str {
        "broken"
    }

    fn render(&self, _: &str, _: RenderQuality, _: CameraAngle) -> scenebench_harness::Result<Render> {
        Err(HarnessError::Render("renderer offline".into()))
    }
}

fn png(level: u8) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([level, level, level])));
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}

fn cases(seed: u64) -> Vec<TestCase> {
    let mut builder = DatasetBuilder::new(seed);
    ComplexityTier::ALL
        .into_iter()
        .flat_map(|tier| (0..3).map(move |_| tier))
        .map(|tier| builder.build_case(tier))
        .collect()
}

fn without_latency(mut results: Vec<CaseEvaluation>) -> Vec<CaseEvaluation> {
    for r in &mut results {
        r.latency_secs = 0.0;
    }
    results
}

fn write_response(dir: &Path, case: &TestCase, text: &str) {
    std::fs::write(dir.join(format!("{}.usda", case.id)), text).unwrap();
}

#[test]
fn oracle_scores_perfectly_on_every_tier() {
    let cases = cases(42);
    let outcome = EvaluationRunner::new(OracleEditor).run(&cases);

    assert_eq!(outcome.results.len(), cases.len());
    assert_eq!(outcome.aggregate.failed_cases, 0);
    assert_close(outcome.aggregate.structural_similarity.mean, 1.0, 1e-9);
    assert_close(outcome.aggregate.structural_similarity.min, 1.0, 1e-9);
    assert!(outcome.aggregate.semantic_correctness.total_count > 0);
    assert_eq!(outcome.aggregate.semantic_correctness.accuracy, 1.0);
    assert!(outcome.aggregate.visual_similarity.is_none());

    let breakdown = outcome.aggregate.structural_breakdown;
    assert_eq!(breakdown.count_match_rate.min, 1.0);
    assert_eq!(breakdown.type_accuracy.min, 1.0);
    assert_eq!(breakdown.color_accuracy.min, 1.0);
    assert_eq!(breakdown.position_mae.max, 0.0);
    assert_eq!(breakdown.position_cases, cases.len() as u64);

    for (case, result) in cases.iter().zip(&outcome.results) {
        assert_eq!(result.test_case_id, case.id);
        let semantic = result.semantic.as_ref().unwrap();
        assert!(semantic.summary.no_hallucinations, "{}", case.id);
    }
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let cases = cases(7);
    let parallel = EvaluationRunner::new(OracleEditor).run(&cases);
    let sequential = EvaluationRunner::with_config(
        OracleEditor,
        EvaluationConfig::default().with_parallel(false),
    )
    .run(&cases);

    assert_eq!(without_latency(parallel.results), without_latency(sequential.results));
    assert_eq!(parallel.aggregate.total_cases, sequential.aggregate.total_cases);
    assert_eq!(
        parallel.aggregate.semantic_correctness,
        sequential.aggregate.semantic_correctness
    );
}

#[test]
fn replay_records_missing_and_wrong_responses_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    let mut builder = DatasetBuilder::new(11);
    let cases: Vec<_> = (0..3).map(|_| builder.build_case(ComplexityTier::Simple)).collect();

    write_response(dir.path(), &cases[0], &cases[0].target_usd);
    write_response(dir.path(), &cases[1], &cases[1].initial_usd);

    let outcome = EvaluationRunner::new(ReplayEditor::new(dir.path())).run(&cases);
    let [correct, unchanged, missing] = outcome.results.as_slice() else {
        panic!("expected three results");
    };

    assert!(correct.success);
    assert!(correct.structural.as_ref().unwrap().summary.exact_match);

    assert!(unchanged.success);
    assert!(!unchanged.structural.as_ref().unwrap().summary.exact_match);

    assert!(!missing.success);
    assert!(missing.error.as_deref().unwrap().contains("no response"));
    assert!(missing.structural.is_none());

    assert_eq!(outcome.aggregate.total_cases, 3);
    assert_eq!(outcome.aggregate.successful_cases, 2);
    assert_eq!(outcome.aggregate.failed_cases, 1);
}

#[test]
fn renderer_enables_visual_metrics_and_saved_renders() {
    let renders = tempfile::tempdir().unwrap();
    let case = DatasetBuilder::new(3).build_case(ComplexityTier::Medium);

    let runner = EvaluationRunner::with_config(
        OracleEditor,
        EvaluationConfig::default().with_renders_dir(renders.path()),
    )
    .with_renderer(CountingRenderer);
    let evaluation = runner.evaluate_case(&case);

    let scores = evaluation.visual.as_ref().and_then(|v| v.scores()).unwrap();
    assert_close(scores.ssim, 1.0, 1e-9);
    assert_eq!(scores.mse, 0.0);
    assert!(scores.psnr.is_infinite());

    for key in ["generated_perspective", "ground_truth_perspective", "input_perspective"] {
        let path = evaluation.render_paths.get(key).unwrap();
        assert!(path.exists(), "{key} not written");
    }

    let aggregate = runner.run(std::slice::from_ref(&case)).aggregate;
    let visual = aggregate.visual_similarity.unwrap();
    assert_eq!(visual.cases_with_visual_metrics, 1);
    assert_eq!(visual.identical_cases, 1);
}

#[test]
fn replayed_renders_are_compared_against_the_renderer() {
    let dir = tempfile::tempdir().unwrap();
    let case = DatasetBuilder::new(5).build_case(ComplexityTier::Simple);
    write_response(dir.path(), &case, &case.target_usd);
    std::fs::write(dir.path().join(format!("{}_perspective.png", case.id)), png(250)).unwrap();

    let evaluation = EvaluationRunner::new(ReplayEditor::new(dir.path()))
        .with_renderer(CountingRenderer)
        .evaluate_case(&case);
    let scores = evaluation.visual.as_ref().and_then(|v| v.scores()).unwrap();
    assert!(scores.mse > 0.0);
    assert!(scores.psnr.is_finite());
}

#[test]
fn render_failures_only_drop_visual_metrics() {
    let case = DatasetBuilder::new(8).build_case(ComplexityTier::Complex);
    let evaluation = EvaluationRunner::new(OracleEditor)
        .with_renderer(BrokenRenderer)
        .evaluate_case(&case);
    assert!(evaluation.success);
    assert!(evaluation.structural.is_some());
    assert!(evaluation.visual.is_none());
}

#[test]
fn report_round_trips_and_renders_markdown() {
    let out = tempfile::tempdir().unwrap();
    let mut builder = DatasetBuilder::new(21);
    let dataset = builder.build(ComplexityTier::Simple, 3).unwrap();
    let responses = tempfile::tempdir().unwrap();
    write_response(responses.path(), &dataset.test_cases[0], &dataset.test_cases[0].target_usd);
    let missing_id = dataset.test_cases[2].id.clone();
    write_response(responses.path(), &dataset.test_cases[1], &dataset.test_cases[1].target_usd);

    let runner = EvaluationRunner::new(ReplayEditor::new(responses.path()));
    let report = evaluate_loaded(Path::new("data/simple/test_dataset.json"), dataset, &runner);
    assert_eq!(report.metadata.editor, "replay");
    assert_eq!(report.metadata.num_test_cases, 3);

    let paths = report.write(out.path()).unwrap();
    let stem = paths.json.file_stem().unwrap().to_str().unwrap().to_string();
    assert!(stem.starts_with("test_dataset_"));
    assert_eq!(paths.markdown.file_stem().unwrap().to_str().unwrap(), stem);

    let loaded = EvaluationReport::load(&paths.json).unwrap();
    assert_eq!(loaded.metadata.dataset_metadata, report.metadata.dataset_metadata);
    assert_eq!(loaded.metadata.evaluation_date, report.metadata.evaluation_date);
    assert_eq!(loaded.aggregate_metrics.failed_cases, 1);
    let ids = |r: &EvaluationReport| {
        r.test_case_results
            .iter()
            .map(|c| (c.test_case_id.clone(), c.success))
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&loaded), ids(&report));

    let markdown = std::fs::read_to_string(&paths.markdown).unwrap();
    assert!(markdown.starts_with("# SceneBench Evaluation Report"));
    assert!(markdown.contains("- **Success Rate**: 66.7% (2/3)"));
    assert!(markdown.contains("| ID | Prompt | Success | Structural | Semantic | SSIM | PSNR | Latency |"));
    assert!(markdown.contains(&format!("- **{missing_id}**: editor failed for {missing_id}")));
    assert!(!markdown.contains("## Visual Comparison"));
    assert!(markdown.contains("- **Count Match Rate**: 1.000 (range: 1.000 - 1.000)"));
    assert!(markdown.contains("- **Type Accuracy**: 1.000 (range: 1.000 - 1.000)"));
    assert!(markdown.contains("- **Color Accuracy**: 1.000 (range: 1.000 - 1.000)"));
    assert!(markdown.contains("- **Position MAE**: 0.000 (range: 0.000 - 0.000)"));
}

#[test]
fn position_error_is_not_averaged_without_matches() {
    let responses = tempfile::tempdir().unwrap();
    let dataset = DatasetBuilder::new(4).build(ComplexityTier::Medium, 2).unwrap();
    let runner = EvaluationRunner::new(ReplayEditor::new(responses.path()));
    let report = evaluate_loaded(Path::new("medium.json"), dataset, &runner);

    assert_eq!(report.aggregate_metrics.structural_breakdown.position_cases, 0);
    let markdown = report.markdown().to_string();
    assert!(markdown.contains("- **Position MAE**: n/a (no matched objects)"));
}

#[test]
fn clean_run_reports_no_failed_cases() {
    let dataset = DatasetBuilder::new(2).build(ComplexityTier::Complex, 2).unwrap();
    let report = evaluate_loaded(Path::new("complex.json"), dataset, &EvaluationRunner::new(OracleEditor));
    let markdown = report.markdown().to_string();
    assert!(markdown.contains("No failed cases!"));
    assert!(markdown.contains("### Structural Similarity"));
}

#[test]
fn generated_datasets_land_per_tier_with_unique_names() {
    let out = tempfile::tempdir().unwrap();
    let config = GenerationConfig::default()
        .with_seed(99)
        .with_num_cases(TierCounts::uniform(2))
        .with_output_dir(out.path())
        .with_save_scene_files(true);

    let written = generate_datasets(&config, &ComplexityTier::ALL).unwrap();
    assert_eq!(written.len(), 3);

    let mut loaded = Vec::new();
    for entry in &written {
        assert_eq!(entry.path, out.path().join(entry.complexity.as_str()).join("test_dataset.json"));
        let dataset = Dataset::load(&entry.path).unwrap();
        assert_eq!(dataset.metadata.complexity, entry.complexity);
        assert_eq!(dataset.len(), 2);

        let scene_dir = entry.scene_files.as_ref().unwrap();
        for case in &dataset.test_cases {
            assert!(scene_dir.join(format!("{}_initial.usda", case.id)).exists());
            assert!(scene_dir.join(format!("{}_target.usda", case.id)).exists());
        }
        loaded.push(dataset);
    }

    let targets = loaded
        .iter()
        .flat_map(|d| d.test_cases.iter().map(|c| &c.target_scene));
    assert_unique_names(targets);
}

#[test]
fn zero_cases_is_an_invalid_argument() {
    let out = tempfile::tempdir().unwrap();
    let config = GenerationConfig::default()
        .with_num_cases(TierCounts::uniform(0))
        .with_output_dir(out.path());
    let err = generate_datasets(&config, &[ComplexityTier::Simple]).unwrap_err();
    assert!(matches!(err, HarnessError::Dataset(_)));
}
