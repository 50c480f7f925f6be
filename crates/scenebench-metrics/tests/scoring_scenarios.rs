//! End-to-end scoring scenarios over encoded scene text

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use scenebench_generator::{
    CaseGenerator, ComplexityTier, DatasetBuilder, EditParams, ObjectChoice, TestCase,
};
use scenebench_metrics::visual::{VisualScores, VisualSummary};
use scenebench_metrics::{
    Aggregator, CaseEvaluation, SemanticScorer, StatSummary, StructuralAggregate,
    StructuralScorer, VisualMetrics,
};
use scenebench_scene::{NamedColor, PrimitiveKind, Scene, SceneObject, Vec3};
use scenebench_test_utils::{
    assert_close, create_blue_cube, create_red_sphere, create_sample_scene,
    create_sample_scene_text, create_sparse_scene_text,
};

#[test]
fn identical_scenes_match_exactly() {
    let text = create_sample_scene_text();
    let metrics = StructuralScorer::new().compute_all_metrics(&text, &text);

    assert!(metrics.count.count_match);
    assert_eq!(metrics.types.type_accuracy, 1.0);
    assert_eq!(metrics.position.position_mae, 0.0);
    assert_eq!(metrics.position.num_matched_objects, 3);
    assert_eq!(metrics.color.color_accuracy, 1.0);
    assert!(metrics.summary.exact_match);
    assert_close(metrics.summary.structural_similarity_score, 1.0, 1e-12);
}

#[test]
fn single_color_difference_only_hurts_color() {
    let gt = create_sample_scene();
    let recolored = gt.replaced(1, create_blue_cube().with_color(NamedColor::Red));

    let metrics = StructuralScorer::new().compute_all_metrics(&gt.encode(), &recolored.encode());
    assert!(metrics.count.count_match);
    assert_eq!(metrics.types.type_accuracy, 1.0);
    assert_eq!(metrics.position.position_mae, 0.0);
    assert_eq!(metrics.color.color_matches, 2);
    assert_close(metrics.color.color_accuracy, 2.0 / 3.0, 1e-12);
    assert!(!metrics.summary.exact_match);
}

#[test]
fn one_extra_object_is_a_hallucination() {
    let gt = create_sample_scene();
    let extra = gt.clone().with_object(SceneObject::new(
        "ExtraCone_9",
        PrimitiveKind::Cone,
        NamedColor::Yellow,
        Vec3::new(0.0, 2.0, 0.0),
        1.0,
    ));

    let semantic = SemanticScorer::new();
    let check = semantic.check_no_hallucinations(
        &scenebench_scene::decode(&gt.encode()),
        &scenebench_scene::decode(&extra.encode()),
    );
    assert!(!check.no_hallucinations);
    assert_eq!(check.hallucination_count, 1);
    assert_eq!(check.reason, "Generated 1 extra object(s)");

    let swapped = semantic.check_no_hallucinations(
        &scenebench_scene::decode(&extra.encode()),
        &scenebench_scene::decode(&gt.encode()),
    );
    assert_eq!(swapped.hallucination_count, 0);
    assert_eq!(swapped.missing_objects, Some(1));
}

#[test]
fn seeded_red_sphere_add_preserves_intent() {
    let mut generator = CaseGenerator::new(42);
    let edit = generator.add_primitive_edit(
        &Scene::new(),
        Some(ObjectChoice {
            kind: PrimitiveKind::Sphere,
            color: NamedColor::Red,
            position: Vec3::ZERO,
            scale: 1.0,
        }),
    );
    let target = edit.target.encode();

    let metrics = SemanticScorer::new().compute_all_metrics(&edit.operation.params, &target, &target);
    assert!(metrics.summary.semantically_correct);
    assert_eq!(metrics.intent.matched_object.as_deref(), Some("RedSphere_1"));

    let wrong_color = Scene::new()
        .with_object(create_red_sphere().with_color(NamedColor::Blue))
        .encode();
    let metrics = SemanticScorer::new().compute_all_metrics(&edit.operation.params, &target, &wrong_color);
    assert!(!metrics.intent.intent_preserved);
    assert_eq!(metrics.intent.reason, "Object found but color mismatch");
}

#[test]
fn sparse_text_is_scored_with_defaults() {
    let text = create_sparse_scene_text(Vec3::new(2.0, 0.0, 0.0), (1.0, 0.0, 0.0));
    let reference = Scene::new()
        .with_object(SceneObject::new(
            "Loose",
            PrimitiveKind::Sphere,
            NamedColor::Red,
            Vec3::new(2.0, 0.0, 0.0),
            1.0,
        ))
        .encode();

    let metrics = StructuralScorer::new().compute_all_metrics(&reference, &text);
    assert!(metrics.summary.exact_match);
}

#[test]
fn change_color_lookup_accepts_suffixed_names() {
    let mut generator = CaseGenerator::new(3);
    let initial = Scene::new().with_object(create_red_sphere());
    let edit = generator.change_color_edit(&initial);
    let EditParams::ChangeColor(params) = &edit.operation.params else {
        panic!("a one-object scene can always be recolored");
    };

    let renamed = Scene::new()
        .with_object(
            SceneObject::new(
                "RedSphere_1_edited",
                PrimitiveKind::Sphere,
                params.new_color_name,
                Vec3::ZERO,
                1.0,
            ),
        )
        .encode();
    let metrics = SemanticScorer::new().compute_all_metrics(
        &edit.operation.params,
        &edit.target.encode(),
        &renamed,
    );
    assert!(metrics.intent.intent_preserved);
    assert_eq!(metrics.intent.matched_object.as_deref(), Some("RedSphere_1_edited"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_generated_targets_score_perfectly_against_themselves(seed in any::<u64>()) {
        let mut builder = DatasetBuilder::new(seed);
        for tier in ComplexityTier::ALL {
            let case = builder.build_case(tier);
            let structural = StructuralScorer::new()
                .compute_all_metrics(&case.target_usd, &case.target_usd);
            prop_assert!(structural.summary.exact_match, "{}", case.id);

            let semantic = SemanticScorer::new().compute_all_metrics(
                &case.edit_operation.params,
                &case.target_usd,
                &case.target_usd,
            );
            prop_assert!(semantic.summary.no_hallucinations);
            if semantic.intent.supported {
                prop_assert!(semantic.intent.intent_preserved, "{}: {}", case.id, semantic.intent.reason);
            }
        }
    }
}

// Aggregation laws. Values are multiples of 1/4 so float sums are exact.

fn template_case() -> TestCase {
    DatasetBuilder::new(42).build_case(ComplexityTier::Simple)
}

#[derive(Debug, Clone)]
struct Sample {
    success: bool,
    score: u8,
    latency: u8,
    supported: bool,
    correct: bool,
    visual: Option<(u8, u8, Option<u8>)>,
    parts: Parts,
}

/// Structural sub-scores, in quarters
#[derive(Debug, Clone, Copy)]
struct Parts {
    count_match: bool,
    types: u8,
    mae: u8,
    color: u8,
    matched: bool,
}

impl Parts {
    fn quarter(value: u8) -> f64 {
        f64::from(value) / 4.0
    }
}

fn sample_strategy() -> impl Strategy<Value = Sample> {
    (
        any::<bool>(),
        0u8..=4,
        0u8..40,
        any::<bool>(),
        any::<bool>(),
        proptest::option::of((0u8..=4, 0u8..=4, proptest::option::of(0u8..120))),
        (any::<bool>(), 0u8..=4, 0u8..=8, 0u8..=4, any::<bool>()),
    )
        .prop_map(
            |(success, score, latency, supported, correct, visual, (count_match, types, mae, color, matched))| {
                Sample {
                    success,
                    score,
                    latency,
                    supported,
                    correct,
                    visual,
                    parts: Parts {
                        count_match,
                        types,
                        mae,
                        color,
                        matched,
                    },
                }
            },
        )
}

fn evaluation(case: &TestCase, sample: &Sample) -> CaseEvaluation {
    let latency = f64::from(sample.latency) / 4.0;
    if !sample.success {
        return CaseEvaluation::failed(case, latency, "editor timed out");
    }
    let mut structural = StructuralScorer::new().compute_all_metrics(&case.target_usd, &case.target_usd);
    structural.summary.structural_similarity_score = f64::from(sample.score) / 4.0;
    let parts = sample.parts;
    structural.count.count_match = parts.count_match;
    structural.types.type_accuracy = Parts::quarter(parts.types);
    structural.position.position_mae = Parts::quarter(parts.mae);
    structural.position.num_matched_objects = usize::from(parts.matched);
    structural.color.color_accuracy = Parts::quarter(parts.color);
    let mut semantic = SemanticScorer::new().compute_all_metrics(
        &case.edit_operation.params,
        &case.target_usd,
        &case.target_usd,
    );
    semantic.intent.supported = sample.supported;
    semantic.summary.semantically_correct = sample.correct;

    let mut evaluation = CaseEvaluation::scored(case, latency, structural, semantic);
    if let Some((ssim, mse, psnr)) = sample.visual {
        let ssim = f64::from(ssim) / 4.0;
        evaluation = evaluation.with_visual(VisualMetrics::Computed(VisualScores {
            mse: f64::from(mse) / 4.0,
            psnr: psnr.map_or(f64::INFINITY, |p| f64::from(p) / 4.0),
            ssim,
            image_shape: [8, 8, 3],
            summary: VisualSummary {
                high_quality: false,
                acceptable_quality: false,
                visual_similarity_score: ssim,
            },
        }));
    }
    evaluation
}

fn fold(case: &TestCase, samples: &[Sample]) -> Aggregator {
    samples.iter().map(|s| evaluation(case, s)).collect::<Vec<_>>().iter().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_merge_is_commutative_and_associative(
        a in proptest::collection::vec(sample_strategy(), 0..6),
        b in proptest::collection::vec(sample_strategy(), 0..6),
        c in proptest::collection::vec(sample_strategy(), 0..6),
    ) {
        let case = template_case();
        let (fa, fb, fc) = (fold(&case, &a), fold(&case, &b), fold(&case, &c));

        prop_assert_eq!(fa.merge(fb).finish(), fb.merge(fa).finish());
        prop_assert_eq!(fa.merge(fb).merge(fc).finish(), fa.merge(fb.merge(fc)).finish());

        let all: Vec<Sample> = a.iter().chain(&b).chain(&c).cloned().collect();
        prop_assert_eq!(fold(&case, &all).finish(), fa.merge(fb).merge(fc).finish());
        prop_assert_eq!(
            fc.merge(fa).merge(fb).finish().structural_breakdown,
            fold(&case, &all).finish().structural_breakdown
        );
    }

    #[test]
    fn prop_totals_add_up(samples in proptest::collection::vec(sample_strategy(), 0..12)) {
        let metrics = fold(&template_case(), &samples).finish();
        prop_assert_eq!(metrics.total_cases, samples.len() as u64);
        prop_assert_eq!(metrics.successful_cases + metrics.failed_cases, metrics.total_cases);
        let successes = samples.iter().filter(|s| s.success).count() as u64;
        prop_assert_eq!(metrics.successful_cases, successes);
        prop_assert!(metrics.semantic_correctness.total_count + metrics.semantic_correctness.unscored_count <= successes);

        let parts: Vec<Parts> = samples.iter().filter(|s| s.success).map(|s| s.parts).collect();
        let breakdown = metrics.structural_breakdown;
        if parts.is_empty() {
            prop_assert_eq!(breakdown, StructuralAggregate::default());
            return Ok(());
        }
        let matching = parts.iter().filter(|p| p.count_match).count();
        prop_assert_eq!(breakdown.count_match_rate.mean, matching as f64 / parts.len() as f64);
        prop_assert_eq!(
            breakdown.type_accuracy.min,
            Parts::quarter(parts.iter().map(|p| p.types).min().unwrap())
        );
        prop_assert_eq!(
            breakdown.color_accuracy.max,
            Parts::quarter(parts.iter().map(|p| p.color).max().unwrap())
        );

        let maes: Vec<u8> = parts.iter().filter(|p| p.matched).map(|p| p.mae).collect();
        prop_assert_eq!(breakdown.position_cases, maes.len() as u64);
        if let (Some(min), Some(max)) = (maes.iter().min(), maes.iter().max()) {
            prop_assert_eq!(breakdown.position_mae.min, Parts::quarter(*min));
            prop_assert_eq!(breakdown.position_mae.max, Parts::quarter(*max));
            let sum: u32 = maes.iter().map(|&m| u32::from(m)).sum();
            prop_assert_eq!(breakdown.position_mae.mean, f64::from(sum) / 4.0 / maes.len() as f64);
        } else {
            prop_assert_eq!(breakdown.position_mae, StatSummary::default());
        }
    }
}

#[test]
fn failed_cases_only_count_toward_totals() {
    let case = template_case();
    let failed = CaseEvaluation::failed(&case, 3.0, "");
    assert_eq!(failed.error.as_deref(), Some("editor failed without an error message"));

    let aggregator: Aggregator = [failed].iter().collect();
    let metrics = aggregator.finish();
    assert_eq!(metrics.failed_cases, 1);
    assert_eq!(metrics.success_rate, 0.0);
    assert_eq!(metrics.latency.total, 0.0);
}

#[test]
fn compositional_cases_count_toward_semantic_accuracy() {
    let case = (0..64)
        .map(|seed| DatasetBuilder::new(seed).build_case(ComplexityTier::Complex))
        .find(|case| matches!(case.edit_operation.params, EditParams::CompositionalEdit(_)))
        .unwrap();

    let structural = StructuralScorer::new().compute_all_metrics(&case.target_usd, &case.target_usd);
    let semantic = SemanticScorer::new().compute_all_metrics(
        &case.edit_operation.params,
        &case.target_usd,
        &case.target_usd,
    );
    assert!(semantic.intent.supported);
    assert!(!semantic.intent.steps.is_empty());

    let evaluation = CaseEvaluation::scored(&case, 1.0, structural, semantic);
    let metrics = [evaluation].iter().collect::<Aggregator>().finish();
    assert_eq!(metrics.semantic_correctness.total_count, 1);
    assert_eq!(metrics.semantic_correctness.unscored_count, 0);
    assert_eq!(metrics.semantic_correctness.accuracy, 1.0);
}
