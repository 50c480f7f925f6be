//! Structural comparison of two scenes
//!
//! Counts, kind histograms, greedy nearest-neighbour position matching and
//! color agreement, folded into one weighted similarity score.

use scenebench_scene::{decode, DecodedObject, ObjectKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Matched positions within this mean absolute error count as correct
pub const DEFAULT_POSITION_THRESHOLD: f64 = 0.1;

/// Matched colors within this mean channel difference count as correct
pub const DEFAULT_COLOR_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountMetrics {
    pub ground_truth_count: usize,
    pub generated_count: usize,
    pub count_match: bool,
    pub count_difference: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMetrics {
    pub type_accuracy: f64,
    pub type_matches: usize,
    pub ground_truth_types: BTreeMap<ObjectKind, usize>,
    pub generated_types: BTreeMap<ObjectKind, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionMetrics {
    pub position_mae: f64,
    pub num_matched_objects: usize,
    pub position_errors: Vec<f64>,
    pub positions_within_threshold: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorMetrics {
    pub color_accuracy: f64,
    pub color_matches: usize,
    pub total_colored_objects: usize,
    pub avg_color_error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralSummary {
    pub exact_match: bool,
    pub structural_similarity_score: f64,
}

/// Full structural comparison of one ground-truth / generated pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralMetrics {
    pub count: CountMetrics,
    #[serde(rename = "type")]
    pub types: TypeMetrics,
    pub position: PositionMetrics,
    pub color: ColorMetrics,
    pub summary: StructuralSummary,
}

/// Stateless structural scorer
#[derive(Debug, Clone, Copy)]
pub struct StructuralScorer {
    position_threshold: f64,
    color_threshold: f64,
}

impl Default for StructuralScorer {
    fn default() -> Self {
        Self {
            position_threshold: DEFAULT_POSITION_THRESHOLD,
            color_threshold: DEFAULT_COLOR_THRESHOLD,
        }
    }
}

impl StructuralScorer {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_position_threshold(mut self, threshold: f64) -> Self {
        self.position_threshold = threshold;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_color_threshold(mut self, threshold: f64) -> Self {
        self.color_threshold = threshold;
        self
    }

    /// Decode both texts and compare them
    #[must_use]
    pub fn compute_all_metrics(&self, ground_truth: &str, generated: &str) -> StructuralMetrics {
        let gt = decode(ground_truth);
        let gen = decode(generated);
        tracing::debug!(ground_truth = gt.len(), generated = gen.len(), "decoded scenes");
        self.compute_for_objects(&gt, &gen)
    }

    /// Compare two already-decoded object lists
    #[must_use]
    pub fn compute_for_objects(
        &self,
        gt: &[DecodedObject],
        gen: &[DecodedObject],
    ) -> StructuralMetrics {
        let count = count_metrics(gt, gen);
        let types = type_metrics(gt, gen);
        let position = self.position_metrics(gt, gen);
        let color = self.color_metrics(gt, gen);

        let summary = StructuralSummary {
            exact_match: count.count_match
                && types.type_accuracy == 1.0
                && position.position_mae < self.position_threshold
                && color.color_accuracy == 1.0,
            structural_similarity_score: (if count.count_match { 1.0 } else { 0.5 }) * 0.2
                + types.type_accuracy * 0.3
                + (1.0 - position.position_mae.min(1.0)) * 0.3
                + color.color_accuracy * 0.2,
        };

        StructuralMetrics {
            count,
            types,
            position,
            color,
            summary,
        }
    }

    fn position_metrics(&self, gt: &[DecodedObject], gen: &[DecodedObject]) -> PositionMetrics {
        let mut used = vec![false; gen.len()];
        let mut errors = Vec::new();

        for target in gt {
            let Some(target_position) = target.position else {
                continue;
            };
            let Some(index) = best_match(target, gen, &used) else {
                continue;
            };
            if let Some(position) = gen[index].position {
                errors.push(target_position.mean_abs_diff(&position));
                used[index] = true;
            }
        }

        let mae = mean(&errors);
        PositionMetrics {
            position_mae: mae,
            num_matched_objects: errors.len(),
            positions_within_threshold: errors
                .iter()
                .filter(|e| **e <= self.position_threshold)
                .count(),
            position_errors: errors,
        }
    }

    fn color_metrics(&self, gt: &[DecodedObject], gen: &[DecodedObject]) -> ColorMetrics {
        let mut used = vec![false; gen.len()];
        let mut errors = Vec::new();
        let mut matches = 0;
        let mut total = 0;

        for target in gt {
            let Some(target_color) = target.color else {
                continue;
            };
            total += 1;
            let Some(index) = best_match(target, gen, &used) else {
                continue;
            };
            if let Some(color) = gen[index].color {
                let error = target_color.mean_abs_diff(&color);
                if error <= self.color_threshold {
                    matches += 1;
                }
                errors.push(error);
                used[index] = true;
            }
        }

        let accuracy = if total > 0 {
            matches as f64 / total as f64
        } else if gen.iter().any(|o| o.color.is_some()) {
            0.0
        } else {
            1.0
        };

        ColorMetrics {
            color_accuracy: accuracy,
            color_matches: matches,
            total_colored_objects: total,
            avg_color_error: mean(&errors),
        }
    }
}

fn count_metrics(gt: &[DecodedObject], gen: &[DecodedObject]) -> CountMetrics {
    CountMetrics {
        ground_truth_count: gt.len(),
        generated_count: gen.len(),
        count_match: gt.len() == gen.len(),
        count_difference: gt.len().abs_diff(gen.len()),
    }
}

fn type_metrics(gt: &[DecodedObject], gen: &[DecodedObject]) -> TypeMetrics {
    let ground_truth_types = histogram(gt);
    let generated_types = histogram(gen);

    let matches: usize = ground_truth_types
        .iter()
        .map(|(kind, n)| (*n).min(generated_types.get(kind).copied().unwrap_or(0)))
        .sum();
    let accuracy = if gt.is_empty() {
        if gen.is_empty() {
            1.0
        } else {
            0.0
        }
    } else {
        matches as f64 / gt.len() as f64
    };

    TypeMetrics {
        type_accuracy: accuracy,
        type_matches: matches,
        ground_truth_types,
        generated_types,
    }
}

fn histogram(objects: &[DecodedObject]) -> BTreeMap<ObjectKind, usize> {
    objects.iter().fold(BTreeMap::new(), |mut acc, o| {
        *acc.entry(o.kind).or_insert(0) += 1;
        acc
    })
}

/// Greedy best candidate of the same kind among unused objects
///
/// Nearest by Euclidean distance when both sides have a position; a
/// candidate without position is taken only while nothing better was seen.
fn best_match(target: &DecodedObject, candidates: &[DecodedObject], used: &[bool]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_distance = f64::INFINITY;

    for (index, candidate) in candidates.iter().enumerate() {
        if used[index] || candidate.kind != target.kind {
            continue;
        }
        match (target.position, candidate.position) {
            (Some(a), Some(b)) => {
                let distance = a.distance(&b);
                if distance < best_distance {
                    best_distance = distance;
                    best = Some(index);
                }
            }
            _ if best.is_none() => best = Some(index),
            _ => {}
        }
    }
    best
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
