//! Batch aggregation of per-case evaluations
//!
//! [`Aggregator`] is a commutative monoid: partial aggregates built on
//! separate shards can be merged in any grouping or order.

use serde::{Deserialize, Serialize};

use crate::evaluation::CaseEvaluation;
use crate::structural::StructuralMetrics;

/// Count, sum and extrema of a stream of values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            sum: self.sum + other.sum,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Mean, min and max, all zero when empty
    #[must_use]
    pub fn summary(&self) -> StatSummary {
        if self.count == 0 {
            return StatSummary::default();
        }
        StatSummary {
            mean: self.sum / self.count as f64,
            min: self.min,
            max: self.max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-sub-score statistics over successful scored cases
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuralAggregate {
    /// Share of cases whose object counts match, as 1.0 / 0.0 per case
    pub count_match_rate: StatSummary,
    pub type_accuracy: StatSummary,
    /// Only cases with at least one matched pair
    pub position_mae: StatSummary,
    pub color_accuracy: StatSummary,
    /// Cases contributing to `position_mae`
    pub position_cases: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemanticAggregate {
    pub correct_count: u64,
    /// Cases with an intent check
    pub total_count: u64,
    pub accuracy: f64,
    /// Successful cases whose operation has no intent check
    pub unscored_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatencySummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualAggregate {
    pub ssim_mean: f64,
    pub ssim_min: f64,
    pub ssim_max: f64,
    /// Over finite PSNR values only
    pub psnr_mean: f64,
    pub psnr_min: f64,
    pub psnr_max: f64,
    /// Pixel-identical cases (infinite PSNR)
    pub identical_cases: u64,
    pub mse_mean: f64,
    pub cases_with_visual_metrics: u64,
}

/// Final batch report numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub total_cases: u64,
    pub successful_cases: u64,
    pub failed_cases: u64,
    pub success_rate: f64,
    pub structural_similarity: StatSummary,
    #[serde(default)]
    pub structural_breakdown: StructuralAggregate,
    pub semantic_correctness: SemanticAggregate,
    pub latency: LatencySummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_similarity: Option<VisualAggregate>,
}

/// Streaming fold over [`CaseEvaluation`]s
///
/// Only successful cases contribute scores and latency; failed cases
/// count toward totals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregator {
    total: u64,
    successful: u64,
    structural: RunningStats,
    count_match: RunningStats,
    type_accuracy: RunningStats,
    position_mae: RunningStats,
    color_accuracy: RunningStats,
    semantic_correct: u64,
    semantic_scored: u64,
    semantic_unscored: u64,
    latency: RunningStats,
    ssim: RunningStats,
    psnr: RunningStats,
    psnr_infinite: u64,
    mse: RunningStats,
}

impl Aggregator {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, case: &CaseEvaluation) {
        self.total += 1;
        if !case.success {
            return;
        }
        self.successful += 1;
        self.latency.push(case.latency_secs);

        if let Some(structural) = &case.structural {
            self.push_structural(structural);
        }
        if let Some(semantic) = &case.semantic {
            if semantic.intent.supported {
                self.semantic_scored += 1;
                if semantic.summary.semantically_correct {
                    self.semantic_correct += 1;
                }
            } else {
                self.semantic_unscored += 1;
            }
        }
        if let Some(scores) = case.visual.as_ref().and_then(|v| v.scores()) {
            self.ssim.push(scores.ssim);
            self.mse.push(scores.mse);
            if scores.psnr.is_finite() {
                self.psnr.push(scores.psnr);
            } else {
                self.psnr_infinite += 1;
            }
        }
    }

    fn push_structural(&mut self, metrics: &StructuralMetrics) {
        self.structural.push(metrics.summary.structural_similarity_score);
        self.count_match
            .push(if metrics.count.count_match { 1.0 } else { 0.0 });
        self.type_accuracy.push(metrics.types.type_accuracy);
        self.color_accuracy.push(metrics.color.color_accuracy);
        if metrics.position.num_matched_objects > 0 {
            self.position_mae.push(metrics.position.position_mae);
        }
    }

    /// Combine two partial aggregates; commutative and associative
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            successful: self.successful + other.successful,
            structural: self.structural.merge(other.structural),
            count_match: self.count_match.merge(other.count_match),
            type_accuracy: self.type_accuracy.merge(other.type_accuracy),
            position_mae: self.position_mae.merge(other.position_mae),
            color_accuracy: self.color_accuracy.merge(other.color_accuracy),
            semantic_correct: self.semantic_correct + other.semantic_correct,
            semantic_scored: self.semantic_scored + other.semantic_scored,
            semantic_unscored: self.semantic_unscored + other.semantic_unscored,
            latency: self.latency.merge(other.latency),
            ssim: self.ssim.merge(other.ssim),
            psnr: self.psnr.merge(other.psnr),
            psnr_infinite: self.psnr_infinite + other.psnr_infinite,
            mse: self.mse.merge(other.mse),
        }
    }

    #[must_use]
    pub fn finish(&self) -> AggregateMetrics {
        let ratio = |n: u64, d: u64| if d > 0 { n as f64 / d as f64 } else { 0.0 };
        let latency = self.latency.summary();

        let visual_similarity = (self.ssim.count > 0).then(|| {
            let ssim = self.ssim.summary();
            let psnr = self.psnr.summary();
            VisualAggregate {
                ssim_mean: ssim.mean,
                ssim_min: ssim.min,
                ssim_max: ssim.max,
                psnr_mean: psnr.mean,
                psnr_min: psnr.min,
                psnr_max: psnr.max,
                identical_cases: self.psnr_infinite,
                mse_mean: self.mse.summary().mean,
                cases_with_visual_metrics: self.ssim.count,
            }
        });

        AggregateMetrics {
            total_cases: self.total,
            successful_cases: self.successful,
            failed_cases: self.total - self.successful,
            success_rate: ratio(self.successful, self.total),
            structural_similarity: self.structural.summary(),
            structural_breakdown: StructuralAggregate {
                count_match_rate: self.count_match.summary(),
                type_accuracy: self.type_accuracy.summary(),
                position_mae: self.position_mae.summary(),
                color_accuracy: self.color_accuracy.summary(),
                position_cases: self.position_mae.count,
            },
            semantic_correctness: SemanticAggregate {
                correct_count: self.semantic_correct,
                total_count: self.semantic_scored,
                accuracy: ratio(self.semantic_correct, self.semantic_scored),
                unscored_count: self.semantic_unscored,
            },
            latency: LatencySummary {
                mean: latency.mean,
                min: latency.min,
                max: latency.max,
                total: self.latency.sum,
            },
            visual_similarity,
        }
    }
}

impl<'a> Extend<&'a CaseEvaluation> for Aggregator {
    fn extend<I: IntoIterator<Item = &'a CaseEvaluation>>(&mut self, iter: I) {
        for case in iter {
            self.push(case);
        }
    }
}

impl<'a> FromIterator<&'a CaseEvaluation> for Aggregator {
    fn from_iter<I: IntoIterator<Item = &'a CaseEvaluation>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        aggregator.extend(iter);
        aggregator
    }
}
