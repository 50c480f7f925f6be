//! Evaluation reports: JSON for machines, Markdown for people

use chrono::{DateTime, Utc};
use scenebench_generator::DatasetMetadata;
use scenebench_metrics::{AggregateMetrics, CaseEvaluation, StatSummary};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use crate::collaborators::CameraAngle;
use crate::config::EvaluationConfig;
use crate::error::{HarnessError, Result};
use crate::runner::{render_key, RunOutcome};

/// Prompts longer than this are cut in the per-case table
const PROMPT_PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub dataset_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_metadata: Option<DatasetMetadata>,
    pub num_test_cases: usize,
    pub evaluation_date: DateTime<Utc>,
    pub editor: String,
    pub config: EvaluationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub metadata: ReportMetadata,
    pub aggregate_metrics: AggregateMetrics,
    pub test_case_results: Vec<CaseEvaluation>,
}

/// Files written by [`EvaluationReport::write`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

impl EvaluationReport {
    #[must_use]
    pub fn new(metadata: ReportMetadata, outcome: RunOutcome) -> Self {
        Self {
            metadata,
            aggregate_metrics: outcome.aggregate,
            test_case_results: outcome.results,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| HarnessError::io_error(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent(path)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| HarnessError::io_error(path, e))
    }

    pub fn save_markdown(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent(path)?;
        fs::write(path, self.markdown().to_string()).map_err(|e| HarnessError::io_error(path, e))
    }

    /// Report stem: `<dataset stem>_<YYYYmmdd_HHMMSS>`
    #[must_use]
    pub fn file_stem(&self) -> String {
        let dataset = self
            .metadata
            .dataset_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("evaluation");
        format!(
            "{dataset}_{}",
            self.metadata.evaluation_date.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write `<stem>.json` and `<stem>.md` into `dir`
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<ReportPaths> {
        let stem = self.file_stem();
        let paths = ReportPaths {
            json: dir.as_ref().join(format!("{stem}.json")),
            markdown: dir.as_ref().join(format!("{stem}.md")),
        };
        self.save_json(&paths.json)?;
        self.save_markdown(&paths.markdown)?;
        tracing::info!(json = %paths.json.display(), markdown = %paths.markdown.display(), "report written");
        Ok(paths)
    }

    /// Markdown rendering of the report
    #[must_use]
    pub fn markdown(&self) -> Markdown<'_> {
        Markdown(self)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| HarnessError::io_error(parent, e))
        }
        _ => Ok(()),
    }
}

/// Display adapter writing the Markdown summary
#[derive(Debug, Clone, Copy)]
pub struct Markdown<'a>(&'a EvaluationReport);

impl fmt::Display for Markdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let meta = &report.metadata;
        let agg = &report.aggregate_metrics;

        writeln!(f, "# SceneBench Evaluation Report")?;
        writeln!(f)?;
        writeln!(f, "**Date**: {}", meta.evaluation_date.to_rfc3339())?;
        writeln!(f, "**Dataset**: {}", meta.dataset_path.display())?;
        writeln!(f, "**Editor**: {}", meta.editor)?;
        writeln!(f, "**Test Cases**: {}", meta.num_test_cases)?;
        writeln!(f)?;
        writeln!(f, "## Summary")?;
        writeln!(f)?;
        writeln!(
            f,
            "- **Success Rate**: {:.1}% ({}/{})",
            agg.success_rate * 100.0,
            agg.successful_cases,
            agg.total_cases
        )?;
        writeln!(f, "- **Failed Cases**: {}", agg.failed_cases)?;
        writeln!(f)?;
        writeln!(f, "## Aggregate Metrics")?;
        writeln!(f)?;

        let structural = &agg.structural_similarity;
        writeln!(f, "### Structural Similarity")?;
        writeln!(f, "- **Mean**: {:.3}", structural.mean)?;
        writeln!(f, "- **Min**: {:.3}", structural.min)?;
        writeln!(f, "- **Max**: {:.3}", structural.max)?;
        let breakdown = &agg.structural_breakdown;
        for (label, stats) in [
            ("Count Match Rate", &breakdown.count_match_rate),
            ("Type Accuracy", &breakdown.type_accuracy),
            ("Color Accuracy", &breakdown.color_accuracy),
        ] {
            write_stat_line(f, label, stats)?;
        }
        if breakdown.position_cases > 0 {
            write_stat_line(f, "Position MAE", &breakdown.position_mae)?;
        } else {
            writeln!(f, "- **Position MAE**: n/a (no matched objects)")?;
        }
        writeln!(f)?;

        let semantic = &agg.semantic_correctness;
        writeln!(f, "### Semantic Correctness")?;
        writeln!(f, "- **Accuracy**: {:.1}%", semantic.accuracy * 100.0)?;
        writeln!(f, "- **Correct**: {}/{}", semantic.correct_count, semantic.total_count)?;
        if semantic.unscored_count > 0 {
            writeln!(f, "- **Without intent check**: {}", semantic.unscored_count)?;
        }

        if let Some(visual) = &agg.visual_similarity {
            writeln!(f)?;
            writeln!(f, "### Visual Similarity (Ground Truth vs Generated)")?;
            writeln!(
                f,
                "- **SSIM Mean**: {:.3} (range: {:.3} - {:.3})",
                visual.ssim_mean, visual.ssim_min, visual.ssim_max
            )?;
            writeln!(
                f,
                "- **PSNR Mean**: {:.1}dB (range: {:.1} - {:.1}dB)",
                visual.psnr_mean, visual.psnr_min, visual.psnr_max
            )?;
            if visual.identical_cases > 0 {
                writeln!(f, "- **Pixel-identical Cases**: {}", visual.identical_cases)?;
            }
            writeln!(f, "- **MSE Mean**: {:.6}", visual.mse_mean)?;
            writeln!(
                f,
                "- **Cases with Visual Metrics**: {}/{}",
                visual.cases_with_visual_metrics, agg.total_cases
            )?;
        }

        writeln!(f)?;
        writeln!(f, "### Performance")?;
        writeln!(f, "- **Mean Latency**: {:.2}s", agg.latency.mean)?;
        writeln!(f, "- **Min Latency**: {:.2}s", agg.latency.min)?;
        writeln!(f, "- **Max Latency**: {:.2}s", agg.latency.max)?;
        writeln!(f, "- **Total Time**: {:.2}s", agg.latency.total)?;
        writeln!(f)?;

        write_case_table(f, &report.test_case_results)?;
        write_visual_comparison(f, &report.test_case_results)?;
        write_failed_cases(f, &report.test_case_results)
    }
}

fn write_case_table(f: &mut fmt::Formatter<'_>, results: &[CaseEvaluation]) -> fmt::Result {
    writeln!(f, "## Test Case Results")?;
    writeln!(f)?;
    writeln!(f, "| ID | Prompt | Success | Structural | Semantic | SSIM | PSNR | Latency |")?;
    writeln!(f, "|----|--------|---------|------------|----------|------|------|---------|")?;

    for r in results {
        let mut row = format!("| {} | {} | ", r.test_case_id, preview(&r.prompt));
        if r.success {
            let structural = r
                .structural_score()
                .map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
            let semantic = match &r.semantic {
                Some(s) if !s.intent.supported => "n/a",
                Some(s) if s.summary.semantically_correct => "✓",
                Some(_) => "✗",
                None => "-",
            };
            let (ssim, psnr) = match r.visual.as_ref().and_then(|v| v.scores()) {
                Some(v) if v.psnr.is_finite() => (format!("{:.3}", v.ssim), format!("{:.1}dB", v.psnr)),
                Some(v) => (format!("{:.3}", v.ssim), "inf".to_string()),
                None => ("-".to_string(), "-".to_string()),
            };
            let _ = write!(row, "✓ | {structural} | {semantic} | {ssim} | {psnr} | ");
        } else {
            row.push_str("✗ | - | - | - | - | ");
        }
        writeln!(f, "{row}{:.2}s |", r.latency_secs)?;
    }
    Ok(())
}

fn write_visual_comparison(f: &mut fmt::Formatter<'_>, results: &[CaseEvaluation]) -> fmt::Result {
    if results.iter().all(|r| r.render_paths.is_empty()) {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "## Visual Comparison")?;
    writeln!(f)?;

    for r in results.iter().filter(|r| !r.render_paths.is_empty()) {
        writeln!(f, "### {}", r.test_case_id)?;
        writeln!(f)?;
        writeln!(f, "**Prompt**: {}", r.prompt)?;
        writeln!(f)?;
        writeln!(f, "| View | Input | Ground Truth | Generated |")?;
        writeln!(f, "|------|-------|--------------|-----------|")?;
        for angle in CameraAngle::ALL {
            let cell = |role: &str, label: &str| match r.render_paths.get(&render_key(role, angle)) {
                Some(path) => format!("![{label} {angle}]({})", path.display()),
                None => "*(not rendered)*".to_string(),
            };
            writeln!(
                f,
                "| **{}** | {} | {} | {} |",
                capitalize(angle.as_str()),
                cell("input", "Input"),
                cell("ground_truth", "GT"),
                cell("generated", "Gen")
            )?;
        }
        writeln!(f)?;
        if let Some(v) = r.visual.as_ref().and_then(|v| v.scores()) {
            writeln!(
                f,
                "**Visual Metrics**: SSIM={:.3}, PSNR={:.2}dB, MSE={:.6}",
                v.ssim, v.psnr, v.mse
            )?;
            writeln!(f)?;
        }
    }
    Ok(())
}

fn write_failed_cases(f: &mut fmt::Formatter<'_>, results: &[CaseEvaluation]) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "## Failed Cases")?;
    writeln!(f)?;
    let mut any = false;
    for r in results.iter().filter(|r| !r.success) {
        any = true;
        writeln!(
            f,
            "- **{}**: {}",
            r.test_case_id,
            r.error.as_deref().unwrap_or("unknown error")
        )?;
    }
    if !any {
        writeln!(f, "No failed cases!")?;
    }
    Ok(())
}

fn preview(prompt: &str) -> String {
    let cleaned = prompt.replace('|', "\\|");
    if cleaned.chars().count() > PROMPT_PREVIEW_CHARS {
        let cut: String = cleaned.chars().take(PROMPT_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        cleaned
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

fn write_stat_line(f: &mut fmt::Formatter<'_>, label: &str, stats: &StatSummary) -> fmt::Result {
    writeln!(
        f,
        "- **{label}**: {:.3} (range: {:.3} - {:.3})",
        stats.mean, stats.min, stats.max
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_prompts_are_truncated() {
        let prompt = "Add a small red sphere to the left of the blue cube please";
        let cut = preview(prompt);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), PROMPT_PREVIEW_CHARS + 3);
        assert_eq!(preview("Add a sphere"), "Add a sphere");
    }

    #[test]
    fn pipes_do_not_break_the_table() {
        assert_eq!(preview("a|b"), "a\\|b");
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("perspective"), "Perspective");
        assert_eq!(capitalize(""), "");
    }
}
