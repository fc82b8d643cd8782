//! Suite reports: aggregation, JSON artifacts and Markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{TestCase, ValidationResult};
use crate::scoring::mean;

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// Aggregate figures for one suite run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    /// Cases that ran but scored below the threshold, plus errored cases.
    pub failed: usize,
    /// Cases that did not complete.
    pub errored: usize,
    pub pass_rate: f64,
    pub mean_summary_score: f64,
    pub mean_suggestions_score: f64,
    pub mean_prompt_score: f64,
    pub mean_overall_score: f64,
}

/// Results of running a suite of test cases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub pass_threshold: f64,
    pub duration_ms: u64,
    pub summary: SuiteSummary,
    /// Ordered by test case id.
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    /// Aggregate `results`; a result passes when it has no error and its
    /// overall score is at least `pass_threshold`.
    pub fn from_results(results: Vec<ValidationResult>, pass_threshold: f64) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed(pass_threshold)).count();
        let errored = results.iter().filter(|r| r.is_error()).count();
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64
        };

        let summary = SuiteSummary {
            total,
            passed,
            failed: total - passed,
            errored,
            pass_rate,
            mean_summary_score: mean(results.iter().map(|r| r.summary_score)),
            mean_suggestions_score: mean(results.iter().map(|r| r.suggestions_score)),
            mean_prompt_score: mean(results.iter().map(|r| r.prompt_score)),
            mean_overall_score: mean(results.iter().map(|r| r.overall_score)),
        };

        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            pass_threshold,
            duration_ms: 0,
            summary,
            results,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// True when every case passed. An empty suite passes.
    pub fn all_passed(&self) -> bool {
        self.summary.passed == self.summary.total
    }

    pub fn failing(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results
            .iter()
            .filter(move |r| !r.passed(self.pass_threshold))
    }
}

/// Write the report as pretty JSON, creating parent directories.
pub fn write_report_json(path: &Path, report: &ValidationReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
    }
    let content = serde_json::to_string_pretty(report).context("serialize validation report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Read a JSON array of test cases.
pub fn read_test_cases_json(path: &Path) -> Result<Vec<TestCase>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    let cases: Vec<TestCase> =
        serde_json::from_str(&content).with_context(|| format!("parse test cases {:?}", path))?;
    Ok(cases)
}

fn status(result: &ValidationResult, threshold: f64) -> &'static str {
    if result.is_error() {
        "ERROR"
    } else if result.passed(threshold) {
        "PASS"
    } else {
        "FAIL"
    }
}

/// Render a Markdown summary for PR comments and CI output.
pub fn render_report_md(report: &ValidationReport) -> String {
    let s = &report.summary;
    let mut out = String::new();
    out.push_str("# Validation Report\n\n");
    out.push_str(&format!(
        "- cases: {}\n- passed: {}\n- failed: {}\n- errors: {}\n- pass rate: {:.1}%\n- mean overall score: {:.3}\n- threshold: {:.2}\n\n",
        s.total,
        s.passed,
        s.failed,
        s.errored,
        s.pass_rate * 100.0,
        s.mean_overall_score,
        report.pass_threshold
    ));

    if report.results.is_empty() {
        out.push_str("_No test cases registered._\n");
        return out;
    }

    out.push_str("## Cases\n\n");
    out.push_str("| Case | Summary | Suggestions | Prompt | Overall | Status |\n");
    out.push_str("|------|---------|-------------|--------|---------|--------|\n");
    for r in &report.results {
        out.push_str(&format!(
            "| `{}` | {:.3} | {:.3} | {:.3} | {:.3} | {} |\n",
            r.test_case_id,
            r.summary_score,
            r.suggestions_score,
            r.prompt_score,
            r.overall_score,
            status(r, report.pass_threshold)
        ));
    }

    let errors: Vec<_> = report
        .results
        .iter()
        .filter_map(|r| r.error.as_ref().map(|e| (r, e)))
        .collect();
    if !errors.is_empty() {
        out.push_str("\n## Errors\n\n");
        for (r, e) in errors {
            out.push_str(&format!("- `{}` ({}): {}\n", r.test_case_id, e.kind, e.message));
        }
    }

    let missing: Vec<_> = report
        .results
        .iter()
        .filter(|r| !r.breakdown.summary.missing_key_points.is_empty())
        .collect();
    if !missing.is_empty() {
        out.push_str("\n## Missing Key Points\n\n");
        for r in missing {
            out.push_str(&format!(
                "- `{}`: {}\n",
                r.test_case_id,
                r.breakdown.summary.missing_key_points.join(", ")
            ));
        }
    }

    out
}
