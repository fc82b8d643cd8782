//! Structured observability hooks for validation, analysis and A/B runs.
//!
//! - [`validation_span`] and [`ab_run_span`] build run-scoped spans for
//!   `tracing::Instrument`
//! - `emit_*` functions log lifecycle events at `info!` level
//!
//! Set `PROMPTLAB_LOG_FORMAT=json` for JSON output.

use tracing::info;

/// Span for one validation run, tagged with the run and test case ids.
///
/// ```ignore
/// async { /* stage calls */ }.instrument(validation_span(&run_id, "case-1")).await
/// ```
pub fn validation_span(run_id: &str, test_case_id: &str) -> tracing::Span {
    tracing::info_span!(
        "promptlab.validation",
        run_id = %run_id,
        test_case_id = %test_case_id
    )
}

/// Span for one A/B harness run.
pub fn ab_run_span(test_id: &str, user_id: &str) -> tracing::Span {
    tracing::info_span!("promptlab.ab_run", test_id = %test_id, user_id = %user_id)
}

pub fn emit_validation_started(run_id: &str, test_case_id: &str, industry: &str, files: usize) {
    info!(
        event = "validation.started",
        run_id = %run_id,
        test_case_id = %test_case_id,
        industry = %industry,
        files = files,
    );
}

/// Emit event: one pipeline stage returned.
pub fn emit_stage_completed(run_id: &str, stage: &str, output_chars: usize) {
    info!(
        event = "validation.stage_completed",
        run_id = %run_id,
        stage = %stage,
        output_chars = output_chars,
    );
}

pub fn emit_validation_finished(run_id: &str, overall_score: f64, duration_ms: u64) {
    info!(
        event = "validation.finished",
        run_id = %run_id,
        overall_score = overall_score,
        duration_ms = duration_ms,
    );
}

/// Emit event: validation aborted (warning level).
pub fn emit_validation_failed(test_case_id: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "validation.failed", test_case_id = %test_case_id, error = %error);
}

pub fn emit_suite_finished(total: usize, passed: usize, mean_score: f64) {
    info!(
        event = "suite.finished",
        total = total,
        passed = passed,
        mean_score = mean_score,
    );
}

pub fn emit_analysis_completed(industry: &str, tasks: usize, requirements: usize) {
    info!(
        event = "analysis.completed",
        industry = %industry,
        key_tasks = tasks,
        requirements = requirements,
    );
}

pub fn emit_ab_run_recorded(test_id: &str, user_id: &str, variant_id: &str, duration_ms: u64) {
    info!(
        event = "ab.run_recorded",
        test_id = %test_id,
        user_id = %user_id,
        variant_id = %variant_id,
        duration_ms = duration_ms,
    );
}

pub fn emit_feedback_recorded(test_id: &str, user_id: &str, rating: u8) {
    info!(
        event = "ab.feedback_recorded",
        test_id = %test_id,
        user_id = %user_id,
        rating = rating,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_create() {
        validation_span("run-1", "case-1").in_scope(|| {
            emit_stage_completed("run-1", "summarize", 42);
        });
        ab_run_span("test-1", "user-1").in_scope(|| {
            emit_feedback_recorded("test-1", "user-1", 5);
        });
    }
}
