//! Scored outcome of a single pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{ErrorKind, LabError};

/// Error recorded on a result whose run failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub message: String,
    pub kind: ErrorKind,
}

impl From<&LabError> for ErrorPayload {
    fn from(err: &LabError) -> Self {
        Self {
            message: err.to_string(),
            kind: err.kind(),
        }
    }
}

/// Sub-scores of the summary stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummaryBreakdown {
    /// Fraction of required key points found.
    pub key_point_coverage: f64,
    /// Fraction of required elements found.
    pub element_coverage: f64,
    /// Required key points that were not found.
    pub missing_key_points: Vec<String>,
}

/// Sub-scores of the suggestion stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SuggestionsBreakdown {
    /// Fraction of required types covered by at least one suggestion.
    pub type_coverage: f64,
    /// 1.0 when the count is within bounds, else 0.0.
    pub count_in_range: f64,
    pub suggestion_count: usize,
}

/// Sub-scores of the optimize stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptBreakdown {
    /// Fraction of required elements found.
    pub element_coverage: f64,
    /// 1.0 when the text matches the declared format, else 0.0.
    pub format_compliance: f64,
    /// 1.0 when the text fits the maximum length, else 0.0.
    pub length_within_limit: f64,
}

/// Per-stage score breakdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub summary: SummaryBreakdown,
    pub suggestions: SuggestionsBreakdown,
    pub prompt: PromptBreakdown,
}

/// The scored outcome of running one test case through the pipeline.
///
/// Built once per run and never mutated; reruns produce new values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    /// Unique identifier of this run.
    pub run_id: Uuid,

    /// Test case this run executed.
    pub test_case_id: String,

    /// Digest of the test case definition (empty when the case was unknown).
    pub test_case_digest: String,

    pub created_at: DateTime<Utc>,

    pub summary_score: f64,
    pub suggestions_score: f64,
    pub prompt_score: f64,

    /// Arithmetic mean of the three stage scores.
    pub overall_score: f64,

    pub summary: String,
    pub suggestions: Vec<String>,
    pub optimized_prompt: String,

    pub breakdown: ScoreBreakdown,

    pub duration_ms: u64,

    /// Present only when the run failed.
    pub error: Option<ErrorPayload>,
}

impl ValidationResult {
    /// A zero-score result describing a failed run.
    pub fn failed(
        test_case_id: impl Into<String>,
        test_case_digest: String,
        err: &LabError,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            test_case_id: test_case_id.into(),
            test_case_digest,
            created_at: Utc::now(),
            summary_score: 0.0,
            suggestions_score: 0.0,
            prompt_score: 0.0,
            overall_score: 0.0,
            summary: String::new(),
            suggestions: Vec::new(),
            optimized_prompt: String::new(),
            breakdown: ScoreBreakdown::default(),
            duration_ms: 0,
            error: Some(ErrorPayload::from(err)),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether the run succeeded with an overall score of at least `threshold`.
    pub fn passed(&self, threshold: f64) -> bool {
        !self.is_error() && self.overall_score >= threshold
    }

    /// The three stage scores in pipeline order.
    pub fn stage_scores(&self) -> [f64; 3] {
        [self.summary_score, self.suggestions_score, self.prompt_score]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptlab_stages::StageError;

    #[test]
    fn test_failed_result_carries_error_payload() {
        let err = LabError::Upstream(StageError::Scripted("timeout".to_string()));
        let result = ValidationResult::failed("case-1", String::new(), &err);

        assert!(result.is_error());
        assert!(!result.passed(0.0));
        assert_eq!(result.overall_score, 0.0);
        let payload = result.error.expect("payload");
        assert_eq!(payload.message, "timeout");
        assert_eq!(payload.kind, ErrorKind::UpstreamFailure);
    }

    #[test]
    fn test_result_serde_roundtrip() {
        let err = LabError::TestCaseNotFound("missing".to_string());
        let result = ValidationResult::failed("missing", String::new(), &err);

        let json = serde_json::to_string(&result).expect("serialize");
        let back: ValidationResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(result, back);
        assert!(json.contains("\"kind\":\"not_found\""));
    }
}
