//! Domain-level error taxonomy for promptlab.

use serde::{Deserialize, Serialize};

use crate::analyzers::AnalyzerError;
use promptlab_stages::StageError;

/// Coarse error classification recorded on failed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown test case, A/B test, or industry.
    NotFound,
    /// A generation stage rejected the request.
    UpstreamFailure,
    /// Caller-supplied data was rejected.
    InvalidInput,
    /// Local I/O or serialization failure.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::UpstreamFailure => "upstream_failure",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// promptlab domain errors.
#[derive(Debug, thiserror::Error)]
pub enum LabError {
    #[error("test case not found: {0}")]
    TestCaseNotFound(String),

    #[error("duplicate test case id: {0}")]
    DuplicateTestCase(String),

    /// Stage failure, passed through unchanged.
    #[error(transparent)]
    Upstream(#[from] StageError),

    #[error("a/b test not found: {0}")]
    AbTestNotFound(String),

    #[error("duplicate a/b test id: {0}")]
    DuplicateAbTest(String),

    #[error("a/b test {0} has no variants")]
    NoVariants(String),

    #[error("a/b test {test_id} has an empty or repeated variant id: {variant_id:?}")]
    InvalidVariantId { test_id: String, variant_id: String },

    #[error("invalid feedback: {0}")]
    InvalidFeedback(String),

    #[error("no recorded run for user {user_id} in a/b test {test_id}")]
    NoResultForUser { test_id: String, user_id: String },

    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LabError {
    /// Classify this error for result payloads.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LabError::TestCaseNotFound(_)
            | LabError::AbTestNotFound(_)
            | LabError::NoResultForUser { .. } => ErrorKind::NotFound,
            LabError::Upstream(_) => ErrorKind::UpstreamFailure,
            LabError::Analyzer(AnalyzerError::UnknownIndustry(_)) => ErrorKind::NotFound,
            LabError::DuplicateTestCase(_)
            | LabError::DuplicateAbTest(_)
            | LabError::NoVariants(_)
            | LabError::InvalidVariantId { .. }
            | LabError::InvalidFeedback(_)
            | LabError::Analyzer(_)
            | LabError::Config(_) => ErrorKind::InvalidInput,
            LabError::Serialization(_) | LabError::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for promptlab domain operations.
pub type Result<T> = std::result::Result<T, LabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lab_error_display() {
        let err = LabError::TestCaseNotFound("case-42".to_string());
        assert!(err.to_string().contains("test case not found"));
        assert!(err.to_string().contains("case-42"));

        let err = LabError::DuplicateTestCase("case-1".to_string());
        assert!(err.to_string().contains("duplicate test case id"));
    }

    #[test]
    fn test_upstream_error_is_transparent() {
        let err = LabError::from(StageError::Scripted("model overloaded".to_string()));
        assert_eq!(err.to_string(), "model overloaded");
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            LabError::TestCaseNotFound("x".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LabError::Analyzer(AnalyzerError::UnknownIndustry("x".to_string())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LabError::InvalidFeedback("rating 9".to_string()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(ErrorKind::UpstreamFailure.to_string(), "upstream_failure");
    }
}
