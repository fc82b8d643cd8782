//! Error types for the industry analyzer layer.

/// Errors produced by analyzers and the analyzer registry.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("invalid pattern for category {category}: {source}")]
    InvalidPattern {
        category: String,
        #[source]
        source: regex::Error,
    },

    #[error("no analyzer registered for industry: {0}")]
    UnknownIndustry(String),

    #[error("industry is disabled: {0}")]
    IndustryDisabled(String),
}

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = std::result::Result<T, AnalyzerError>;
