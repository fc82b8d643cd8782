//! Domain models for promptlab.
//!
//! Canonical definitions for the core entities:
//! - `TestCase`: fixed pipeline input paired with per-stage expectations
//! - `ValidationResult`: scored outcome of one pipeline run
//! - `ProjectAnalysis`: structured insight extracted from project text

pub mod analysis;
pub mod digest;
pub mod error;
pub mod result;
pub mod test_case;

// Re-export main types and errors
pub use analysis::{IndustryMetrics, ProjectAnalysis, ProjectSample, ValidationMetrics};
pub use error::{ErrorKind, LabError, Result};
pub use result::{
    ErrorPayload, PromptBreakdown, ScoreBreakdown, SuggestionsBreakdown, SummaryBreakdown,
    ValidationResult,
};
pub use test_case::{
    InputFile, OutputFormat, PromptCriteria, SuggestionCriteria, SummaryCriteria, TestCase,
};
