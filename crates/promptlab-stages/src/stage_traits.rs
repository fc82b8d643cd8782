//! Generation stage contract
//!
//! The pipeline runs three stages in a fixed order:
//! - `summarize`: input documents → project summary
//! - `generate_suggestions`: summary + combined text → customization suggestions
//! - `generate_optimized_prompt`: summary + file texts + customizations → prompt
//!
//! Implementations are black boxes to the validation engine. Each call may
//! fail with an arbitrary [`StageError`]; callers propagate it unchanged.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StageError;

/// Result type for stage operations
pub type StageResult<T> = std::result::Result<T, StageError>;

/// The three pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Summarize,
    Suggest,
    Optimize,
}

impl PipelineStage {
    /// All stages in execution order.
    pub const ALL: [PipelineStage; 3] = [
        PipelineStage::Summarize,
        PipelineStage::Suggest,
        PipelineStage::Optimize,
    ];

    /// Stable name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Summarize => "summarize",
            PipelineStage::Suggest => "suggest",
            PipelineStage::Optimize => "optimize",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A document handed to the summarize stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFile {
    /// Original file name
    pub name: String,
    /// MIME type reported by the uploader
    pub mime_type: String,
    /// Decoded text content
    pub content: String,
}

/// Per-stage parameter overrides (model, temperature, prompt variant, ...).
///
/// Keys are free-form; the stage implementation decides which ones it
/// understands. An empty set means "use the backend defaults".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageParams(BTreeMap<String, serde_json::Value>);

impl StageParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }
}

/// Output of the summarize stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub summary: String,
}

/// Output of the suggestion stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionsOutput {
    pub suggestions: Vec<String>,
}

/// Output of the optimize stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedPromptOutput {
    pub optimized_prompt: String,
}

/// The three hosted generation calls.
///
/// Guarantees expected from implementations:
/// - calls are independent; no state is carried between them by the caller
/// - failures are reported as `Err`, never as empty output
#[async_trait]
pub trait GenerationStages: Send + Sync {
    /// Summarize the uploaded documents for `industry`.
    async fn summarize(
        &self,
        industry: &str,
        files: &[StageFile],
        params: &StageParams,
    ) -> StageResult<SummaryOutput>;

    /// Propose customizations given the summary and the concatenated file text.
    async fn generate_suggestions(
        &self,
        industry: &str,
        summary: &str,
        combined_text: &str,
        params: &StageParams,
    ) -> StageResult<SuggestionsOutput>;

    /// Produce the final optimized prompt.
    async fn generate_optimized_prompt(
        &self,
        industry: &str,
        summary: &str,
        file_texts: &[String],
        customizations: &[String],
        params: &StageParams,
    ) -> StageResult<OptimizedPromptOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names_in_order() {
        let names: Vec<&str> = PipelineStage::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["summarize", "suggest", "optimize"]);
    }

    #[test]
    fn test_stage_params_builder() {
        let params = StageParams::new()
            .with("temperature", 0.2)
            .with("model", "fast");
        assert_eq!(params.get("model"), Some(&serde_json::json!("fast")));
        assert!(!params.is_empty());
        assert!(StageParams::default().is_empty());
    }

    #[test]
    fn test_stage_params_serialize_as_plain_map() {
        let params = StageParams::new().with("temperature", 0.5);
        let json = serde_json::to_value(&params).expect("serialize");
        assert_eq!(json, serde_json::json!({"temperature": 0.5}));
    }

    #[test]
    fn test_optimized_prompt_uses_camel_case() {
        let out: OptimizedPromptOutput =
            serde_json::from_str(r##"{"optimizedPrompt":"# Prompt"}"##).expect("deserialize");
        assert_eq!(out.optimized_prompt, "# Prompt");
    }
}
