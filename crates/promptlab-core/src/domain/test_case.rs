//! Test case definitions and per-stage expectations.

use serde::{Deserialize, Serialize};

use crate::domain::digest::canonical_digest;
use crate::domain::error::Result;
use promptlab_stages::StageFile;

fn default_mime_type() -> String {
    "text/plain".to_string()
}

/// A document fed to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputFile {
    /// File name as uploaded.
    pub name: String,

    /// Raw text content.
    pub content: String,

    /// MIME type reported by the uploader.
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

impl InputFile {
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            mime_type: mime_type.into(),
        }
    }

    /// A `text/plain` file.
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(name, content, default_mime_type())
    }

    pub fn to_stage_file(&self) -> StageFile {
        StageFile {
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            content: self.content.clone(),
        }
    }
}

/// Expectations for the summarize stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryCriteria {
    /// Phrases the summary must mention.
    #[serde(default)]
    pub key_points: Vec<String>,

    /// Section elements the summary must contain.
    #[serde(default)]
    pub elements: Vec<String>,
}

fn default_min_count() -> usize {
    1
}

fn default_max_count() -> usize {
    10
}

/// Expectations for the suggestion stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestionCriteria {
    /// Suggestion types that must each appear in at least one suggestion.
    #[serde(default)]
    pub types: Vec<String>,

    /// Minimum acceptable number of suggestions (inclusive).
    #[serde(default = "default_min_count")]
    pub min_count: usize,

    /// Maximum acceptable number of suggestions (inclusive).
    #[serde(default = "default_max_count")]
    pub max_count: usize,
}

impl Default for SuggestionCriteria {
    fn default() -> Self {
        Self {
            types: Vec::new(),
            min_count: default_min_count(),
            max_count: default_max_count(),
        }
    }
}

/// Declared output format of the optimized prompt.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Plain,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Plain => "plain",
            OutputFormat::Json => "json",
        };
        f.write_str(s)
    }
}

fn default_max_length() -> usize {
    4000
}

/// Expectations for the optimize stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptCriteria {
    /// Elements the optimized prompt must contain.
    #[serde(default)]
    pub elements: Vec<String>,

    /// Maximum length in characters (inclusive).
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Required output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for PromptCriteria {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            max_length: default_max_length(),
            format: OutputFormat::default(),
        }
    }
}

/// A fixed pipeline input paired with expected-output criteria for all three
/// stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestCase {
    /// Unique identifier within a validation service.
    pub id: String,

    /// Industry tag passed to every stage.
    pub industry: String,

    /// Input documents, in upload order.
    #[serde(default)]
    pub files: Vec<InputFile>,

    #[serde(default)]
    pub summary: SummaryCriteria,

    #[serde(default)]
    pub suggestions: SuggestionCriteria,

    #[serde(default)]
    pub prompt: PromptCriteria,
}

impl TestCase {
    /// Create a test case with no files and default criteria.
    pub fn new(id: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            industry: industry.into(),
            files: Vec::new(),
            summary: SummaryCriteria::default(),
            suggestions: SuggestionCriteria::default(),
            prompt: PromptCriteria::default(),
        }
    }

    pub fn with_file(mut self, file: InputFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_summary_criteria(mut self, criteria: SummaryCriteria) -> Self {
        self.summary = criteria;
        self
    }

    pub fn with_suggestion_criteria(mut self, criteria: SuggestionCriteria) -> Self {
        self.suggestions = criteria;
        self
    }

    pub fn with_prompt_criteria(mut self, criteria: PromptCriteria) -> Self {
        self.prompt = criteria;
        self
    }

    /// File contents in upload order.
    pub fn file_texts(&self) -> Vec<String> {
        self.files.iter().map(|f| f.content.clone()).collect()
    }

    /// All file contents joined by blank lines.
    pub fn combined_text(&self) -> String {
        self.files
            .iter()
            .map(|f| f.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn stage_files(&self) -> Vec<StageFile> {
        self.files.iter().map(InputFile::to_stage_file).collect()
    }

    /// SHA-256 of the canonical JSON encoding.
    pub fn digest(&self) -> Result<String> {
        canonical_digest(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TestCase {
        TestCase::new("leed-office", "construction")
            .with_file(InputFile::text("brief.md", "Office tower."))
            .with_file(InputFile::text("budget.md", "Budget $4M."))
    }

    #[test]
    fn test_combined_text_joins_files_in_order() {
        assert_eq!(sample().combined_text(), "Office tower.\n\nBudget $4M.");
        assert_eq!(sample().file_texts().len(), 2);
    }

    #[test]
    fn test_digest_is_stable_and_content_sensitive() {
        let a = sample();
        let b = sample();
        assert_eq!(a.digest().expect("digest"), b.digest().expect("digest"));

        let c = sample().with_file(InputFile::text("extra.md", "More."));
        assert_ne!(a.digest().expect("digest"), c.digest().expect("digest"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "id": "minimal",
            "industry": "generic",
            "files": [{"name": "a.txt", "content": "hello"}]
        }"#;
        let tc: TestCase = serde_json::from_str(json).expect("deserialize");
        assert_eq!(tc.files[0].mime_type, "text/plain");
        assert_eq!(tc.suggestions.min_count, 1);
        assert_eq!(tc.suggestions.max_count, 10);
        assert_eq!(tc.prompt.max_length, 4000);
        assert_eq!(tc.prompt.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_output_format_lowercase_names() {
        let f: OutputFormat = serde_json::from_str("\"json\"").expect("deserialize");
        assert_eq!(f, OutputFormat::Json);
        assert_eq!(OutputFormat::Plain.to_string(), "plain");
    }
}
