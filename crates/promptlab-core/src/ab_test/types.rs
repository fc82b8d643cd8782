//! A/B test data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use promptlab_stages::{PipelineStage, StageFile, StageParams};

use crate::domain::InputFile;

/// One arm of an A/B test: a named set of per-stage parameter overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ABVariant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub summarize: StageParams,
    #[serde(default)]
    pub suggest: StageParams,
    #[serde(default)]
    pub optimize: StageParams,
}

impl ABVariant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_stage_params(mut self, stage: PipelineStage, params: StageParams) -> Self {
        match stage {
            PipelineStage::Summarize => self.summarize = params,
            PipelineStage::Suggest => self.suggest = params,
            PipelineStage::Optimize => self.optimize = params,
        }
        self
    }

    pub fn params_for(&self, stage: PipelineStage) -> &StageParams {
        match stage {
            PipelineStage::Summarize => &self.summarize,
            PipelineStage::Suggest => &self.suggest,
            PipelineStage::Optimize => &self.optimize,
        }
    }
}

/// A named test owning an ordered list of variants.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ABTestConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub variants: Vec<ABVariant>,
}

impl ABTestConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_variant(mut self, variant: ABVariant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn variant(&self, id: &str) -> Option<&ABVariant> {
        self.variants.iter().find(|v| v.id == id)
    }
}

/// The project a user submits for an A/B run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ABTestInput {
    pub industry: String,
    pub files: Vec<InputFile>,
}

impl ABTestInput {
    pub fn new(industry: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: InputFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn stage_files(&self) -> Vec<StageFile> {
        self.files.iter().map(InputFile::to_stage_file).collect()
    }

    pub fn file_texts(&self) -> Vec<String> {
        self.files.iter().map(|f| f.content.clone()).collect()
    }

    pub fn combined_text(&self) -> String {
        self.file_texts().join("\n\n")
    }
}

/// Output-shape metrics of one run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunMetrics {
    pub summary_chars: usize,
    pub suggestion_count: usize,
    pub prompt_chars: usize,
    pub duration_ms: u64,
}

/// A user's rating of a run, 1 to 5.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFeedback {
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl UserFeedback {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    pub fn new(rating: u8) -> Self {
        Self {
            rating,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        (Self::MIN_RATING..=Self::MAX_RATING).contains(&self.rating)
    }
}

/// One recorded A/B run. The variant id is fixed at record time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ABTestResult {
    pub result_id: Uuid,
    pub test_id: String,
    pub user_id: String,
    pub variant_id: String,
    pub created_at: DateTime<Utc>,
    pub summary: String,
    pub suggestions: Vec<String>,
    pub optimized_prompt: String,
    pub metrics: RunMetrics,
    pub feedback: Option<UserFeedback>,
}

/// Mean metrics and feedback over a set of results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunAggregate {
    pub runs: usize,
    pub mean_summary_chars: f64,
    pub mean_suggestion_count: f64,
    pub mean_prompt_chars: f64,
    pub mean_duration_ms: f64,
    pub feedback_count: usize,
    /// `None` when no result in the set has feedback.
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantSummary {
    pub variant_id: String,
    pub variant_name: String,
    pub stats: RunAggregate,
}

/// Per-variant and overall aggregation of an A/B test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ABTestReport {
    pub test_id: String,
    pub name: String,
    /// In the order the variants were configured.
    pub variants: Vec<VariantSummary>,
    pub overall: RunAggregate,
}

impl ABTestReport {
    pub fn variant(&self, id: &str) -> Option<&VariantSummary> {
        self.variants.iter().find(|v| v.variant_id == id)
    }
}
