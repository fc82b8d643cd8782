//! Industry analysis outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Structured insight extracted from free-form project text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectAnalysis {
    pub key_tasks: Vec<String>,
    pub goals: Vec<String>,
    pub requirements: Vec<String>,
    pub constraints: Vec<String>,

    /// Analyzer-specific insight (modality, components, dependency graph, ...).
    #[serde(default)]
    pub insights: serde_json::Map<String, serde_json::Value>,
}

impl ProjectAnalysis {
    /// Builder-style insight insert.
    pub fn with_insight(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.insights.insert(key.into(), value.into());
        self
    }

    pub fn insight(&self, key: &str) -> Option<&serde_json::Value> {
        self.insights.get(key)
    }

    /// Insight value as a string, when it is one.
    pub fn insight_str(&self, key: &str) -> Option<&str> {
        self.insights.get(key).and_then(|v| v.as_str())
    }

    /// Insight value as a list of strings; non-string entries are skipped.
    pub fn insight_list(&self, key: &str) -> Vec<String> {
        self.insights
            .get(key)
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True when no list field and no insight is populated.
    pub fn is_empty(&self) -> bool {
        self.key_tasks.is_empty()
            && self.goals.is_empty()
            && self.requirements.is_empty()
            && self.constraints.is_empty()
            && self.insights.is_empty()
    }
}

/// Quality floors an industry expects from generated output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndustryMetrics {
    pub accuracy: f64,
    pub completeness: f64,
    pub usefulness: f64,
    pub efficiency: f64,

    /// Industry-specific numeric thresholds.
    #[serde(default)]
    pub thresholds: BTreeMap<String, f64>,
}

impl Default for IndustryMetrics {
    fn default() -> Self {
        Self {
            accuracy: 0.8,
            completeness: 0.8,
            usefulness: 0.75,
            efficiency: 0.7,
            thresholds: BTreeMap::new(),
        }
    }
}

impl IndustryMetrics {
    pub fn with_threshold(mut self, name: impl Into<String>, value: f64) -> Self {
        self.thresholds.insert(name.into(), value);
        self
    }
}

/// A project paired with gold-standard outputs, used by `validate_project`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectSample {
    /// Free-form project description.
    pub description: String,
    /// Reference summary written by a domain expert.
    pub gold_summary: String,
    /// Reference prompt written by a domain expert.
    pub gold_prompt: String,
}

/// Outcome of validating an analyzer against a gold-standard project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationMetrics {
    /// Cosine similarity between description and gold summary.
    pub summary_similarity: f64,
    /// Cosine similarity between the analyzer's default template and the gold prompt.
    pub prompt_similarity: f64,
    /// Mean of the two similarities.
    pub gold_standard_similarity: f64,
    /// Estimated fraction of successful generations.
    pub success_rate: f64,
    /// Estimated user rating, 1–5.
    pub user_feedback: f64,
    /// Estimated fraction of authoring time saved.
    pub time_savings: f64,
}
