//! In-memory fakes for the stage contract (testing only)
//!
//! Provides `ScriptedStages`, `EchoStages`, and `FailingStages` that satisfy
//! the [`GenerationStages`] contract without any network access. Every fake
//! counts its calls so tests can assert which stages ran.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StageError;
use crate::stage_traits::*;

// ---------------------------------------------------------------------------
// Call accounting
// ---------------------------------------------------------------------------

/// Per-stage call counters shared by all fakes.
#[derive(Debug, Default)]
pub struct CallCounts {
    summarize: AtomicUsize,
    suggest: AtomicUsize,
    optimize: AtomicUsize,
}

impl CallCounts {
    fn hit(&self, stage: PipelineStage) {
        self.counter(stage).fetch_add(1, Ordering::SeqCst);
    }

    fn counter(&self, stage: PipelineStage) -> &AtomicUsize {
        match stage {
            PipelineStage::Summarize => &self.summarize,
            PipelineStage::Suggest => &self.suggest,
            PipelineStage::Optimize => &self.optimize,
        }
    }

    /// Number of calls made to `stage`.
    pub fn get(&self, stage: PipelineStage) -> usize {
        self.counter(stage).load(Ordering::SeqCst)
    }

    /// Calls across all stages.
    pub fn total(&self) -> usize {
        PipelineStage::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

// ---------------------------------------------------------------------------
// ScriptedStages
// ---------------------------------------------------------------------------

/// Returns the same canned output on every call.
///
/// Also records the parameters each stage received so tests can check that
/// overrides were applied.
#[derive(Debug, Default)]
pub struct ScriptedStages {
    summary: String,
    suggestions: Vec<String>,
    optimized_prompt: String,
    calls: CallCounts,
    seen_params: Mutex<Vec<(PipelineStage, StageParams)>>,
    seen_customizations: Mutex<Vec<Vec<String>>>,
}

impl ScriptedStages {
    pub fn new(
        summary: impl Into<String>,
        suggestions: Vec<String>,
        optimized_prompt: impl Into<String>,
    ) -> Self {
        Self {
            summary: summary.into(),
            suggestions,
            optimized_prompt: optimized_prompt.into(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    /// Parameters received, in call order.
    pub fn seen_params(&self) -> Vec<(PipelineStage, StageParams)> {
        self.seen_params.lock().unwrap().clone()
    }

    /// Customizations handed to the optimize stage, in call order.
    pub fn seen_customizations(&self) -> Vec<Vec<String>> {
        self.seen_customizations.lock().unwrap().clone()
    }

    fn record(&self, stage: PipelineStage, params: &StageParams) {
        self.calls.hit(stage);
        self.seen_params
            .lock()
            .unwrap()
            .push((stage, params.clone()));
    }
}

#[async_trait]
impl GenerationStages for ScriptedStages {
    async fn summarize(
        &self,
        _industry: &str,
        _files: &[StageFile],
        params: &StageParams,
    ) -> StageResult<SummaryOutput> {
        self.record(PipelineStage::Summarize, params);
        Ok(SummaryOutput {
            summary: self.summary.clone(),
        })
    }

    async fn generate_suggestions(
        &self,
        _industry: &str,
        _summary: &str,
        _combined_text: &str,
        params: &StageParams,
    ) -> StageResult<SuggestionsOutput> {
        self.record(PipelineStage::Suggest, params);
        Ok(SuggestionsOutput {
            suggestions: self.suggestions.clone(),
        })
    }

    async fn generate_optimized_prompt(
        &self,
        _industry: &str,
        _summary: &str,
        _file_texts: &[String],
        customizations: &[String],
        params: &StageParams,
    ) -> StageResult<OptimizedPromptOutput> {
        self.record(PipelineStage::Optimize, params);
        self.seen_customizations
            .lock()
            .unwrap()
            .push(customizations.to_vec());
        Ok(OptimizedPromptOutput {
            optimized_prompt: self.optimized_prompt.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// EchoStages
// ---------------------------------------------------------------------------

/// Derives every output from its input.
///
/// - summary: the non-empty file contents joined by a space
/// - suggestions: one `Add <line>` entry per non-empty summary line
/// - prompt: a markdown heading followed by the summary and customizations
///
/// Empty documents therefore yield an empty summary and no suggestions.
#[derive(Debug, Default)]
pub struct EchoStages {
    calls: CallCounts,
}

impl EchoStages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }
}

#[async_trait]
impl GenerationStages for EchoStages {
    async fn summarize(
        &self,
        _industry: &str,
        files: &[StageFile],
        _params: &StageParams,
    ) -> StageResult<SummaryOutput> {
        self.calls.hit(PipelineStage::Summarize);
        let summary = files
            .iter()
            .map(|f| f.content.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(SummaryOutput { summary })
    }

    async fn generate_suggestions(
        &self,
        _industry: &str,
        summary: &str,
        _combined_text: &str,
        _params: &StageParams,
    ) -> StageResult<SuggestionsOutput> {
        self.calls.hit(PipelineStage::Suggest);
        let suggestions = summary
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| format!("Add {l}"))
            .collect();
        Ok(SuggestionsOutput { suggestions })
    }

    async fn generate_optimized_prompt(
        &self,
        industry: &str,
        summary: &str,
        _file_texts: &[String],
        customizations: &[String],
        _params: &StageParams,
    ) -> StageResult<OptimizedPromptOutput> {
        self.calls.hit(PipelineStage::Optimize);
        let mut prompt = format!("# {industry} prompt\n\n{summary}\n");
        for c in customizations {
            prompt.push_str(&format!("- {c}\n"));
        }
        Ok(OptimizedPromptOutput {
            optimized_prompt: prompt,
        })
    }
}

// ---------------------------------------------------------------------------
// FailingStages
// ---------------------------------------------------------------------------

/// Succeeds with placeholder output until `fail_at`, which returns
/// `StageError::Scripted(message)`.
#[derive(Debug)]
pub struct FailingStages {
    fail_at: PipelineStage,
    message: String,
    calls: CallCounts,
}

impl FailingStages {
    pub fn new(fail_at: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            fail_at,
            message: message.into(),
            calls: CallCounts::default(),
        }
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    fn check(&self, stage: PipelineStage) -> StageResult<()> {
        self.calls.hit(stage);
        if stage == self.fail_at {
            Err(StageError::Scripted(self.message.clone()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl GenerationStages for FailingStages {
    async fn summarize(
        &self,
        _industry: &str,
        _files: &[StageFile],
        _params: &StageParams,
    ) -> StageResult<SummaryOutput> {
        self.check(PipelineStage::Summarize)?;
        Ok(SummaryOutput {
            summary: "summary".to_string(),
        })
    }

    async fn generate_suggestions(
        &self,
        _industry: &str,
        _summary: &str,
        _combined_text: &str,
        _params: &StageParams,
    ) -> StageResult<SuggestionsOutput> {
        self.check(PipelineStage::Suggest)?;
        Ok(SuggestionsOutput {
            suggestions: vec!["suggestion".to_string()],
        })
    }

    async fn generate_optimized_prompt(
        &self,
        _industry: &str,
        _summary: &str,
        _file_texts: &[String],
        _customizations: &[String],
        _params: &StageParams,
    ) -> StageResult<OptimizedPromptOutput> {
        self.check(PipelineStage::Optimize)?;
        Ok(OptimizedPromptOutput {
            optimized_prompt: "prompt".to_string(),
        })
    }
}
