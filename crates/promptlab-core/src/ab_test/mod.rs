//! A/B test harness.
//!
//! Runs the same project input through parameterized variants of the
//! three-stage pipeline and aggregates output-shape metrics and user feedback
//! per variant. Variant assignment is uniform random on every call; a user
//! who runs twice may land on different variants. Each recorded result keeps
//! the variant it actually ran, and aggregation always groups by that.

mod types;

pub use types::{
    ABTestConfig, ABTestInput, ABTestReport, ABTestResult, ABVariant, RunAggregate, RunMetrics,
    UserFeedback, VariantSummary,
};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use promptlab_stages::{GenerationStages, PipelineStage};

use crate::domain::{LabError, Result};
use crate::metrics::UsageTracker;
use crate::obs;
use crate::scoring::mean;

/// Stage outputs of one variant run.
struct VariantOutput {
    summary: String,
    suggestions: Vec<String>,
    optimized_prompt: String,
}

async fn run_variant(
    stages: &dyn GenerationStages,
    variant: &ABVariant,
    input: &ABTestInput,
) -> Result<VariantOutput> {
    let summary = stages
        .summarize(
            &input.industry,
            &input.stage_files(),
            variant.params_for(PipelineStage::Summarize),
        )
        .await?
        .summary;

    let suggestions = stages
        .generate_suggestions(
            &input.industry,
            &summary,
            &input.combined_text(),
            variant.params_for(PipelineStage::Suggest),
        )
        .await?
        .suggestions;

    let optimized_prompt = stages
        .generate_optimized_prompt(
            &input.industry,
            &summary,
            &input.file_texts(),
            &suggestions,
            variant.params_for(PipelineStage::Optimize),
        )
        .await?
        .optimized_prompt;

    Ok(VariantOutput {
        summary,
        suggestions,
        optimized_prompt,
    })
}

fn aggregate(results: &[&ABTestResult]) -> RunAggregate {
    let ratings: Vec<f64> = results
        .iter()
        .filter_map(|r| r.feedback.as_ref())
        .map(|f| f64::from(f.rating))
        .collect();

    RunAggregate {
        runs: results.len(),
        mean_summary_chars: mean(results.iter().map(|r| r.metrics.summary_chars as f64)),
        mean_suggestion_count: mean(results.iter().map(|r| r.metrics.suggestion_count as f64)),
        mean_prompt_chars: mean(results.iter().map(|r| r.metrics.prompt_chars as f64)),
        mean_duration_ms: mean(results.iter().map(|r| r.metrics.duration_ms as f64)),
        feedback_count: ratings.len(),
        avg_rating: if ratings.is_empty() {
            None
        } else {
            Some(mean(ratings))
        },
    }
}

/// Owns A/B test definitions and their recorded results.
pub struct ABTestHarness {
    stages: Arc<dyn GenerationStages>,
    tests: HashMap<String, ABTestConfig>,
    results: HashMap<String, Vec<ABTestResult>>,
    rng: fastrand::Rng,
    usage: Arc<UsageTracker>,
}

impl std::fmt::Debug for ABTestHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ABTestHarness")
            .field("tests", &self.tests.keys().collect::<Vec<_>>())
            .field("results", &self.results.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl ABTestHarness {
    pub fn new(stages: Arc<dyn GenerationStages>) -> Self {
        Self {
            stages,
            tests: HashMap::new(),
            results: HashMap::new(),
            rng: fastrand::Rng::new(),
            usage: Arc::new(UsageTracker::new()),
        }
    }

    /// Seed variant assignment for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    pub fn with_usage_tracker(mut self, usage: Arc<UsageTracker>) -> Self {
        self.usage = usage;
        self
    }

    pub fn usage(&self) -> &Arc<UsageTracker> {
        &self.usage
    }

    /// Store a test definition. It needs a fresh id and at least one variant;
    /// variant ids must be non-blank and unique within the test.
    pub fn create_test(&mut self, config: ABTestConfig) -> Result<()> {
        if config.variants.is_empty() {
            return Err(LabError::NoVariants(config.id));
        }
        let mut seen = HashSet::new();
        for variant in &config.variants {
            if variant.id.trim().is_empty() || !seen.insert(variant.id.as_str()) {
                return Err(LabError::InvalidVariantId {
                    test_id: config.id.clone(),
                    variant_id: variant.id.clone(),
                });
            }
        }
        if self.tests.contains_key(&config.id) {
            return Err(LabError::DuplicateAbTest(config.id));
        }
        tracing::debug!(
            test_id = %config.id,
            variants = config.variants.len(),
            "a/b test created"
        );
        self.results.insert(config.id.clone(), Vec::new());
        self.tests.insert(config.id.clone(), config);
        Ok(())
    }

    pub fn get_test(&self, test_id: &str) -> Option<&ABTestConfig> {
        self.tests.get(test_id)
    }

    /// Recorded results for a test, in run order.
    pub fn results(&self, test_id: &str) -> &[ABTestResult] {
        self.results.get(test_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn test(&self, test_id: &str) -> Result<&ABTestConfig> {
        self.tests
            .get(test_id)
            .ok_or_else(|| LabError::AbTestNotFound(test_id.to_string()))
    }

    /// Pick a variant uniformly at random. Not sticky per user.
    pub fn assign_variant(&mut self, test_id: &str, user_id: &str) -> Result<ABVariant> {
        let count = self.test(test_id)?.variants.len();
        let index = self.rng.usize(..count);
        let variant = self.test(test_id)?.variants[index].clone();
        tracing::debug!(
            test_id = %test_id,
            user_id = %user_id,
            variant_id = %variant.id,
            "variant assigned"
        );
        Ok(variant)
    }

    /// Assign a variant, run the pipeline with its overrides and record the
    /// result. Stage failures propagate and nothing is recorded.
    pub async fn run_test(
        &mut self,
        test_id: &str,
        user_id: &str,
        input: &ABTestInput,
    ) -> Result<ABTestResult> {
        let variant = self.assign_variant(test_id, user_id)?;
        let started = Instant::now();

        let output = run_variant(self.stages.as_ref(), &variant, input)
            .instrument(obs::ab_run_span(test_id, user_id))
            .await?;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let result = ABTestResult {
            result_id: Uuid::new_v4(),
            test_id: test_id.to_string(),
            user_id: user_id.to_string(),
            variant_id: variant.id.clone(),
            created_at: Utc::now(),
            metrics: RunMetrics {
                summary_chars: output.summary.chars().count(),
                suggestion_count: output.suggestions.len(),
                prompt_chars: output.optimized_prompt.chars().count(),
                duration_ms,
            },
            summary: output.summary,
            suggestions: output.suggestions,
            optimized_prompt: output.optimized_prompt,
            feedback: None,
        };

        self.results
            .entry(test_id.to_string())
            .or_default()
            .push(result.clone());
        self.usage.inc_ab_runs();
        obs::emit_ab_run_recorded(test_id, user_id, &variant.id, duration_ms);
        Ok(result)
    }

    /// Attach feedback to the user's most recent result in the test.
    pub fn add_feedback(
        &mut self,
        test_id: &str,
        user_id: &str,
        feedback: UserFeedback,
    ) -> Result<()> {
        self.test(test_id)?;
        if !feedback.is_valid() {
            return Err(LabError::InvalidFeedback(format!(
                "rating must be between {} and {}, got {}",
                UserFeedback::MIN_RATING,
                UserFeedback::MAX_RATING,
                feedback.rating
            )));
        }

        let rating = feedback.rating;
        let result = self
            .results
            .get_mut(test_id)
            .and_then(|results| results.iter_mut().rev().find(|r| r.user_id == user_id))
            .ok_or_else(|| LabError::NoResultForUser {
                test_id: test_id.to_string(),
                user_id: user_id.to_string(),
            })?;
        result.feedback = Some(feedback);

        self.usage.inc_feedback();
        obs::emit_feedback_recorded(test_id, user_id, rating);
        Ok(())
    }

    /// Aggregate every recorded result per variant and overall.
    pub fn get_test_results(&self, test_id: &str) -> Result<ABTestReport> {
        let config = self.test(test_id)?;
        let recorded: Vec<&ABTestResult> = self.results(test_id).iter().collect();

        let variants = config
            .variants
            .iter()
            .map(|variant| {
                let subset: Vec<&ABTestResult> = recorded
                    .iter()
                    .copied()
                    .filter(|r| r.variant_id == variant.id)
                    .collect();
                VariantSummary {
                    variant_id: variant.id.clone(),
                    variant_name: variant.name.clone(),
                    stats: aggregate(&subset),
                }
            })
            .collect();

        Ok(ABTestReport {
            test_id: config.id.clone(),
            name: config.name.clone(),
            variants,
            overall: aggregate(&recorded),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, InputFile};
    use promptlab_stages::fakes::{FailingStages, ScriptedStages};
    use promptlab_stages::StageParams;

    fn two_arm_test() -> ABTestConfig {
        let casual = ABVariant::new("b", "Casual").with_stage_params(
            PipelineStage::Optimize,
            StageParams::new().with("tone", "casual"),
        );
        ABTestConfig::new("t1", "Prompt tone")
            .with_variant(ABVariant::new("a", "Formal"))
            .with_variant(casual)
    }

    fn input() -> ABTestInput {
        ABTestInput::new("software_development")
            .with_file(InputFile::text("readme.md", "Build a CLI."))
    }

    fn scripted() -> Arc<ScriptedStages> {
        Arc::new(ScriptedStages::new(
            "A CLI tool.",
            vec!["Add tests".to_string(), "Add docs".to_string()],
            "# Prompt",
        ))
    }

    #[test]
    fn test_create_test_validation() {
        let mut harness = ABTestHarness::new(scripted());
        let err = harness
            .create_test(ABTestConfig::new("empty", "No arms"))
            .expect_err("no variants");
        assert!(matches!(err, LabError::NoVariants(_)));

        harness.create_test(two_arm_test()).expect("create");
        let err = harness.create_test(two_arm_test()).expect_err("duplicate");
        assert!(matches!(err, LabError::DuplicateAbTest(_)));
    }

    #[test]
    fn test_create_test_rejects_repeated_or_blank_variant_ids() {
        let mut harness = ABTestHarness::new(scripted());
        let repeated = ABTestConfig::new("twice", "Same arm twice")
            .with_variant(ABVariant::new("a", "Formal"))
            .with_variant(ABVariant::new("a", "Formal again"));
        let err = harness.create_test(repeated).expect_err("repeated id");
        assert!(matches!(
            &err,
            LabError::InvalidVariantId { test_id, variant_id } if test_id == "twice" && variant_id == "a"
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let blank = ABTestConfig::new("blank", "Unnamed arm")
            .with_variant(ABVariant::new("  ", "Nameless"));
        let err = harness.create_test(blank).expect_err("blank id");
        assert!(matches!(err, LabError::InvalidVariantId { .. }));

        assert!(harness.get_test("twice").is_none());
        assert!(harness.get_test("blank").is_none());
    }

    #[test]
    fn test_assign_unknown_test() {
        let mut harness = ABTestHarness::new(scripted());
        let err = harness.assign_variant("nope", "u1").expect_err("unknown");
        assert!(matches!(err, LabError::AbTestNotFound(_)));
    }

    #[test]
    fn test_seeded_assignment_is_reproducible() {
        let picks = |seed| {
            let mut harness = ABTestHarness::new(scripted()).with_seed(seed);
            harness.create_test(two_arm_test()).expect("create");
            (0..20)
                .map(|_| harness.assign_variant("t1", "u1").expect("assign").id)
                .collect::<Vec<_>>()
        };
        let first = picks(7);
        assert_eq!(first, picks(7));
        assert!(first.iter().all(|id| id == "a" || id == "b"));
    }

    #[tokio::test]
    async fn test_run_records_metrics_and_applies_overrides() {
        let stages = scripted();
        let mut harness = ABTestHarness::new(stages.clone()).with_seed(1);
        harness.create_test(two_arm_test()).expect("create");

        let result = harness.run_test("t1", "u1", &input()).await.expect("run");
        assert_eq!(result.metrics.summary_chars, "A CLI tool.".len());
        assert_eq!(result.metrics.suggestion_count, 2);
        assert_eq!(result.metrics.prompt_chars, "# Prompt".len());
        assert_eq!(harness.results("t1").len(), 1);

        let optimize_params: Vec<StageParams> = stages
            .seen_params()
            .into_iter()
            .filter(|(stage, _)| *stage == PipelineStage::Optimize)
            .map(|(_, p)| p)
            .collect();
        let expected = harness
            .get_test("t1")
            .and_then(|t| t.variant(&result.variant_id))
            .map(|v| v.optimize.clone())
            .expect("variant");
        assert_eq!(optimize_params, vec![expected]);
    }

    #[tokio::test]
    async fn test_stage_failure_records_nothing() {
        let stages = Arc::new(FailingStages::new(PipelineStage::Suggest, "quota exceeded"));
        let mut harness = ABTestHarness::new(stages);
        harness.create_test(two_arm_test()).expect("create");

        let err = harness
            .run_test("t1", "u1", &input())
            .await
            .expect_err("stage failure");
        assert_eq!(err.to_string(), "quota exceeded");
        assert!(harness.results("t1").is_empty());
    }

    #[tokio::test]
    async fn test_feedback_rules() {
        let mut harness = ABTestHarness::new(scripted()).with_seed(3);
        harness.create_test(two_arm_test()).expect("create");

        let err = harness
            .add_feedback("t1", "u1", UserFeedback::new(4))
            .expect_err("no result yet");
        assert!(matches!(err, LabError::NoResultForUser { .. }));

        harness.run_test("t1", "u1", &input()).await.expect("run 1");
        let second = harness.run_test("t1", "u1", &input()).await.expect("run 2");

        let err = harness
            .add_feedback("t1", "u1", UserFeedback::new(0))
            .expect_err("rating too low");
        assert!(matches!(err, LabError::InvalidFeedback(_)));
        let err = harness
            .add_feedback("t1", "u1", UserFeedback::new(6))
            .expect_err("rating too high");
        assert!(matches!(err, LabError::InvalidFeedback(_)));

        harness
            .add_feedback("t1", "u1", UserFeedback::new(5).with_comment("great"))
            .expect("feedback");
        let results = harness.results("t1");
        assert!(results[0].feedback.is_none());
        assert_eq!(results[1].result_id, second.result_id);
        assert_eq!(results[1].feedback.as_ref().map(|f| f.rating), Some(5));
    }
}
