//! Validation pipeline executor.
//!
//! [`ValidationService`] owns the test-case registry and runs each case
//! through summarize → suggest → optimize, scoring every stage. Stage
//! failures abort the run and surface unchanged; there is no retry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::Instrument;
use uuid::Uuid;

use promptlab_stages::{GenerationStages, PipelineStage, StageParams};

use crate::config::{LabConfig, ScoringConfig, SuiteConfig};
use crate::domain::{LabError, Result, ScoreBreakdown, TestCase, ValidationResult};
use crate::metrics::UsageTracker;
use crate::obs;
use crate::report::ValidationReport;
use crate::scoring::{overall_score, score_prompt, score_suggestions, score_summary};

/// Runs registered test cases against a set of generation stages.
pub struct ValidationService {
    stages: Arc<dyn GenerationStages>,
    test_cases: HashMap<String, Arc<TestCase>>,
    usage: Arc<UsageTracker>,
    scoring: ScoringConfig,
    suite: SuiteConfig,
}

impl std::fmt::Debug for ValidationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationService")
            .field("test_cases", &self.test_case_ids())
            .field("scoring", &self.scoring)
            .field("suite", &self.suite)
            .finish()
    }
}

impl ValidationService {
    pub fn new(stages: Arc<dyn GenerationStages>) -> Self {
        Self {
            stages,
            test_cases: HashMap::new(),
            usage: Arc::new(UsageTracker::new()),
            scoring: ScoringConfig::default(),
            suite: SuiteConfig::default(),
        }
    }

    /// Take scoring and suite settings from `config`.
    pub fn with_config(mut self, config: &LabConfig) -> Self {
        self.scoring = config.scoring.clone();
        self.suite = config.suite.clone();
        self
    }

    pub fn with_usage_tracker(mut self, usage: Arc<UsageTracker>) -> Self {
        self.usage = usage;
        self
    }

    pub fn usage(&self) -> &Arc<UsageTracker> {
        &self.usage
    }

    pub fn pass_threshold(&self) -> f64 {
        self.scoring.pass_threshold
    }

    /// Register a test case. Ids are unique.
    pub fn add_test_case(&mut self, test_case: TestCase) -> Result<()> {
        if self.test_cases.contains_key(&test_case.id) {
            return Err(LabError::DuplicateTestCase(test_case.id));
        }
        self.test_cases
            .insert(test_case.id.clone(), Arc::new(test_case));
        Ok(())
    }

    /// Register every case in `cases`, stopping at the first duplicate.
    pub fn add_test_cases(&mut self, cases: impl IntoIterator<Item = TestCase>) -> Result<()> {
        for case in cases {
            self.add_test_case(case)?;
        }
        Ok(())
    }

    pub fn get_test_case(&self, id: &str) -> Option<&TestCase> {
        self.test_cases.get(id).map(Arc::as_ref)
    }

    /// Registered ids, sorted.
    pub fn test_case_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.test_cases.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }

    /// Run one registered test case through all three stages and score it.
    ///
    /// Unknown ids fail with [`LabError::TestCaseNotFound`] before any stage
    /// is invoked. A stage error aborts the run and is returned as
    /// [`LabError::Upstream`].
    pub async fn run_validation(&self, test_case_id: &str) -> Result<ValidationResult> {
        let test_case = self
            .test_cases
            .get(test_case_id)
            .cloned()
            .ok_or_else(|| LabError::TestCaseNotFound(test_case_id.to_string()))?;

        let run_id = Uuid::new_v4();
        let span = obs::validation_span(&run_id.to_string(), test_case_id);
        let outcome = self.execute(run_id, &test_case).instrument(span).await;

        self.usage.inc_validations();
        if let Err(err) = &outcome {
            self.usage.inc_validation_failures();
            obs::emit_validation_failed(test_case_id, err);
        }
        outcome
    }

    async fn execute(&self, run_id: Uuid, test_case: &TestCase) -> Result<ValidationResult> {
        let started = Instant::now();
        let run_label = run_id.to_string();
        let digest = test_case.digest()?;
        let params = StageParams::default();

        obs::emit_validation_started(
            &run_label,
            &test_case.id,
            &test_case.industry,
            test_case.files.len(),
        );

        let summary = self
            .stages
            .summarize(&test_case.industry, &test_case.stage_files(), &params)
            .await?
            .summary;
        obs::emit_stage_completed(
            &run_label,
            PipelineStage::Summarize.name(),
            summary.chars().count(),
        );

        let suggestions = self
            .stages
            .generate_suggestions(
                &test_case.industry,
                &summary,
                &test_case.combined_text(),
                &params,
            )
            .await?
            .suggestions;
        obs::emit_stage_completed(&run_label, PipelineStage::Suggest.name(), suggestions.len());

        let optimized_prompt = self
            .stages
            .generate_optimized_prompt(
                &test_case.industry,
                &summary,
                &test_case.file_texts(),
                &suggestions,
                &params,
            )
            .await?
            .optimized_prompt;
        obs::emit_stage_completed(
            &run_label,
            PipelineStage::Optimize.name(),
            optimized_prompt.chars().count(),
        );

        let summary_scored = score_summary(&summary, &test_case.summary);
        let suggestions_scored = score_suggestions(&suggestions, &test_case.suggestions);
        let prompt_scored = score_prompt(&optimized_prompt, &test_case.prompt);
        let overall = overall_score(
            summary_scored.score,
            suggestions_scored.score,
            prompt_scored.score,
        );
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        obs::emit_validation_finished(&run_label, overall, duration_ms);

        Ok(ValidationResult {
            run_id,
            test_case_id: test_case.id.clone(),
            test_case_digest: digest,
            created_at: Utc::now(),
            summary_score: summary_scored.score,
            suggestions_score: suggestions_scored.score,
            prompt_score: prompt_scored.score,
            overall_score: overall,
            summary,
            suggestions,
            optimized_prompt,
            breakdown: ScoreBreakdown {
                summary: summary_scored.breakdown,
                suggestions: suggestions_scored.breakdown,
                prompt: prompt_scored.breakdown,
            },
            duration_ms,
            error: None,
        })
    }

    /// Run every registered case with bounded concurrency.
    ///
    /// Failed cases are folded into zero-score results carrying an error
    /// payload. Results are ordered by test case id.
    pub async fn run_suite(&self) -> ValidationReport {
        let started = Instant::now();
        let ids = self.test_case_ids();
        let limit = self.suite.max_concurrent.max(1);

        let permits = Semaphore::new(limit);

        let runs = ids.into_iter().map(|id| {
            let permits = &permits;
            async move {
                let _permit = permits.acquire().await.ok();
                match self.run_validation(&id).await {
                    Ok(result) => result,
                    Err(err) => {
                        let digest = self
                            .test_cases
                            .get(&id)
                            .and_then(|tc| tc.digest().ok())
                            .unwrap_or_default();
                        ValidationResult::failed(id, digest, &err)
                    }
                }
            }
        });
        // join_all keeps input order, so results stay sorted by id.
        let results: Vec<ValidationResult> = join_all(runs).await;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = ValidationReport::from_results(results, self.scoring.pass_threshold)
            .with_duration_ms(duration_ms);
        obs::emit_suite_finished(
            report.summary.total,
            report.summary.passed,
            report.summary.mean_overall_score,
        );
        self.usage.flush();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InputFile, SummaryCriteria};
    use promptlab_stages::fakes::{EchoStages, ScriptedStages};

    fn leed_case() -> TestCase {
        TestCase::new("leed", "construction")
            .with_file(InputFile::text("brief.txt", "Office tower, LEED Gold, 6 months."))
            .with_summary_criteria(SummaryCriteria {
                key_points: vec!["LEED Gold".to_string(), "6-month timeline".to_string()],
                elements: vec![],
            })
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let mut service = ValidationService::new(Arc::new(EchoStages::new()));
        service.add_test_case(leed_case()).expect("first add");
        let err = service.add_test_case(leed_case()).expect_err("duplicate");
        assert!(matches!(err, LabError::DuplicateTestCase(ref id) if id == "leed"));
        assert_eq!(service.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_fails_before_any_stage_call() {
        let stages = Arc::new(EchoStages::new());
        let service = ValidationService::new(stages.clone());

        let err = service.run_validation("nope").await.expect_err("unknown");
        assert!(matches!(err, LabError::TestCaseNotFound(ref id) if id == "nope"));
        assert_eq!(stages.calls().total(), 0);
        assert_eq!(service.usage().validations_run(), 0);
    }

    #[tokio::test]
    async fn test_leed_key_points_fully_covered() {
        let stages = Arc::new(ScriptedStages::new(
            "Project uses LEED Gold certification over a 6-month timeline.",
            vec!["Add a commissioning plan".to_string()],
            "# Prompt\n\nDesign a LEED Gold office.",
        ));
        let mut service = ValidationService::new(stages.clone());
        service.add_test_case(leed_case()).expect("add");

        let result = service.run_validation("leed").await.expect("run");
        assert_eq!(result.breakdown.summary.key_point_coverage, 1.0);
        assert!(result.breakdown.summary.missing_key_points.is_empty());
        assert_eq!(result.summary_score, 1.0);
        assert_eq!(stages.calls().total(), 3);
        assert_eq!(
            stages.seen_customizations(),
            vec![vec!["Add a commissioning plan".to_string()]]
        );
        assert!(stages.seen_params().iter().all(|(_, p)| p.is_empty()));
    }
}
