use std::sync::Arc;

use promptlab_core::{
    ABTestConfig, ABTestHarness, ABTestInput, ABVariant, ErrorKind, InputFile, LabError,
    UserFeedback,
};
use promptlab_stages::fakes::{EchoStages, FailingStages, ScriptedStages};
use promptlab_stages::{PipelineStage, StageParams};

fn two_arm_test() -> ABTestConfig {
    ABTestConfig::new("tone", "Formal vs casual tone")
        .with_description("Compare optimize-stage temperature settings")
        .with_variant(ABVariant::new("formal", "Formal").with_stage_params(
            PipelineStage::Optimize,
            StageParams::new().with("temperature", 0.2),
        ))
        .with_variant(ABVariant::new("casual", "Casual").with_stage_params(
            PipelineStage::Optimize,
            StageParams::new().with("temperature", 0.9),
        ))
}

fn input_for(user: usize) -> ABTestInput {
    let mut input = ABTestInput::new("software_development");
    for line in 0..=(user % 3) {
        input = input.with_file(InputFile::text(
            format!("notes-{line}.txt"),
            format!("Requirement {line} for user {user}"),
        ));
    }
    input
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn results_partition_by_variant_and_overall_spans_all_runs() {
    let mut harness = ABTestHarness::new(Arc::new(EchoStages::new())).with_seed(7);
    harness.create_test(two_arm_test()).expect("create");

    for user in 0..20 {
        harness
            .run_test("tone", &format!("user-{user}"), &input_for(user))
            .await
            .expect("run");
    }

    let report = harness.get_test_results("tone").expect("report");
    let recorded = harness.results("tone");

    let ids: Vec<_> = report.variants.iter().map(|v| v.variant_id.as_str()).collect();
    assert_eq!(ids, vec!["formal", "casual"]);
    assert_eq!(report.overall.runs, 20);
    assert_eq!(
        report.variants.iter().map(|v| v.stats.runs).sum::<usize>(),
        20
    );

    for summary in &report.variants {
        let subset: Vec<_> = recorded
            .iter()
            .filter(|r| r.variant_id == summary.variant_id)
            .collect();
        assert_eq!(summary.stats.runs, subset.len());
        if !subset.is_empty() {
            let expected = subset
                .iter()
                .map(|r| r.metrics.summary_chars as f64)
                .sum::<f64>()
                / subset.len() as f64;
            assert!(close(summary.stats.mean_summary_chars, expected));
        }
    }

    let expected_overall = recorded
        .iter()
        .map(|r| r.metrics.prompt_chars as f64)
        .sum::<f64>()
        / recorded.len() as f64;
    assert!(close(report.overall.mean_prompt_chars, expected_overall));
    assert_eq!(report.overall.avg_rating, None);
    assert_eq!(harness.usage().ab_runs(), 20);
}

#[tokio::test]
async fn each_run_uses_the_assigned_variant_parameters() {
    let stages = Arc::new(ScriptedStages::new("summary", vec!["tip".to_string()], "# prompt"));
    let mut harness = ABTestHarness::new(stages.clone()).with_seed(11);
    harness.create_test(two_arm_test()).expect("create");

    let result = harness
        .run_test("tone", "alice", &input_for(0))
        .await
        .expect("run");

    let variant = harness
        .get_test("tone")
        .and_then(|t| t.variant(&result.variant_id))
        .cloned()
        .expect("recorded variant exists");
    let optimize_params: Vec<_> = stages
        .seen_params()
        .into_iter()
        .filter(|(stage, _)| *stage == PipelineStage::Optimize)
        .map(|(_, params)| params)
        .collect();
    assert_eq!(optimize_params, vec![variant.optimize.clone()]);
    assert_eq!(result.metrics.suggestion_count, 1);
    assert_eq!(result.metrics.prompt_chars, "# prompt".len());
}

#[tokio::test]
async fn feedback_is_averaged_per_variant_and_overall() {
    let mut harness = ABTestHarness::new(Arc::new(EchoStages::new())).with_seed(3);
    harness.create_test(two_arm_test()).expect("create");

    for user in 0..10 {
        let user_id = format!("user-{user}");
        harness
            .run_test("tone", &user_id, &input_for(user))
            .await
            .expect("run");
        let rating = u8::try_from(user % 5 + 1).expect("small rating");
        harness
            .add_feedback("tone", &user_id, UserFeedback::new(rating))
            .expect("feedback");
    }

    let report = harness.get_test_results("tone").expect("report");
    assert_eq!(report.overall.feedback_count, 10);
    assert_eq!(report.overall.avg_rating, Some(3.0));

    for summary in &report.variants {
        let ratings: Vec<f64> = harness
            .results("tone")
            .iter()
            .filter(|r| r.variant_id == summary.variant_id)
            .filter_map(|r| r.feedback.as_ref())
            .map(|f| f64::from(f.rating))
            .collect();
        match summary.stats.avg_rating {
            Some(avg) => {
                assert!(close(avg, ratings.iter().sum::<f64>() / ratings.len() as f64))
            }
            None => assert!(ratings.is_empty()),
        }
    }
    assert_eq!(harness.usage().feedback_recorded(), 10);
}

#[tokio::test]
async fn feedback_targets_most_recent_run_of_the_user() {
    let mut harness = ABTestHarness::new(Arc::new(EchoStages::new()));
    harness.create_test(two_arm_test()).expect("create");

    harness
        .run_test("tone", "bob", &input_for(1))
        .await
        .expect("first run");
    harness
        .run_test("tone", "bob", &input_for(2))
        .await
        .expect("second run");

    harness
        .add_feedback("tone", "bob", UserFeedback::new(4).with_comment("clearer"))
        .expect("feedback");

    let results = harness.results("tone");
    assert!(results[0].feedback.is_none());
    assert_eq!(
        results[1].feedback.as_ref().map(|f| f.rating),
        Some(4)
    );
}

#[tokio::test]
async fn feedback_errors() {
    let mut harness = ABTestHarness::new(Arc::new(EchoStages::new()));
    harness.create_test(two_arm_test()).expect("create");

    let err = harness
        .add_feedback("missing", "carol", UserFeedback::new(3))
        .expect_err("unknown test");
    assert!(matches!(err, LabError::AbTestNotFound(_)));

    let err = harness
        .add_feedback("tone", "carol", UserFeedback::new(0))
        .expect_err("rating out of range");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = harness
        .add_feedback("tone", "carol", UserFeedback::new(5))
        .expect_err("no run yet");
    assert!(matches!(err, LabError::NoResultForUser { ref user_id, .. } if user_id == "carol"));
}

#[tokio::test]
async fn failed_run_leaves_results_untouched() {
    let mut harness = ABTestHarness::new(Arc::new(FailingStages::new(
        PipelineStage::Summarize,
        "quota exceeded",
    )));
    harness.create_test(two_arm_test()).expect("create");

    let err = harness
        .run_test("tone", "dave", &input_for(0))
        .await
        .expect_err("stage failure");

    assert_eq!(err.to_string(), "quota exceeded");
    assert!(harness.results("tone").is_empty());
    let report = harness.get_test_results("tone").expect("report");
    assert_eq!(report.overall.runs, 0);
    assert_eq!(report.overall.mean_duration_ms, 0.0);
}

#[tokio::test]
async fn unknown_test_cannot_run_or_report() {
    let mut harness = ABTestHarness::new(Arc::new(EchoStages::new()));

    let err = harness
        .run_test("nope", "erin", &input_for(0))
        .await
        .expect_err("unknown test");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(harness.get_test_results("nope").is_err());
}
