//! promptlab core library
//!
//! Validation and scoring engine for the summarize → suggest → optimize
//! prompt pipeline, the industry analyzer plugin system, and the A/B test
//! harness.

pub mod ab_test;
pub mod analyzers;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod obs;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod similarity;
pub mod telemetry;

pub use ab_test::{
    ABTestConfig, ABTestHarness, ABTestInput, ABTestReport, ABTestResult, ABVariant, RunAggregate,
    RunMetrics, UserFeedback, VariantSummary,
};

pub use analyzers::{
    render_template, AnalyzerError, AnalyzerRegistry, ConstructionAnalyzer, ExtractionRules,
    GenericAnalyzer, IndustryAnalyzer, MedicalImagingAnalyzer, PatternRule, RuleTable,
    SoftwareAnalyzer,
};

pub use config::{IndustriesConfig, IndustrySettings, LabConfig};

pub use domain::{
    ErrorKind, ErrorPayload, IndustryMetrics, InputFile, LabError, OutputFormat, ProjectAnalysis,
    ProjectSample, PromptCriteria, Result, ScoreBreakdown, SuggestionCriteria, SummaryCriteria,
    TestCase, ValidationMetrics, ValidationResult,
};

pub use metrics::UsageTracker;
pub use pipeline::ValidationService;
pub use report::{
    read_test_cases_json, render_report_md, write_report_json, SuiteSummary, ValidationReport,
};
pub use scoring::{overall_score, score_prompt, score_suggestions, score_summary, Scored};
pub use similarity::cosine_similarity;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
