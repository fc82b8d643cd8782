//! promptlab CLI
//!
//! Runs validation suites against a hosted stage backend and exposes the
//! industry analyzers from the command line.
//!
//! ## Commands
//!
//! - `industries`: List registered analyzers and whether they are enabled
//! - `analyze`: Extract structured insight from project files
//! - `template`: Render an industry prompt template
//! - `gold`: Compare an analyzer against a gold-standard project
//! - `validate`: Run a test-case suite and write reports

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use promptlab_core::analyzers::DEFAULT_TASK;
use promptlab_core::{
    read_test_cases_json, render_report_md, telemetry, write_report_json, AnalyzerRegistry,
    IndustryAnalyzer, LabConfig, ProjectSample, ValidationReport, ValidationService,
};
use promptlab_stages::{HttpStages, HttpStagesConfig};

#[derive(Parser)]
#[command(name = "promptlab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validation and scoring for prompt optimization pipelines", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Path to a promptlab.toml configuration file
    #[arg(short, long, global = true, env = "PROMPTLAB_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered industries
    Industries,

    /// Analyze project files with an industry analyzer
    Analyze {
        /// Industry analyzer to use
        #[arg(short, long, default_value = "generic")]
        industry: String,

        /// Files to analyze, concatenated in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Render the prompt template of an industry
    Template {
        /// Industry analyzer to use
        #[arg(short, long)]
        industry: String,

        /// Task description substituted into the template
        #[arg(short, long, default_value = DEFAULT_TASK)]
        task: String,
    },

    /// Compare an analyzer against a gold-standard project (JSON)
    Gold {
        /// Industry analyzer to use
        #[arg(short, long)]
        industry: String,

        /// Project sample with description, gold_summary and gold_prompt
        sample: PathBuf,
    },

    /// Run a test-case suite against the stage backend
    Validate {
        /// Test cases (JSON array)
        #[arg(long)]
        cases: PathBuf,

        /// Override the stage backend base URL
        #[arg(long)]
        stages_url: Option<String>,

        /// Write the JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Write a markdown report to this path
        #[arg(long)]
        markdown: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.logging.tracing_level()
    };
    telemetry::init_tracing(cli.json || config.logging.json, level);

    match cli.command {
        Commands::Industries => cmd_industries(&config),
        Commands::Analyze { industry, files } => cmd_analyze(&config, &industry, &files),
        Commands::Template { industry, task } => cmd_template(&config, &industry, &task),
        Commands::Gold { industry, sample } => cmd_gold(&config, &industry, &sample),
        Commands::Validate {
            cases,
            stages_url,
            report,
            markdown,
        } => {
            cmd_validate(
                config,
                &cases,
                stages_url,
                report.as_deref(),
                markdown.as_deref(),
            )
            .await
        }
    }
}

/// Configuration from `path` (or defaults), with environment overrides.
fn load_config(path: Option<&Path>) -> Result<LabConfig> {
    let mut config = match path {
        Some(path) => LabConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => LabConfig::default(),
    };
    config.apply_env();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn registry(config: &LabConfig) -> Result<AnalyzerRegistry> {
    let mut registry =
        AnalyzerRegistry::with_builtin_analyzers().context("Failed to build analyzers")?;
    registry.apply_config(&config.industries);
    Ok(registry)
}

/// Concatenate files with `=== path ===` headers so the software analyzer
/// can split them again.
fn read_project_text(files: &[PathBuf]) -> Result<String> {
    let mut text = String::new();
    for path in files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        text.push_str(&format!("=== {} ===\n{}\n\n", path.display(), content));
    }
    Ok(text)
}

fn cmd_industries(config: &LabConfig) -> Result<()> {
    let registry = registry(config)?;
    for (industry, enabled) in registry.status() {
        let display = registry
            .get(&industry)
            .map(|a| a.display_name().to_string())
            .unwrap_or_default();
        let marker = if enabled { "  " } else { "- " };
        let suffix = if enabled { "" } else { " (disabled)" };
        println!("{}{:<22} {}{}", marker, industry, display, suffix);
    }
    Ok(())
}

fn cmd_analyze(config: &LabConfig, industry: &str, files: &[PathBuf]) -> Result<()> {
    let text = read_project_text(files)?;
    let analysis = registry(config)?
        .analyze_project(&text, industry)
        .with_context(|| format!("Analysis failed for industry '{}'", industry))?;
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn cmd_template(config: &LabConfig, industry: &str, task: &str) -> Result<()> {
    let analyzer = registry(config)?.resolve(industry)?;
    println!("{}", analyzer.prompt_template(task));
    Ok(())
}

fn cmd_gold(config: &LabConfig, industry: &str, sample: &Path) -> Result<()> {
    let content = std::fs::read_to_string(sample)
        .with_context(|| format!("Failed to read {:?}", sample))?;
    let sample: ProjectSample =
        serde_json::from_str(&content).context("Failed to parse project sample")?;
    let analyzer = registry(config)?.resolve(industry)?;
    let metrics = analyzer.validate_project(&sample);
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}

async fn cmd_validate(
    mut config: LabConfig,
    cases: &Path,
    stages_url: Option<String>,
    report_path: Option<&Path>,
    markdown_path: Option<&Path>,
) -> Result<()> {
    if let Some(url) = stages_url {
        config.stages.base_url = url;
    }

    let stages = HttpStages::new(HttpStagesConfig {
        base_url: config.stages.base_url.clone(),
        timeout: config.stages.timeout(),
    })
    .context("Failed to build stage client")?;

    let mut service = ValidationService::new(Arc::new(stages)).with_config(&config);
    service.add_test_cases(read_test_cases_json(cases)?)?;
    info!(
        cases = service.len(),
        stages = %config.stages.base_url,
        "running validation suite"
    );

    let report = service.run_suite().await;
    print_summary(&report);

    if let Some(path) = report_path {
        write_report_json(path, &report)?;
        println!("Report written to {:?}", path);
    }
    if let Some(path) = markdown_path {
        std::fs::write(path, render_report_md(&report))
            .with_context(|| format!("Failed to write {:?}", path))?;
        println!("Markdown report written to {:?}", path);
    }

    if report.all_passed() {
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} test cases failed",
            report.summary.failed,
            report.summary.total
        )
    }
}

fn print_summary(report: &ValidationReport) {
    for result in &report.results {
        let status = match (&result.error, result.passed(report.pass_threshold)) {
            (Some(_), _) => "ERROR",
            (None, true) => "PASS",
            (None, false) => "FAIL",
        };
        println!(
            "  [{}] {} ({:.3})",
            status, result.test_case_id, result.overall_score
        );
        if let Some(err) = &result.error {
            println!("         {}: {}", err.kind, err.message);
        }
    }
    println!(
        "{}/{} passed, mean overall score {:.3} (threshold {:.2}, {}ms)",
        report.summary.passed,
        report.summary.total,
        report.summary.mean_overall_score,
        report.pass_threshold,
        report.duration_ms
    );
}
