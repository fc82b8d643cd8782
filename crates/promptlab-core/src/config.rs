//! Configuration for promptlab.
//!
//! Loaded from a TOML file with `[scoring]`, `[suite]`, `[stages]`,
//! `[logging]` and `[industries.<name>]` sections; every section and field is
//! optional. Environment overrides are applied on top of the file:
//!
//! - `PROMPTLAB_STAGES_URL` replaces `stages.base_url`
//! - `PROMPTLAB_LOG_FORMAT=json` turns on JSON logging

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{LabError, Result};

pub const ENV_STAGES_URL: &str = "PROMPTLAB_STAGES_URL";
pub const ENV_LOG_FORMAT: &str = "PROMPTLAB_LOG_FORMAT";

pub const DEFAULT_PASS_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MAX_CONCURRENT: usize = 4;
pub const DEFAULT_STAGES_URL: &str = "http://127.0.0.1:8787/api";
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum overall score for a case to count as passed.
    pub pass_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Maximum number of test cases in flight during a suite run.
    pub max_concurrent: usize,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagesConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STAGES_URL.to_string(),
            timeout_secs: DEFAULT_STAGE_TIMEOUT_SECS,
        }
    }
}

impl StagesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parsed level; falls back to `INFO` for unrecognised values.
    pub fn tracing_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndustrySettings {
    pub enabled: bool,
}

impl Default for IndustrySettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Per-industry settings keyed by industry name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndustriesConfig(BTreeMap<String, IndustrySettings>);

impl IndustriesConfig {
    pub fn insert(&mut self, industry: impl Into<String>, settings: IndustrySettings) {
        self.0.insert(industry.into(), settings);
    }

    pub fn get(&self, industry: &str) -> Option<&IndustrySettings> {
        self.0.get(industry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndustrySettings)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub scoring: ScoringConfig,
    pub suite: SuiteConfig,
    pub stages: StagesConfig,
    pub logging: LoggingConfig,
    pub industries: IndustriesConfig,
}

impl LabConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LabConfig =
            toml::from_str(content).map_err(|e| LabError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| LabError::Config(format!("{}: {e}", path.display())))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` in place of the process environment.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_STAGES_URL).filter(|u| !u.trim().is_empty()) {
            self.stages.base_url = url;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.logging.json = format.eq_ignore_ascii_case("json");
        }
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.scoring.pass_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(LabError::Config(format!(
                "scoring.pass_threshold must be within [0, 1], got {threshold}"
            )));
        }
        if self.suite.max_concurrent == 0 {
            return Err(LabError::Config(
                "suite.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.stages.base_url.trim().is_empty() {
            return Err(LabError::Config("stages.base_url is empty".to_string()));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(LabError::Config(format!(
                "logging.level is not a valid level: {}",
                self.logging.level
            )));
        }
        Ok(())
    }
}
