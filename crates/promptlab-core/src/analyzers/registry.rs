//! Explicitly constructed registry of industry analyzers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::analyzers::error::{AnalyzerError, AnalyzerResult};
use crate::analyzers::{
    ConstructionAnalyzer, GenericAnalyzer, IndustryAnalyzer, MedicalImagingAnalyzer,
    SoftwareAnalyzer,
};
use crate::config::IndustriesConfig;
use crate::domain::ProjectAnalysis;
use crate::metrics::UsageTracker;
use crate::obs;

/// Maps industry name to analyzer, with a per-industry enable flag.
///
/// Industries are enabled unless explicitly disabled. The registry is an
/// ordinary value owned by the caller; nothing is registered globally.
#[derive(Default, Clone)]
pub struct AnalyzerRegistry {
    analyzers: HashMap<String, Arc<dyn IndustryAnalyzer>>,
    enabled: HashMap<String, bool>,
    usage: Arc<UsageTracker>,
}

impl std::fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerRegistry")
            .field("industries", &self.list_industries())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_usage_tracker(mut self, usage: Arc<UsageTracker>) -> Self {
        self.usage = usage;
        self
    }

    /// A registry holding the generic, software, medical imaging and
    /// construction analyzers.
    pub fn with_builtin_analyzers() -> AnalyzerResult<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(GenericAnalyzer::new()?));
        registry.register(Arc::new(SoftwareAnalyzer::new()?));
        registry.register(Arc::new(MedicalImagingAnalyzer::new()?));
        registry.register(Arc::new(ConstructionAnalyzer::new()?));
        Ok(registry)
    }

    /// Register `analyzer` under its industry name, returning any analyzer it
    /// replaced.
    pub fn register(
        &mut self,
        analyzer: Arc<dyn IndustryAnalyzer>,
    ) -> Option<Arc<dyn IndustryAnalyzer>> {
        let industry = analyzer.industry().to_string();
        debug!(industry = %industry, "registering analyzer");
        self.analyzers.insert(industry, analyzer)
    }

    pub fn get(&self, industry: &str) -> Option<Arc<dyn IndustryAnalyzer>> {
        self.analyzers.get(industry).cloned()
    }

    /// Registered industry names, sorted.
    pub fn list_industries(&self) -> Vec<String> {
        let mut names: Vec<String> = self.analyzers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn set_enabled(&mut self, industry: impl Into<String>, enabled: bool) {
        self.enabled.insert(industry.into(), enabled);
    }

    pub fn is_enabled(&self, industry: &str) -> bool {
        self.enabled.get(industry).copied().unwrap_or(true)
    }

    /// Apply `[industries.<name>]` enable flags from configuration.
    pub fn apply_config(&mut self, config: &IndustriesConfig) {
        for (industry, settings) in config.iter() {
            self.set_enabled(industry.clone(), settings.enabled);
        }
    }

    /// Registered industries with their enabled state, sorted by name.
    pub fn status(&self) -> BTreeMap<String, bool> {
        self.analyzers
            .keys()
            .map(|name| (name.clone(), self.is_enabled(name)))
            .collect()
    }

    /// Resolve an enabled analyzer for `industry`.
    pub fn resolve(&self, industry: &str) -> AnalyzerResult<Arc<dyn IndustryAnalyzer>> {
        let analyzer = self
            .get(industry)
            .ok_or_else(|| AnalyzerError::UnknownIndustry(industry.to_string()))?;
        if !self.is_enabled(industry) {
            return Err(AnalyzerError::IndustryDisabled(industry.to_string()));
        }
        Ok(analyzer)
    }

    /// Analyze `text` with the analyzer registered for `industry`.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub fn analyze_project(&self, text: &str, industry: &str) -> AnalyzerResult<ProjectAnalysis> {
        let analyzer = self.resolve(industry)?;
        let analysis = analyzer.analyze_project(text);
        self.usage.inc_analyses();
        obs::emit_analysis_completed(
            industry,
            analysis.key_tasks.len(),
            analysis.requirements.len(),
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndustrySettings;

    struct Fixed(&'static str, &'static str);

    impl IndustryAnalyzer for Fixed {
        fn industry(&self) -> &str {
            self.0
        }

        fn display_name(&self) -> &str {
            self.1
        }

        fn analyze_project(&self, _text: &str) -> ProjectAnalysis {
            ProjectAnalysis::default().with_insight("source", self.1)
        }
    }

    #[test]
    fn test_builtin_registry_lists_sorted_industries() {
        let registry = AnalyzerRegistry::with_builtin_analyzers().expect("builtins");
        assert_eq!(
            registry.list_industries(),
            vec![
                "construction",
                "generic",
                "medical_imaging",
                "software_development"
            ]
        );
        assert!(registry.status().values().all(|enabled| *enabled));
    }

    #[test]
    fn test_register_overwrites_and_returns_previous() {
        let mut registry = AnalyzerRegistry::new();
        assert!(registry.register(Arc::new(Fixed("x", "first"))).is_none());
        let previous = registry
            .register(Arc::new(Fixed("x", "second")))
            .expect("previous analyzer");
        assert_eq!(previous.display_name(), "first");

        let analysis = registry.analyze_project("text", "x").expect("analyze");
        assert_eq!(analysis.insight_str("source"), Some("second"));
        assert_eq!(registry.usage.analyses_run(), 1);
    }

    #[test]
    fn test_unknown_and_disabled_industries() {
        let mut registry = AnalyzerRegistry::new();
        registry.register(Arc::new(Fixed("x", "X")));

        let err = registry.analyze_project("text", "nope").expect_err("unknown");
        assert!(matches!(err, AnalyzerError::UnknownIndustry(ref n) if n == "nope"));

        registry.set_enabled("x", false);
        assert!(!registry.is_enabled("x"));
        let err = registry.analyze_project("text", "x").expect_err("disabled");
        assert!(matches!(err, AnalyzerError::IndustryDisabled(ref n) if n == "x"));
    }

    #[test]
    fn test_apply_config_sets_flags() {
        let mut registry = AnalyzerRegistry::with_builtin_analyzers().expect("builtins");
        let mut config = IndustriesConfig::default();
        config.insert("construction", IndustrySettings { enabled: false });

        registry.apply_config(&config);
        assert!(!registry.is_enabled("construction"));
        assert!(registry.is_enabled("generic"));
    }
}
