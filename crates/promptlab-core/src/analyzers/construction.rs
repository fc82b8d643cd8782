//! Construction and built-environment analyzer.

use serde_json::Value;

use crate::analyzers::error::AnalyzerResult;
use crate::analyzers::rules::{push_unique, ExtractionRules, RuleTable};
use crate::analyzers::IndustryAnalyzer;
use crate::domain::{IndustryMetrics, ProjectAnalysis};

const PROJECT_TYPE_RULES: &[(&str, &str)] = &[
    (
        "Renovation",
        r"(?i)\b(?:renovat|retrofit|remodel|refurbish)\w*\b",
    ),
    (
        "Infrastructure",
        r"(?i)\b(?:bridges?|highways?|roads?|tunnels?|railways?|infrastructure|utilities)\b",
    ),
    (
        "Industrial",
        r"(?i)\b(?:industrial|factory|manufacturing plant|warehouses?|plant)\b",
    ),
    (
        "Healthcare",
        r"(?i)\b(?:hospital|clinic|medical (?:center|office building))\b",
    ),
    (
        "Residential",
        r"(?i)\b(?:residential|housing|homes?|apartments?|condo\w*|single-family|multifamily)\b",
    ),
    (
        "Commercial",
        r"(?i)\b(?:commercial|office|retail|mixed-use|hotel)\b",
    ),
];

/// LEED levels are listed most-specific first; all matching rows are reported.
const CERTIFICATION_RULES: &[(&str, &str)] = &[
    ("LEED Platinum", r"(?i)\bLEED\s+Platinum\b"),
    ("LEED Gold", r"(?i)\bLEED\s+Gold\b"),
    ("LEED Silver", r"(?i)\bLEED\s+Silver\b"),
    ("LEED Certified", r"(?i)\bLEED[- ]certified\b"),
    ("BREEAM", r"(?i)\bBREEAM\b"),
    ("ENERGY STAR", r"(?i)\benergy\s+star\b"),
    ("WELL", r"\bWELL\b|(?i)\bWELL\s+building\b"),
    ("Passive House", r"(?i)\bpassive\s+house\b|\bpassivhaus\b"),
];

const TIMELINE_RULES: &[(&str, &str)] = &[(
    "duration",
    r"(?i)\b(\d+[- ](?:day|week|month|year)s?)\b",
)];

const BUDGET_RULES: &[(&str, &str)] = &[(
    "amount",
    r"(?i)(\$\s?\d[\d,]*(?:\.\d+)?(?:\s?(?:million|billion|[mkb])\b)?)",
)];

pub const CONSTRUCTION_INDUSTRY: &str = "construction";

#[derive(Debug, Clone)]
pub struct ConstructionAnalyzer {
    rules: ExtractionRules,
    project_types: RuleTable,
    certifications: RuleTable,
    timelines: RuleTable,
    budgets: RuleTable,
}

impl ConstructionAnalyzer {
    pub fn new() -> AnalyzerResult<Self> {
        Ok(Self {
            rules: ExtractionRules::standard()?,
            project_types: RuleTable::compile(PROJECT_TYPE_RULES)?,
            certifications: RuleTable::compile(CERTIFICATION_RULES)?,
            timelines: RuleTable::compile(TIMELINE_RULES)?,
            budgets: RuleTable::compile(BUDGET_RULES)?,
        })
    }
}

impl IndustryAnalyzer for ConstructionAnalyzer {
    fn industry(&self) -> &str {
        CONSTRUCTION_INDUSTRY
    }

    fn display_name(&self) -> &str {
        "Construction"
    }

    fn focus_areas(&self) -> &[&str] {
        &[
            "project type",
            "sustainability certifications",
            "schedule",
            "budget",
            "site safety",
        ]
    }

    fn analyze_project(&self, text: &str) -> ProjectAnalysis {
        let mut analysis = ProjectAnalysis::default();
        self.rules.apply(text, &mut analysis);

        let certifications = self.certifications.all_matches(text);
        for cert in &certifications {
            push_unique(&mut analysis.requirements, cert);
        }

        let timeline = self.timelines.extract(text);
        let budget = self.budgets.extract(text);

        let project_type = self
            .project_types
            .first_match(text)
            .map_or(Value::Null, |t| Value::String(t.to_string()));

        analysis
            .with_insight("project_type", project_type)
            .with_insight("certifications", certifications)
            .with_insight("timeline", timeline)
            .with_insight("budget", budget)
    }

    fn industry_metrics(&self) -> IndustryMetrics {
        IndustryMetrics {
            accuracy: 0.85,
            completeness: 0.85,
            usefulness: 0.8,
            efficiency: 0.75,
            ..IndustryMetrics::default()
        }
        .with_threshold("schedule_variance", 0.1)
        .with_threshold("cost_variance", 0.1)
        .with_threshold("safety_compliance", 1.0)
    }

    fn time_savings_estimate(&self) -> f64 {
        0.3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ConstructionAnalyzer {
        ConstructionAnalyzer::new().expect("builtin tables compile")
    }

    #[test]
    fn test_leed_gold_office_project() {
        let analysis = analyzer().analyze_project(
            "Construct a 5-storey office building targeting LEED Gold certification. \
             The project has a 6-month timeline and a budget of $4.5 million.",
        );

        assert_eq!(analysis.insight_str("project_type"), Some("Commercial"));
        assert_eq!(analysis.insight_list("certifications"), vec!["LEED Gold"]);
        assert_eq!(analysis.insight_list("timeline"), vec!["6-month"]);
        assert_eq!(analysis.insight_list("budget"), vec!["$4.5 million"]);
        assert!(analysis.requirements.iter().any(|r| r == "LEED Gold"));
        assert!(!analysis.key_tasks.is_empty());
    }

    #[test]
    fn test_multiple_certifications_reported_in_table_order() {
        let analysis = analyzer().analyze_project(
            "Renovate the apartment block to ENERGY STAR and BREEAM standards.",
        );
        assert_eq!(analysis.insight_str("project_type"), Some("Renovation"));
        assert_eq!(
            analysis.insight_list("certifications"),
            vec!["BREEAM", "ENERGY STAR"]
        );
    }

    #[test]
    fn test_no_matches_yields_empty_insights() {
        let analysis = analyzer().analyze_project("Hello there.");
        assert_eq!(analysis.insight("project_type"), Some(&Value::Null));
        assert!(analysis.insight_list("timeline").is_empty());
        assert!(analysis.insight_list("budget").is_empty());
    }
}
