//! Base analyzer used for industries without a dedicated plugin.

use crate::analyzers::error::AnalyzerResult;
use crate::analyzers::rules::{segments, ExtractionRules, RuleTable};
use crate::analyzers::IndustryAnalyzer;
use crate::domain::ProjectAnalysis;

/// Domain-detection table; the first matching row names the suggested industry.
const DOMAIN_RULES: &[(&str, &str)] = &[
    (
        "medical_imaging",
        r"(?i)\b(?:mri|ct scans?|x-?rays?|radiolog\w*|dicom|ultrasound|mammogra\w*|pacs)\b",
    ),
    (
        "construction",
        r"(?i)\b(?:leed|construction|contractors?|blueprints?|hvac|zoning|site plans?|breeam)\b",
    ),
    (
        "software_development",
        r"(?i)\b(?:api|frontend|backend|react|database|repository|npm|cargo|microservices?|codebase)\b",
    ),
    (
        "finance",
        r"(?i)\b(?:portfolio|trading|ledger|banking|invoices?|accounting)\b",
    ),
    (
        "marketing",
        r"(?i)\b(?:campaigns?|seo|brand\w*|audience|conversion rate)\b",
    ),
];

pub const GENERIC_INDUSTRY: &str = "generic";

/// Four-family extraction plus text statistics.
#[derive(Debug, Clone)]
pub struct GenericAnalyzer {
    rules: ExtractionRules,
    domains: RuleTable,
}

impl GenericAnalyzer {
    pub fn new() -> AnalyzerResult<Self> {
        Ok(Self {
            rules: ExtractionRules::standard()?,
            domains: RuleTable::compile(DOMAIN_RULES)?,
        })
    }

    /// Best-guess industry for `text`, if any domain vocabulary appears.
    pub fn suggest_industry(&self, text: &str) -> Option<&str> {
        self.domains.first_match(text)
    }
}

impl IndustryAnalyzer for GenericAnalyzer {
    fn industry(&self) -> &str {
        GENERIC_INDUSTRY
    }

    fn display_name(&self) -> &str {
        "General Business"
    }

    fn analyze_project(&self, text: &str) -> ProjectAnalysis {
        let mut analysis = ProjectAnalysis::default()
            .with_insight("word_count", text.split_whitespace().count())
            .with_insight("segment_count", segments(text).len());
        if let Some(industry) = self.suggest_industry(text) {
            analysis = analysis.with_insight("suggested_industry", industry);
        }
        self.rules.apply(text, &mut analysis);
        analysis
    }
}
