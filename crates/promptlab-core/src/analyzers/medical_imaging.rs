//! Medical imaging analyzer.

use serde_json::Value;

use crate::analyzers::error::AnalyzerResult;
use crate::analyzers::rules::{push_unique, ExtractionRules, RuleTable};
use crate::analyzers::IndustryAnalyzer;
use crate::domain::{IndustryMetrics, ProjectAnalysis};

/// First match wins; more specific modalities come first.
const MODALITY_RULES: &[(&str, &str)] = &[
    ("MRI", r"(?i)\bMRI\b|\bmagnetic resonance\b"),
    ("CT", r"\bCT\b|(?i)\bcomputed tomography\b|\bCAT scans?\b"),
    ("PET", r"\bPET\b|(?i)\bpositron emission\b"),
    ("Mammography", r"(?i)\bmammogra\w*\b"),
    ("Ultrasound", r"(?i)\bultrasound\b|\bsonograph\w*\b"),
    ("X-Ray", r"(?i)\bx-?rays?\b|\bradiograph\w*\b"),
];

const CLINICAL_RULES: &[(&str, &str)] = &[
    ("Screening", r"(?i)\bscreening\b"),
    (
        "Treatment Planning",
        r"(?i)\b(?:treatment|surgical|radiotherapy) planning\b|\bradiotherapy\b",
    ),
    ("Segmentation", r"(?i)\bsegment(?:ation|ing|s)?\b"),
    ("Diagnosis", r"(?i)\bdiagnos\w*\b|\bdetect\w*\b|\bclassif\w*\b"),
    ("Monitoring", r"(?i)\bmonitor\w*\b|\bfollow-up\b|\blongitudinal\b"),
    ("Research", r"(?i)\bresearch\b|\bclinical trials?\b"),
];

/// All matches are reported.
const REGULATORY_RULES: &[(&str, &str)] = &[
    ("HIPAA", r"(?i)\bHIPAA\b"),
    ("FDA", r"(?i)\bFDA\b|510\(k\)|\bpremarket\b"),
    ("DICOM", r"(?i)\bDICOM\b"),
    ("GDPR", r"(?i)\bGDPR\b"),
    ("CE Mark", r"(?i)\bCE[- ]mark\w*\b|\bMDR\b"),
    ("HL7", r"(?i)\bHL7\b|\bFHIR\b"),
    ("ISO 13485", r"(?i)\bISO\s*13485\b"),
    ("IEC 62304", r"(?i)\bIEC\s*62304\b"),
];

pub const MEDICAL_IMAGING_INDUSTRY: &str = "medical_imaging";

#[derive(Debug, Clone)]
pub struct MedicalImagingAnalyzer {
    rules: ExtractionRules,
    modalities: RuleTable,
    clinical: RuleTable,
    regulatory: RuleTable,
}

impl MedicalImagingAnalyzer {
    pub fn new() -> AnalyzerResult<Self> {
        Ok(Self {
            rules: ExtractionRules::standard()?,
            modalities: RuleTable::compile(MODALITY_RULES)?,
            clinical: RuleTable::compile(CLINICAL_RULES)?,
            regulatory: RuleTable::compile(REGULATORY_RULES)?,
        })
    }
}

fn optional(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_string()))
}

impl IndustryAnalyzer for MedicalImagingAnalyzer {
    fn industry(&self) -> &str {
        MEDICAL_IMAGING_INDUSTRY
    }

    fn display_name(&self) -> &str {
        "Medical Imaging"
    }

    fn focus_areas(&self) -> &[&str] {
        &[
            "imaging modality",
            "clinical application",
            "regulatory compliance",
            "patient data privacy",
            "diagnostic accuracy",
        ]
    }

    fn analyze_project(&self, text: &str) -> ProjectAnalysis {
        let mut analysis = ProjectAnalysis::default();
        self.rules.apply(text, &mut analysis);

        let regulatory = self.regulatory.all_matches(text);
        for framework in &regulatory {
            push_unique(&mut analysis.requirements, framework);
        }

        analysis
            .with_insight("modality", optional(self.modalities.first_match(text)))
            .with_insight(
                "clinical_application",
                optional(self.clinical.first_match(text)),
            )
            .with_insight("regulatory", regulatory)
    }

    fn industry_metrics(&self) -> IndustryMetrics {
        IndustryMetrics {
            accuracy: 0.95,
            completeness: 0.9,
            usefulness: 0.85,
            efficiency: 0.75,
            ..IndustryMetrics::default()
        }
        .with_threshold("sensitivity", 0.9)
        .with_threshold("specificity", 0.9)
        .with_threshold("dice_coefficient", 0.8)
        .with_threshold("false_positive_rate", 0.05)
    }

    fn success_rate_estimate(&self) -> f64 {
        0.82
    }

    fn feedback_estimate(&self) -> f64 {
        4.4
    }

    fn time_savings_estimate(&self) -> f64 {
        0.4
    }
}
