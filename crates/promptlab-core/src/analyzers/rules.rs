//! Ordered pattern rule tables.
//!
//! A [`RuleTable`] is an ordered list of `(category, regex)` pairs. Tables are
//! plain data: adding a category or an industry means adding rows, not
//! branching code. Two evaluation modes are provided:
//!
//! - [`RuleTable::first_match`]: the first category whose pattern matches
//!   wins; later rows are not consulted (no overlap resolution)
//! - [`RuleTable::all_matches`]: every matching category, in table order

use regex::Regex;

use crate::analyzers::error::{AnalyzerError, AnalyzerResult};
use crate::domain::ProjectAnalysis;

/// One row of a rule table.
#[derive(Debug, Clone)]
pub struct PatternRule {
    category: String,
    pattern: Regex,
}

impl PatternRule {
    pub fn new(category: impl Into<String>, pattern: &str) -> AnalyzerResult<Self> {
        let category = category.into();
        let pattern = Regex::new(pattern).map_err(|source| AnalyzerError::InvalidPattern {
            category: category.clone(),
            source,
        })?;
        Ok(Self { category, pattern })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// An ordered table of pattern rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<PatternRule>,
}

impl RuleTable {
    /// Compile `(category, pattern)` rows in order.
    pub fn compile(rows: &[(&str, &str)]) -> AnalyzerResult<Self> {
        let rules = rows
            .iter()
            .map(|(category, pattern)| PatternRule::new(*category, pattern))
            .collect::<AnalyzerResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Append a row; it is evaluated after all existing rows.
    pub fn push(&mut self, category: impl Into<String>, pattern: &str) -> AnalyzerResult<()> {
        self.rules.push(PatternRule::new(category, pattern)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Categories in table order.
    pub fn categories(&self) -> Vec<&str> {
        self.rules.iter().map(PatternRule::category).collect()
    }

    /// Category of the first row whose pattern matches `text`.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.is_match(text))
            .map(PatternRule::category)
    }

    /// Every category whose pattern matches `text`, in table order, each once.
    pub fn all_matches(&self, text: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for rule in self.rules.iter().filter(|r| r.is_match(text)) {
            if !out.contains(&rule.category()) {
                out.push(rule.category());
            }
        }
        out
    }

    /// Matched text for every row, in table order then position order.
    ///
    /// Uses capture group 1 when the pattern has one, the whole match
    /// otherwise. Results are trimmed and deduplicated.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        for rule in &self.rules {
            for caps in rule.pattern.captures_iter(text) {
                let m = caps.get(1).or_else(|| caps.get(0));
                if let Some(m) = m {
                    push_unique(&mut out, m.as_str().trim());
                }
            }
        }
        out
    }
}

/// Push `item` unless it is blank or already present.
pub fn push_unique(list: &mut Vec<String>, item: &str) {
    if !item.is_empty() && !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

/// Split text into sentence/line segments.
///
/// Breaks on newlines and on `.`, `!`, `?`, `;` followed by whitespace, so
/// version numbers and decimals stay intact. Leading list markers are removed
/// and blank segments dropped.
pub fn segments(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for line in text.lines() {
        let mut start = 0;
        let mut iter = line.char_indices().peekable();
        while let Some((i, c)) = iter.next() {
            let at_break = matches!(c, '.' | '!' | '?' | ';')
                && iter.peek().map_or(true, |(_, next)| next.is_whitespace())
                && !(c == '.' && is_ordinal(&line[start..i]));
            if at_break {
                let end = i + c.len_utf8();
                push_segment(&mut out, &line[start..end]);
                start = end;
            }
        }
        push_segment(&mut out, &line[start..]);
    }
    out
}

/// `"2"` in `"2. Ship it"`: a numbered-list prefix, not a sentence.
fn is_ordinal(prefix: &str) -> bool {
    let prefix = prefix.trim();
    !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit())
}

fn push_segment<'a>(out: &mut Vec<&'a str>, raw: &'a str) {
    let trimmed = strip_list_marker(raw.trim());
    if trimmed.chars().any(char::is_alphanumeric) {
        out.push(trimmed);
    }
}

fn strip_list_marker(s: &str) -> &str {
    for marker in ["- ", "* ", "+ ", "• "] {
        if let Some(rest) = s.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = s[digits..]
            .strip_prefix(". ")
            .or_else(|| s[digits..].strip_prefix(") "))
        {
            return rest.trim_start();
        }
    }
    s
}

// ---------------------------------------------------------------------------
// Standard extraction families
// ---------------------------------------------------------------------------

const TASK_RULES: &[(&str, &str)] = &[
    (
        "build",
        r"(?i)\b(?:build|develop|create|implement|design|construct|install|deploy)\w*\b",
    ),
    (
        "integrate",
        r"(?i)\b(?:integrat|migrat|connect|configur)\w*\b|\bset up\b",
    ),
    (
        "assess",
        r"(?i)\b(?:analy[sz]|review|assess|evaluat|audit|test)\w*\b",
    ),
];

const GOAL_RULES: &[(&str, &str)] = &[
    (
        "improve",
        r"(?i)\b(?:improv|enhanc|optimi[sz]|increas|boost|maximi[sz]|streamlin)\w*\b",
    ),
    (
        "reduce",
        r"(?i)\b(?:reduc|decreas|minimi[sz]|lower|cut)\w*\b",
    ),
    (
        "achieve",
        r"(?i)\b(?:achiev\w*|goals?|objectives?|aims? to)\b",
    ),
];

const REQUIREMENT_RULES: &[(&str, &str)] = &[
    (
        "obligation",
        r"(?i)\b(?:must|shall|required?|requires|mandatory|needs? to)\b",
    ),
    (
        "compliance",
        r"(?i)\b(?:compl(?:y|ies|iance|iant)|certif\w*|regulat\w*|standards?)\b",
    ),
];

const CONSTRAINT_RULES: &[(&str, &str)] = &[
    ("budget", r"(?i)\bbudget\w*\b|\$\s?\d|\bcosts?\b"),
    (
        "schedule",
        r"(?i)\b(?:deadline|timeline|schedule)s?\b|\b\d+[- ](?:day|week|month|year)s?\b",
    ),
    (
        "limit",
        r"(?i)\b(?:limit\w*|constrain\w*|restrict\w*|maximum|minimum|at most|no more than)\b",
    ),
    (
        "resource",
        r"(?i)\bteam of \d+\b|\b(?:staff\w*|headcount|resources?)\b",
    ),
];

/// The four independent extraction families that populate a
/// [`ProjectAnalysis`]'s list fields.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    /// Action verbs → key tasks.
    pub tasks: RuleTable,
    /// Improvement verbs → goals.
    pub goals: RuleTable,
    /// Obligation and compliance phrases → requirements.
    pub requirements: RuleTable,
    /// Limiting and resource phrases → constraints.
    pub constraints: RuleTable,
}

impl ExtractionRules {
    /// The built-in families.
    pub fn standard() -> AnalyzerResult<Self> {
        Ok(Self {
            tasks: RuleTable::compile(TASK_RULES)?,
            goals: RuleTable::compile(GOAL_RULES)?,
            requirements: RuleTable::compile(REQUIREMENT_RULES)?,
            constraints: RuleTable::compile(CONSTRAINT_RULES)?,
        })
    }

    /// Classify every segment of `text` into the list fields of `analysis`.
    ///
    /// Families are independent: one segment may land in several lists.
    pub fn apply(&self, text: &str, analysis: &mut ProjectAnalysis) {
        for segment in segments(text) {
            if self.tasks.first_match(segment).is_some() {
                push_unique(&mut analysis.key_tasks, segment);
            }
            if self.goals.first_match(segment).is_some() {
                push_unique(&mut analysis.goals, segment);
            }
            if self.requirements.first_match(segment).is_some() {
                push_unique(&mut analysis.requirements, segment);
            }
            if self.constraints.first_match(segment).is_some() {
                push_unique(&mut analysis.constraints, segment);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_respects_table_order() {
        let table = RuleTable::compile(&[
            ("first", r"(?i)scan"),
            ("second", r"(?i)mri scan"),
        ])
        .expect("compile");
        assert_eq!(table.first_match("MRI scan"), Some("first"));
        assert_eq!(table.all_matches("MRI scan"), vec!["first", "second"]);
        assert_eq!(table.first_match("nothing"), None);
    }

    #[test]
    fn test_invalid_pattern_reports_category() {
        let err = RuleTable::compile(&[("broken", r"(unclosed")]).expect_err("must fail");
        assert!(matches!(
            err,
            AnalyzerError::InvalidPattern { ref category, .. } if category == "broken"
        ));
    }

    #[test]
    fn test_push_appends_after_existing_rows() {
        let mut table = RuleTable::compile(&[("a", "x")]).expect("compile");
        table.push("b", "x").expect("push");
        assert_eq!(table.categories(), vec!["a", "b"]);
        assert_eq!(table.first_match("x"), Some("a"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_extract_prefers_capture_group() {
        let table = RuleTable::compile(&[("tag", r"#(\w+)")]).expect("compile");
        assert_eq!(table.extract("#alpha and #beta and #alpha"), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_segments_split_sentences_and_lines() {
        let segs = segments("Build v1.2 portal. Reduce cost!\n- Must comply with HIPAA\n\n2. Ship it");
        assert_eq!(
            segs,
            vec![
                "Build v1.2 portal.",
                "Reduce cost!",
                "Must comply with HIPAA",
                "Ship it"
            ]
        );
    }

    #[test]
    fn test_segments_keep_numbered_items_whole() {
        assert_eq!(
            segments("1. Build the portal\n  12. Improve speed. Then ship\n3) Deploy"),
            vec!["Build the portal", "Improve speed.", "Then ship", "Deploy"]
        );
        assert_eq!(segments("Released in 2. Next"), vec!["Released in 2.", "Next"]);
    }

    #[test]
    fn test_standard_families_classify_segments() {
        let rules = ExtractionRules::standard().expect("standard rules compile");
        let mut analysis = ProjectAnalysis::default();
        rules.apply(
            "Implement a patient portal. Improve onboarding speed. \
             The system must comply with HIPAA. Budget is limited to $50k.",
            &mut analysis,
        );

        assert_eq!(analysis.key_tasks, vec!["Implement a patient portal."]);
        assert_eq!(analysis.goals, vec!["Improve onboarding speed."]);
        assert_eq!(analysis.requirements, vec!["The system must comply with HIPAA."]);
        assert_eq!(analysis.constraints, vec!["Budget is limited to $50k."]);
    }

    #[test]
    fn test_push_unique_skips_blank_and_duplicates() {
        let mut list = vec!["a".to_string()];
        push_unique(&mut list, "a");
        push_unique(&mut list, "");
        push_unique(&mut list, "b");
        assert_eq!(list, vec!["a", "b"]);
    }
}
