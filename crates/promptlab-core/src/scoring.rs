//! Per-stage scoring functions.
//!
//! Each function takes a generated artifact and its expectations and returns
//! a score in [0, 1] plus a breakdown. Matching is case-insensitive literal
//! substring containment; there is no semantic comparison.
//!
//! Degenerate inputs (blank summary, no suggestions) score 0 rather than
//! failing. Every returned value is finite and clamped.

use serde::{Deserialize, Serialize};

use crate::domain::{
    OutputFormat, PromptBreakdown, PromptCriteria, SuggestionCriteria, SuggestionsBreakdown,
    SummaryBreakdown, SummaryCriteria,
};

pub const SUMMARY_KEY_POINT_WEIGHT: f64 = 0.6;
pub const SUMMARY_ELEMENT_WEIGHT: f64 = 0.4;

pub const SUGGESTION_TYPE_WEIGHT: f64 = 0.7;
pub const SUGGESTION_COUNT_WEIGHT: f64 = 0.3;

pub const PROMPT_ELEMENT_WEIGHT: f64 = 0.6;
pub const PROMPT_FORMAT_WEIGHT: f64 = 0.2;
pub const PROMPT_LENGTH_WEIGHT: f64 = 0.2;

/// A stage score together with the sub-scores that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scored<B> {
    pub score: f64,
    pub breakdown: B,
}

/// Map NaN/infinite values to 0 and clamp to [0, 1].
pub fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn indicator(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

fn required_phrases(required: &[String]) -> Vec<&str> {
    required
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect()
}

/// Fraction of `required` phrases contained (case-insensitively) in `text`.
///
/// An empty requirement set is fully covered by any non-blank text; blank
/// text covers nothing.
pub fn coverage(text: &str, required: &[String]) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    let phrases = required_phrases(required);
    if phrases.is_empty() {
        return 1.0;
    }
    let haystack = text.to_lowercase();
    let found = phrases
        .iter()
        .filter(|p| haystack.contains(&p.to_lowercase()))
        .count();
    unit(found as f64 / phrases.len() as f64)
}

fn missing_phrases(text: &str, required: &[String]) -> Vec<String> {
    let haystack = text.to_lowercase();
    required_phrases(required)
        .into_iter()
        .filter(|p| !haystack.contains(&p.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Score a generated summary.
///
/// `0.6 × key-point coverage + 0.4 × element coverage`; a blank summary is 0.
pub fn score_summary(summary: &str, criteria: &SummaryCriteria) -> Scored<SummaryBreakdown> {
    if summary.trim().is_empty() {
        return Scored {
            score: 0.0,
            breakdown: SummaryBreakdown {
                key_point_coverage: 0.0,
                element_coverage: 0.0,
                missing_key_points: required_phrases(&criteria.key_points)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            },
        };
    }

    let key_point_coverage = coverage(summary, &criteria.key_points);
    let element_coverage = coverage(summary, &criteria.elements);
    let score = unit(
        SUMMARY_KEY_POINT_WEIGHT * key_point_coverage + SUMMARY_ELEMENT_WEIGHT * element_coverage,
    );

    Scored {
        score,
        breakdown: SummaryBreakdown {
            key_point_coverage,
            element_coverage,
            missing_key_points: missing_phrases(summary, &criteria.key_points),
        },
    }
}

/// Score the suggestion list.
///
/// `0.7 × type coverage + 0.3 × (count within [min, max])`; an empty list
/// (or one with only blank entries) is 0. Blank entries are ignored for type
/// coverage but still count toward the list length.
pub fn score_suggestions(
    suggestions: &[String],
    criteria: &SuggestionCriteria,
) -> Scored<SuggestionsBreakdown> {
    let lowered: Vec<String> = suggestions
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_lowercase())
        .collect();

    if lowered.is_empty() {
        return Scored {
            score: 0.0,
            breakdown: SuggestionsBreakdown::default(),
        };
    }

    let types = required_phrases(&criteria.types);
    let type_coverage = if types.is_empty() {
        1.0
    } else {
        let covered = types
            .iter()
            .filter(|t| {
                let t = t.to_lowercase();
                lowered.iter().any(|s| s.contains(&t))
            })
            .count();
        unit(covered as f64 / types.len() as f64)
    };

    let count = suggestions.len();
    let count_in_range = indicator(count >= criteria.min_count && count <= criteria.max_count);
    let score = unit(
        SUGGESTION_TYPE_WEIGHT * type_coverage + SUGGESTION_COUNT_WEIGHT * count_in_range,
    );

    Scored {
        score,
        breakdown: SuggestionsBreakdown {
            type_coverage,
            count_in_range,
            suggestion_count: count,
        },
    }
}

/// Score the optimized prompt.
///
/// `0.6 × element coverage + 0.2 × format compliance + 0.2 × (length ≤ max)`.
/// Blank prompts are not short-circuited: they may still earn the format and
/// length terms.
pub fn score_prompt(prompt: &str, criteria: &PromptCriteria) -> Scored<PromptBreakdown> {
    let element_coverage = coverage(prompt, &criteria.elements);
    let format_compliance = indicator(format_compliant(prompt, criteria.format));
    let length_within_limit = indicator(prompt.chars().count() <= criteria.max_length);

    let score = unit(
        PROMPT_ELEMENT_WEIGHT * element_coverage
            + PROMPT_FORMAT_WEIGHT * format_compliance
            + PROMPT_LENGTH_WEIGHT * length_within_limit,
    );

    Scored {
        score,
        breakdown: PromptBreakdown {
            element_coverage,
            format_compliance,
            length_within_limit,
        },
    }
}

/// Arithmetic mean of the three stage scores.
pub fn overall_score(summary: f64, suggestions: f64, prompt: f64) -> f64 {
    unit((summary + suggestions + prompt) / 3.0)
}

/// Arithmetic mean; 0 for an empty sequence.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Whether `text` starts with a markdown heading, list item, quote, or code
/// fence.
pub fn is_markdown(text: &str) -> bool {
    let t = text.trim_start();
    if t.starts_with('#') || t.starts_with("```") || t.starts_with("> ") {
        return true;
    }
    if ["- ", "* ", "+ "].iter().any(|m| t.starts_with(m)) {
        return true;
    }
    // Ordered list: digits followed by `.` or `)` and whitespace.
    let digits = t.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &t[digits..];
        let mut chars = rest.chars();
        if let (Some('.' | ')'), Some(next)) = (chars.next(), chars.next()) {
            return next.is_whitespace();
        }
    }
    false
}

/// Whether `text` matches the declared output format.
pub fn format_compliant(text: &str, format: OutputFormat) -> bool {
    match format {
        OutputFormat::Markdown => is_markdown(text),
        OutputFormat::Plain => !is_markdown(text),
        OutputFormat::Json => serde_json::from_str::<serde_json::Value>(text).is_ok(),
    }
}
