//! Bag-of-words cosine similarity.
//!
//! Used for coarse gold-standard comparisons. Tokens are lowercase runs of
//! alphanumeric characters; no stemming, no stop words, no semantics.

use std::collections::HashMap;

/// Term frequencies of `text`.
pub fn term_frequencies(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        *counts.entry(token.to_lowercase()).or_insert(0) += 1;
    }
    counts
}

/// Cosine similarity in [0, 1] between the word-count vectors of `a` and `b`.
///
/// Returns 0.0 when either text has no tokens.
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let fa = term_frequencies(a);
    let fb = term_frequencies(b);
    if fa.is_empty() || fb.is_empty() {
        return 0.0;
    }

    let dot: f64 = fa
        .iter()
        .filter_map(|(term, &ca)| fb.get(term).map(|&cb| (ca * cb) as f64))
        .sum();
    let norm = |f: &HashMap<String, usize>| {
        f.values()
            .map(|&c| (c * c) as f64)
            .sum::<f64>()
            .sqrt()
    };

    let denom = norm(&fa) * norm(&fb);
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(0.0, 1.0)
}
