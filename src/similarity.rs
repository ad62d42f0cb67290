//! Lexical similarity primitives shared by search ranking and conflict detection.
//!
//! Similarity is deliberately cheap: token sets from a lowercase whitespace
//! split, compared with Jaccard overlap.

use std::collections::HashSet;

/// Suffixes stripped by [`stem`], longest first.
const SUFFIXES: [&str; 4] = ["ing", "ed", "es", "s"];

/// Minimum length of what remains after stripping a suffix.
const MIN_STEM_LEN: usize = 3;

/// Lowercased whitespace-separated tokens of `text`.
pub fn token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity `|a ∩ b| / |a ∪ b|`.
///
/// Returns 0.0 when the union is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Crude inflection stripping so `lives` and `lived` share a root.
pub fn stem(token: &str) -> &str {
    for suffix in SUFFIXES {
        if let Some(root) = token.strip_suffix(suffix) {
            if root.chars().count() >= MIN_STEM_LEN {
                return root;
            }
        }
    }
    token
}

/// Lowercased tokens with surrounding punctuation trimmed and suffixes stemmed.
pub fn stemmed_token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .map(|token| stem(token).to_string())
        .collect()
}
