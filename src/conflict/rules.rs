//! Built-in conflict heuristics.

use std::sync::LazyLock;

use regex::RegexSet;

use super::ConflictClassifier;
use crate::memory_types::{ConflictType, MemoryEntry};
use crate::similarity::{jaccard, stemmed_token_set, token_set};

const NEGATION_CUES: [&str; 14] = [
    "not", "dislike", "hate", "avoid", "isn't", "aren't", "wasn't", "weren't", "can't", "cannot",
    "unable", "didn't", "don't", "won't",
];

const POLARITY_CUES: [&str; 9] = [
    "is", "are", "was", "were", "like", "love", "prefer", "can", "able",
];

/// Tokens too common to establish a shared subject.
const STOP_WORDS: [&str; 12] = [
    "user", "the", "a", "an", "in", "on", "at", "to", "for", "of", "and", "but",
];

/// Shared topic tokens needed before time markers are compared.
const MIN_TOPIC_OVERLAP: usize = 3;

/// Lower (exclusive) bound of the semantic similarity window.
const SEMANTIC_FLOOR: f64 = 0.5;

static TEMPORAL_MARKERS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"\b(now|currently|today)\b",
        r"\b(then|before|previously)\b",
        r"\b(yesterday|last week|last month)\b",
        r"\b(tomorrow|next week|soon)\b",
    ])
    .expect("valid temporal marker patterns")
});

fn contains_any(text: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| text.contains(cue))
}

/// Opposite polarity about a shared subject.
///
/// Cues match anywhere in the lowercased content, so `dislikes` carries both
/// a negation cue and a polarity cue.
pub struct ContradictionRule;

impl ConflictClassifier for ContradictionRule {
    fn conflict_type(&self) -> ConflictType {
        ConflictType::Contradiction
    }

    fn matches(&self, a: &MemoryEntry, b: &MemoryEntry) -> bool {
        let a_text = a.content.to_lowercase();
        let b_text = b.content.to_lowercase();

        let a_negative = contains_any(&a_text, &NEGATION_CUES);
        let b_negative = contains_any(&b_text, &NEGATION_CUES);
        let a_positive = contains_any(&a_text, &POLARITY_CUES);
        let b_positive = contains_any(&b_text, &POLARITY_CUES);

        if !((a_negative && b_positive) || (a_positive && b_negative)) {
            return false;
        }

        let a_tokens = token_set(&a.content);
        let b_tokens = token_set(&b.content);
        a_tokens
            .intersection(&b_tokens)
            .any(|token| !STOP_WORDS.contains(&token.as_str()))
    }
}

/// Same topic with time markers on both sides.
///
/// Topic overlap is counted on stemmed tokens; markers are matched
/// case-sensitively against the raw content.
pub struct TemporalRule;

impl ConflictClassifier for TemporalRule {
    fn conflict_type(&self) -> ConflictType {
        ConflictType::Temporal
    }

    fn matches(&self, a: &MemoryEntry, b: &MemoryEntry) -> bool {
        let a_tokens = stemmed_token_set(&a.content);
        let b_tokens = stemmed_token_set(&b.content);
        if a_tokens.intersection(&b_tokens).count() < MIN_TOPIC_OVERLAP {
            return false;
        }
        TEMPORAL_MARKERS.is_match(&a.content) && TEMPORAL_MARKERS.is_match(&b.content)
    }
}

/// High but imperfect lexical overlap: `0.5 < jaccard < threshold`.
pub struct SemanticRule {
    threshold: f64,
}

impl SemanticRule {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl ConflictClassifier for SemanticRule {
    fn conflict_type(&self) -> ConflictType {
        ConflictType::Semantic
    }

    fn matches(&self, a: &MemoryEntry, b: &MemoryEntry) -> bool {
        let similarity = jaccard(&token_set(&a.content), &token_set(&b.content));
        similarity > SEMANTIC_FLOOR && similarity < self.threshold
    }
}
