//! Pairwise conflict detection between memory entries.
//!
//! A [`ConflictDetector`] runs an ordered list of [`ConflictClassifier`]s over
//! each pair; the first classifier that fires decides the conflict type, so a
//! pair yields at most one report. Entries recorded under the same path never
//! conflict with each other.

mod rules;

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::memory_types::{ConflictReport, ConflictType, MemoryEntry};

pub use rules::{ContradictionRule, SemanticRule, TemporalRule};

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid non-word pattern"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// First `len` hex characters of the SHA-256 of `input`.
pub(crate) fn sha256_prefix(input: &str, len: usize) -> String {
    let digest = hex::encode(Sha256::digest(input.as_bytes()));
    digest[..len].to_string()
}

/// Fingerprint of normalized content (16 hex chars).
///
/// Normalization lowercases, trims, strips every character that is neither a
/// word character nor whitespace, and collapses whitespace runs.
pub fn compute_semantic_hash(content: &str) -> String {
    let lowered = content.to_lowercase();
    let stripped = NON_WORD.replace_all(lowered.trim(), "");
    let normalized = WHITESPACE_RUN.replace_all(&stripped, " ");
    sha256_prefix(&normalized, 16)
}

/// Provenance tag for a citation (8 hex chars) over `path:line_start:content`.
pub fn version_hash(path: &str, line_start: usize, content: &str) -> String {
    sha256_prefix(&format!("{path}:{line_start}:{content}"), 8)
}

/// A single conflict heuristic.
pub trait ConflictClassifier: Send + Sync {
    /// Kind of conflict this classifier reports.
    fn conflict_type(&self) -> ConflictType;

    /// Whether `a` and `b` conflict under this heuristic.
    fn matches(&self, a: &MemoryEntry, b: &MemoryEntry) -> bool;

    /// Report for the pair, if it conflicts.
    fn classify(&self, a: &MemoryEntry, b: &MemoryEntry) -> Option<ConflictReport> {
        self.matches(a, b)
            .then(|| ConflictReport::new(a, b, self.conflict_type()))
    }
}

/// Ordered set of conflict classifiers.
pub struct ConflictDetector {
    classifiers: Vec<Box<dyn ConflictClassifier>>,
}

impl ConflictDetector {
    /// Default upper bound for semantic similarity.
    pub const DEFAULT_THRESHOLD: f64 = 0.7;

    /// Contradiction, then temporal, then semantic (bounded by `threshold`).
    pub fn new(threshold: f64) -> Self {
        Self::with_classifiers(vec![
            Box::new(ContradictionRule),
            Box::new(TemporalRule),
            Box::new(SemanticRule::new(threshold)),
        ])
    }

    /// Build a detector from a custom classifier chain, tried in order.
    pub fn with_classifiers(classifiers: Vec<Box<dyn ConflictClassifier>>) -> Self {
        Self { classifiers }
    }

    fn classify_pair(&self, a: &MemoryEntry, b: &MemoryEntry) -> Option<ConflictReport> {
        self.classifiers
            .iter()
            .find_map(|classifier| classifier.classify(a, b))
    }

    /// Conflicts between `candidate` and each entry of `existing`, in order.
    ///
    /// Entries sharing the candidate's path are skipped.
    pub fn detect_conflicts<'a, I>(&self, candidate: &MemoryEntry, existing: I) -> Vec<ConflictReport>
    where
        I: IntoIterator<Item = &'a MemoryEntry>,
    {
        existing
            .into_iter()
            .filter(|other| other.path != candidate.path)
            .filter_map(|other| self.classify_pair(candidate, other))
            .collect()
    }

    /// Every conflict among `entries`, each unordered pair tested once.
    ///
    /// Quadratic in the number of entries.
    pub fn scan_all(&self, entries: &[&MemoryEntry]) -> Vec<ConflictReport> {
        entries
            .iter()
            .enumerate()
            .flat_map(|(i, entry)| self.detect_conflicts(entry, entries[i + 1..].iter().copied()))
            .collect()
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}
