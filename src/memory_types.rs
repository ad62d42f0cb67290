//! Memory store data types.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Current time as an RFC 3339 UTC timestamp with microsecond precision.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Structured pointer back to the source location that produced a memory.
///
/// Immutable once created. `version_hash` is an 8 hex character provenance
/// tag derived from the path, the starting line and the cited content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub path: String,
    pub line_start: usize,
    pub line_end: usize,
    pub excerpt: String,
    pub timestamp: String,
    pub version_hash: String,
}

/// A single stored memory fact with its quality metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub content: String,
    pub path: String,
    /// Provenance channel, e.g. `USER.md` or `session`. Open set.
    pub source_type: String,
    pub created_at: String,
    pub last_accessed: String,
    pub access_count: u64,
    /// Trust score in `[0, 1]`.
    pub confidence: f64,
    #[serde(default)]
    pub citation: Option<Citation>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Normalized-content fingerprint (16 hex chars).
    pub semantic_hash: String,
}

impl MemoryEntry {
    /// Bump access statistics after the entry was read.
    pub(crate) fn record_access(&mut self, at: &str) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed = at.to_string();
    }
}

/// Classification of a detected conflict between two entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    /// Opposite polarity statements about a shared subject.
    Contradiction,
    /// Same topic stated with different time markers.
    Temporal,
    /// High but imperfect lexical overlap.
    Semantic,
}

impl ConflictType {
    /// Fixed resolution hint for this kind of conflict.
    pub fn resolution(self) -> Resolution {
        match self {
            ConflictType::Contradiction => Resolution::ManualReview,
            ConflictType::Temporal => Resolution::TimestampPriority,
            ConflictType::Semantic => Resolution::MergeOrClarify,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConflictType::Contradiction => "contradiction",
            ConflictType::Temporal => "temporal",
            ConflictType::Semantic => "semantic",
        }
    }
}

/// Suggested way to resolve a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    ManualReview,
    TimestampPriority,
    MergeOrClarify,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::ManualReview => "manual_review",
            Resolution::TimestampPriority => "timestamp_priority",
            Resolution::MergeOrClarify => "merge_or_clarify",
        }
    }
}

/// Report of two conflicting memories.
///
/// Produced transiently by detection and never persisted. `entry_a` is the
/// candidate that was checked, `entry_b` the existing entry it was checked
/// against; both are copies taken at detection time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictReport {
    pub entry_a: MemoryEntry,
    pub entry_b: MemoryEntry,
    pub conflict_type: ConflictType,
    /// Absolute confidence difference at detection time.
    pub confidence_delta: f64,
    pub suggested_resolution: Resolution,
}

impl ConflictReport {
    pub fn new(entry_a: &MemoryEntry, entry_b: &MemoryEntry, conflict_type: ConflictType) -> Self {
        Self {
            entry_a: entry_a.clone(),
            entry_b: entry_b.clone(),
            conflict_type,
            confidence_delta: (entry_a.confidence - entry_b.confidence).abs(),
            suggested_resolution: conflict_type.resolution(),
        }
    }
}

/// Input for `MemoryStore::add`.
///
/// A citation is attached only when a starting line is given.
#[derive(Debug, Clone, Default)]
pub struct NewMemory {
    pub content: String,
    pub path: String,
    pub source_type: String,
    pub line_start: Option<usize>,
    pub line_end: Option<usize>,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
}

impl NewMemory {
    pub fn new(
        content: impl Into<String>,
        path: impl Into<String>,
        source_type: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            path: path.into(),
            source_type: source_type.into(),
            ..Self::default()
        }
    }

    /// Cite an inclusive line range of the source.
    pub fn lines(mut self, line_start: usize, line_end: usize) -> Self {
        self.line_start = Some(line_start);
        self.line_end = Some(line_end);
        self
    }

    /// Cite a single starting line; the end defaults to the same line.
    pub fn line_start(mut self, line_start: usize) -> Self {
        self.line_start = Some(line_start);
        self
    }

    pub fn excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Result of adding a memory: the stored entry, its id, and the conflicts
/// found against entries that were already stored.
#[derive(Debug, Clone, Serialize)]
pub struct AddOutcome {
    pub id: String,
    pub entry: MemoryEntry,
    pub conflicts: Vec<ConflictReport>,
}

/// Default cap on search results.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Parameters for `MemoryStore::search`.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// Confidence floor for the strict pass.
    pub min_confidence: f64,
    pub max_results: usize,
    /// Only consider entries with this exact `source_type`.
    pub source_filter: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            min_confidence: 0.0,
            max_results: DEFAULT_MAX_RESULTS,
            source_filter: None,
        }
    }

    pub fn min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn source(mut self, source_type: impl Into<String>) -> Self {
        self.source_filter = Some(source_type.into());
        self
    }
}

/// A ranked search result: the entry as stored after scoring, plus its scores.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(flatten)]
    pub entry: MemoryEntry,
    /// Jaccard overlap between query and content, 4 decimals.
    pub relevance_score: f64,
    /// `confidence × relevance`, 4 decimals. Ranking key.
    pub combined_score: f64,
}

/// Whether the confidence floor had to be relaxed to produce the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fallback {
    pub used: bool,
    pub reason: Option<String>,
}

impl Fallback {
    pub(crate) fn unused() -> Self {
        Self {
            used: false,
            reason: None,
        }
    }

    pub(crate) fn relaxed(from_threshold: f64) -> Self {
        Self {
            used: true,
            reason: Some(format!(
                "No results above confidence threshold {from_threshold}; retried with threshold 0"
            )),
        }
    }
}

/// Whether any returned result carries a citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationMode {
    Auto,
    None,
}

/// Full response of a search call.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub count: usize,
    /// Floor that produced `results` (0 after a fallback).
    pub min_confidence_threshold: f64,
    pub fallback: Fallback,
    pub citations: CitationMode,
}
