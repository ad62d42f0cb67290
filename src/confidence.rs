//! Confidence scoring for memory entries.
//!
//! A confidence score blends four signals into `[0, 1]`:
//!
//! ```text
//! confidence = (base × 0.5 + recency × 0.3 + access × 0.1 + citation × 0.1) × relevance
//! ```
//!
//! - `base`: fixed weight of the entry's provenance channel
//! - `recency`: `e^(-age_days / 30)`, or 0.5 when the creation time is unreadable
//! - `access`: `min(ln(1 + access_count) × 0.05, 0.10)`
//! - `citation`: 0.05 when the entry carries a citation
//! - `relevance`: query relevance multiplier, 1.0 outside of search
//!
//! Every output is clamped into `[0, 1]` and rounded to 4 decimal places.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::memory_types::{ConflictReport, ConflictType, MemoryEntry};

/// Base weight per provenance channel.
pub const SOURCE_TYPE_WEIGHTS: [(&str, f64); 7] = [
    ("USER.md", 1.0),
    ("MEMORY.md", 0.95),
    ("AGENTS.md", 0.90),
    ("session", 0.85),
    ("heartbeat", 0.70),
    ("inferred", 0.50),
    ("fallback", 0.40),
];

/// Base weight for source types missing from the table.
pub const DEFAULT_SOURCE_WEIGHT: f64 = 0.50;

/// Age in days at which recency has decayed to 1/e.
pub const RECENCY_DECAY_DAYS: f64 = 30.0;

/// Maximum bonus from repeated access.
pub const ACCESS_BONUS_MAX: f64 = 0.10;

/// Recency used when `created_at` cannot be parsed.
const NEUTRAL_RECENCY: f64 = 0.5;

const CITATION_BONUS: f64 = 0.05;

/// Cap on the total reduction applied for conflicts.
const CONFLICT_PENALTY_CAP: f64 = 0.5;

/// Base weight for a provenance channel.
pub fn source_weight(source_type: &str) -> f64 {
    SOURCE_TYPE_WEIGHTS
        .iter()
        .find(|(name, _)| *name == source_type)
        .map(|(_, weight)| *weight)
        .unwrap_or(DEFAULT_SOURCE_WEIGHT)
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339, and offset-less ISO 8601 (read as UTC) as written by
/// legacy snapshots.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Exponential recency factor for an entry created at `created_at`.
///
/// Age is counted in whole days.
pub fn recency_factor(created_at: &str, now: DateTime<Utc>) -> f64 {
    match parse_timestamp(created_at) {
        Some(created) => {
            let days_old = now.signed_duration_since(created).num_days() as f64;
            (-days_old / RECENCY_DECAY_DAYS).exp()
        }
        None => {
            tracing::warn!(created_at, "unparsable creation timestamp, using neutral recency");
            NEUTRAL_RECENCY
        }
    }
}

/// Diminishing bonus for repeated access.
pub fn access_bonus(access_count: u64) -> f64 {
    ((access_count as f64).ln_1p() * 0.05).min(ACCESS_BONUS_MAX)
}

/// Round to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Calculate the confidence of `entry` as of now.
///
/// `query_relevance` scales the score during search; `None` means 1.0.
pub fn calculate_confidence(entry: &MemoryEntry, query_relevance: Option<f64>) -> f64 {
    calculate_confidence_at(entry, query_relevance, Utc::now())
}

/// Calculate the confidence of `entry` relative to a fixed `now`.
pub fn calculate_confidence_at(
    entry: &MemoryEntry,
    query_relevance: Option<f64>,
    now: DateTime<Utc>,
) -> f64 {
    let base = source_weight(&entry.source_type);
    let recency = recency_factor(&entry.created_at, now);
    let access = access_bonus(entry.access_count);
    let citation = if entry.citation.is_some() {
        CITATION_BONUS
    } else {
        0.0
    };
    let relevance = query_relevance.unwrap_or(1.0);

    let confidence = (base * 0.5 + recency * 0.3 + access * 0.1 + citation * 0.1) * relevance;
    round4(clamp_unit(confidence))
}

/// Penalty for a single conflict of the given kind.
pub fn conflict_penalty(conflict_type: ConflictType) -> f64 {
    match conflict_type {
        ConflictType::Contradiction => 0.30,
        ConflictType::Temporal => 0.15,
        ConflictType::Semantic => 0.10,
    }
}

/// Reduce `entry`'s confidence for the conflicts it takes part in.
///
/// Each report's `entry_b` is the counterpart. A penalty is halved when
/// `entry` is the more trusted side. The total reduction is capped at 0.5.
pub fn adjust_for_conflicts(entry: &MemoryEntry, conflicts: &[ConflictReport]) -> f64 {
    if conflicts.is_empty() {
        return clamp_unit(entry.confidence);
    }

    let total_penalty: f64 = conflicts
        .iter()
        .map(|conflict| {
            let penalty = conflict_penalty(conflict.conflict_type);
            if entry.confidence > conflict.entry_b.confidence {
                penalty * 0.5
            } else {
                penalty
            }
        })
        .sum();

    let adjusted = entry.confidence - total_penalty.min(CONFLICT_PENALTY_CAP);
    round4(clamp_unit(adjusted))
}
