//! Add, get and conflict-scan operations for the memory store.

use crate::confidence::{adjust_for_conflicts, calculate_confidence};
use crate::conflict::{compute_semantic_hash, sha256_prefix, version_hash};
use crate::errors::Error;
use crate::memory_types::{
    AddOutcome, Citation, ConflictReport, MemoryEntry, NewMemory, now_timestamp,
};

use super::store::MemoryStore;

/// Characters of content used as the default citation excerpt.
const EXCERPT_CHARS: usize = 200;

/// Entry id: first 16 hex chars of `sha256(path:created_at)`.
fn entry_id(path: &str, created_at: &str) -> String {
    sha256_prefix(&format!("{path}:{created_at}"), 16)
}

fn build_citation(new: &NewMemory, timestamp: &str) -> Result<Option<Citation>, Error> {
    let Some(line_start) = new.line_start else {
        return Ok(None);
    };
    let line_end = new.line_end.unwrap_or(line_start);
    if line_end < line_start {
        return Err(Error::InvalidInput(format!(
            "line_end {line_end} is before line_start {line_start}"
        )));
    }

    let excerpt = match new.excerpt.as_deref() {
        Some(excerpt) if !excerpt.is_empty() => excerpt.to_string(),
        _ => new.content.chars().take(EXCERPT_CHARS).collect(),
    };

    Ok(Some(Citation {
        path: new.path.clone(),
        line_start,
        line_end,
        excerpt,
        timestamp: timestamp.to_string(),
        version_hash: version_hash(&new.path, line_start, &new.content),
    }))
}

impl MemoryStore {
    #[must_use = "handle the error or results may be lost"]
    /// Add a memory with conflict detection and confidence scoring.
    ///
    /// The entry is checked against every stored entry, scored, penalized
    /// for any conflicts found, stored and persisted. Conflicts never block
    /// the add; they are returned alongside the stored entry.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Content is empty or exceeds 100,000 bytes
    /// - `line_end` is before `line_start`
    /// - The snapshot cannot be written (`Persistence`)
    pub fn add(&mut self, new: NewMemory) -> Result<AddOutcome, Error> {
        Self::validate_input_length(&new.content)?;

        let now = now_timestamp();
        let citation = build_citation(&new, &now)?;

        let mut entry = MemoryEntry {
            semantic_hash: compute_semantic_hash(&new.content),
            content: new.content,
            path: new.path,
            source_type: new.source_type,
            created_at: now.clone(),
            last_accessed: now,
            access_count: 0,
            confidence: 0.0,
            citation,
            tags: new.tags,
        };

        let conflicts = self.detector.detect_conflicts(&entry, self.index.entries());

        entry.confidence = calculate_confidence(&entry, None);
        if !conflicts.is_empty() {
            entry.confidence = adjust_for_conflicts(&entry, &conflicts);
        }

        let id = entry_id(&entry.path, &entry.created_at);
        if self.index.insert(id.clone(), entry.clone()) {
            tracing::warn!(id = %id, "entry id collision, existing entry overwritten");
        }
        self.persist()?;

        tracing::debug!(
            id = %id,
            confidence = entry.confidence,
            conflicts = conflicts.len(),
            "memory added"
        );

        Ok(AddOutcome {
            id,
            entry,
            conflicts,
        })
    }

    #[must_use = "handle the error or results may be lost"]
    /// Get a specific memory by ID, recording the access.
    ///
    /// Returns `None` if the memory doesn't exist.
    pub fn get(&mut self, id: &str) -> Result<Option<MemoryEntry>, Error> {
        let Some(entry) = self.index.get_mut(id) else {
            return Ok(None);
        };
        entry.record_access(&now_timestamp());
        let found = entry.clone();
        self.persist()?;
        Ok(Some(found))
    }

    /// Every conflict among the stored entries, each pair tested once.
    pub fn get_all_conflicts(&self) -> Vec<ConflictReport> {
        let entries: Vec<&MemoryEntry> = self.index.entries().collect();
        self.detector.scan_all(&entries)
    }
}
