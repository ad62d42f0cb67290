//! Core memory store struct combining the in-memory index and its snapshot.

use std::collections::HashMap;
use std::path::Path;

use crate::config::Config;
use crate::conflict::ConflictDetector;
use crate::errors::Error;
use crate::memory_types::MemoryEntry;
use crate::snapshot::Snapshot;

/// Maximum allowed input length (100,000 bytes).
pub const MAX_INPUT_LENGTH: usize = 100_000;
/// Maximum allowed limit for search operations.
pub const MAX_SEARCH_LIMIT: usize = 10_000;

/// Insertion-ordered map from entry id to entry.
#[derive(Debug, Default)]
pub(crate) struct Index {
    entries: Vec<(String, MemoryEntry)>,
    positions: HashMap<String, usize>,
}

impl Index {
    pub(crate) fn from_records(records: Vec<(String, MemoryEntry)>) -> Self {
        let mut index = Self::default();
        for (id, entry) in records {
            index.insert(id, entry);
        }
        index
    }

    /// Insert or replace. Returns `true` when an existing entry was replaced
    /// (it keeps its original position).
    pub(crate) fn insert(&mut self, id: String, entry: MemoryEntry) -> bool {
        match self.positions.get(&id) {
            Some(&pos) => {
                self.entries[pos].1 = entry;
                true
            }
            None => {
                self.positions.insert(id.clone(), self.entries.len());
                self.entries.push((id, entry));
                false
            }
        }
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut MemoryEntry> {
        let pos = *self.positions.get(id)?;
        Some(&mut self.entries[pos].1)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &MemoryEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut MemoryEntry)> {
        self.entries.iter_mut().map(|(id, entry)| (id.as_str(), entry))
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.iter().map(|(_, entry)| entry)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Memory store owning the entry index and persisting it as one snapshot.
///
/// Single owner, synchronous: every call runs to completion and mutating
/// calls rewrite the snapshot before returning. Share it across threads only
/// behind a lock.
pub struct MemoryStore {
    pub(crate) index: Index,
    pub(crate) snapshot: Snapshot,
    pub(crate) detector: ConflictDetector,
    pub(crate) config: Config,
}

impl MemoryStore {
    /// Open (or create) the store kept in `storage_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The path contains `..` components
    /// - The directory cannot be created or the snapshot cannot be read (`Persistence`)
    /// - The snapshot holds an invalid record (`MalformedRecord`) or unknown schema
    pub fn open(storage_dir: &Path, config: Config) -> Result<Self, Error> {
        use std::path::Component;

        // Path traversal guard: reject parent directory components
        for component in storage_dir.components() {
            if matches!(component, Component::ParentDir) {
                return Err(Error::Config(
                    "Invalid storage path: contains '..' which may escape the intended directory"
                        .to_string(),
                ));
            }
        }

        std::fs::create_dir_all(storage_dir).map_err(|source| Error::Persistence {
            path: storage_dir.to_path_buf(),
            source,
        })?;

        let snapshot = Snapshot::in_dir(storage_dir);
        let loaded = snapshot.load()?;
        let index = Index::from_records(loaded.records);
        tracing::info!(
            entries = index.len(),
            path = %snapshot.path().display(),
            "memory store opened"
        );

        Ok(MemoryStore {
            index,
            snapshot,
            detector: ConflictDetector::new(config.conflict_threshold),
            config,
        })
    }

    /// Persist the final state and release the store.
    pub fn close(self) -> Result<(), Error> {
        self.persist()
    }

    /// Rewrite the snapshot from the current index.
    pub(crate) fn persist(&self) -> Result<(), Error> {
        self.snapshot.save(self.index.iter())
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.len() == 0
    }

    /// Location of the snapshot file.
    pub fn snapshot_path(&self) -> &Path {
        self.snapshot.path()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate input length (rejects empty and whitespace-only inputs).
    pub(crate) fn validate_input_length(text: &str) -> Result<(), Error> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        if text.len() > MAX_INPUT_LENGTH {
            return Err(Error::InputTooLong {
                max_length: MAX_INPUT_LENGTH,
                actual_length: text.len(),
            });
        }
        Ok(())
    }
}

/// Validate a result limit against `1..=MAX_SEARCH_LIMIT`.
pub(crate) fn validate_limit(limit: usize) -> Result<(), Error> {
    if limit == 0 {
        return Err(Error::InvalidLimit("limit must be at least 1".to_string()));
    }
    if limit > MAX_SEARCH_LIMIT {
        return Err(Error::InvalidLimit(format!(
            "limit {limit} exceeds maximum {MAX_SEARCH_LIMIT}"
        )));
    }
    Ok(())
}
