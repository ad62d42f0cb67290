//! Versioned JSON snapshot of the memory index.
//!
//! Layout (version 1):
//!
//! ```json
//! { "version": 1, "entries": { "<id>": { ...MemoryEntry... } } }
//! ```
//!
//! A bare `{ "<id>": entry }` object is read as the legacy version 0 layout
//! and upgraded on the next write. Writes go to a temporary file in the same
//! directory which is then renamed over the snapshot.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::NamedTempFile;

use crate::errors::Error;
use crate::memory_types::MemoryEntry;

/// File name of the snapshot inside the storage directory.
pub const SNAPSHOT_FILE: &str = "index.json";

/// Schema version written by this crate.
pub const SCHEMA_VERSION: u64 = 1;

/// Version assigned to the unversioned legacy layout.
pub const LEGACY_VERSION: u64 = 0;

/// Id used in `MalformedRecord` errors about the document itself.
const DOCUMENT_ID: &str = "<snapshot>";

/// Records decoded from a snapshot, in file order.
#[derive(Debug, Default)]
pub struct Loaded {
    pub version: u64,
    pub records: Vec<(String, MemoryEntry)>,
}

fn malformed(id: &str, reason: impl Into<String>) -> Error {
    Error::MalformedRecord {
        id: id.to_string(),
        reason: reason.into(),
    }
}

/// Serialize entries into a pretty-printed version 1 document.
pub fn encode<'a, I>(entries: I) -> Result<String, Error>
where
    I: IntoIterator<Item = (&'a str, &'a MemoryEntry)>,
{
    let mut map = Map::new();
    for (id, entry) in entries {
        map.insert(id.to_string(), serde_json::to_value(entry)?);
    }
    let document = json!({
        "version": SCHEMA_VERSION,
        "entries": Value::Object(map),
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Check field values serde cannot check.
fn validate_record(id: &str, entry: &MemoryEntry) -> Result<(), Error> {
    if !entry.confidence.is_finite() || !(0.0..=1.0).contains(&entry.confidence) {
        return Err(malformed(
            id,
            format!("confidence {} outside [0, 1]", entry.confidence),
        ));
    }
    if let Some(citation) = &entry.citation {
        if citation.line_end < citation.line_start {
            return Err(malformed(
                id,
                format!(
                    "citation line_end {} before line_start {}",
                    citation.line_end, citation.line_start
                ),
            ));
        }
    }
    Ok(())
}

/// Parse a snapshot document of any supported version.
pub fn decode(text: &str) -> Result<Loaded, Error> {
    let Value::Object(mut root) = serde_json::from_str::<Value>(text)? else {
        return Err(malformed(DOCUMENT_ID, "top level is not a JSON object"));
    };

    let (version, entries) = match root.get("version").cloned() {
        None => (LEGACY_VERSION, root),
        Some(raw) => {
            let version = raw
                .as_u64()
                .ok_or_else(|| malformed(DOCUMENT_ID, "version is not an unsigned integer"))?;
            if version != SCHEMA_VERSION {
                return Err(Error::UnsupportedSchema(version));
            }
            match root.remove("entries") {
                Some(Value::Object(entries)) => (version, entries),
                Some(_) => return Err(malformed(DOCUMENT_ID, "entries is not an object")),
                None => return Err(malformed(DOCUMENT_ID, "missing field `entries`")),
            }
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (id, value) in entries {
        let entry: MemoryEntry =
            serde_json::from_value(value).map_err(|e| malformed(&id, e.to_string()))?;
        validate_record(&id, &entry)?;
        records.push((id, entry));
    }

    Ok(Loaded { version, records })
}

/// Snapshot file on disk.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    /// Snapshot stored as [`SNAPSHOT_FILE`] inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(SNAPSHOT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persistence_error(&self, source: std::io::Error) -> Error {
        Error::Persistence {
            path: self.path.clone(),
            source,
        }
    }

    /// Read and decode the snapshot. A missing file is an empty index.
    pub fn load(&self) -> Result<Loaded, Error> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Loaded {
                    version: SCHEMA_VERSION,
                    records: Vec::new(),
                });
            }
            Err(e) => return Err(self.persistence_error(e)),
        };

        let loaded = decode(&text)?;
        if loaded.version == LEGACY_VERSION {
            tracing::info!(
                path = %self.path.display(),
                "legacy snapshot layout, will be upgraded on next write"
            );
        }
        Ok(loaded)
    }

    /// Atomically replace the snapshot with `entries`.
    pub fn save<'a, I>(&self, entries: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (&'a str, &'a MemoryEntry)>,
    {
        let text = encode(entries)?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.persistence_error(e))?;
        tmp.write_all(text.as_bytes())
            .map_err(|e| self.persistence_error(e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| self.persistence_error(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.persistence_error(e.error))?;

        tracing::debug!(path = %self.path.display(), bytes = text.len(), "snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_types::Citation;
    use tempfile::TempDir;

    fn entry(content: &str) -> MemoryEntry {
        MemoryEntry {
            content: content.to_string(),
            path: "/test.md".to_string(),
            source_type: "session".to_string(),
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
            last_accessed: "2024-01-02T00:00:00.000000Z".to_string(),
            access_count: 3,
            confidence: 0.4321,
            citation: Some(Citation {
                path: "/test.md".to_string(),
                line_start: 4,
                line_end: 6,
                excerpt: "excerpt".to_string(),
                timestamp: "2024-01-01T00:00:00.000000Z".to_string(),
                version_hash: "deadbeef".to_string(),
            }),
            tags: vec!["a".to_string(), "a".to_string()],
            semantic_hash: "0011223344556677".to_string(),
        }
    }

    #[test]
    fn test_save_then_load_preserves_entries_and_order() {
        let dir = TempDir::new().unwrap();
        let snapshot = Snapshot::in_dir(dir.path());
        let second = entry("second");
        let first = entry("first");

        snapshot
            .save([("ffff000000000000", &second), ("0000ffffffffffff", &first)])
            .unwrap();
        let loaded = snapshot.load().unwrap();

        assert_eq!(loaded.version, SCHEMA_VERSION);
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].0, "ffff000000000000");
        assert_eq!(loaded.records[0].1, second);
        assert_eq!(loaded.records[1].1, first);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = Snapshot::in_dir(dir.path()).load().unwrap();
        assert!(loaded.records.is_empty());
    }

    #[test]
    fn test_save_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let snapshot = Snapshot::in_dir(dir.path());
        let e = entry("only");
        snapshot.save([("id", &e)]).unwrap();
        snapshot.save([("id", &e)]).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|d| d.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(SNAPSHOT_FILE)]);
    }

    #[test]
    fn test_encoded_document_is_versioned_and_pretty() {
        let e = entry("x");
        let text = encode([("id1", &e)]).unwrap();
        assert!(text.contains('\n'));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], SCHEMA_VERSION);
        assert_eq!(value["entries"]["id1"]["content"], "x");
        assert_eq!(value["entries"]["id1"]["citation"]["line_start"], 4);
    }

    #[test]
    fn test_decode_legacy_unversioned_layout() {
        let text = r#"{
            "abc": {
                "content": "User prefers tea", "path": "/user.md", "source_type": "USER.md",
                "created_at": "2024-01-01T10:00:00.123456",
                "last_accessed": "2024-01-01T10:00:00.123456",
                "access_count": 0, "confidence": 0.8, "citation": null,
                "tags": ["preference"], "semantic_hash": "0123456789abcdef"
            }
        }"#;
        let loaded = decode(text).unwrap();
        assert_eq!(loaded.version, LEGACY_VERSION);
        assert_eq!(loaded.records[0].0, "abc");
        assert_eq!(loaded.records[0].1.tags, vec!["preference".to_string()]);
    }

    #[test]
    fn test_decode_missing_field_is_malformed_record() {
        let text = r#"{ "version": 1, "entries": { "bad-id": { "content": "no path here" } } }"#;
        match decode(text) {
            Err(Error::MalformedRecord { id, reason }) => {
                assert_eq!(id, "bad-id");
                assert!(reason.contains("missing field"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_out_of_range_confidence_is_malformed() {
        let mut e = entry("x");
        e.confidence = 1.5;
        let text = encode([("id1", &e)]).unwrap();
        assert!(matches!(
            decode(&text),
            Err(Error::MalformedRecord { id, .. }) if id == "id1"
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let text = r#"{ "version": 7, "entries": {} }"#;
        assert!(matches!(decode(text), Err(Error::UnsupportedSchema(7))));
    }

    #[test]
    fn test_decode_rejects_non_object_document() {
        assert!(matches!(
            decode("[1, 2, 3]"),
            Err(Error::MalformedRecord { .. })
        ));
        assert!(matches!(decode("{not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_save_into_missing_directory_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        let snapshot = Snapshot::in_dir(&dir.path().join("gone"));
        let e = entry("x");
        assert!(matches!(
            snapshot.save([("id", &e)]),
            Err(Error::Persistence { .. })
        ));
    }
}
