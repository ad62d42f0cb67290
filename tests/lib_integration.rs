//! Integration tests testing memquality library API from external crate perspective.

use std::path::{Path, PathBuf};

use memquality::errors::Error;
use memquality::{
    Config, ConflictType, MAX_INPUT_LENGTH, MAX_SEARCH_LIMIT, MemoryStore, NewMemory, Resolution,
    SearchRequest, compute_semantic_hash,
};
use tempfile::TempDir;

fn open(dir: &Path) -> MemoryStore {
    let config = Config {
        storage_dir: dir.to_path_buf(),
        ..Config::default()
    };
    MemoryStore::open(dir, config).expect("Failed to open store")
}

/// Test basic memory add and search operations.
#[test]
fn test_memory_store_add_then_search_returns_matching_memory() {
    let dir = TempDir::new().unwrap();
    let mut store = open(dir.path());

    let outcome = store
        .add(NewMemory::new(
            "Alice works at Microsoft",
            "/workspace/MEMORY.md",
            "MEMORY.md",
        ))
        .expect("Failed to add memory");

    assert_eq!(outcome.id.len(), 16);
    assert!(outcome.conflicts.is_empty());

    let response = store
        .search(&SearchRequest::new("where does alice work at"))
        .expect("Failed to search");

    assert_eq!(response.count, 1);
    assert_eq!(response.results[0].entry.content, "Alice works at Microsoft");
    assert_eq!(response.results[0].id, outcome.id);
}

/// Test that path traversal strings are rejected by MemoryStore::open().
#[test]
fn test_memory_store_open_with_path_traversal_returns_error() {
    let traversal_path = PathBuf::from("../../../etc/memquality");

    let result = MemoryStore::open(&traversal_path, Config::default());

    assert!(matches!(result, Err(Error::Config(_))));
}

/// Test that empty input is rejected by add().
#[test]
fn test_add_with_empty_input_returns_error() {
    let dir = TempDir::new().unwrap();
    let mut store = open(dir.path());

    let result = store.add(NewMemory::new("", "/a.md", "session"));

    assert!(matches!(result, Err(Error::EmptyInput)));
}

/// Test that oversized input is rejected by add().
#[test]
fn test_add_with_input_too_long_returns_error() {
    let dir = TempDir::new().unwrap();
    let mut store = open(dir.path());

    let content = "a".repeat(MAX_INPUT_LENGTH + 1);
    let result = store.add(NewMemory::new(content, "/a.md", "session"));

    assert!(matches!(
        result,
        Err(Error::InputTooLong {
            max_length: MAX_INPUT_LENGTH,
            ..
        })
    ));
}

/// Test that limits above the maximum are rejected by search().
#[test]
fn test_search_with_limit_too_large_returns_error() {
    let dir = TempDir::new().unwrap();
    let mut store = open(dir.path());

    let result = store.search(&SearchRequest::new("test").max_results(MAX_SEARCH_LIMIT + 1));

    assert!(matches!(result, Err(Error::InvalidLimit(_))));
}

/// Test that a contradiction is reported and penalized but still stored.
#[test]
fn test_add_contradiction_is_reported_and_stored() {
    let dir = TempDir::new().unwrap();
    let mut store = open(dir.path());

    store
        .add(NewMemory::new("User likes coffee", "/workspace/USER.md", "USER.md"))
        .unwrap();
    let outcome = store
        .add(NewMemory::new(
            "User does not like coffee",
            "/sessions/today.md",
            "session",
        ))
        .unwrap();

    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].conflict_type, ConflictType::Contradiction);
    assert_eq!(
        outcome.conflicts[0].suggested_resolution,
        Resolution::ManualReview
    );
    assert!(outcome.entry.confidence < 0.725);
    assert_eq!(store.len(), 2);
}

/// Test that a changed fact over time is classified as temporal.
#[test]
fn test_add_temporal_change_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut store = open(dir.path());

    store
        .add(NewMemory::new(
            "User lived in Boston before",
            "/notes/2023.md",
            "session",
        ))
        .unwrap();
    let outcome = store
        .add(NewMemory::new(
            "User lives in New York now",
            "/notes/2024.md",
            "session",
        ))
        .unwrap();

    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].conflict_type, ConflictType::Temporal);
    assert_eq!(
        outcome.conflicts[0].suggested_resolution,
        Resolution::TimestampPriority
    );
}

/// Test that the full scan reports every conflicting pair once.
#[test]
fn test_get_all_conflicts_reports_each_pair_once() {
    let dir = TempDir::new().unwrap();
    let mut store = open(dir.path());

    store
        .add(NewMemory::new("User likes coffee", "/a.md", "USER.md"))
        .unwrap();
    store
        .add(NewMemory::new("User does not like coffee", "/b.md", "session"))
        .unwrap();

    let conflicts = store.get_all_conflicts();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].entry_a.path, "/a.md");
    assert_eq!(conflicts[0].entry_b.path, "/b.md");
}

/// Test that the fallback block is populated when the floor is relaxed.
#[test]
fn test_search_fallback_is_transparent() {
    let dir = TempDir::new().unwrap();
    let mut store = open(dir.path());

    store
        .add(NewMemory::new("User enjoys hiking", "/guess.md", "fallback"))
        .unwrap();

    let response = store
        .search(&SearchRequest::new("hiking").min_confidence(0.95))
        .unwrap();

    assert_eq!(response.count, 1);
    assert!(response.fallback.used);
    assert!(response.fallback.reason.is_some());
    assert_eq!(response.min_confidence_threshold, 0.0);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["fallback"]["used"], true);
    assert_eq!(json["citations"], "none");
    assert_eq!(json["results"][0]["content"], "User enjoys hiking");
}

/// Test that memories and their citations survive a close and reopen.
#[test]
fn test_store_reopen_preserves_memories() {
    let dir = TempDir::new().unwrap();

    let id = {
        let mut store = open(dir.path());
        let outcome = store
            .add(
                NewMemory::new("Project uses Rust", "/workspace/AGENTS.md", "AGENTS.md")
                    .lines(10, 12)
                    .tags(["stack"]),
            )
            .unwrap();
        store.close().unwrap();
        outcome.id
    };

    let mut store = open(dir.path());
    let entry = store.get(&id).unwrap().expect("memory should survive reopen");

    assert_eq!(entry.content, "Project uses Rust");
    assert_eq!(entry.tags, vec!["stack"]);
    let citation = entry.citation.expect("citation should survive reopen");
    assert_eq!((citation.line_start, citation.line_end), (10, 12));
    assert_eq!(citation.excerpt, "Project uses Rust");
}

/// Test that the snapshot file is written in the versioned layout.
#[test]
fn test_snapshot_file_is_versioned() {
    let dir = TempDir::new().unwrap();
    let mut store = open(dir.path());
    let outcome = store
        .add(NewMemory::new("User likes tea", "/a.md", "session"))
        .unwrap();

    let text = std::fs::read_to_string(store.snapshot_path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["version"], 1);
    assert_eq!(value["entries"][&outcome.id]["content"], "User likes tea");
}

/// Test that a corrupt record is reported instead of silently dropped.
#[test]
fn test_open_with_malformed_record_returns_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("index.json"),
        r#"{"version": 1, "entries": {"bad": {"content": "missing everything else"}}}"#,
    )
    .unwrap();

    let config = Config {
        storage_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let result = MemoryStore::open(dir.path(), config);

    assert!(matches!(result, Err(Error::MalformedRecord { ref id, .. }) if id == "bad"));
}

/// Test that the stored fingerprint matches the crate-root hash helper.
#[test]
fn test_semantic_hash_is_exposed_at_crate_root() {
    let dir = TempDir::new().unwrap();
    let mut store = open(dir.path());

    let outcome = store
        .add(NewMemory::new("User likes tea!", "/a.md", "session"))
        .unwrap();

    assert_eq!(outcome.entry.semantic_hash, compute_semantic_hash("User likes tea!"));
    assert_eq!(
        compute_semantic_hash("User  likes TEA"),
        compute_semantic_hash("user likes tea")
    );
}
