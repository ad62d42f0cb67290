//! memquality - A quality layer for agent memory.
//!
//! Every stored fact carries a confidence score, an optional citation back to
//! its source, and is checked against existing facts for conflicts. Search
//! ranks by `confidence × relevance` and reports when it had to relax its
//! confidence floor to return anything.
//! All operations are synchronous (no async/await required).
//!
//! # Example
//!
//! ```no_run
//! use memquality::{Config, MemoryStore, NewMemory, SearchRequest};
//!
//! let config = Config::load().expect("Failed to load config");
//! let storage_dir = config.storage_dir.clone();
//! let mut store = MemoryStore::open(&storage_dir, config)
//!     .expect("Failed to open store");
//!
//! // Add a memory with conflict detection
//! let outcome = store
//!     .add(NewMemory::new("User prefers dark mode", "/workspace/USER.md", "USER.md").line_start(4))
//!     .expect("Failed to add memory");
//! println!("{} confidence={:.2}", outcome.id, outcome.entry.confidence);
//! for conflict in &outcome.conflicts {
//!     println!("conflicts with: {}", conflict.entry_b.content);
//! }
//!
//! // Search memories
//! let response = store
//!     .search(&SearchRequest::new("dark mode").min_confidence(0.5))
//!     .expect("Failed to search");
//! if response.fallback.used {
//!     println!("note: {}", response.fallback.reason.unwrap_or_default());
//! }
//! for hit in &response.results {
//!     println!("{:.2}: {}", hit.combined_score, hit.entry.content);
//! }
//!
//! store.close().expect("Failed to persist store");
//! ```
//!
//! # Mutability Requirements
//!
//! `search` and `get` take `&mut self`: reading a memory records the access,
//! and access counts feed back into confidence.

pub mod confidence;
pub mod config;
pub mod conflict;
pub mod errors;
pub mod memory;
pub mod memory_types;
pub mod similarity;
pub mod snapshot;

// Re-export public API
pub use confidence::{adjust_for_conflicts, calculate_confidence, calculate_confidence_at};
pub use config::Config;
pub use conflict::{ConflictClassifier, ConflictDetector, compute_semantic_hash};
pub use errors::Error;
pub use memory::MemoryStore;
pub use memory::store::{MAX_INPUT_LENGTH, MAX_SEARCH_LIMIT};
pub use memory_types::{
    AddOutcome, Citation, CitationMode, ConflictReport, ConflictType, Fallback, MemoryEntry,
    NewMemory, Resolution, SearchHit, SearchRequest, SearchResponse,
};
