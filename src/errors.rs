//! Error types for memquality.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for memquality operations.
#[derive(Error, Debug)]
pub enum Error {
    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Empty or whitespace-only input.
    #[error("Input cannot be empty")]
    EmptyInput,

    /// Input exceeds the maximum accepted length.
    #[error("Input too long: {actual_length} bytes (max {max_length})")]
    InputTooLong {
        max_length: usize,
        actual_length: usize,
    },

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Result limit out of range.
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    /// No entry with the given id.
    #[error("Memory not found: {0}")]
    NotFound(String),

    /// A persisted record is missing a required field or has the wrong shape.
    #[error("Malformed record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    /// Snapshot written by an unknown schema version.
    #[error("Unsupported snapshot schema version: {0}")]
    UnsupportedSchema(u64),

    /// The snapshot could not be read or written.
    #[error("Failed to persist snapshot {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
