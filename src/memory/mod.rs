//! Core memory store orchestrating scoring, conflict detection and persistence.
//!
//! Provides a high-level API for storing, searching, and retrieving memories
//! with confidence scores, citations and conflict reports.

mod crud;
mod search;

// pub(crate): module internals hidden; public items re-exported explicitly via lib.rs
pub(crate) mod store;

pub use store::MemoryStore;
