//! JSON response types and formatting for CLI output.

use memquality::{Citation, ConflictReport, ConflictType, MemoryEntry, Resolution};
use serde::Serialize;

/// Response for successful memory addition.
#[derive(Serialize)]
pub struct AddResponse {
    pub status: String,
    pub id: String,
    pub confidence: f64,
    pub citation: Option<Citation>,
    pub conflicts: Vec<ConflictItem>,
}

/// Response for retrieving a specific memory.
#[derive(Serialize)]
pub struct GetResponse {
    pub id: String,
    #[serde(flatten)]
    pub entry: MemoryEntry,
}

/// Response for the full conflict scan.
#[derive(Serialize)]
pub struct ConflictsResponse {
    pub count: usize,
    pub conflicts: Vec<ConflictItem>,
}

/// One side of a reported conflict.
#[derive(Serialize)]
pub struct ConflictSide {
    pub content: String,
    pub path: String,
    pub source_type: String,
    pub confidence: f64,
}

impl From<&MemoryEntry> for ConflictSide {
    fn from(entry: &MemoryEntry) -> Self {
        Self {
            content: entry.content.clone(),
            path: entry.path.clone(),
            source_type: entry.source_type.clone(),
            confidence: entry.confidence,
        }
    }
}

/// Individual conflict in a response.
#[derive(Serialize)]
pub struct ConflictItem {
    pub conflict_type: ConflictType,
    pub suggested_resolution: Resolution,
    pub confidence_delta: f64,
    pub entry_a: ConflictSide,
    pub entry_b: ConflictSide,
}

impl From<&ConflictReport> for ConflictItem {
    fn from(report: &ConflictReport) -> Self {
        Self {
            conflict_type: report.conflict_type,
            suggested_resolution: report.suggested_resolution,
            confidence_delta: report.confidence_delta,
            entry_a: ConflictSide::from(&report.entry_a),
            entry_b: ConflictSide::from(&report.entry_b),
        }
    }
}

/// Response for errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Print a value as formatted JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print one conflict as indented text.
pub fn print_conflict(report: &ConflictReport) {
    println!(
        "  [{}] {} (delta {:.4})",
        report.conflict_type.as_str(),
        report.suggested_resolution.as_str(),
        report.confidence_delta
    );
    println!("    a: {} ({})", report.entry_a.content, report.entry_a.path);
    println!("    b: {} ({})", report.entry_b.content, report.entry_b.path);
}
