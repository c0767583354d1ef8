//! Dataset Module
//!
//! Read-only access to the dialogue dataset:
//! - Paged multi-source dialogue search and variable search
//! - Lookups backing the conversation and entry views
//! - The entry detail cache
//! - Schema used by the importer and test fixtures

mod rows;
pub mod schema;
mod sqlite;

use std::path::PathBuf;

pub use schema::{apply_schema, SchemaVersion, REQUIRED_TABLES, SCHEMA};
pub use sqlite::Dataset;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Dataset error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The dataset could not be opened or is not a dialogue dataset
    #[error("Dataset unavailable at {}: {reason}", path.display())]
    DatasetUnavailable { path: PathBuf, reason: String },
    /// A search predicate failed to run
    #[error("Query failed: {0}")]
    QueryExecution(String),
    /// Database error from a lookup, schema step or import
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed export file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Export content that cannot be imported
    #[error("Import error: {0}")]
    Import(String),
    /// A shared lock was poisoned by a panicking holder
    #[error("Lock error: {0}")]
    Lock(String),
}

/// Dataset result type
pub type Result<T> = std::result::Result<T, DatasetError>;
