//! Test Dataset Manager
//!
//! Provides isolated dataset files for testing:
//! - Temporary dataset files that are automatically cleaned up
//! - Pre-seeded corpora written through a writable connection
//! - Read-only `Dataset` handles opened the way the browser opens them

use std::path::{Path, PathBuf};

use discobase_core::{apply_schema, Dataset, DatasetConfig, PagingMode};
use rusqlite::Connection;
use tempfile::TempDir;

use crate::mocks::DialogueFactory;

/// Manager for test datasets
///
/// Seeds a dataset file in a temporary directory, then opens it read-only.
/// The file is deleted when the manager is dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatasetManager::with_precinct_corpus();
/// let dataset = db.open();
/// let page = dataset.search(&SearchRequest::new("cop"))?;
/// ```
pub struct TestDatasetManager {
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: TempDir,
    /// Path to the dataset file
    db_path: PathBuf,
}

impl TestDatasetManager {
    /// An empty dataset with the full schema
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_discobase.sqlite3");

        let conn = Connection::open(&db_path).expect("Failed to create dataset file");
        apply_schema(&conn).expect("Failed to apply schema");

        Self {
            _temp_dir: temp_dir,
            db_path,
        }
    }

    /// A dataset seeded with the precinct corpus
    pub fn with_precinct_corpus() -> Self {
        let db = Self::new_temp();
        db.seed(DialogueFactory::create_precinct_corpus);
        db
    }

    /// A dataset seeded with bulk lines for paging
    pub fn with_bulk_lines(count: usize, orbs: usize) -> Self {
        let db = Self::new_temp();
        db.seed(|conn| DialogueFactory::create_bulk_lines(conn, count, orbs));
        db
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Write rows through a short-lived writable connection
    pub fn seed(&self, f: impl FnOnce(&Connection)) {
        let conn = Connection::open(&self.db_path).expect("Failed to open dataset for seeding");
        f(&conn);
    }

    pub fn config(&self) -> DatasetConfig {
        DatasetConfig::at(&self.db_path)
    }

    /// Open read-only with default settings
    pub fn open(&self) -> Dataset {
        Dataset::open(self.config()).expect("Failed to open dataset")
    }

    pub fn open_with_paging(&self, paging: PagingMode) -> Dataset {
        Dataset::open(self.config().with_paging(paging)).expect("Failed to open dataset")
    }

    pub fn open_with(&self, config: DatasetConfig) -> Dataset {
        Dataset::open(config).expect("Failed to open dataset")
    }
}
