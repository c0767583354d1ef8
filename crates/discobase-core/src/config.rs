//! Dataset configuration
//!
//! Environment variables:
//! - `DISCOBASE_DB_PATH`: dataset file
//! - `DISCOBASE_PAGE_SIZE`: rows per search page (default 50)
//! - `DISCOBASE_PAGING`: `sequential` (default) or `shared`
//! - `DISCOBASE_CACHE_CAPACITY`: bound the entry detail cache; unset keeps
//!   every entry

use std::num::NonZeroUsize;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::search::{PagingMode, DEFAULT_LIMIT};

/// Dataset file used when nothing else is configured and it exists
pub const LOCAL_DATASET_PATH: &str = "db/discobase.sqlite3";

const DATASET_FILE_NAME: &str = "discobase.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub page_size: usize,
    pub paging: PagingMode,
    pub cache_capacity: Option<NonZeroUsize>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            page_size: DEFAULT_LIMIT,
            paging: PagingMode::default(),
            cache_capacity: None,
        }
    }
}

impl DatasetConfig {
    /// Config for an explicit dataset file with default settings
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            page_size: DEFAULT_LIMIT,
            paging: PagingMode::default(),
            cache_capacity: None,
        }
    }

    /// Defaults overridden by `DISCOBASE_*` variables
    ///
    /// Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("DISCOBASE_DB_PATH") {
            if !path.trim().is_empty() {
                config.path = PathBuf::from(path);
            }
        }

        if let Ok(raw) = std::env::var("DISCOBASE_PAGE_SIZE") {
            match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => config.page_size = size,
                _ => tracing::warn!("Ignoring DISCOBASE_PAGE_SIZE={:?}", raw),
            }
        }

        if let Ok(raw) = std::env::var("DISCOBASE_PAGING") {
            match raw.parse::<PagingMode>() {
                Ok(mode) => config.paging = mode,
                Err(e) => tracing::warn!("Ignoring DISCOBASE_PAGING: {}", e),
            }
        }

        if let Ok(raw) = std::env::var("DISCOBASE_CACHE_CAPACITY") {
            match raw.trim().parse::<usize>().ok().and_then(NonZeroUsize::new) {
                Some(cap) => config.cache_capacity = Some(cap),
                None => tracing::warn!("Ignoring DISCOBASE_CACHE_CAPACITY={:?}", raw),
            }
        }

        config
    }

    pub fn with_paging(mut self, paging: PagingMode) -> Self {
        self.paging = paging;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: Option<NonZeroUsize>) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

/// `db/discobase.sqlite3` when present, otherwise the platform data directory
pub fn default_dataset_path() -> PathBuf {
    let local = PathBuf::from(LOCAL_DATASET_PATH);
    if local.exists() {
        return local;
    }
    match ProjectDirs::from("com", "discobase", "discobase") {
        Some(dirs) => dirs.data_dir().join(DATASET_FILE_NAME),
        None => local,
    }
}
