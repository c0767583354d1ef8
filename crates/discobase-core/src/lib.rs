//! # Discobase Core
//!
//! Query engine for browsing a read-only branching dialogue corpus:
//!
//! - **Dialogue search**: Entries, orb/task records and alternate lines searched
//!   together, with quoted phrases, script fragments and whole-word matching
//! - **Paging**: Deterministic windows over the concatenated sources, so
//!   successive pages never skip or repeat rows
//! - **Conversation tree**: Slash-separated titles folded into a collapsed
//!   hierarchy with per-type filtering
//! - **Lookups**: Entries, alternates, skill checks, parent/child links,
//!   actors and variables
//! - **Entry cache**: Assembled entry details, optionally LRU-bounded
//! - **Import**: Dataset files built from the game's JSON export
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use discobase_core::{Dataset, DatasetConfig, FilterState};
//!
//! // Open the dataset named by DISCOBASE_DB_PATH (or the platform default)
//! let dataset = Dataset::open(DatasetConfig::from_env())?;
//!
//! // Whole-word search for lines mentioning "cop"
//! let filters = FilterState::default().with_whole_words(true);
//! let mut cursor = dataset.cursor("cop", filters);
//! while cursor.has_more() {
//!     cursor.fetch_next(&dataset)?;
//! }
//! println!("{} matches", cursor.refined_count());
//!
//! // Browse conversations as a tree
//! let tree = discobase_core::build_hierarchy(&dataset.conversations_for_tree(false)?);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod cache;
pub mod config;
pub mod dataset;
pub mod hierarchy;
pub mod import;
pub mod model;
pub mod search;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Record types
pub use model::{
    is_pseudo_root, ActorRecord, AlternateLine, AlternateSelection, CheckRecord,
    ConversationRecord, ConversationSummary, ConversationType, EntryDetails, EntryKey,
    EntryLinks, EntryRecord, EntrySummary, LinkRecord, VariableRecord, PSEUDO_ROOT_ENTRY_IDS,
};

// Dataset access
pub use dataset::{apply_schema, Dataset, DatasetError, Result, REQUIRED_TABLES};

// Search
pub use search::{
    plan_windows, ActorFilter, ConditionBuilder, FilterState, PagingMode, Predicate,
    QueryTokens, RowMatcher, SearchBackend, SearchCursor, SearchPage, SearchRequest,
    SearchRow, SearchSource, SourceCounts, VariablePage, Window, DEFAULT_LIMIT,
};

// Conversation tree
pub use hierarchy::{build_hierarchy, ConversationTree, TreeLeaf, TreeNode};

// Entry cache
pub use cache::EntryCache;

// Configuration
pub use config::{default_dataset_path, DatasetConfig, LOCAL_DATASET_PATH};

// Import
pub use import::{import_export, import_into, DialogueExport, ImportSummary};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        build_hierarchy, ConversationType, Dataset, DatasetConfig, DatasetError, EntryKey,
        FilterState, Result, SearchCursor, SearchRequest,
    };
}
