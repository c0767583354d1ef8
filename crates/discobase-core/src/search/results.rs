//! Search request and result types

use serde::{Deserialize, Serialize};

use crate::model::{EntryKey, VariableRecord};
use crate::search::filters::FilterState;
use crate::search::paging::SourceCounts;
use crate::search::source::SearchSource;

/// Default page size
pub const DEFAULT_LIMIT: usize = 50;

/// One page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
    pub offset: usize,
    pub filters: FilterState,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_LIMIT,
            offset: 0,
            filters: FilterState::default(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self
    }
}

/// A normalized result row from any source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRow {
    pub conversation_id: i64,
    /// `None` for conversation-level (orb/task) rows
    pub entry_id: Option<i64>,
    /// Entry text, conversation description, or the alternate line
    pub dialogue_text: Option<String>,
    pub title: Option<String>,
    pub actor: Option<i64>,
    pub is_hidden: bool,
    pub source: SearchSource,
    /// Set on rows from the alternates source
    pub is_alternate: bool,
    /// Gating condition of an alternate row
    pub alternate_condition: Option<String>,
}

impl SearchRow {
    pub fn entry_key(&self) -> Option<EntryKey> {
        self.entry_id
            .map(|entry_id| EntryKey::new(self.conversation_id, entry_id))
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub results: Vec<SearchRow>,
    /// Sum of the per-source counts; independent of offset and limit
    pub total: usize,
    pub counts: SourceCounts,
}

impl SearchPage {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// One page of variable search results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablePage {
    pub results: Vec<VariableRecord>,
    pub total: usize,
}
