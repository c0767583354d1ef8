//! Paging
//!
//! A search concatenates three sources. The page window is planned from the
//! per-source counts before any rows are fetched, so each source is queried
//! with exactly the slice it contributes.

use serde::{Deserialize, Serialize};

use crate::search::source::SearchSource;

/// How an `offset`/`limit` window maps onto the three sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// One window over the concatenated sequence; every row appears on
    /// exactly one page
    #[default]
    Sequential,
    /// The same window applied to each source independently. A page can then
    /// hold up to three times `limit` rows and a source with fewer rows than
    /// the others runs out early.
    #[serde(alias = "shared")]
    SharedOffset,
}

impl std::str::FromStr for PagingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(PagingMode::Sequential),
            "shared" | "shared_offset" | "sharedoffset" => Ok(PagingMode::SharedOffset),
            other => Err(format!("unknown paging mode: {}", other)),
        }
    }
}

/// Unlimited match count per source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    pub entries: usize,
    pub conversations: usize,
    pub alternates: usize,
}

impl SourceCounts {
    pub fn get(&self, source: SearchSource) -> usize {
        match source {
            SearchSource::Entries => self.entries,
            SearchSource::Conversations => self.conversations,
            SearchSource::Alternates => self.alternates,
        }
    }

    pub fn set(&mut self, source: SearchSource, count: usize) {
        match source {
            SearchSource::Entries => self.entries = count,
            SearchSource::Conversations => self.conversations = count,
            SearchSource::Alternates => self.alternates = count,
        }
    }

    pub fn total(&self) -> usize {
        self.entries + self.conversations + self.alternates
    }
}

/// Slice of one source to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub limit: usize,
}

impl Window {
    pub const EMPTY: Window = Window { offset: 0, limit: 0 };

    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }
}

/// Plan the per-source windows for a page, in [`SearchSource::ORDER`]
pub fn plan_windows(
    offset: usize,
    limit: usize,
    counts: &SourceCounts,
    mode: PagingMode,
) -> [(SearchSource, Window); 3] {
    let mut windows = SearchSource::ORDER.map(|source| (source, Window::EMPTY));

    match mode {
        PagingMode::SharedOffset => {
            for (source, window) in windows.iter_mut() {
                let count = counts.get(*source);
                if offset < count {
                    *window = Window {
                        offset,
                        limit: limit.min(count - offset),
                    };
                }
            }
        }
        PagingMode::Sequential => {
            let mut skip = offset;
            let mut remaining = limit;
            for (source, window) in windows.iter_mut() {
                if remaining == 0 {
                    break;
                }
                let count = counts.get(*source);
                if skip >= count {
                    skip -= count;
                    continue;
                }
                let take = remaining.min(count - skip);
                *window = Window {
                    offset: skip,
                    limit: take,
                };
                remaining -= take;
                skip = 0;
            }
        }
    }

    windows
}
