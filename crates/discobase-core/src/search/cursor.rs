//! Search cursor
//!
//! Holds one query's paging state: the request, how far it has been read and
//! the rows fetched so far.

use crate::dataset::Result;
use crate::search::refine::RowMatcher;
use crate::search::results::{SearchPage, SearchRequest, SearchRow};
use crate::search::tokenizer::QueryTokens;

/// Anything that can answer a page request
pub trait SearchBackend {
    fn search(&self, request: &SearchRequest) -> Result<SearchPage>;
}

/// Incremental reader over a search's pages
pub struct SearchCursor {
    request: SearchRequest,
    offset: usize,
    rows: Vec<SearchRow>,
    total: Option<usize>,
    matcher: RowMatcher,
}

impl SearchCursor {
    /// Start at the request's offset
    pub fn new(request: SearchRequest) -> Self {
        let tokens = QueryTokens::parse(&request.query);
        let matcher = RowMatcher::new(&tokens, request.filters.whole_words);
        Self {
            offset: request.offset,
            request,
            rows: Vec::new(),
            total: None,
            matcher,
        }
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// Underlying rows consumed so far, counted from the start
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn rows(&self) -> &[SearchRow] {
        &self.rows
    }

    /// Total reported by the last successful fetch
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// Whether another fetch can return rows
    pub fn has_more(&self) -> bool {
        match self.total {
            None => true,
            Some(total) => self.offset < total,
        }
    }

    /// Fetch the next page and append it
    ///
    /// On error the offset and fetched rows are left as they were, so the
    /// same page can be requested again.
    pub fn fetch_next<B: SearchBackend + ?Sized>(&mut self, backend: &B) -> Result<&[SearchRow]> {
        let request = self.request.clone().with_offset(self.offset);
        let page = backend.search(&request)?;

        let start = self.rows.len();
        self.offset += page.results.len();
        self.total = Some(page.total);
        // An empty page ends the cursor even if the reported total is larger
        if page.results.is_empty() {
            self.total = Some(self.offset);
        }
        self.rows.extend(page.results);
        Ok(&self.rows[start..])
    }

    /// Fetch until the total is reached
    pub fn fetch_all<B: SearchBackend + ?Sized>(&mut self, backend: &B) -> Result<&[SearchRow]> {
        while self.has_more() {
            self.fetch_next(backend)?;
        }
        Ok(&self.rows)
    }

    /// Fetched rows that pass the word-boundary refinement
    pub fn refined_rows(&self) -> Vec<&SearchRow> {
        self.matcher.refine(&self.rows)
    }

    pub fn refined_count(&self) -> usize {
        self.refined_rows().len()
    }
}
