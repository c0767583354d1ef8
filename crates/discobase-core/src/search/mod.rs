//! Search Module
//!
//! Dialogue search over three sources unioned together:
//! - Tokenizing raw queries into phrases, script fragments and words
//! - Building one conjunctive SQL predicate per source
//! - Planning page windows over the concatenated sources
//! - Refining fetched rows with real word boundaries
//! - Cursors that page through a query incrementally

mod condition;
mod cursor;
mod filters;
mod paging;
mod refine;
mod results;
mod source;
mod tokenizer;

pub use condition::{
    quote_literal, text_conditions, variable_predicate, whole_word_patterns, ConditionBuilder,
    Predicate, WORD_BARRIERS,
};

pub use cursor::{SearchBackend, SearchCursor};

pub use filters::{ActorFilter, FilterState};

pub use paging::{plan_windows, PagingMode, SourceCounts, Window};

pub use refine::RowMatcher;

pub use results::{SearchPage, SearchRequest, SearchRow, VariablePage, DEFAULT_LIMIT};

pub use source::SearchSource;

pub use tokenizer::QueryTokens;
