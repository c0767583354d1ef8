//! Refinement pass
//!
//! The predicate's whole-word approximation over-matches in places and
//! under-matches in others. Fetched rows are re-checked here with real word
//! boundaries to produce the count shown next to a page. Refinement never
//! moves the paging offset, which always tracks underlying rows.

use regex::Regex;

use crate::search::results::SearchRow;
use crate::search::tokenizer::QueryTokens;

enum Term {
    Word(Regex),
    Substring(String),
}

impl Term {
    fn matches(&self, haystack: &str) -> bool {
        match self {
            Term::Word(re) => re.is_match(haystack),
            Term::Substring(s) => haystack.contains(s.as_str()),
        }
    }
}

/// Case-insensitive matcher for a token set
pub struct RowMatcher {
    terms: Vec<Term>,
}

impl RowMatcher {
    /// Build a matcher; with `whole_words` off, words match as substrings
    pub fn new(tokens: &QueryTokens, whole_words: bool) -> Self {
        let mut terms: Vec<Term> = tokens
            .substring_terms()
            .map(|t| Term::Substring(t.to_lowercase()))
            .collect();

        for word in &tokens.words {
            let lowered = word.to_lowercase();
            let term = if whole_words {
                let pattern = format!(r"(?:^|[^\w]){}(?:$|[^\w])", regex::escape(&lowered));
                match Regex::new(&pattern) {
                    Ok(re) => Term::Word(re),
                    Err(e) => {
                        tracing::warn!("Whole-word pattern for {:?} rejected: {}", word, e);
                        Term::Substring(lowered)
                    }
                }
            } else {
                Term::Substring(lowered)
            };
            terms.push(term);
        }

        Self { terms }
    }

    /// Whether `text` satisfies every term
    pub fn matches_text(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        self.terms.iter().all(|t| t.matches(&haystack))
    }

    /// Whether a row's text and title together satisfy every term
    pub fn matches(&self, row: &SearchRow) -> bool {
        let text = format!(
            "{} {}",
            row.dialogue_text.as_deref().unwrap_or_default(),
            row.title.as_deref().unwrap_or_default()
        );
        self.matches_text(&text)
    }

    /// Rows that pass refinement, in their original order
    pub fn refine<'r>(&self, rows: &'r [SearchRow]) -> Vec<&'r SearchRow> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }
}
