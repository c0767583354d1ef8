//! Condition Builder
//!
//! Turns query tokens and a [`FilterState`] into one conjunctive SQL predicate
//! per content source. Every token is a hard requirement: precision over
//! recall.
//!
//! Literals are interpolated into the predicate text, so every string passes
//! through [`quote_literal`], which doubles the `'` delimiter. Numeric ids are
//! formatted from `i64` and never need quoting. LIKE wildcards typed by the
//! user (`%`, `_`) keep their engine meaning.
//!
//! ## Whole words
//!
//! The engine only offers substring matching, so "whole word" is approximated:
//! a word must sit between two characters from [`WORD_BARRIERS`] (or the
//! start/end of the text), equal the whole column, or appear wrapped in
//! brackets or parentheses. This misses some real boundaries, e.g. `cop.` in
//! the middle of a sentence, and the refinement pass in `refine` is what
//! produces exact display counts.
//!
//! Barriers are literal characters: whole-word clauses carry `ESCAPE '\'` and
//! the `_` and `\` barriers are escaped, so `_cop %` never stands for "any
//! character before cop".

use crate::search::filters::FilterState;
use crate::search::source::SearchSource;
use crate::search::tokenizer::QueryTokens;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Characters accepted as neighbours of a whole word; `""` stands for the
/// start or end of the text
pub const WORD_BARRIERS: &[&str] = &[
    "'", "\"", "\\", "//", " ", ".", "!", "?", "$", "#", ">", "*", ":", "_", "(", ")", "[", "]",
    "--", "",
];

// ============================================================================
// LITERALS
// ============================================================================

/// Quote a string for interpolation into SQL, doubling embedded quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn like(column: &str, pattern: &str) -> String {
    format!("{} LIKE {}", column, quote_literal(pattern))
}

fn like_escaped(column: &str, pattern: &str) -> String {
    format!("{} LIKE {} ESCAPE '\\'", column, quote_literal(pattern))
}

/// Escape LIKE metacharacters so `text` only matches itself
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn id_list(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// LIKE patterns accepting `word` as a whole word, without duplicates
///
/// Patterns are meant for `LIKE .. ESCAPE '\'`. A backslash in `word` is
/// escaped; `%` and `_` typed by the user stay wildcards.
pub fn whole_word_patterns(word: &str) -> Vec<String> {
    let word = word.replace('\\', "\\\\");
    let mut patterns: Vec<String> = Vec::new();
    for barrier in WORD_BARRIERS.iter().map(|b| escape_like(b)) {
        let candidates = [
            format!("% {word} %"),
            format!("{barrier}{word} %"),
            format!("% {word}{barrier}"),
            format!("{barrier}{word}{barrier}"),
            word.clone(),
            format!("%[{barrier}{word}{barrier}]%"),
            format!("%[{word}]%"),
            format!("%({barrier}{word}{barrier})%"),
            format!("%({word})%"),
        ];
        for candidate in candidates {
            if !patterns.contains(&candidate) {
                patterns.push(candidate);
            }
        }
    }
    patterns
}

/// Substring match of `term` against any of `columns`
fn substring_condition(columns: &[&str], term: &str) -> String {
    let pattern = format!("%{term}%");
    let parts: Vec<String> = columns.iter().map(|c| like(c, &pattern)).collect();
    format!("({})", parts.join(" OR "))
}

/// Whole-word match of `word` against any of `columns`
fn whole_word_condition(columns: &[&str], word: &str) -> String {
    let patterns = whole_word_patterns(word);
    let parts: Vec<String> = columns
        .iter()
        .flat_map(|c| patterns.iter().map(move |p| like_escaped(c, p)))
        .collect();
    format!("({})", parts.join(" OR "))
}

/// Text conditions for a token set over a set of columns
pub fn text_conditions(tokens: &QueryTokens, columns: &[&str], whole_words: bool) -> Vec<String> {
    let mut conditions: Vec<String> = tokens
        .substring_terms()
        .map(|term| substring_condition(columns, term))
        .collect();

    for word in &tokens.words {
        if whole_words {
            conditions.push(whole_word_condition(columns, word));
        } else {
            conditions.push(substring_condition(columns, word));
        }
    }
    conditions
}

// ============================================================================
// PREDICATE
// ============================================================================

/// A conjunction of SQL clauses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<String>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause that must also hold
    pub fn and(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render as a `WHERE` body; an empty predicate matches everything
    pub fn to_sql(&self) -> String {
        if self.clauses.is_empty() {
            "1=1".to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}

// ============================================================================
// CONDITION BUILDER
// ============================================================================

/// Builds per-source predicates for one search request
pub struct ConditionBuilder<'a> {
    tokens: &'a QueryTokens,
    filters: &'a FilterState,
}

impl<'a> ConditionBuilder<'a> {
    pub fn new(tokens: &'a QueryTokens, filters: &'a FilterState) -> Self {
        Self { tokens, filters }
    }

    /// Predicate for one content source
    ///
    /// Shape: text terms, then actor, conversation, type, start exclusion and
    /// hidden exclusion, all joined with AND.
    pub fn build(&self, source: SearchSource) -> Predicate {
        let mut predicate = Predicate::new();

        for condition in text_conditions(
            self.tokens,
            source.text_columns(),
            self.filters.whole_words,
        ) {
            predicate.and(condition);
        }

        if source == SearchSource::Conversations {
            predicate.and("type IN ('orb', 'task')");
        }

        if let Some(clause) = self.actor_clause(source) {
            predicate.and(clause);
        }

        if !self.filters.conversation_ids.is_empty() {
            predicate.and(format!(
                "{} IN ({})",
                source.conversation_column(),
                id_list(&self.filters.conversation_ids)
            ));
        }

        if let Some(clause) = self.type_clause(source) {
            predicate.and(clause);
        }

        if self.filters.exclude_start {
            if let Some(entry_column) = source.entry_column() {
                predicate.and(format!("{} NOT IN (0, 1)", entry_column));
            }
        }

        if !self.filters.show_hidden {
            predicate.and(format!("COALESCE({}, 0) != 1", source.hidden_column()));
        }

        predicate
    }

    fn actor_clause(&self, source: SearchSource) -> Option<String> {
        let ids = self.filters.actors.ids()?;
        let clause = match source.conversant_column() {
            // Unassigned (0) orbs and tasks stay visible under any actor filter
            Some(conversant) => {
                let list = format!("{}, 0", id_list(&ids));
                format!(
                    "({} IN ({}) OR {} IN ({}))",
                    source.actor_column(),
                    list,
                    conversant,
                    list
                )
            }
            None => format!("{} IN ({})", source.actor_column(), id_list(&ids)),
        };
        Some(clause)
    }

    fn type_clause(&self, source: SearchSource) -> Option<String> {
        if self.filters.types.is_empty() {
            return None;
        }
        let types = self
            .filters
            .types
            .iter()
            .map(|t| quote_literal(t.as_str()))
            .collect::<Vec<_>>()
            .join(", ");

        let clause = match source {
            SearchSource::Conversations => format!("type IN ({})", types),
            _ => format!(
                "{} IN (SELECT id FROM conversations WHERE type IN ({}))",
                source.conversation_column(),
                types
            ),
        };
        Some(clause)
    }
}

/// Predicate for the `variables` table (name and description)
pub fn variable_predicate(tokens: &QueryTokens, whole_words: bool) -> Predicate {
    let mut predicate = Predicate::new();
    for condition in text_conditions(tokens, &["name", "description"], whole_words) {
        predicate.and(condition);
    }
    predicate
}
