//! Query Tokenizer
//!
//! Splits a raw search string into the four kinds of terms the condition
//! builder understands. Script fragments are pulled out first so that their
//! inner quotes do not get mistaken for phrase delimiters.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// PATTERNS
// ============================================================================

/// `Variable["name"]` / `Variable['name']`, whitespace allowed inside the brackets
fn variable_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"Variable\[\s*(?:'[^']*'|"[^"]*")\s*\]"#).expect("valid variable pattern")
    })
}

/// An identifier immediately followed by a parenthesized argument list,
/// e.g. `CheckItem("pen")`, `HasShirt()`, `once(1)`
fn function_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\([^)]*\)").expect("valid function pattern")
    })
}

fn quoted_phrase_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)""#).expect("valid phrase pattern"))
}

// ============================================================================
// TOKENS
// ============================================================================

/// Terms extracted from a query
///
/// Every term becomes a hard AND requirement when the predicate is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryTokens {
    /// Text between double quotes, matched as one substring
    pub quoted_phrases: Vec<String>,
    /// `Variable[...]` references, matched verbatim
    pub variable_tokens: Vec<String>,
    /// `Name(args)` calls, matched verbatim
    pub function_tokens: Vec<String>,
    /// Whitespace-separated leftovers
    pub words: Vec<String>,
}

impl QueryTokens {
    /// Tokenize a full dialogue query
    ///
    /// Variable tokens are removed first, then function tokens, then quoted
    /// phrases; whatever is left is split on whitespace. An unterminated quote
    /// is not a phrase and stays part of the words.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::default();
        }

        let variable_tokens = collect_matches(variable_token_regex(), raw);
        let without_variables = variable_token_regex().replace_all(raw, " ");

        let function_tokens = collect_matches(function_token_regex(), &without_variables);
        let without_scripts = function_token_regex().replace_all(&without_variables, " ");

        let (quoted_phrases, words) = split_phrases_and_words(without_scripts.trim());

        Self {
            quoted_phrases,
            variable_tokens,
            function_tokens,
            words,
        }
    }

    /// Tokenize into phrases and words only
    ///
    /// Used where script fragments carry no special meaning (variable search).
    pub fn parse_plain(raw: &str) -> Self {
        let (quoted_phrases, words) = split_phrases_and_words(raw.trim());
        Self {
            quoted_phrases,
            words,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quoted_phrases.is_empty()
            && self.variable_tokens.is_empty()
            && self.function_tokens.is_empty()
            && self.words.is_empty()
    }

    /// Terms matched as plain substrings regardless of whole-word mode
    pub fn substring_terms(&self) -> impl Iterator<Item = &str> {
        self.quoted_phrases
            .iter()
            .chain(&self.variable_tokens)
            .chain(&self.function_tokens)
            .map(String::as_str)
    }
}

fn collect_matches(re: &Regex, haystack: &str) -> Vec<String> {
    re.find_iter(haystack).map(|m| m.as_str().to_string()).collect()
}

fn split_phrases_and_words(text: &str) -> (Vec<String>, Vec<String>) {
    if text.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let phrases = quoted_phrase_regex()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    let remaining = quoted_phrase_regex().replace_all(text, "");
    let words = remaining.split_whitespace().map(str::to_string).collect();

    (phrases, words)
}
