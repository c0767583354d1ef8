//! Content sources
//!
//! The three tables a dialogue search reads from, with the column names each
//! one uses for the shared filter concepts.

use serde::{Deserialize, Serialize};

/// One of the three heterogeneous sources a search unions together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// Lines of branching flow conversations (`dentries`)
    Entries,
    /// Orb and task records, searched by their description (`conversations`)
    Conversations,
    /// Alternate lines, joined to their owning entry (`alternates`)
    Alternates,
}

impl SearchSource {
    /// Sources in the order their rows are concatenated
    pub const ORDER: [SearchSource; 3] = [
        SearchSource::Entries,
        SearchSource::Conversations,
        SearchSource::Alternates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSource::Entries => "entries",
            SearchSource::Conversations => "conversations",
            SearchSource::Alternates => "alternates",
        }
    }

    /// Columns free text is matched against
    pub fn text_columns(&self) -> &'static [&'static str] {
        match self {
            SearchSource::Entries => &["dialoguetext", "title"],
            SearchSource::Conversations => &["description", "title"],
            SearchSource::Alternates => &["a.alternateline"],
        }
    }

    /// Column holding the speaking actor
    pub(crate) fn actor_column(&self) -> &'static str {
        match self {
            SearchSource::Entries => "actor",
            SearchSource::Conversations => "actor",
            SearchSource::Alternates => "d.actor",
        }
    }

    /// Second actor column, matched with OR (conversation records only)
    pub(crate) fn conversant_column(&self) -> Option<&'static str> {
        match self {
            SearchSource::Conversations => Some("conversant"),
            _ => None,
        }
    }

    pub(crate) fn conversation_column(&self) -> &'static str {
        match self {
            SearchSource::Entries => "conversationid",
            SearchSource::Conversations => "id",
            SearchSource::Alternates => "a.conversationid",
        }
    }

    /// Entry id column; conversation records have none
    pub(crate) fn entry_column(&self) -> Option<&'static str> {
        match self {
            SearchSource::Entries => Some("id"),
            SearchSource::Conversations => None,
            SearchSource::Alternates => Some("a.dialogueid"),
        }
    }

    pub(crate) fn hidden_column(&self) -> &'static str {
        match self {
            SearchSource::Entries => "isHidden",
            SearchSource::Conversations => "isHidden",
            SearchSource::Alternates => "d.isHidden",
        }
    }

    /// `FROM` clause including the join for alternates
    pub(crate) fn from_clause(&self) -> &'static str {
        match self {
            SearchSource::Entries => "dentries",
            SearchSource::Conversations => "conversations",
            SearchSource::Alternates => {
                "alternates a
                 JOIN dentries d ON a.conversationid = d.conversationid AND a.dialogueid = d.id"
            }
        }
    }

    /// Selected columns, normalized to
    /// `(conversation_id, entry_id, text, title, actor, hidden, condition)`
    pub(crate) fn select_columns(&self) -> &'static str {
        match self {
            SearchSource::Entries => {
                "conversationid, id, dialoguetext, title, actor, isHidden, NULL"
            }
            SearchSource::Conversations => {
                "id, NULL, description, title, actor, isHidden, NULL"
            }
            SearchSource::Alternates => {
                "a.conversationid, a.dialogueid, a.alternateline, d.title, d.actor, d.isHidden, a.condition"
            }
        }
    }

    /// Deterministic order; ties are impossible within a source
    pub(crate) fn order_by(&self) -> &'static str {
        match self {
            SearchSource::Entries => "conversationid, id",
            SearchSource::Conversations => "id",
            SearchSource::Alternates => "a.conversationid, a.dialogueid, a.id",
        }
    }
}

impl std::fmt::Display for SearchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
