//! Filter State
//!
//! The structured half of a search request. Built once by the caller and
//! passed by reference into every search call; the query layer never reads
//! selection state from anywhere else.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::ConversationType;

/// Which actors a result must belong to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "ids")]
pub enum ActorFilter {
    /// No restriction
    #[default]
    Any,
    /// Exactly one actor
    Single(i64),
    /// Any of the listed actors; an empty list is no restriction
    Many(Vec<i64>),
}

impl ActorFilter {
    /// Build from a selection, collapsing "nothing selected" and
    /// "everything selected" into no restriction
    pub fn from_selection(selected: &[i64], all_actor_count: usize) -> Self {
        match selected {
            [] => ActorFilter::Any,
            _ if selected.len() == all_actor_count => ActorFilter::Any,
            [single] => ActorFilter::Single(*single),
            many => ActorFilter::Many(many.to_vec()),
        }
    }

    /// Actor ids to match, or `None` when unrestricted
    pub fn ids(&self) -> Option<Vec<i64>> {
        match self {
            ActorFilter::Any => None,
            ActorFilter::Single(id) => Some(vec![*id]),
            ActorFilter::Many(ids) if ids.is_empty() => None,
            ActorFilter::Many(ids) => Some(ids.clone()),
        }
    }
}

/// Selection state applied to a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub actors: ActorFilter,
    /// Restrict to these conversations; empty means all
    pub conversation_ids: Vec<i64>,
    /// Restrict to these conversation types; empty means all
    pub types: BTreeSet<ConversationType>,
    /// Match words only at word boundaries
    pub whole_words: bool,
    /// Include rows flagged hidden
    pub show_hidden: bool,
    /// Leave out the pseudo-root start entries
    pub exclude_start: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            actors: ActorFilter::Any,
            conversation_ids: Vec::new(),
            types: BTreeSet::new(),
            whole_words: false,
            show_hidden: false,
            exclude_start: true,
        }
    }
}

impl FilterState {
    pub fn with_actors(mut self, actors: ActorFilter) -> Self {
        self.actors = actors;
        self
    }

    pub fn with_conversations(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.conversation_ids = ids.into_iter().collect();
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = ConversationType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn with_whole_words(mut self, whole_words: bool) -> Self {
        self.whole_words = whole_words;
        self
    }

    pub fn with_show_hidden(mut self, show_hidden: bool) -> Self {
        self.show_hidden = show_hidden;
        self
    }

    pub fn with_exclude_start(mut self, exclude_start: bool) -> Self {
        self.exclude_start = exclude_start;
        self
    }

    /// Whether a conversation type passes the type filter
    pub fn admits_type(&self, conversation_type: ConversationType) -> bool {
        self.types.is_empty() || self.types.contains(&conversation_type)
    }
}
