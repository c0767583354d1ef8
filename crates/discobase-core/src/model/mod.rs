//! Model module - Core record types
//!
//! Plain data read out of the dialogue dataset:
//! - Conversations (branching flows, orbs, tasks)
//! - Dialogue entries and their alternate lines
//! - Skill checks, links, actors and variables
//! - Entry details assembled for display

mod records;

pub use records::{
    ActorRecord, AlternateLine, AlternateSelection, CheckRecord, ConversationRecord,
    ConversationSummary, EntryDetails, EntryKey, EntryLinks, EntryRecord, EntrySummary,
    LinkRecord, VariableRecord,
};

use serde::{Deserialize, Serialize};

// ============================================================================
// CONVERSATION TYPES
// ============================================================================

/// Kind of conversation stored in the `conversations` table
///
/// - Flow: a branching dialogue made of entries and links
/// - Orb: a single descriptive record shown in the world
/// - Task: a quest record with conditions and subtasks
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    /// Branching dialogue
    #[default]
    Flow,
    /// Flat descriptive record
    Orb,
    /// Quest record
    Task,
}

impl ConversationType {
    /// All conversation types, in display priority order (lowest first)
    pub const ALL: [ConversationType; 3] = [
        ConversationType::Flow,
        ConversationType::Task,
        ConversationType::Orb,
    ];

    /// Value stored in the `type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationType::Flow => "flow",
            ConversationType::Orb => "orb",
            ConversationType::Task => "task",
        }
    }

    /// Whether records of this type are searched as conversation-level rows
    pub fn is_descriptive(&self) -> bool {
        matches!(self, ConversationType::Orb | ConversationType::Task)
    }

    /// Parse a stored column value, treating unknown or missing values as a flow
    pub fn from_column(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl std::fmt::Display for ConversationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ConversationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flow" => Ok(ConversationType::Flow),
            "orb" => Ok(ConversationType::Orb),
            "task" => Ok(ConversationType::Task),
            _ => Err(format!("Unknown conversation type: {}", s)),
        }
    }
}

// ============================================================================
// PSEUDO-ROOT ENTRIES
// ============================================================================

/// Entry ids reserved for the synthetic start nodes of every conversation
pub const PSEUDO_ROOT_ENTRY_IDS: [i64; 2] = [0, 1];

/// Whether an entry id is one of the reserved start nodes
pub fn is_pseudo_root(entry_id: i64) -> bool {
    PSEUDO_ROOT_ENTRY_IDS.contains(&entry_id)
}
