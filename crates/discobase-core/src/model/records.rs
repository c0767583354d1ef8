//! Dataset records
//!
//! One struct per table row shape the browser reads. Field names follow the
//! domain, not the column names; the mapping lives in `dataset::rows`.

use serde::{Deserialize, Serialize};

use super::ConversationType;

// ============================================================================
// CONVERSATIONS
// ============================================================================

/// Listing row used to build the conversation hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: i64,
    /// Slash-delimited title, e.g. `"WHIRLING / KIM / FIRST MEETING"`
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub conversation_type: ConversationType,
}

impl ConversationSummary {
    pub fn new(id: i64, title: impl Into<String>, conversation_type: ConversationType) -> Self {
        Self {
            id,
            title: Some(title.into()),
            conversation_type,
        }
    }
}

/// A full conversation row
///
/// Flow conversations only use the first block of fields. Orbs and tasks also
/// carry their descriptive text in `description` and the task metadata below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: i64,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub conversation_type: ConversationType,
    pub description: Option<String>,
    pub actor: Option<i64>,
    pub conversant: Option<i64>,
    pub is_hidden: bool,

    // ========== Orb metadata ==========
    pub on_use: Option<String>,
    pub override_dialogue_condition: Option<String>,
    pub alternate_orb_text: Option<String>,
    pub check_type: Option<String>,
    pub condition: Option<String>,
    pub instruction: Option<String>,
    pub placement: Option<String>,
    pub difficulty: Option<String>,

    // ========== Task metadata ==========
    pub display_condition_main: Option<String>,
    pub done_condition_main: Option<String>,
    pub cancel_condition_main: Option<String>,
    pub task_reward: Option<String>,
    pub task_timed: Option<bool>,
    pub total_subtasks: i64,

    /// Number of entries in the conversation's flow
    pub total_entries: i64,
}

// ============================================================================
// ENTRIES
// ============================================================================

/// `(conversation id, entry id)` - the unique key of a dialogue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryKey {
    pub conversation_id: i64,
    pub entry_id: i64,
}

impl EntryKey {
    pub fn new(conversation_id: i64, entry_id: i64) -> Self {
        Self {
            conversation_id,
            entry_id,
        }
    }
}

impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.conversation_id, self.entry_id)
    }
}

/// Short entry row used for listings and link targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySummary {
    pub conversation_id: i64,
    pub id: i64,
    pub title: Option<String>,
    pub dialogue_text: Option<String>,
    pub actor: Option<i64>,
    pub is_hidden: bool,
}

impl EntrySummary {
    pub fn key(&self) -> EntryKey {
        EntryKey::new(self.conversation_id, self.id)
    }
}

/// A full dialogue entry row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub conversation_id: i64,
    pub id: i64,
    pub title: Option<String>,
    pub dialogue_text: Option<String>,
    pub actor: Option<i64>,
    pub has_alternates: bool,
    pub has_check: bool,
    pub sequence: Option<String>,
    /// Script gating whether the entry is reachable
    pub condition_string: Option<String>,
    /// Script run when the entry is shown
    pub user_script: Option<String>,
    pub is_hidden: bool,
    /// Difficulty of the entry's check, when it has one
    pub difficulty_pass: Option<i64>,
}

impl EntryRecord {
    pub fn key(&self) -> EntryKey {
        EntryKey::new(self.conversation_id, self.id)
    }
}

/// Condition-gated substitute phrasing for an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternateLine {
    pub conversation_id: i64,
    pub entry_id: i64,
    pub alternate_line: Option<String>,
    pub condition: Option<String>,
}

/// Skill check attached to an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRecord {
    /// `passive`, `white` or `red`
    pub check_type: Option<String>,
    pub difficulty: Option<i64>,
    pub flag_name: Option<String>,
    pub forced: bool,
    /// Name of the skill actor performing the check
    pub skill_name: Option<String>,
}

/// Directed link between two entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub origin: EntryKey,
    pub destination: EntryKey,
    pub priority: i64,
    pub is_connector: bool,
}

/// Incoming and outgoing links of one entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLinks {
    pub parents: Vec<LinkRecord>,
    pub children: Vec<LinkRecord>,
}

// ============================================================================
// ACTORS & VARIABLES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRecord {
    pub id: i64,
    pub name: String,
    pub color: Option<i64>,
}

/// A free variable of the dialogue scripting language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRecord {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub initial_value: Option<String>,
}

// ============================================================================
// ENTRY DETAILS
// ============================================================================

/// Alternate line picked by the user when opening an entry from a search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternateSelection {
    pub condition: Option<String>,
    pub line: Option<String>,
}

impl AlternateSelection {
    pub fn is_empty(&self) -> bool {
        self.condition.is_none() && self.line.is_none()
    }
}

/// Everything shown for a single entry
///
/// The cached copy never carries a selection; it is attached per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDetails {
    pub entry: EntryRecord,
    pub actor_name: Option<String>,
    pub alternates: Vec<AlternateLine>,
    pub checks: Vec<CheckRecord>,
    pub links: EntryLinks,
    pub conversation: Option<ConversationRecord>,
    pub conversation_actor_name: Option<String>,
    pub conversation_conversant_name: Option<String>,
    pub selected_alternate: Option<AlternateSelection>,
}

impl EntryDetails {
    /// Text to display: the selected alternate when present, otherwise the original line
    pub fn display_text(&self) -> Option<&str> {
        self.selected_alternate
            .as_ref()
            .and_then(|s| s.line.as_deref())
            .or(self.entry.dialogue_text.as_deref())
    }
}
