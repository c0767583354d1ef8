//! Row mapping
//!
//! Datasets come out of a loosely typed export: actor ids are stored as REAL,
//! flags as 0/1, `"True"` or NULL. The readers here accept any storage class
//! a column has been seen with.

use rusqlite::types::ValueRef;
use rusqlite::Row;

use crate::model::{
    ActorRecord, AlternateLine, CheckRecord, ConversationRecord, ConversationSummary,
    ConversationType, EntryKey, EntryRecord, EntrySummary, LinkRecord, VariableRecord,
};
use crate::search::{SearchRow, SearchSource};

// ============================================================================
// VALUE READERS
// ============================================================================

pub(crate) fn opt_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
    })
}

pub(crate) fn opt_int(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<i64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) => Some(f as i64),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().map(|f| f as i64))
        }
        ValueRef::Blob(_) => None,
    })
}

pub(crate) fn int_or_zero(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(opt_int(row, idx)?.unwrap_or(0))
}

pub(crate) fn opt_flag(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<bool>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i != 0),
        ValueRef::Real(f) => Some(f != 0.0),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).trim().to_lowercase();
            Some(matches!(text.as_str(), "1" | "true" | "yes"))
        }
        ValueRef::Blob(_) => None,
    })
}

pub(crate) fn flag(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    Ok(opt_flag(row, idx)?.unwrap_or(false))
}

fn conversation_type(row: &Row<'_>, idx: usize) -> rusqlite::Result<ConversationType> {
    Ok(ConversationType::from_column(opt_text(row, idx)?.as_deref()))
}

// ============================================================================
// RECORD MAPPERS
// ============================================================================

/// Columns: `id, title, type`
pub(crate) fn row_to_conversation_summary(row: &Row<'_>) -> rusqlite::Result<ConversationSummary> {
    Ok(ConversationSummary {
        id: int_or_zero(row, 0)?,
        title: opt_text(row, 1)?,
        conversation_type: conversation_type(row, 2)?,
    })
}

/// Column list matching [`row_to_conversation`]
pub(crate) const CONVERSATION_COLUMNS: &str = "id, title, type, description, actor, conversant, isHidden,
     onUse, overrideDialogueCondition, alternateOrbText, checkType, condition, instruction,
     placement, difficulty,
     displayConditionMain, doneConditionMain, cancelConditionMain, taskReward, taskTimed,
     totalSubtasks, totalEntries";

pub(crate) fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<ConversationRecord> {
    Ok(ConversationRecord {
        id: int_or_zero(row, 0)?,
        title: opt_text(row, 1)?,
        conversation_type: conversation_type(row, 2)?,
        description: opt_text(row, 3)?,
        actor: opt_int(row, 4)?,
        conversant: opt_int(row, 5)?,
        is_hidden: flag(row, 6)?,
        on_use: opt_text(row, 7)?,
        override_dialogue_condition: opt_text(row, 8)?,
        alternate_orb_text: opt_text(row, 9)?,
        check_type: opt_text(row, 10)?,
        condition: opt_text(row, 11)?,
        instruction: opt_text(row, 12)?,
        placement: opt_text(row, 13)?,
        difficulty: opt_text(row, 14)?,
        display_condition_main: opt_text(row, 15)?,
        done_condition_main: opt_text(row, 16)?,
        cancel_condition_main: opt_text(row, 17)?,
        task_reward: opt_text(row, 18)?,
        task_timed: opt_flag(row, 19)?,
        total_subtasks: int_or_zero(row, 20)?,
        total_entries: int_or_zero(row, 21)?,
    })
}

/// Columns: `conversationid, id, title, dialoguetext, actor, isHidden`
pub(crate) fn row_to_entry_summary(row: &Row<'_>) -> rusqlite::Result<EntrySummary> {
    Ok(EntrySummary {
        conversation_id: int_or_zero(row, 0)?,
        id: int_or_zero(row, 1)?,
        title: opt_text(row, 2)?,
        dialogue_text: opt_text(row, 3)?,
        actor: opt_int(row, 4)?,
        is_hidden: flag(row, 5)?,
    })
}

/// Columns: `conversationid, id, title, dialoguetext, actor, hasAlts, hasCheck,
/// sequence, conditionstring, userscript, isHidden, difficultypass`
pub(crate) fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<EntryRecord> {
    Ok(EntryRecord {
        conversation_id: int_or_zero(row, 0)?,
        id: int_or_zero(row, 1)?,
        title: opt_text(row, 2)?,
        dialogue_text: opt_text(row, 3)?,
        actor: opt_int(row, 4)?,
        has_alternates: flag(row, 5)?,
        has_check: flag(row, 6)?,
        sequence: opt_text(row, 7)?,
        condition_string: opt_text(row, 8)?,
        user_script: opt_text(row, 9)?,
        is_hidden: flag(row, 10)?,
        difficulty_pass: opt_int(row, 11)?,
    })
}

/// Columns: `conversationid, dialogueid, alternateline, condition`
pub(crate) fn row_to_alternate(row: &Row<'_>) -> rusqlite::Result<AlternateLine> {
    Ok(AlternateLine {
        conversation_id: int_or_zero(row, 0)?,
        entry_id: int_or_zero(row, 1)?,
        alternate_line: opt_text(row, 2)?,
        condition: opt_text(row, 3)?,
    })
}

/// Columns: `checktype, difficulty, flagname, forced, skill name`
pub(crate) fn row_to_check(row: &Row<'_>) -> rusqlite::Result<CheckRecord> {
    Ok(CheckRecord {
        check_type: opt_text(row, 0)?,
        difficulty: opt_int(row, 1)?,
        flag_name: opt_text(row, 2)?,
        forced: flag(row, 3)?,
        skill_name: opt_text(row, 4)?,
    })
}

/// Columns: `origin convo, origin id, destination convo, destination id,
/// priority, isConnector`
pub(crate) fn row_to_link(row: &Row<'_>) -> rusqlite::Result<LinkRecord> {
    Ok(LinkRecord {
        origin: EntryKey::new(int_or_zero(row, 0)?, int_or_zero(row, 1)?),
        destination: EntryKey::new(int_or_zero(row, 2)?, int_or_zero(row, 3)?),
        priority: opt_int(row, 4)?.unwrap_or(2),
        is_connector: flag(row, 5)?,
    })
}

/// Columns: `id, name, color`; a missing name reads as empty
pub(crate) fn row_to_actor(row: &Row<'_>) -> rusqlite::Result<ActorRecord> {
    Ok(ActorRecord {
        id: int_or_zero(row, 0)?,
        name: opt_text(row, 1)?.unwrap_or_default(),
        color: opt_int(row, 2)?,
    })
}

/// Columns: `id, name, description, initialvalue`
pub(crate) fn row_to_variable(row: &Row<'_>) -> rusqlite::Result<VariableRecord> {
    Ok(VariableRecord {
        id: int_or_zero(row, 0)?,
        name: opt_text(row, 1)?,
        description: opt_text(row, 2)?,
        initial_value: opt_text(row, 3)?,
    })
}

/// Columns as produced by `SearchSource::select_columns`
pub(crate) fn row_to_search_row(row: &Row<'_>, source: SearchSource) -> rusqlite::Result<SearchRow> {
    Ok(SearchRow {
        conversation_id: int_or_zero(row, 0)?,
        entry_id: opt_int(row, 1)?,
        dialogue_text: opt_text(row, 2)?,
        title: opt_text(row, 3)?,
        actor: opt_int(row, 4)?,
        is_hidden: flag(row, 5)?,
        source,
        is_alternate: source == SearchSource::Alternates,
        alternate_condition: opt_text(row, 6)?,
    })
}
