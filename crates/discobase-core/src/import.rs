//! Dataset import
//!
//! Builds a dataset file from the game's dialogue-database JSON export. The
//! export stores almost everything as `{ "title": ..., "value": ... }` field
//! lists; this module flattens those into the dataset tables and derives the
//! columns the browser relies on:
//! - conversation type (flow, orb or task) and hidden flag
//! - a cleaned display title for conversations and untitled entries
//! - alternate lines, skill checks and links per entry
//! - per-actor line counts and per-conversation entry totals
//!
//! The whole import runs in one transaction; any failure leaves no file
//! content behind.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use rusqlite::{params, Connection, Transaction};
use serde::{Deserialize, Serialize};

use crate::dataset::{apply_schema, DatasetError, Result};
use crate::model::ConversationType;

// ============================================================================
// EXPORT FORMAT
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DialogueExport {
    #[serde(default)]
    pub actors: Vec<ExportRecord>,
    #[serde(default)]
    pub variables: Vec<ExportRecord>,
    #[serde(default)]
    pub conversations: Vec<ExportConversation>,
}

/// A `{title, value}` pair
#[derive(Debug, Clone, Deserialize)]
pub struct ExportField {
    pub title: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ExportRecord {
    pub id: i64,
    #[serde(default)]
    pub fields: Vec<ExportField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConversation {
    pub id: i64,
    #[serde(default)]
    pub fields: Vec<ExportField>,
    #[serde(default)]
    pub dialogue_entries: Vec<ExportEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    pub id: i64,
    #[serde(rename = "conversationID")]
    pub conversation_id: Option<i64>,
    #[serde(default)]
    pub fields: Vec<ExportField>,
    #[serde(default)]
    pub outgoing_links: Vec<ExportLink>,
    pub conditions_string: Option<String>,
    pub user_script: Option<String>,
    pub is_group: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ExportLink {
    #[serde(rename = "originConversationID")]
    pub origin_conversation_id: Option<i64>,
    #[serde(rename = "originDialogueID")]
    pub origin_dialogue_id: Option<i64>,
    #[serde(rename = "destinationConversationID")]
    pub destination_conversation_id: Option<i64>,
    #[serde(rename = "destinationDialogueID")]
    pub destination_dialogue_id: Option<i64>,
    #[serde(rename = "isConnector", default)]
    pub is_connector: Option<bool>,
    #[serde(default)]
    pub priority: Option<i64>,
}

// ============================================================================
// FIELD ACCESS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Text(String),
    Bool(bool),
    Number(f64),
}

/// Lookup over an export field list
struct Fields<'a>(&'a [ExportField]);

impl<'a> Fields<'a> {
    /// First field titled `name`; blank strings, `""` and null read as absent
    fn get(&self, name: &str) -> Option<FieldValue> {
        let field = self.0.iter().find(|f| f.title == name)?;
        match &field.value {
            serde_json::Value::String(s) => match s.as_str() {
                "True" => Some(FieldValue::Bool(true)),
                "False" => Some(FieldValue::Bool(false)),
                _ if s.trim().is_empty() || s.trim() == "\"\"" => None,
                _ => Some(FieldValue::Text(s.clone())),
            },
            serde_json::Value::Bool(b) => Some(FieldValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
            _ => None,
        }
    }

    fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| match v {
            FieldValue::Text(s) => s,
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
        })
    }

    fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            FieldValue::Number(n) => Some(n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::Bool(_) => None,
        }
    }

    fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            FieldValue::Bool(b) => Some(b),
            FieldValue::Number(n) => Some(n != 0.0),
            FieldValue::Text(s) => Some(matches!(s.to_lowercase().as_str(), "true" | "1" | "yes")),
        }
    }
}

// ============================================================================
// CONVERSATION CLASSIFICATION
// ============================================================================

/// Title prefixes of orbs that have no placement
const ORB_TITLE_PREFIXES: &[&str] = &["ARX - EASTEREGGS", "HELEN - EASTEREGGS", "LAIR ORB / FOOTPRINTS"];

/// Title prefixes never treated as orbs
const NON_ORB_TITLE_PREFIXES: &[&str] = &["BOARDWALK / PAYPHONE"];

const TASK_FIELDS: &[&str] = &[
    "display_condition_main",
    "done_condition_main",
    "cancel_condition_main",
    "task_reward",
    "task_timed",
];

const MAX_SUBTASKS: usize = 12;

fn classify_conversation(fields: &Fields<'_>) -> ConversationType {
    let title = fields.text("Title").unwrap_or_default().to_uppercase();
    let has_placement = fields.text("Placement").is_some();
    let orb_title = ORB_TITLE_PREFIXES.iter().any(|p| title.starts_with(p));
    let excluded = NON_ORB_TITLE_PREFIXES.iter().any(|p| title.starts_with(p));

    if (has_placement || orb_title) && !excluded {
        ConversationType::Orb
    } else if TASK_FIELDS.iter().any(|f| fields.get(f).is_some()) {
        ConversationType::Task
    } else {
        ConversationType::Flow
    }
}

fn is_hidden_conversation(title: Option<&str>, description: Option<&str>) -> bool {
    [title, description].iter().flatten().any(|text| {
        let lower = text.to_lowercase();
        lower.contains("obsolete") || lower.contains("delete")
    })
}

fn count_subtasks(fields: &Fields<'_>) -> i64 {
    (1..=MAX_SUBTASKS)
        .filter(|i| {
            ["subtask_title", "display_subtask", "done_subtask", "cancel_subtask"]
                .iter()
                .any(|prefix| fields.get(&format!("{}_{:02}", prefix, i)).is_some())
        })
        .count() as i64
}

fn bark_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bbarks?\b").expect("valid bark pattern"))
}

fn orb_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\borbs?\b").expect("valid orb pattern"))
}

fn wcw_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bwcw\b").expect("valid wcw pattern"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Title shown in listings: bark/orb markers dropped, `WCW` spelled out,
/// whitespace squeezed, tasks prefixed with `TASK / `
pub fn display_title(title: Option<&str>, conversation_type: ConversationType) -> String {
    let title = title.unwrap_or_default();
    let title = bark_regex().replace_all(title, "");
    let title = wcw_regex().replace_all(&title, "WORKING CLASS WOMAN");
    let title = orb_regex().replace_all(&title, "");
    let title = whitespace_regex().replace_all(&title, " ");
    let title = title.trim();

    match conversation_type {
        ConversationType::Task => format!("TASK / {}", title),
        _ => title.to_string(),
    }
}

// ============================================================================
// IMPORT
// ============================================================================

/// Row counts written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub actors: usize,
    pub variables: usize,
    pub conversations: usize,
    pub hidden_conversations: usize,
    pub entries: usize,
    pub alternates: usize,
    pub checks: usize,
    pub links: usize,
}

/// Convert an export file into a new dataset file at `db_path`
///
/// Refuses to overwrite an existing file.
pub fn import_export(json_path: &Path, db_path: &Path) -> Result<ImportSummary> {
    if db_path.exists() {
        return Err(DatasetError::Import(format!(
            "{} already exists",
            db_path.display()
        )));
    }

    tracing::info!("Loading export from {}", json_path.display());
    let reader = BufReader::new(File::open(json_path)?);
    let export: DialogueExport = serde_json::from_reader(reader)?;

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut conn = Connection::open(db_path)?;
    let result = import_into(&mut conn, &export);
    if result.is_err() {
        drop(conn);
        discard_partial(db_path);
    }
    result
}

/// Remove a half-written dataset file; returns false if it could not be removed
fn discard_partial(db_path: &Path) -> bool {
    match std::fs::remove_file(db_path) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to remove partial dataset {}: {}", db_path.display(), e);
            false
        }
    }
}

/// Write an export into `conn` in a single transaction
pub fn import_into(conn: &mut Connection, export: &DialogueExport) -> Result<ImportSummary> {
    apply_schema(conn)?;

    let tx = conn.transaction()?;
    let mut summary = ImportSummary::default();

    import_actors(&tx, &export.actors, &mut summary)?;
    import_variables(&tx, &export.variables, &mut summary)?;
    import_conversations(&tx, &export.conversations, &mut summary)?;
    import_entries(&tx, &export.conversations, &mut summary)?;
    derive_columns(&tx)?;

    tx.commit()?;

    tracing::info!(
        "Imported {} actors, {} variables, {} conversations ({} hidden), {} entries, {} alternates, {} checks, {} links",
        summary.actors,
        summary.variables,
        summary.conversations,
        summary.hidden_conversations,
        summary.entries,
        summary.alternates,
        summary.checks,
        summary.links
    );
    Ok(summary)
}

fn import_actors(tx: &Transaction<'_>, actors: &[ExportRecord], summary: &mut ImportSummary) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT OR REPLACE INTO actors
         (id, name, description, characterShortName, shortDescription, longDescription,
          color, articyId, pictures, isFemale)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for actor in actors {
        let fields = Fields(&actor.fields);
        stmt.execute(params![
            actor.id,
            fields.text("Name"),
            fields.text("Description"),
            fields.text("character_short_name"),
            fields.text("short_description"),
            fields.text("LongDescription"),
            fields.number("color"),
            fields.text("Articy Id"),
            fields.text("Pictures"),
            fields.flag("IsFemale"),
        ])?;
        summary.actors += 1;
    }
    tracing::info!("Imported {} actors", summary.actors);
    Ok(())
}

fn import_variables(
    tx: &Transaction<'_>,
    variables: &[ExportRecord],
    summary: &mut ImportSummary,
) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT OR REPLACE INTO variables (id, name, initialvalue, description)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for variable in variables {
        let fields = Fields(&variable.fields);
        stmt.execute(params![
            variable.id,
            fields.text("Name"),
            fields.text("Initial Value"),
            fields.text("Description"),
        ])?;
        summary.variables += 1;
    }
    tracing::info!("Imported {} variables", summary.variables);
    Ok(())
}

fn import_conversations(
    tx: &Transaction<'_>,
    conversations: &[ExportConversation],
    summary: &mut ImportSummary,
) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT OR REPLACE INTO conversations
         (id, title, articyId, onUse, overrideDialogueCondition, alternateOrbText, checkType,
          condition, instruction, placement, difficulty, description, actor, conversant,
          displayConditionMain, doneConditionMain, cancelConditionMain, taskReward, taskTimed,
          type, totalSubtasks, displayTitle, isHidden)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                 ?18, ?19, ?20, ?21, ?22, ?23)",
    )?;

    for convo in conversations {
        let fields = Fields(&convo.fields);
        let title = fields.text("Title");
        let description = fields.text("Description");
        let conversation_type = classify_conversation(&fields);
        let hidden = is_hidden_conversation(title.as_deref(), description.as_deref());

        stmt.execute(params![
            convo.id,
            title,
            fields.text("Articy Id"),
            fields.text("OnUse"),
            fields.text("OverrideDialogueCondition"),
            fields.text("AlternateOrbText"),
            fields.text("CheckType"),
            fields.text("Condition"),
            fields.text("Instruction"),
            fields.text("Placement"),
            fields.text("Difficulty"),
            description,
            fields.number("Actor"),
            fields.number("Conversant"),
            fields.text("display_condition_main"),
            fields.text("done_condition_main"),
            fields.text("cancel_condition_main"),
            fields.text("task_reward"),
            fields.flag("task_timed"),
            conversation_type.as_str(),
            count_subtasks(&fields),
            display_title(title.as_deref(), conversation_type),
            hidden,
        ])?;

        summary.conversations += 1;
        if hidden {
            summary.hidden_conversations += 1;
        }
    }
    tracing::info!("Imported {} conversations", summary.conversations);
    Ok(())
}

fn import_entries(
    tx: &Transaction<'_>,
    conversations: &[ExportConversation],
    summary: &mut ImportSummary,
) -> Result<()> {
    let mut entry_stmt = tx.prepare(
        "INSERT OR REPLACE INTO dentries
         (id, conversationid, title, dialoguetext, articyId, sequence, dialogueEntryType,
          actor, conversant, outputId, inputId, forced, menuText, flagname, isGroup,
          conditionstring, userscript, hasAlts, hasCheck)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                 ?18, ?19)",
    )?;
    let mut alternate_stmt = tx.prepare(
        "INSERT OR REPLACE INTO alternates
         (id, conversationid, dialogueid, alternateline, condition, replaces)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let mut check_stmt = tx.prepare(
        "INSERT INTO checks (conversationid, dialogueid, checktype, skilltype, check_target, difficulty)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let mut link_stmt = tx.prepare(
        "INSERT INTO dlinks
         (originconversationid, origindialogueid, destinationconversationid,
          destinationdialogueid, isConnector, priority)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    for convo in conversations {
        for entry in &convo.dialogue_entries {
            if let Some(declared) = entry.conversation_id {
                if declared != convo.id {
                    tracing::warn!(
                        "Entry {} declares conversation {} but is listed under {}",
                        entry.id,
                        declared,
                        convo.id
                    );
                }
            }
            let conversation_id = convo.id;
            let fields = Fields(&entry.fields);
            let dialogue_text = fields.text("Dialogue Text");

            let alternates: Vec<(i64, Option<String>, Option<String>)> = (1..=4)
                .map(|i| {
                    (
                        i,
                        fields.text(&format!("Alternate{}", i)),
                        fields.text(&format!("Condition{}", i)),
                    )
                })
                .filter(|(_, line, condition)| line.is_some() || condition.is_some())
                .collect();

            let skill_type = fields.text("SkillType");
            let check_target = fields.text("check_target");
            let checks: Vec<(&str, f64)> = [
                ("passive", "DifficultyPass"),
                ("white", "DifficultyWhite"),
                ("red", "DifficultyRed"),
            ]
            .into_iter()
            .filter_map(|(kind, field)| fields.number(field).map(|d| (kind, d)))
            .collect();

            entry_stmt.execute(params![
                entry.id,
                conversation_id,
                fields.text("Title"),
                dialogue_text,
                fields.text("Articy Id"),
                fields.text("Sequence"),
                fields.text("DialogueEntryType"),
                fields.number("Actor"),
                fields.number("Conversant"),
                fields.text("OutputId"),
                fields.text("InputId"),
                fields.flag("Forced"),
                fields.text("Menu Text"),
                fields.text("FlagName"),
                entry.is_group,
                entry.conditions_string,
                entry.user_script,
                !alternates.is_empty(),
                !checks.is_empty(),
            ])?;
            summary.entries += 1;

            for (slot, line, condition) in &alternates {
                alternate_stmt.execute(params![
                    slot,
                    conversation_id,
                    entry.id,
                    line,
                    condition,
                    dialogue_text
                ])?;
                summary.alternates += 1;
            }

            for (kind, difficulty) in &checks {
                check_stmt.execute(params![
                    conversation_id,
                    entry.id,
                    kind,
                    skill_type,
                    check_target,
                    *difficulty as i64
                ])?;
                summary.checks += 1;
            }

            for link in &entry.outgoing_links {
                let (Some(oc), Some(od), Some(dc), Some(dd)) = (
                    link.origin_conversation_id,
                    link.origin_dialogue_id,
                    link.destination_conversation_id,
                    link.destination_dialogue_id,
                ) else {
                    tracing::warn!(
                        "Skipping incomplete link from entry {}:{}",
                        conversation_id,
                        entry.id
                    );
                    continue;
                };
                link_stmt.execute(params![
                    oc,
                    od,
                    dc,
                    dd,
                    link.is_connector.unwrap_or(false),
                    link.priority.unwrap_or(2)
                ])?;
                summary.links += 1;
            }
        }
    }
    tracing::info!(
        "Imported {} entries, {} alternates, {} checks, {} links",
        summary.entries,
        summary.alternates,
        summary.checks,
        summary.links
    );
    Ok(())
}

/// Columns computed from the imported rows
fn derive_columns(tx: &Transaction<'_>) -> Result<()> {
    // Untitled entries are listed as `<actor>: "<opening of the line>"`
    tx.execute_batch(
        r#"
        UPDATE dentries SET displayTitle =
            COALESCE((SELECT name FROM actors WHERE actors.id = dentries.actor), '') ||
            CASE
                WHEN dialoguetext IS NULL OR dialoguetext = '' THEN ''
                WHEN LENGTH(dialoguetext) > 39 THEN ': "' || SUBSTR(dialoguetext, 1, 36) || '..."'
                ELSE ': "' || dialoguetext || '"'
            END
        WHERE title IS NULL OR title = '';

        UPDATE actors SET talkativeness =
            (SELECT COUNT(*) FROM dentries WHERE dentries.actor = actors.id)
        WHERE id IN (SELECT actor FROM dentries WHERE actor IS NOT NULL);

        UPDATE conversations SET
            totalEntries = (SELECT COUNT(*) FROM dentries WHERE dentries.conversationid = conversations.id),
            isDeadEnd = (SELECT COUNT(*) FROM dentries WHERE dentries.conversationid = conversations.id) <= 2
        WHERE id IN (SELECT conversationid FROM dentries);
        "#,
    )?;
    tracing::info!("Derived display titles, talkativeness and entry totals");
    Ok(())
}
