//! Test Data Factory
//!
//! Writes dialogue rows straight into a dataset connection:
//! - Single actors, conversations, entries, alternates, checks and links
//! - A small precinct corpus used by most journeys
//! - Bulk lines for paging tests

use discobase_core::ConversationType;
use rusqlite::{params, Connection};

/// Factory for dataset rows
///
/// # Example
///
/// ```rust,ignore
/// let conn = Connection::open(path)?;
/// apply_schema(&conn)?;
///
/// DialogueFactory::actor(&conn, 3, "Kim Kitsuragi");
/// DialogueFactory::conversation(&conn, 1, "WHIRLING / KIM", ConversationType::Flow, None, false);
/// DialogueFactory::entry(&conn, 1, 2, "Kim", "Detective.", 3, false);
/// ```
pub struct DialogueFactory;

/// Well-known ids in the precinct corpus
pub struct CorpusIds;

impl CorpusIds {
    pub const YOU: i64 = 1;
    pub const KIM: i64 = 3;
    pub const CUNO: i64 = 5;
    pub const LOGIC: i64 = 9;

    pub const KIM_INTRO: i64 = 1;
    pub const CUNO_YARD: i64 = 2;
    pub const DOOR_ORB: i64 = 3;
    pub const GUN_TASK: i64 = 4;
    pub const OBSOLETE: i64 = 5;
    pub const KIM_BARKS: i64 = 6;

    pub const BULK: i64 = 10;
}

impl DialogueFactory {
    pub fn actor(conn: &Connection, id: i64, name: &str) {
        conn.execute(
            "INSERT INTO actors (id, name) VALUES (?1, ?2)",
            params![id, name],
        )
        .expect("insert actor");
    }

    pub fn skill(conn: &Connection, id: i64, name: &str, articy_id: &str) {
        conn.execute(
            "INSERT INTO actors (id, name, articyId) VALUES (?1, ?2, ?3)",
            params![id, name, articy_id],
        )
        .expect("insert skill");
    }

    pub fn conversation(
        conn: &Connection,
        id: i64,
        title: &str,
        conversation_type: ConversationType,
        description: Option<&str>,
        hidden: bool,
    ) {
        conn.execute(
            "INSERT INTO conversations (id, title, type, description, actor, conversant, isHidden)
             VALUES (?1, ?2, ?3, ?4, 0, 0, ?5)",
            params![id, title, conversation_type.as_str(), description, hidden],
        )
        .expect("insert conversation");
    }

    pub fn entry(
        conn: &Connection,
        conversation_id: i64,
        id: i64,
        title: &str,
        text: &str,
        actor: i64,
        hidden: bool,
    ) {
        conn.execute(
            "INSERT INTO dentries (id, conversationid, title, dialoguetext, actor, isHidden)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, conversation_id, title, text, actor as f64, hidden],
        )
        .expect("insert entry");
    }

    pub fn alternate(
        conn: &Connection,
        conversation_id: i64,
        entry_id: i64,
        slot: i64,
        line: &str,
        condition: &str,
    ) {
        conn.execute(
            "INSERT INTO alternates (id, conversationid, dialogueid, alternateline, condition)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![slot, conversation_id, entry_id, line, condition],
        )
        .expect("insert alternate");
        conn.execute(
            "UPDATE dentries SET hasAlts = 1 WHERE conversationid = ?1 AND id = ?2",
            params![conversation_id, entry_id],
        )
        .expect("flag alternate");
    }

    pub fn check(
        conn: &Connection,
        conversation_id: i64,
        entry_id: i64,
        check_type: &str,
        skill_articy_id: &str,
        difficulty: i64,
    ) {
        conn.execute(
            "INSERT INTO checks (conversationid, dialogueid, checktype, skilltype, difficulty)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![conversation_id, entry_id, check_type, skill_articy_id, difficulty],
        )
        .expect("insert check");
        conn.execute(
            "UPDATE dentries SET hasCheck = 1 WHERE conversationid = ?1 AND id = ?2",
            params![conversation_id, entry_id],
        )
        .expect("flag check");
    }

    pub fn link(conn: &Connection, from: (i64, i64), to: (i64, i64)) {
        conn.execute(
            "INSERT INTO dlinks (originconversationid, origindialogueid,
                                 destinationconversationid, destinationdialogueid)
             VALUES (?1, ?2, ?3, ?4)",
            params![from.0, from.1, to.0, to.1],
        )
        .expect("insert link");
    }

    pub fn variable(conn: &Connection, id: i64, name: &str, description: &str) {
        conn.execute(
            "INSERT INTO variables (id, name, description, initialvalue) VALUES (?1, ?2, ?3, 'False')",
            params![id, name, description],
        )
        .expect("insert variable");
    }

    // ========================================================================
    // SCENARIOS
    // ========================================================================

    /// The precinct corpus
    ///
    /// Whole-word `cop` matches entries 1:2 and 1:4, orb 3 and the alternate
    /// on 1:3. Substring `cop` additionally matches 2:2 (`cops`), 2:3
    /// (`Copper`) and task 4 (`copper`). Conversation 5 and its line are
    /// hidden.
    pub fn create_precinct_corpus(conn: &Connection) {
        Self::actor(conn, 0, "");
        Self::actor(conn, CorpusIds::YOU, "You");
        Self::actor(conn, CorpusIds::KIM, "Kim Kitsuragi");
        Self::actor(conn, CorpusIds::CUNO, "Cuno");
        Self::skill(conn, CorpusIds::LOGIC, "Logic", "skill-logic");

        Self::conversation(conn, CorpusIds::KIM_INTRO, "WHIRLING / KIM / INTRO", ConversationType::Flow, None, false);
        Self::conversation(conn, CorpusIds::CUNO_YARD, "WHIRLING / CUNO", ConversationType::Flow, None, false);
        Self::conversation(
            conn,
            CorpusIds::DOOR_ORB,
            "JAM / DOOR",
            ConversationType::Orb,
            Some("A cop painted on the door."),
            false,
        );
        Self::conversation(
            conn,
            CorpusIds::GUN_TASK,
            "TASK / FIND THE GUN",
            ConversationType::Task,
            Some("Find the copper gun."),
            false,
        );
        Self::conversation(conn, CorpusIds::OBSOLETE, "OBSOLETE / OLD", ConversationType::Flow, None, true);
        Self::conversation(conn, CorpusIds::KIM_BARKS, "WHIRLING / KIM / BARKS", ConversationType::Flow, None, false);

        let intro = CorpusIds::KIM_INTRO;
        Self::entry(conn, intro, 0, "START", "", 0, false);
        Self::entry(conn, intro, 1, "input", "", 0, false);
        Self::entry(conn, intro, 2, "Kim", "Are you a cop?", CorpusIds::KIM, false);
        Self::entry(conn, intro, 3, "You", "I am the law.", CorpusIds::YOU, false);
        Self::entry(conn, intro, 4, "Kim", "O'Brien was a good cop.", CorpusIds::KIM, false);
        Self::alternate(conn, intro, 3, 1, "I am the cop here.", "IsKimHere()");
        Self::check(conn, intro, 3, "white", "skill-logic", 12);
        Self::link(conn, (intro, 0), (intro, 2));
        Self::link(conn, (intro, 2), (intro, 3));
        Self::link(conn, (intro, 2), (intro, 4));
        Self::link(conn, (intro, 3), (intro, 0));

        let yard = CorpusIds::CUNO_YARD;
        Self::entry(conn, yard, 0, "START", "", 0, false);
        Self::entry(conn, yard, 2, "Cuno", "Cuno does not talk to cops.", CorpusIds::CUNO, false);
        Self::entry(conn, yard, 3, "Cuno", "Copper is worth money.", CorpusIds::CUNO, false);

        Self::entry(conn, CorpusIds::OBSOLETE, 2, "Kim", "A cop line nobody sees.", CorpusIds::KIM, true);
        Self::entry(conn, CorpusIds::KIM_BARKS, 2, "Kim", "Officer down.", CorpusIds::KIM, false);

        Self::variable(conn, 1, "whirling.kim_met", "Met Kim at the whirling");
        Self::variable(conn, 2, "jam.door_open", "The door is open");
    }

    /// `count` lines mentioning `tare` in conversation 10, every third one
    /// with an alternate, plus `orbs` orb records mentioning it
    pub fn create_bulk_lines(conn: &Connection, count: usize, orbs: usize) {
        Self::conversation(conn, CorpusIds::BULK, "BULK / LINES", ConversationType::Flow, None, false);
        for i in 0..count as i64 {
            let id = i + 2;
            Self::entry(conn, CorpusIds::BULK, id, "Line", &format!("tare line {}", i), CorpusIds::KIM, false);
            if i % 3 == 0 {
                Self::alternate(conn, CorpusIds::BULK, id, 1, &format!("tare alternate {}", i), "Always()");
            }
        }
        for i in 0..orbs as i64 {
            Self::conversation(
                conn,
                100 + i,
                &format!("ORBS / TARE {}", i),
                ConversationType::Orb,
                Some(&format!("tare orb {}", i)),
                false,
            );
        }
    }
}
