//! Dataset schema
//!
//! Table definitions for the dialogue dataset. The browser only ever reads
//! these tables; the importer and test fixtures create them.
//!
//! Column names match the files produced by the original export tooling, so
//! datasets built elsewhere open without conversion.

/// Tables a file must have to be opened as a dataset
pub const REQUIRED_TABLES: &[&str] = &[
    "actors",
    "alternates",
    "checks",
    "conversations",
    "dentries",
    "dlinks",
    "variables",
];

/// Schema versions, applied in order
pub const SCHEMA: &[SchemaVersion] = &[
    SchemaVersion {
        version: 1,
        description: "Dialogue tables",
        up: SCHEMA_V1_UP,
    },
    SchemaVersion {
        version: 2,
        description: "Lookup indexes for links, alternates and checks",
        up: SCHEMA_V2_UP,
    },
];

/// One schema step
#[derive(Debug, Clone)]
pub struct SchemaVersion {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

/// V1: tables
const SCHEMA_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS actors (
    id INTEGER PRIMARY KEY,
    name TEXT,
    description TEXT,
    characterShortName TEXT,
    shortDescription TEXT,
    longDescription TEXT,
    color REAL,
    articyId TEXT,
    pictures TEXT,
    isFemale INTEGER,
    talkativeness INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS variables (
    id INTEGER PRIMARY KEY,
    name TEXT,
    initialvalue TEXT,
    description TEXT
);

CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY,
    title TEXT,
    articyId TEXT,
    onUse TEXT,
    overrideDialogueCondition TEXT,
    alternateOrbText TEXT,
    checkType TEXT,
    condition TEXT,
    instruction TEXT,
    placement TEXT,
    difficulty TEXT,
    description TEXT,
    actor REAL,
    conversant REAL,
    displayConditionMain TEXT,
    doneConditionMain TEXT,
    cancelConditionMain TEXT,
    taskReward TEXT,
    taskTimed INTEGER,

    -- 'flow', 'orb' or 'task'
    type TEXT NOT NULL DEFAULT 'flow',
    totalSubtasks INTEGER DEFAULT 0,
    displayTitle TEXT,
    isHidden INTEGER DEFAULT 0,
    totalEntries INTEGER DEFAULT 0,
    isDeadEnd INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS dentries (
    id INTEGER NOT NULL,
    conversationid INTEGER NOT NULL,
    title TEXT,
    dialoguetext TEXT,
    articyId TEXT,
    sequence TEXT,
    dialogueEntryType TEXT,
    actor REAL,
    conversant REAL,
    outputId TEXT,
    inputId TEXT,
    forced INTEGER,
    menuText TEXT,
    flagname TEXT,
    isGroup INTEGER,
    conditionstring TEXT,
    userscript TEXT,
    hasAlts INTEGER DEFAULT 0,
    hasCheck INTEGER DEFAULT 0,
    isHidden INTEGER DEFAULT 0,
    displayTitle TEXT,
    PRIMARY KEY (conversationid, id)
);

-- Up to four condition-gated substitute lines per entry
CREATE TABLE IF NOT EXISTS alternates (
    id INTEGER NOT NULL,
    conversationid INTEGER NOT NULL,
    dialogueid INTEGER NOT NULL,
    alternateline TEXT,
    condition TEXT,
    replaces TEXT,
    PRIMARY KEY (conversationid, dialogueid, id)
);

CREATE TABLE IF NOT EXISTS checks (
    conversationid INTEGER NOT NULL,
    dialogueid INTEGER NOT NULL,
    -- 'passive', 'white' or 'red'
    checktype TEXT,
    -- articyId of the skill actor
    skilltype TEXT,
    check_target TEXT,
    difficulty INTEGER
);

CREATE TABLE IF NOT EXISTS dlinks (
    originconversationid INTEGER NOT NULL,
    origindialogueid INTEGER NOT NULL,
    destinationconversationid INTEGER NOT NULL,
    destinationdialogueid INTEGER NOT NULL,
    isConnector INTEGER DEFAULT 0,
    priority INTEGER DEFAULT 2
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR REPLACE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: indexes
const SCHEMA_V2_UP: &str = r#"
CREATE INDEX IF NOT EXISTS idx_dentries_actor ON dentries(actor);
CREATE INDEX IF NOT EXISTS idx_conversations_type ON conversations(type);
CREATE INDEX IF NOT EXISTS idx_alternates_entry ON alternates(conversationid, dialogueid);
CREATE INDEX IF NOT EXISTS idx_checks_entry ON checks(conversationid, dialogueid);
CREATE INDEX IF NOT EXISTS idx_dlinks_origin ON dlinks(originconversationid, origindialogueid);
CREATE INDEX IF NOT EXISTS idx_dlinks_destination ON dlinks(destinationconversationid, destinationdialogueid);
CREATE INDEX IF NOT EXISTS idx_actors_articy ON actors(articyId);

INSERT OR REPLACE INTO schema_version (version, applied_at) VALUES (2, datetime('now'));
"#;

/// Current schema version of a connection; 0 when it has none
pub fn current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Create or upgrade the dataset tables; returns the number of steps applied
pub fn apply_schema(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current = current_version(conn)?;
    let mut applied = 0;

    for step in SCHEMA {
        if step.version > current {
            tracing::info!("Applying schema v{}: {}", step.version, step.description);
            conn.execute_batch(step.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
