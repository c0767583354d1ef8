//! SQLite Dataset Implementation
//!
//! Read-only dataset handle: dialogue search, the lookups behind the
//! conversation and entry views, and the entry detail cache.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use super::rows::{
    row_to_actor, row_to_alternate, row_to_check, row_to_conversation,
    row_to_conversation_summary, row_to_entry, row_to_entry_summary, row_to_link,
    row_to_search_row, row_to_variable, CONVERSATION_COLUMNS,
};
use super::schema::REQUIRED_TABLES;
use super::{DatasetError, Result};
use crate::cache::EntryCache;
use crate::config::DatasetConfig;
use crate::model::{
    ActorRecord, AlternateLine, AlternateSelection, CheckRecord, ConversationRecord,
    ConversationSummary, EntryDetails, EntryKey, EntryLinks, EntryRecord, EntrySummary,
    VariableRecord,
};
use crate::search::{
    plan_windows, variable_predicate, ConditionBuilder, FilterState, Predicate, QueryTokens,
    SearchBackend, SearchCursor, SearchPage, SearchRequest, SearchRow, SearchSource,
    SourceCounts, VariablePage, Window,
};

// ============================================================================
// DATASET
// ============================================================================

/// Read-only handle on a dialogue dataset
///
/// All methods take `&self`; the connection and the detail cache sit behind
/// their own mutexes so the handle can be shared across threads.
pub struct Dataset {
    reader: Mutex<Connection>,
    cache: Mutex<EntryCache>,
    config: DatasetConfig,
}

impl Dataset {
    /// Open the dataset file named by `config`, read-only
    pub fn open(config: DatasetConfig) -> Result<Self> {
        let path = config.path.clone();
        let unavailable = |reason: String| DatasetError::DatasetUnavailable {
            path: path.clone(),
            reason,
        };

        if !path.exists() {
            return Err(unavailable("file not found".to_string()));
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| unavailable(e.to_string()))?;

        let missing = missing_tables(&conn).map_err(|e| unavailable(e.to_string()))?;
        if !missing.is_empty() {
            return Err(unavailable(format!("missing tables: {}", missing.join(", "))));
        }

        tracing::info!("Opened dataset at {}", path.display());
        Ok(Self::with_connection(conn, config))
    }

    /// Wrap an already open connection (in-memory fixtures, freshly imported files)
    pub fn from_connection(conn: Connection, config: DatasetConfig) -> Result<Self> {
        let missing = missing_tables(&conn)?;
        if !missing.is_empty() {
            return Err(DatasetError::DatasetUnavailable {
                path: config.path.clone(),
                reason: format!("missing tables: {}", missing.join(", ")),
            });
        }
        Ok(Self::with_connection(conn, config))
    }

    fn with_connection(conn: Connection, config: DatasetConfig) -> Self {
        Self {
            reader: Mutex::new(conn),
            cache: Mutex::new(EntryCache::new(config.cache_capacity)),
            config,
        }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    fn reader(&self) -> Result<MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| DatasetError::Lock("Reader lock poisoned".into()))
    }

    fn cache(&self) -> Result<MutexGuard<'_, EntryCache>> {
        self.cache
            .lock()
            .map_err(|_| DatasetError::Lock("Entry cache lock poisoned".into()))
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    /// A first-page request with the configured page size
    pub fn request(&self, query: impl Into<String>, filters: FilterState) -> SearchRequest {
        SearchRequest::new(query)
            .with_limit(self.config.page_size)
            .with_filters(filters)
    }

    /// A cursor over `query` starting at the first page
    pub fn cursor(&self, query: impl Into<String>, filters: FilterState) -> SearchCursor {
        SearchCursor::new(self.request(query, filters))
    }

    /// Search entries, orb/task records and alternate lines
    ///
    /// Rows come back as entries, then conversation records, then alternates.
    /// `total` is the sum of the unlimited per-source counts and does not
    /// depend on `offset` or `limit`.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let tokens = QueryTokens::parse(&request.query);
        let builder = ConditionBuilder::new(&tokens, &request.filters);
        let predicates = SearchSource::ORDER.map(|source| (source, builder.build(source)));

        let reader = self.reader()?;

        let mut counts = SourceCounts::default();
        for (source, predicate) in &predicates {
            tracing::debug!("Search predicate [{}]: {}", source, predicate);
            counts.set(*source, count_source(&reader, *source, predicate)?);
        }
        tracing::debug!(
            "Search counts: {} entries, {} conversations, {} alternates",
            counts.entries,
            counts.conversations,
            counts.alternates
        );

        let windows = plan_windows(request.offset, request.limit, &counts, self.config.paging);

        let mut results = Vec::new();
        for ((source, window), (_, predicate)) in windows.iter().zip(predicates.iter()) {
            if window.is_empty() {
                continue;
            }
            results.extend(fetch_source(&reader, *source, predicate, *window)?);
        }

        Ok(SearchPage {
            results,
            total: counts.total(),
            counts,
        })
    }

    /// Search variable names and descriptions; an empty query returns nothing
    pub fn search_variables(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
        whole_words: bool,
    ) -> Result<VariablePage> {
        if query.trim().is_empty() {
            return Ok(VariablePage::default());
        }

        let tokens = QueryTokens::parse_plain(query);
        let predicate = variable_predicate(&tokens, whole_words);
        tracing::debug!("Variable predicate: {}", predicate);

        let reader = self.reader()?;
        let run = || -> rusqlite::Result<VariablePage> {
            let total: i64 = reader.query_row(
                &format!("SELECT COUNT(*) FROM variables WHERE {}", predicate),
                [],
                |row| row.get(0),
            )?;

            let mut stmt = reader.prepare(&format!(
                "SELECT id, name, description, initialvalue FROM variables
                 WHERE {} ORDER BY name, id LIMIT ?1 OFFSET ?2",
                predicate
            ))?;
            let results = stmt
                .query_map(params![limit as i64, offset as i64], row_to_variable)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(VariablePage {
                results,
                total: total.max(0) as usize,
            })
        };
        run().map_err(|e| DatasetError::QueryExecution(format!("variables: {}", e)))
    }

    // ========================================================================
    // CONVERSATIONS
    // ========================================================================

    /// A conversation by id; hidden ones only with `show_hidden`
    pub fn conversation(&self, id: i64, show_hidden: bool) -> Result<Option<ConversationRecord>> {
        let reader = self.reader()?;
        let hidden = if show_hidden {
            ""
        } else {
            " AND COALESCE(isHidden, 0) != 1"
        };
        let mut stmt = reader.prepare(&format!(
            "SELECT {} FROM conversations WHERE id = ?1{}",
            CONVERSATION_COLUMNS, hidden
        ))?;
        Ok(stmt.query_row(params![id], row_to_conversation).optional()?)
    }

    /// Every conversation as `(id, title, type)` for the hierarchy, by title
    pub fn conversations_for_tree(&self, show_hidden: bool) -> Result<Vec<ConversationSummary>> {
        let reader = self.reader()?;
        let filter = if show_hidden {
            ""
        } else {
            "WHERE COALESCE(isHidden, 0) != 1"
        };
        let mut stmt = reader.prepare(&format!(
            "SELECT id, title, type FROM conversations {} ORDER BY title, id",
            filter
        ))?;
        let rows = stmt
            .query_map([], row_to_conversation_summary)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ========================================================================
    // ENTRIES
    // ========================================================================

    /// Entries of one conversation, by id
    pub fn entries_for_conversation(
        &self,
        conversation_id: i64,
        show_hidden: bool,
    ) -> Result<Vec<EntrySummary>> {
        let reader = self.reader()?;
        let hidden = if show_hidden {
            ""
        } else {
            " AND COALESCE(isHidden, 0) != 1"
        };
        let mut stmt = reader.prepare(&format!(
            "SELECT conversationid, id, title, dialoguetext, actor, isHidden
             FROM dentries WHERE conversationid = ?1{} ORDER BY id",
            hidden
        ))?;
        let rows = stmt
            .query_map(params![conversation_id], row_to_entry_summary)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// One entry with its core fields
    pub fn entry(&self, key: EntryKey) -> Result<Option<EntryRecord>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT de.conversationid, de.id, de.title, de.dialoguetext, de.actor,
                    de.hasAlts, de.hasCheck, de.sequence, de.conditionstring, de.userscript,
                    de.isHidden,
                    (SELECT c.difficulty FROM checks c
                      WHERE c.conversationid = de.conversationid AND c.dialogueid = de.id
                      LIMIT 1)
             FROM dentries de
             WHERE de.conversationid = ?1 AND de.id = ?2",
        )?;
        Ok(stmt
            .query_row(params![key.conversation_id, key.entry_id], row_to_entry)
            .optional()?)
    }

    /// Alternate lines of an entry, in slot order
    pub fn alternates(&self, key: EntryKey) -> Result<Vec<AlternateLine>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT conversationid, dialogueid, alternateline, condition
             FROM alternates
             WHERE conversationid = ?1 AND dialogueid = ?2
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![key.conversation_id, key.entry_id], row_to_alternate)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Skill checks of an entry, with the skill's name
    pub fn checks(&self, key: EntryKey) -> Result<Vec<CheckRecord>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT c.checktype, c.difficulty, d.flagname, d.forced, a.name
             FROM checks c
             LEFT JOIN dentries d ON c.dialogueid = d.id AND c.conversationid = d.conversationid
             LEFT JOIN actors a ON a.articyId = c.skilltype
             WHERE c.conversationid = ?1 AND c.dialogueid = ?2",
        )?;
        let rows = stmt
            .query_map(params![key.conversation_id, key.entry_id], row_to_check)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Incoming (parents) and outgoing (children) links of an entry
    pub fn links(&self, key: EntryKey) -> Result<EntryLinks> {
        let reader = self.reader()?;
        let columns = "originconversationid, origindialogueid,
                       destinationconversationid, destinationdialogueid,
                       priority, isConnector";

        let mut parents_stmt = reader.prepare(&format!(
            "SELECT {} FROM dlinks
             WHERE destinationconversationid = ?1 AND destinationdialogueid = ?2
             ORDER BY rowid",
            columns
        ))?;
        let parents = parents_stmt
            .query_map(params![key.conversation_id, key.entry_id], row_to_link)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut children_stmt = reader.prepare(&format!(
            "SELECT {} FROM dlinks
             WHERE originconversationid = ?1 AND origindialogueid = ?2
             ORDER BY rowid",
            columns
        ))?;
        let children = children_stmt
            .query_map(params![key.conversation_id, key.entry_id], row_to_link)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(EntryLinks { parents, children })
    }

    /// Many entries at once, one query per conversation
    ///
    /// Keys that do not resolve (or are hidden without `show_hidden`) are
    /// skipped.
    pub fn entries_bulk(&self, keys: &[EntryKey], show_hidden: bool) -> Result<Vec<EntrySummary>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_conversation: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for key in keys {
            by_conversation
                .entry(key.conversation_id)
                .or_default()
                .push(key.entry_id);
        }

        let reader = self.reader()?;
        let hidden = if show_hidden {
            ""
        } else {
            " AND COALESCE(isHidden, 0) != 1"
        };

        let mut results = Vec::with_capacity(keys.len());
        for (conversation_id, entry_ids) in by_conversation {
            let id_list = entry_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let mut stmt = reader.prepare(&format!(
                "SELECT conversationid, id, title, dialoguetext, actor, isHidden
                 FROM dentries WHERE conversationid = ?1{} AND id IN ({}) ORDER BY id",
                hidden, id_list
            ))?;
            let rows = stmt
                .query_map(params![conversation_id], row_to_entry_summary)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            results.extend(rows);
        }
        Ok(results)
    }

    /// Entries reachable from `key` through its outgoing links, in link
    /// order, leaving out `START` nodes
    pub fn next_options(&self, key: EntryKey, show_hidden: bool) -> Result<Vec<EntrySummary>> {
        let children = self.links(key)?.children;
        let destinations: Vec<EntryKey> = children.iter().map(|l| l.destination).collect();

        let mut by_key: BTreeMap<EntryKey, EntrySummary> = self
            .entries_bulk(&destinations, show_hidden)?
            .into_iter()
            .map(|e| (e.key(), e))
            .collect();

        Ok(destinations
            .iter()
            .filter_map(|k| by_key.remove(k))
            .filter(|e| {
                !e.title
                    .as_deref()
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("start"))
            })
            .collect())
    }

    // ========================================================================
    // ACTORS & VARIABLES
    // ========================================================================

    /// Named actors, by name
    pub fn distinct_actors(&self) -> Result<Vec<ActorRecord>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT DISTINCT id, name, color FROM actors
             WHERE name IS NOT NULL AND name != ''
             ORDER BY name, id",
        )?;
        let rows = stmt
            .query_map([], row_to_actor)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// An actor by id; 0 is the unassigned actor and never resolves
    pub fn actor(&self, id: i64) -> Result<Option<ActorRecord>> {
        if id == 0 {
            return Ok(None);
        }
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT id, name, color FROM actors WHERE id = ?1")?;
        Ok(stmt.query_row(params![id], row_to_actor).optional()?)
    }

    fn actor_name(&self, id: Option<i64>) -> Result<Option<String>> {
        match id {
            Some(id) => Ok(self.actor(id)?.map(|a| a.name).filter(|n| !n.is_empty())),
            None => Ok(None),
        }
    }

    pub fn variable(&self, id: i64) -> Result<Option<VariableRecord>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT id, name, description, initialvalue FROM variables WHERE id = ?1",
        )?;
        Ok(stmt.query_row(params![id], row_to_variable).optional()?)
    }

    // ========================================================================
    // ENTRY DETAILS
    // ========================================================================

    /// Everything shown for one entry
    ///
    /// Without a selection the cached copy is used when present and stored
    /// otherwise. With an alternate selected, the details are rebuilt and
    /// returned with the selection attached, and the cache is left alone.
    pub fn entry_details(
        &self,
        key: EntryKey,
        selection: Option<AlternateSelection>,
    ) -> Result<Option<EntryDetails>> {
        let selection = selection.filter(|s| !s.is_empty());

        if selection.is_none() {
            if let Some(hit) = self.cache()?.get(&key) {
                tracing::debug!("Entry cache hit for {}", key);
                return Ok(Some(hit));
            }
        }

        let Some(mut details) = self.assemble_details(key)? else {
            return Ok(None);
        };

        match selection {
            Some(selected) => details.selected_alternate = Some(selected),
            None => self.cache()?.put(key, details.clone()),
        }
        Ok(Some(details))
    }

    fn assemble_details(&self, key: EntryKey) -> Result<Option<EntryDetails>> {
        let Some(entry) = self.entry(key)? else {
            return Ok(None);
        };

        let actor_name = self.actor_name(entry.actor)?;
        let alternates = self.alternates(key)?;
        let checks = self.checks(key)?;
        let links = self.links(key)?;
        let conversation = self.conversation(key.conversation_id, true)?;
        let (conversation_actor_name, conversation_conversant_name) = match &conversation {
            Some(c) => (self.actor_name(c.actor)?, self.actor_name(c.conversant)?),
            None => (None, None),
        };

        Ok(Some(EntryDetails {
            entry,
            actor_name,
            alternates,
            checks,
            links,
            conversation,
            conversation_actor_name,
            conversation_conversant_name,
            selected_alternate: None,
        }))
    }

    /// Drop one entry's cached details; returns whether it was cached
    pub fn invalidate_entry(&self, key: EntryKey) -> Result<bool> {
        Ok(self.cache()?.invalidate(&key))
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache()?.clear();
        Ok(())
    }

    pub fn cached_entries(&self) -> Result<usize> {
        Ok(self.cache()?.len())
    }
}

impl SearchBackend for Dataset {
    fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        Dataset::search(self, request)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn missing_tables(conn: &Connection) -> rusqlite::Result<Vec<&'static str>> {
    let mut stmt =
        conn.prepare("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    let mut missing = Vec::new();
    for table in REQUIRED_TABLES {
        let n: i64 = stmt.query_row(params![table], |row| row.get(0))?;
        if n == 0 {
            missing.push(*table);
        }
    }
    Ok(missing)
}

fn query_error(source: SearchSource, e: rusqlite::Error) -> DatasetError {
    DatasetError::QueryExecution(format!("{}: {}", source, e))
}

fn count_source(conn: &Connection, source: SearchSource, predicate: &Predicate) -> Result<usize> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {}",
        source.from_clause(),
        predicate
    );
    let count: i64 = conn
        .query_row(&sql, [], |row| row.get(0))
        .map_err(|e| query_error(source, e))?;
    Ok(count.max(0) as usize)
}

fn fetch_source(
    conn: &Connection,
    source: SearchSource,
    predicate: &Predicate,
    window: Window,
) -> Result<Vec<SearchRow>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {} LIMIT ?1 OFFSET ?2",
        source.select_columns(),
        source.from_clause(),
        predicate,
        source.order_by()
    );
    let run = || -> rusqlite::Result<Vec<SearchRow>> {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![window.limit as i64, window.offset as i64], |row| {
                row_to_search_row(row, source)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    };
    run().map_err(|e| query_error(source, e))
}
