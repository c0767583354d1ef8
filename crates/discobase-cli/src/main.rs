//! Discobase CLI
//!
//! Command-line browser for a dialogue dataset: search, the conversation
//! tree, entry details with links and checks, and dataset import.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use discobase_core::{
    build_hierarchy, import_export, ActorFilter, AlternateSelection, ConversationTree,
    ConversationType, Dataset, DatasetConfig, EntryDetails, EntryKey, EntrySummary, FilterState,
    PagingMode, SearchCursor, SearchRow, TreeNode,
};
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Discobase - dialogue dataset browser
#[derive(Parser)]
#[command(name = "discobase")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search and browse a branching dialogue dataset")]
#[command(long_about = "Search entries, orbs, tasks and alternate lines, browse conversations as a title tree, \
and follow links between entries.\n\nThe dataset defaults to db/discobase.sqlite3 when present, \
otherwise DISCOBASE_DB_PATH or the platform data directory.")]
struct Cli {
    /// Dataset file to open
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Paging mode for search: sequential or shared
    #[arg(long, global = true)]
    paging: Option<PagingMode>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search dialogue lines, orb/task records and alternate lines
    Search(SearchArgs),

    /// Search variable names and descriptions
    Variables {
        /// Words to look for
        query: String,
        #[arg(long, default_value = "50")]
        limit: usize,
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Match whole words only
        #[arg(long)]
        whole_words: bool,
        #[arg(long)]
        json: bool,
    },

    /// Show the conversation title tree
    Tree {
        /// Only conversations of this type (flow, orb, task)
        #[arg(long = "type")]
        conversation_type: Option<ConversationType>,
        /// List conversations whose title or id contains this text
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        show_hidden: bool,
        #[arg(long)]
        json: bool,
    },

    /// Show a conversation and its entries
    Conversation {
        id: i64,
        #[arg(long)]
        show_hidden: bool,
        #[arg(long)]
        json: bool,
    },

    /// Show one entry with its alternates, checks and links
    Entry {
        conversation_id: i64,
        entry_id: i64,
        /// Condition of the alternate line to display
        #[arg(long)]
        alternate_condition: Option<String>,
        /// Alternate line to display instead of the original
        #[arg(long)]
        alternate_line: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// List the entries an entry leads to
    Options {
        conversation_id: i64,
        entry_id: i64,
        #[arg(long)]
        show_hidden: bool,
    },

    /// List named actors
    Actors {
        #[arg(long)]
        json: bool,
    },

    /// Build a dataset from a dialogue-database JSON export
    Import {
        /// Export file
        input: PathBuf,
        /// Dataset file to create
        output: PathBuf,
        /// Replace the output file if it exists
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Words, "quoted phrases", Variable["names"] or Function(calls)
    query: String,
    /// Only lines spoken by these actor ids
    #[arg(long = "actor")]
    actors: Vec<i64>,
    /// Only these conversation ids
    #[arg(long = "conversation")]
    conversations: Vec<i64>,
    /// Only these conversation types
    #[arg(long = "type")]
    types: Vec<ConversationType>,
    /// Match whole words only
    #[arg(long)]
    whole_words: bool,
    /// Include hidden conversations and entries
    #[arg(long)]
    show_hidden: bool,
    /// Include the start entries of each conversation
    #[arg(long)]
    include_start: bool,
    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    limit: Option<usize>,
    #[arg(long, default_value = "0")]
    offset: usize,
    /// Fetch every page
    #[arg(long)]
    all: bool,
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    let mut config = DatasetConfig::from_env();
    if let Some(db) = cli.db {
        config.path = db;
    }
    if let Some(paging) = cli.paging {
        config.paging = paging;
    }

    match cli.command {
        Commands::Search(args) => run_search(config, args),
        Commands::Variables {
            query,
            limit,
            offset,
            whole_words,
            json,
        } => run_variables(config, &query, limit, offset, whole_words, json),
        Commands::Tree {
            conversation_type,
            filter,
            show_hidden,
            json,
        } => run_tree(config, conversation_type, filter, show_hidden, json),
        Commands::Conversation {
            id,
            show_hidden,
            json,
        } => run_conversation(config, id, show_hidden, json),
        Commands::Entry {
            conversation_id,
            entry_id,
            alternate_condition,
            alternate_line,
            json,
        } => {
            let selection = AlternateSelection {
                condition: alternate_condition,
                line: alternate_line,
            };
            run_entry(
                config,
                EntryKey::new(conversation_id, entry_id),
                selection,
                json,
            )
        }
        Commands::Options {
            conversation_id,
            entry_id,
            show_hidden,
        } => run_options(config, EntryKey::new(conversation_id, entry_id), show_hidden),
        Commands::Actors { json } => run_actors(config, json),
        Commands::Import {
            input,
            output,
            force,
        } => run_import(input, output, force),
    }
}

fn open_dataset(config: DatasetConfig) -> anyhow::Result<Dataset> {
    Dataset::open(config).context("Could not open dataset (use --db or DISCOBASE_DB_PATH)")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// SEARCH
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchOutput<'a> {
    query: &'a str,
    offset: usize,
    total: Option<usize>,
    results: Vec<&'a SearchRow>,
}

fn run_search(config: DatasetConfig, args: SearchArgs) -> anyhow::Result<()> {
    let dataset = open_dataset(config)?;

    let actors = if args.actors.is_empty() {
        ActorFilter::Any
    } else {
        let all_actor_count = dataset.distinct_actors()?.len();
        ActorFilter::from_selection(&args.actors, all_actor_count)
    };
    let filters = FilterState::default()
        .with_actors(actors)
        .with_conversations(args.conversations)
        .with_types(args.types)
        .with_whole_words(args.whole_words)
        .with_show_hidden(args.show_hidden)
        .with_exclude_start(!args.include_start);

    let mut request = dataset.request(args.query.as_str(), filters).with_offset(args.offset);
    if let Some(limit) = args.limit {
        request = request.with_limit(limit.max(1));
    }

    let mut cursor = SearchCursor::new(request);
    if args.all {
        cursor.fetch_all(&dataset)?;
    } else {
        cursor.fetch_next(&dataset)?;
    }
    let rows = cursor.refined_rows();

    if args.json {
        return print_json(&SearchOutput {
            query: &args.query,
            offset: args.offset,
            total: cursor.total(),
            results: rows,
        });
    }

    println!("{}", format!("=== Search: {} ===", args.query).cyan().bold());
    println!(
        "{}: {} of {}",
        "Showing".white().bold(),
        rows.len(),
        cursor.total().unwrap_or(0)
    );
    println!();

    for row in &rows {
        print_search_row(&dataset, row)?;
    }

    if cursor.has_more() && !args.all {
        println!();
        println!(
            "{}",
            format!("More results: --offset {}", cursor.offset()).dimmed()
        );
    }
    Ok(())
}

fn print_search_row(dataset: &Dataset, row: &SearchRow) -> anyhow::Result<()> {
    let location = match row.entry_id {
        Some(entry_id) => format!("{}:{}", row.conversation_id, entry_id),
        None => format!("{}", row.conversation_id),
    };
    let speaker = match row.actor {
        Some(id) => dataset.actor(id)?.map(|a| a.name),
        None => None,
    };

    let tag = match row.source {
        discobase_core::SearchSource::Entries => "line".green(),
        discobase_core::SearchSource::Conversations => "record".magenta(),
        discobase_core::SearchSource::Alternates => "alt".yellow(),
    };

    println!(
        "[{}] {} {}",
        tag,
        location.white().bold(),
        row.title.as_deref().unwrap_or("").dimmed()
    );
    let text = truncate(row.dialogue_text.as_deref().unwrap_or(""), 160);
    match speaker {
        Some(name) => println!("    {}: {}", name.cyan(), text),
        None => println!("    {}", text),
    }
    if let Some(condition) = &row.alternate_condition {
        println!("    {} {}", "if".dimmed(), condition.dimmed());
    }
    Ok(())
}

fn run_variables(
    config: DatasetConfig,
    query: &str,
    limit: usize,
    offset: usize,
    whole_words: bool,
    json: bool,
) -> anyhow::Result<()> {
    let dataset = open_dataset(config)?;
    let page = dataset.search_variables(query, limit, offset, whole_words)?;

    if json {
        return print_json(&page);
    }

    println!("{}", format!("=== Variables: {} ===", query).cyan().bold());
    println!("{}: {} of {}", "Showing".white().bold(), page.results.len(), page.total);
    println!();
    for variable in &page.results {
        println!(
            "{} {} = {}",
            format!("#{}", variable.id).dimmed(),
            variable.name.as_deref().unwrap_or("(unnamed)").white().bold(),
            variable.initial_value.as_deref().unwrap_or("-")
        );
        if let Some(description) = &variable.description {
            println!("    {}", truncate(description, 160).dimmed());
        }
    }
    Ok(())
}

// ============================================================================
// TREE
// ============================================================================

fn run_tree(
    config: DatasetConfig,
    conversation_type: Option<ConversationType>,
    filter: Option<String>,
    show_hidden: bool,
    json: bool,
) -> anyhow::Result<()> {
    let dataset = open_dataset(config)?;
    let rows = dataset.conversations_for_tree(show_hidden)?;
    let mut tree = build_hierarchy(&rows);
    if let Some(t) = conversation_type {
        tree = tree.filtered_by_type(t);
    }

    if let Some(text) = filter {
        let leaves = tree.matching_leaves(&text, conversation_type);
        if json {
            return print_json(&leaves);
        }
        println!("{}", format!("=== Conversations matching {:?} ===", text).cyan().bold());
        for leaf in &leaves {
            println!(
                "{} {}",
                format!("#{}", leaf.id).dimmed(),
                type_color(leaf.conversation_type, &leaf.title)
            );
        }
        println!();
        println!("{}: {}", "Matches".white().bold(), leaves.len());
        return Ok(());
    }

    if json {
        return print_json(&tree.root);
    }

    println!("{}", "=== Conversations ===".cyan().bold());
    for child in tree.root.children.values() {
        print_tree_node(&tree, child, 0);
    }
    println!();
    println!("{}: {}", "Total".white().bold(), tree.root.subtree_size);
    Ok(())
}

fn print_tree_node(tree: &ConversationTree, node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let marker = if node.shows_toggle() { "+" } else { "-" };
    let label = type_color(tree.dominant_type(node), &node.label);

    if node.shows_toggle() {
        println!(
            "{}{} {} {}",
            indent,
            marker,
            label,
            format!("({})", node.subtree_size).dimmed()
        );
    } else {
        println!("{}{} {}", indent, marker, label);
    }

    for child in node.children.values() {
        print_tree_node(tree, child, depth + 1);
    }
}

fn type_color(conversation_type: ConversationType, text: &str) -> ColoredString {
    match conversation_type {
        ConversationType::Orb => text.magenta(),
        ConversationType::Task => text.yellow(),
        ConversationType::Flow => text.normal(),
    }
}

// ============================================================================
// CONVERSATIONS & ENTRIES
// ============================================================================

#[derive(Serialize)]
struct ConversationOutput {
    conversation: discobase_core::ConversationRecord,
    entries: Vec<EntrySummary>,
}

fn run_conversation(
    config: DatasetConfig,
    id: i64,
    show_hidden: bool,
    json: bool,
) -> anyhow::Result<()> {
    let dataset = open_dataset(config)?;
    let Some(conversation) = dataset.conversation(id, show_hidden)? else {
        anyhow::bail!("Conversation {} not found", id);
    };
    let entries = dataset.entries_for_conversation(id, show_hidden)?;

    if json {
        return print_json(&ConversationOutput {
            conversation,
            entries,
        });
    }

    let title = conversation.title.as_deref().unwrap_or("(untitled)");
    println!("{}", format!("=== {} ===", title).cyan().bold());
    println!("{}: {}", "Type".white().bold(), conversation.conversation_type);
    if let Some(description) = &conversation.description {
        println!("{}: {}", "Description".white().bold(), description);
    }
    if conversation.conversation_type == ConversationType::Task {
        println!("{}: {}", "Subtasks".white().bold(), conversation.total_subtasks);
        if let Some(reward) = &conversation.task_reward {
            println!("{}: {}", "Reward".white().bold(), reward);
        }
    }
    println!("{}: {}", "Entries".white().bold(), entries.len());
    println!();

    for entry in &entries {
        print_entry_summary(&entry_label(entry), entry);
    }
    Ok(())
}

fn run_entry(
    config: DatasetConfig,
    key: EntryKey,
    selection: AlternateSelection,
    json: bool,
) -> anyhow::Result<()> {
    let dataset = open_dataset(config)?;
    let Some(details) = dataset.entry_details(key, Some(selection))? else {
        anyhow::bail!("Entry {} not found", key);
    };

    if json {
        return print_json(&details);
    }
    print_entry_details(&details);
    Ok(())
}

fn print_entry_details(details: &EntryDetails) {
    let entry = &details.entry;
    let heading = details
        .conversation
        .as_ref()
        .and_then(|c| c.title.clone())
        .unwrap_or_else(|| format!("Conversation {}", entry.conversation_id));

    println!("{}", format!("=== {} ({}) ===", heading, entry.key()).cyan().bold());
    if let Some(name) = &details.actor_name {
        println!("{}: {}", "Speaker".white().bold(), name);
    }
    println!("{}", details.display_text().unwrap_or("(no text)"));
    if let Some(selected) = &details.selected_alternate {
        if let Some(condition) = &selected.condition {
            println!("{} {}", "alternate when".dimmed(), condition.dimmed());
        }
    }

    if let Some(condition) = &entry.condition_string {
        println!("{}: {}", "Condition".white().bold(), condition);
    }
    if let Some(script) = &entry.user_script {
        println!("{}: {}", "Script".white().bold(), script);
    }

    if !details.alternates.is_empty() {
        println!();
        println!("{}", "Alternates".yellow().bold());
        for alternate in &details.alternates {
            println!(
                "  {} {}",
                alternate.alternate_line.as_deref().unwrap_or(""),
                format!("[{}]", alternate.condition.as_deref().unwrap_or("-")).dimmed()
            );
        }
    }

    if !details.checks.is_empty() {
        println!();
        println!("{}", "Checks".yellow().bold());
        for check in &details.checks {
            println!(
                "  {} {} {}{}",
                check.check_type.as_deref().unwrap_or("check"),
                check.skill_name.as_deref().unwrap_or("?").white().bold(),
                check.difficulty.map(|d| d.to_string()).unwrap_or_default(),
                if check.forced { " (forced)" } else { "" }
            );
        }
    }

    println!();
    println!(
        "{}: {}",
        "Parents".white().bold(),
        link_list(details.links.parents.iter().map(|l| l.origin))
    );
    println!(
        "{}: {}",
        "Children".white().bold(),
        link_list(details.links.children.iter().map(|l| l.destination))
    );
}

fn link_list(keys: impl Iterator<Item = EntryKey>) -> String {
    let keys: Vec<String> = keys.map(|k| k.to_string()).collect();
    if keys.is_empty() {
        "-".to_string()
    } else {
        keys.join(", ")
    }
}

fn run_options(config: DatasetConfig, key: EntryKey, show_hidden: bool) -> anyhow::Result<()> {
    let dataset = open_dataset(config)?;
    let options = dataset.next_options(key, show_hidden)?;

    println!("{}", format!("=== Options after {} ===", key).cyan().bold());
    if options.is_empty() {
        println!("{}", "No further options.".dimmed());
    }
    for (i, entry) in options.iter().enumerate() {
        print_entry_summary(&format!("{}.", i + 1), entry);
    }
    Ok(())
}

fn entry_label(entry: &EntrySummary) -> String {
    format!("{}", entry.id)
}

fn print_entry_summary(label: &str, entry: &EntrySummary) {
    let title = entry.title.as_deref().unwrap_or("");
    let text = truncate(entry.dialogue_text.as_deref().unwrap_or(""), 120);
    let line = format!("{:>5} {} {}", label, title.white().bold(), text);
    if entry.is_hidden {
        println!("{}", line.dimmed());
    } else {
        println!("{}", line);
    }
}

fn run_actors(config: DatasetConfig, json: bool) -> anyhow::Result<()> {
    let dataset = open_dataset(config)?;
    let actors = dataset.distinct_actors()?;

    if json {
        return print_json(&actors);
    }
    println!("{}", "=== Actors ===".cyan().bold());
    for actor in &actors {
        println!("{} {}", format!("{:>5}", actor.id).dimmed(), actor.name);
    }
    Ok(())
}

// ============================================================================
// IMPORT
// ============================================================================

fn run_import(input: PathBuf, output: PathBuf, force: bool) -> anyhow::Result<()> {
    if !input.exists() {
        anyhow::bail!("Export file not found: {}", input.display());
    }
    if output.exists() {
        if force {
            std::fs::remove_file(&output)
                .with_context(|| format!("Could not remove {}", output.display()))?;
        } else {
            anyhow::bail!(
                "{} already exists (use --force to replace it)",
                output.display()
            );
        }
    }

    println!("Importing {} ...", input.display());
    let summary = import_export(&input, &output)?;

    println!("{}", "=== Import Complete ===".green().bold());
    println!("{}: {}", "Actors".white().bold(), summary.actors);
    println!("{}: {}", "Variables".white().bold(), summary.variables);
    println!(
        "{}: {} ({} hidden)",
        "Conversations".white().bold(),
        summary.conversations,
        summary.hidden_conversations
    );
    println!("{}: {}", "Entries".white().bold(), summary.entries);
    println!("{}: {}", "Alternates".white().bold(), summary.alternates);
    println!("{}: {}", "Checks".white().bold(), summary.checks);
    println!("{}: {}", "Links".white().bold(), summary.links);
    println!("{}: {}", "Dataset".white().bold(), output.display());
    Ok(())
}

/// Truncate to `max_chars` characters, flattening newlines
fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_chars {
        s
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
