//! Journey: building a dataset from an export and searching it

use discobase_core::{
    build_hierarchy, import_export, ConversationType, Dataset, DatasetConfig, DatasetError,
    EntryKey, FilterState, SearchRequest,
};
use serde_json::json;
use tempfile::TempDir;

fn field(title: &str, value: &str) -> serde_json::Value {
    json!({ "title": title, "value": value })
}

fn sample_export() -> serde_json::Value {
    json!({
        "actors": [
            { "id": 1, "fields": [field("Name", "You")] },
            { "id": 3, "fields": [field("Name", "Kim Kitsuragi")] },
            { "id": 9, "fields": [field("Name", "Authority"), field("Articy Id", "0xAUTH")] }
        ],
        "variables": [
            { "id": 1, "fields": [field("Name", "tribunal.kim_shot"), field("Initial Value", "False"),
                                  field("Description", "Kim was shot at the tribunal")] }
        ],
        "conversations": [
            {
                "id": 10,
                "fields": [field("Title", "WHIRLING / KIM / BARKS"), field("Actor", "3")],
                "dialogueEntries": [
                    { "id": 0, "conversationID": 10, "fields": [field("Title", "START")],
                      "outgoingLinks": [{ "originConversationID": 10, "originDialogueID": 0,
                                          "destinationConversationID": 10, "destinationDialogueID": 2 }] },
                    { "id": 2, "conversationID": 10,
                      "fields": [field("Dialogue Text", "I am the law, the cop said."), field("Actor", "1"),
                                 field("DifficultyRed", "14"), field("SkillType", "0xAUTH")],
                      "outgoingLinks": [{ "originConversationID": 10, "originDialogueID": 2,
                                          "destinationConversationID": 10, "destinationDialogueID": 3,
                                          "priority": 3 }] },
                    { "id": 3, "conversationID": 10,
                      "fields": [field("Dialogue Text", "Detective, that is not how a cop talks to people in this district."),
                                 field("Actor", "3"),
                                 field("Alternate1", "Detective."), field("Condition1", "IsKimAngry()")] }
                ]
            },
            { "id": 11, "fields": [field("Title", "HARBOR / GATE ORB"), field("Placement", "gate"),
                                   field("Description", "A cop stands at the gate.")] },
            { "id": 12, "fields": [field("Title", "WCW / RENT"), field("done_condition_main", "Variable[\"rent.paid\"]")] },
            { "id": 13, "fields": [field("Title", "JAM / DELETE ME")] }
        ]
    })
}

fn import_sample(dir: &TempDir) -> Dataset {
    let json_path = dir.path().join("export.json");
    let db_path = dir.path().join("discobase.sqlite3");
    std::fs::write(&json_path, serde_json::to_vec(&sample_export()).unwrap()).unwrap();

    let summary = import_export(&json_path, &db_path).unwrap();
    assert_eq!(summary.conversations, 4);
    assert_eq!(summary.hidden_conversations, 1);
    assert_eq!(summary.entries, 3);
    assert_eq!(summary.links, 2);

    Dataset::open(DatasetConfig::at(&db_path)).unwrap()
}

#[test]
fn test_imported_dataset_is_searchable() {
    let dir = TempDir::new().unwrap();
    let dataset = import_sample(&dir);

    let page = dataset
        .search(&SearchRequest::new("cop").with_filters(FilterState::default().with_whole_words(true)))
        .unwrap();
    assert_eq!(page.counts.entries, 2);
    assert_eq!(page.counts.conversations, 1);

    let page = dataset.search(&SearchRequest::new("Detective.")).unwrap();
    assert_eq!(page.counts.alternates, 1);
    assert_eq!(page.results.last().unwrap().alternate_condition.as_deref(), Some("IsKimAngry()"));

    let vars = dataset.search_variables("tribunal", 10, 0, false).unwrap();
    assert_eq!(vars.total, 1);
}

#[test]
fn test_imported_classification_and_titles() {
    let dir = TempDir::new().unwrap();
    let dataset = import_sample(&dir);

    let orb = dataset.conversation(11, false).unwrap().unwrap();
    assert_eq!(orb.conversation_type, ConversationType::Orb);
    let task = dataset.conversation(12, false).unwrap().unwrap();
    assert_eq!(task.conversation_type, ConversationType::Task);
    assert!(dataset.conversation(13, false).unwrap().is_none());

    let tree = build_hierarchy(&dataset.conversations_for_tree(false).unwrap());
    assert_eq!(tree.root.subtree_size, 3);
    assert_eq!(tree.conversation_type(11), ConversationType::Orb);
}

#[test]
fn test_imported_entry_details() {
    let dir = TempDir::new().unwrap();
    let dataset = import_sample(&dir);

    let details = dataset
        .entry_details(EntryKey::new(10, 2), None)
        .unwrap()
        .unwrap();
    assert_eq!(details.actor_name.as_deref(), Some("You"));
    assert_eq!(details.checks.len(), 1);
    assert_eq!(details.checks[0].check_type.as_deref(), Some("red"));
    assert_eq!(details.checks[0].skill_name.as_deref(), Some("Authority"));
    assert_eq!(details.links.children[0].priority, 3);
    assert_eq!(details.conversation_actor_name.as_deref(), Some("Kim Kitsuragi"));

    let options = dataset.next_options(EntryKey::new(10, 2), false).unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].id, 3);
}

#[test]
fn test_import_refuses_existing_file() {
    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("export.json");
    let db_path = dir.path().join("discobase.sqlite3");
    std::fs::write(&json_path, serde_json::to_vec(&sample_export()).unwrap()).unwrap();

    import_export(&json_path, &db_path).unwrap();
    let err = import_export(&json_path, &db_path).err().unwrap();
    assert!(matches!(err, DatasetError::Import(_)));

    // The first import is still intact
    assert!(Dataset::open(DatasetConfig::at(&db_path)).is_ok());
}
