//! Journey: browsing instead of searching
//!
//! Open the conversation tree, pick a conversation, open an entry, follow its
//! links, and come back to an entry already seen.

use std::num::NonZeroUsize;

use discobase_core::{build_hierarchy, AlternateSelection, ConversationType, EntryKey};
use discobase_e2e_tests::harness::TestDatasetManager;
use discobase_e2e_tests::mocks::CorpusIds;

#[test]
fn test_tree_hides_obsolete_and_collapses_chains() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let tree = build_hierarchy(&dataset.conversations_for_tree(false).unwrap());
    assert_eq!(tree.root.subtree_size, 5);

    let top: Vec<&String> = tree.root.children.keys().collect();
    assert_eq!(top, vec!["JAM / DOOR #3", "TASK / FIND THE GUN #4", "WHIRLING"]);

    let whirling = &tree.root.children["WHIRLING"];
    let kids: Vec<&String> = whirling.children.keys().collect();
    assert_eq!(kids, vec!["CUNO #2", "KIM"]);
    assert_eq!(whirling.children["KIM"].all_ids(), vec![CorpusIds::KIM_BARKS, CorpusIds::KIM_INTRO]);

    assert_eq!(tree.dominant_type(&tree.root), ConversationType::Orb);
    assert_eq!(tree.dominant_type(whirling), ConversationType::Flow);

    let with_hidden = build_hierarchy(&dataset.conversations_for_tree(true).unwrap());
    assert_eq!(with_hidden.root.subtree_size, 6);
}

#[test]
fn test_tree_filtering() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();
    let tree = build_hierarchy(&dataset.conversations_for_tree(false).unwrap());

    let kim: Vec<i64> = tree.matching_leaves("kim", None).iter().map(|l| l.id).collect();
    assert_eq!(kim, vec![CorpusIds::KIM_BARKS, CorpusIds::KIM_INTRO]);

    let tasks = tree.filtered_by_type(ConversationType::Task);
    assert_eq!(tasks.root.all_ids(), vec![CorpusIds::GUN_TASK]);
}

#[test]
fn test_conversation_and_its_entries() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let convo = dataset.conversation(CorpusIds::DOOR_ORB, false).unwrap().unwrap();
    assert_eq!(convo.conversation_type, ConversationType::Orb);
    assert_eq!(convo.description.as_deref(), Some("A cop painted on the door."));

    assert!(dataset.conversation(CorpusIds::OBSOLETE, false).unwrap().is_none());
    assert!(dataset.conversation(CorpusIds::OBSOLETE, true).unwrap().is_some());

    let entries = dataset
        .entries_for_conversation(CorpusIds::KIM_INTRO, false)
        .unwrap();
    let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_entry_details_with_checks_links_and_alternates() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();
    let key = EntryKey::new(CorpusIds::KIM_INTRO, 3);

    let details = dataset.entry_details(key, None).unwrap().unwrap();
    assert_eq!(details.actor_name.as_deref(), Some("You"));
    assert_eq!(details.display_text(), Some("I am the law."));
    assert!(details.entry.has_alternates);
    assert_eq!(details.alternates.len(), 1);

    assert_eq!(details.checks.len(), 1);
    assert_eq!(details.checks[0].skill_name.as_deref(), Some("Logic"));
    assert_eq!(details.checks[0].difficulty, Some(12));

    let parents: Vec<EntryKey> = details.links.parents.iter().map(|l| l.origin).collect();
    assert_eq!(parents, vec![EntryKey::new(CorpusIds::KIM_INTRO, 2)]);
    let children: Vec<EntryKey> = details.links.children.iter().map(|l| l.destination).collect();
    assert_eq!(children, vec![EntryKey::new(CorpusIds::KIM_INTRO, 0)]);

    let conversation = details.conversation.as_ref().unwrap();
    assert_eq!(conversation.id, CorpusIds::KIM_INTRO);
}

#[test]
fn test_opening_an_alternate_hit() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();
    let key = EntryKey::new(CorpusIds::KIM_INTRO, 3);

    let selection = AlternateSelection {
        condition: Some("IsKimHere()".to_string()),
        line: Some("I am the cop here.".to_string()),
    };
    let details = dataset.entry_details(key, Some(selection.clone())).unwrap().unwrap();
    assert_eq!(details.display_text(), Some("I am the cop here."));
    assert_eq!(details.selected_alternate, Some(selection));

    // The selection is never cached
    assert_eq!(dataset.cached_entries().unwrap(), 0);
    let plain = dataset.entry_details(key, None).unwrap().unwrap();
    assert_eq!(plain.selected_alternate, None);
    assert_eq!(plain.display_text(), Some("I am the law."));
}

#[test]
fn test_following_options() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let options = dataset
        .next_options(EntryKey::new(CorpusIds::KIM_INTRO, 2), false)
        .unwrap();
    let keys: Vec<EntryKey> = options.iter().map(|e| e.key()).collect();
    assert_eq!(
        keys,
        vec![
            EntryKey::new(CorpusIds::KIM_INTRO, 3),
            EntryKey::new(CorpusIds::KIM_INTRO, 4)
        ]
    );

    // Links back to START are not options
    let options = dataset
        .next_options(EntryKey::new(CorpusIds::KIM_INTRO, 3), false)
        .unwrap();
    assert!(options.is_empty());
}

#[test]
fn test_revisiting_entries_uses_the_cache() {
    let db = TestDatasetManager::with_precinct_corpus();
    let config = db
        .config()
        .with_cache_capacity(NonZeroUsize::new(2));
    let dataset = db.open_with(config);

    for id in [2, 3, 4] {
        dataset
            .entry_details(EntryKey::new(CorpusIds::KIM_INTRO, id), None)
            .unwrap();
    }
    assert_eq!(dataset.cached_entries().unwrap(), 2);

    let first = EntryKey::new(CorpusIds::KIM_INTRO, 2);
    assert!(!dataset.invalidate_entry(first).unwrap());
    assert!(dataset.invalidate_entry(EntryKey::new(CorpusIds::KIM_INTRO, 4)).unwrap());

    dataset.clear_cache().unwrap();
    assert_eq!(dataset.cached_entries().unwrap(), 0);
}

#[test]
fn test_actor_listing() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let names: Vec<String> = dataset
        .distinct_actors()
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Cuno", "Kim Kitsuragi", "Logic", "You"]);
    assert!(dataset.actor(0).unwrap().is_none());
}
