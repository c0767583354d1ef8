//! Journey: narrowing a search
//!
//! Whole-word matching, quoted phrases, script fragments, apostrophes and the
//! structured filters, all against the precinct corpus.

use discobase_core::{
    ActorFilter, ConversationType, EntryKey, FilterState, SearchCursor, SearchRequest,
    SearchSource,
};
use discobase_e2e_tests::harness::TestDatasetManager;
use discobase_e2e_tests::mocks::CorpusIds;

fn search(dataset: &discobase_core::Dataset, query: &str, filters: FilterState) -> discobase_core::SearchPage {
    dataset
        .search(&SearchRequest::new(query).with_limit(100).with_filters(filters))
        .unwrap()
}

#[test]
fn test_substring_search_finds_every_spelling() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let page = search(&dataset, "cop", FilterState::default());
    assert_eq!(page.counts.entries, 4);
    assert_eq!(page.counts.conversations, 2);
    assert_eq!(page.counts.alternates, 1);
    assert_eq!(page.total, 7);
}

#[test]
fn test_whole_words_leave_out_cops_and_copper() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let filters = FilterState::default().with_whole_words(true);
    let page = search(&dataset, "cop", filters.clone());
    assert_eq!(page.total, 4);

    let entries: Vec<EntryKey> = page
        .results
        .iter()
        .filter(|r| r.source == SearchSource::Entries)
        .filter_map(|r| r.entry_key())
        .collect();
    assert_eq!(
        entries,
        vec![
            EntryKey::new(CorpusIds::KIM_INTRO, 2),
            EntryKey::new(CorpusIds::KIM_INTRO, 4)
        ]
    );

    let orb = page
        .results
        .iter()
        .find(|r| r.source == SearchSource::Conversations)
        .unwrap();
    assert_eq!(orb.conversation_id, CorpusIds::DOOR_ORB);
    assert_eq!(orb.entry_id, None);

    let alternate = page.results.iter().find(|r| r.is_alternate).unwrap();
    assert_eq!(alternate.entry_key(), Some(EntryKey::new(CorpusIds::KIM_INTRO, 3)));
    assert_eq!(alternate.alternate_condition.as_deref(), Some("IsKimHere()"));

    // Refinement agrees with the SQL patterns here
    let mut cursor = SearchCursor::new(SearchRequest::new("cop").with_filters(filters));
    cursor.fetch_all(&dataset).unwrap();
    assert_eq!(cursor.refined_count(), 4);
}

#[test]
fn test_apostrophes_are_searchable() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    for whole_words in [false, true] {
        let page = search(
            &dataset,
            "O'Brien",
            FilterState::default().with_whole_words(whole_words),
        );
        assert_eq!(page.total, 1, "whole_words = {}", whole_words);
        assert_eq!(
            page.results[0].entry_key(),
            Some(EntryKey::new(CorpusIds::KIM_INTRO, 4))
        );
    }
}

#[test]
fn test_quoted_phrase_is_one_term() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let phrase = search(&dataset, "\"good cop\"", FilterState::default());
    assert_eq!(phrase.total, 1);

    // Unquoted, both words must appear but not necessarily together
    let words = search(&dataset, "cop good", FilterState::default());
    assert_eq!(words.total, 1);

    let reversed = search(&dataset, "\"cop good\"", FilterState::default());
    assert_eq!(reversed.total, 0);
}

#[test]
fn test_hidden_rows_need_show_hidden() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let hidden_line = EntryKey::new(CorpusIds::OBSOLETE, 2);

    let page = search(&dataset, "nobody", FilterState::default());
    assert_eq!(page.total, 0);

    let page = search(&dataset, "nobody", FilterState::default().with_show_hidden(true));
    assert_eq!(page.total, 1);
    assert_eq!(page.results[0].entry_key(), Some(hidden_line));
    assert!(page.results[0].is_hidden);
}

#[test]
fn test_start_entries_are_excluded_by_default() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let page = search(&dataset, "START", FilterState::default());
    assert_eq!(page.counts.entries, 0);

    let page = search(&dataset, "START", FilterState::default().with_exclude_start(false));
    assert_eq!(page.counts.entries, 2);
}

#[test]
fn test_actor_filter() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let kim = FilterState::default().with_actors(ActorFilter::Single(CorpusIds::KIM));
    let page = search(&dataset, "cop", kim);
    // Kim's two lines; the orb and task records have no actor (0) and still match
    assert_eq!(page.counts.entries, 2);
    assert_eq!(page.counts.conversations, 2);
    assert_eq!(page.counts.alternates, 0);

    let cuno_or_you = FilterState::default()
        .with_actors(ActorFilter::Many(vec![CorpusIds::CUNO, CorpusIds::YOU]));
    let page = search(&dataset, "cop", cuno_or_you);
    assert_eq!(page.counts.entries, 2);
    assert_eq!(page.counts.alternates, 1);
}

#[test]
fn test_type_and_conversation_filters() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let orbs = FilterState::default().with_types([ConversationType::Orb]);
    let page = search(&dataset, "cop", orbs);
    assert_eq!(page.total, 1);
    assert_eq!(page.results[0].conversation_id, CorpusIds::DOOR_ORB);

    let yard = FilterState::default().with_conversations([CorpusIds::CUNO_YARD]);
    let page = search(&dataset, "cop", yard);
    assert_eq!(page.counts.entries, 2);
    assert_eq!(page.counts.conversations, 0);
    assert_eq!(page.counts.alternates, 0);
}

#[test]
fn test_variable_search() {
    let db = TestDatasetManager::with_precinct_corpus();
    let dataset = db.open();

    let page = dataset.search_variables("door", 10, 0, false).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.results[0].name.as_deref(), Some("jam.door_open"));

    let page = dataset.search_variables("kim", 10, 0, true).unwrap();
    assert_eq!(page.total, 1);

    assert_eq!(dataset.search_variables("  ", 10, 0, false).unwrap().total, 0);
}
