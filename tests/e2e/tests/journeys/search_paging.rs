//! Journey: paging through a search
//!
//! A user types a query and keeps scrolling. Every match must show up exactly
//! once, and the reported total must not move while they scroll.

use std::collections::HashSet;

use discobase_core::{PagingMode, SearchCursor, SearchRequest, SearchRow, SearchSource};
use discobase_e2e_tests::harness::TestDatasetManager;

const LINES: usize = 23;
const ORBS: usize = 4;
/// Alternates on every third line: 0, 3, ..., 21
const ALTERNATES: usize = 8;
const TOTAL: usize = LINES + ORBS + ALTERNATES;

fn row_key(row: &SearchRow) -> (SearchSource, i64, Option<i64>, Option<String>) {
    (
        row.source,
        row.conversation_id,
        row.entry_id,
        row.alternate_condition.clone(),
    )
}

fn source_rank(source: SearchSource) -> usize {
    SearchSource::ORDER
        .iter()
        .position(|s| *s == source)
        .unwrap()
}

#[test]
fn test_sequential_pages_cover_every_match_once() {
    let db = TestDatasetManager::with_bulk_lines(LINES, ORBS);
    let dataset = db.open();

    let everything = dataset
        .search(&SearchRequest::new("tare").with_limit(1000))
        .unwrap();
    assert_eq!(everything.total, TOTAL);
    assert_eq!(everything.len(), TOTAL);

    let mut cursor = SearchCursor::new(SearchRequest::new("tare").with_limit(6));
    let mut pages = 0;
    while cursor.has_more() {
        let page = cursor.fetch_next(&dataset).unwrap();
        assert!(page.len() <= 6);
        pages += 1;
        assert!(pages < 100, "cursor never finished");
    }

    assert_eq!(cursor.rows(), everything.results.as_slice());
    assert_eq!(pages, TOTAL.div_ceil(6));

    let distinct: HashSet<_> = cursor
        .rows()
        .iter()
        .map(|r| (r.source, r.conversation_id, r.entry_id, r.dialogue_text.clone()))
        .collect();
    assert_eq!(distinct.len(), TOTAL);
}

#[test]
fn test_rows_come_back_grouped_by_source() {
    let db = TestDatasetManager::with_bulk_lines(LINES, ORBS);
    let dataset = db.open();

    let page = dataset
        .search(&SearchRequest::new("tare").with_limit(1000))
        .unwrap();
    let ranks: Vec<usize> = page.results.iter().map(|r| source_rank(r.source)).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));

    assert_eq!(page.counts.entries, LINES);
    assert_eq!(page.counts.conversations, ORBS);
    assert_eq!(page.counts.alternates, ALTERNATES);
}

#[test]
fn test_page_straddling_a_source_boundary() {
    let db = TestDatasetManager::with_bulk_lines(LINES, ORBS);
    let dataset = db.open();

    let page = dataset
        .search(&SearchRequest::new("tare").with_offset(20).with_limit(10))
        .unwrap();
    let sources: Vec<SearchSource> = page.results.iter().map(|r| r.source).collect();
    assert_eq!(sources.len(), 10);
    assert_eq!(&sources[..3], &[SearchSource::Entries; 3]);
    assert_eq!(&sources[3..7], &[SearchSource::Conversations; 4]);
    assert_eq!(&sources[7..], &[SearchSource::Alternates; 3]);
}

#[test]
fn test_total_is_independent_of_window() {
    let db = TestDatasetManager::with_bulk_lines(LINES, ORBS);

    for mode in [PagingMode::Sequential, PagingMode::SharedOffset] {
        let dataset = db.open_with_paging(mode);
        for offset in [0, 5, 30, 40] {
            for limit in [1, 10] {
                let page = dataset
                    .search(&SearchRequest::new("tare").with_offset(offset).with_limit(limit))
                    .unwrap();
                assert_eq!(page.total, TOTAL, "mode {:?} offset {} limit {}", mode, offset, limit);
            }
        }
    }
}

#[test]
fn test_offset_past_the_end() {
    let db = TestDatasetManager::with_bulk_lines(LINES, ORBS);
    let dataset = db.open();

    let page = dataset
        .search(&SearchRequest::new("tare").with_offset(TOTAL + 5))
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, TOTAL);
}

#[test]
fn test_shared_offset_applies_window_per_source() {
    let db = TestDatasetManager::with_bulk_lines(LINES, ORBS);
    let dataset = db.open_with_paging(PagingMode::SharedOffset);

    let page = dataset
        .search(&SearchRequest::new("tare").with_limit(5))
        .unwrap();
    // 5 entries, all 4 orbs, 5 alternates
    assert_eq!(page.len(), 14);

    let page = dataset
        .search(&SearchRequest::new("tare").with_offset(5).with_limit(5))
        .unwrap();
    // orbs are exhausted after the first page
    assert!(page.results.iter().all(|r| r.source != SearchSource::Conversations));
    assert_eq!(page.len(), 8);
}

#[test]
fn test_cursor_keys_are_unique_across_pages() {
    let db = TestDatasetManager::with_bulk_lines(LINES, ORBS);
    let dataset = db.open();

    let mut cursor = dataset.cursor("tare", Default::default());
    cursor.fetch_all(&dataset).unwrap();
    assert_eq!(cursor.total(), Some(TOTAL));
    assert!(!cursor.has_more());

    let keys: HashSet<_> = cursor
        .rows()
        .iter()
        .filter(|r| !r.is_alternate)
        .map(row_key)
        .collect();
    assert_eq!(keys.len(), LINES + ORBS);
}
