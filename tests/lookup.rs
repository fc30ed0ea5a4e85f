//! Integration test: lookup semantics of an opened index.
//!
//! Validates that:
//! - Posting lists come back in on-disk order, never sorted
//! - The corpus document list is sorted, keeps duplicates, and is stable
//! - Unknown terms and ids are misses, not errors
//! - A dictionary id with no offset is a hard failure, never an empty result

use std::path::Path;

use inv_index::index::IndexFilesWriter;
use inv_index::index::format::{DocumentRecord, OffsetEntry};
use inv_index::{
    Dictionary, IndexError, InvIndexProvider, OpenOptions, PayloadLayout,
    Posting, StoreBackend,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tf(doc_id: u64) -> Posting {
    Posting::new(doc_id, 1u32.to_le_bytes())
}

fn build(
    dir: &Path,
    terms: &[(&str, u64)],
    lists: &[(u64, Vec<Posting>)],
    docs: &[u64],
) {
    let w = IndexFilesWriter::new(dir, PayloadLayout::default());
    w.write_dictionary(&Dictionary::from_entries(terms.iter().copied()).unwrap())
        .unwrap();
    w.write_postings_and_offsets(lists).unwrap();
    let docs: Vec<DocumentRecord> = docs
        .iter()
        .map(|&id| DocumentRecord::new(id, format!("docs/{}.txt", id)))
        .collect();
    w.write_documents(&docs).unwrap();
}

// ---------------------------------------------------------------------------
// Tests: Posting Order
// ---------------------------------------------------------------------------

#[test]
fn single_term_keeps_storage_order() {
    let dir = TempDir::new().unwrap();
    build(dir.path(), &[("x", 1)], &[(1, vec![tf(7), tf(3), tf(9)])], &[3, 7, 9]);

    for backend in [StoreBackend::LockedFile, StoreBackend::Mmap] {
        let p = InvIndexProvider::open_with(dir.path(), OpenOptions::new().backend(backend))
            .unwrap();
        assert_eq!(p.lookup_by_term("x").unwrap(), vec![7, 3, 9], "{:?}", backend);
        assert_eq!(p.lookup_by_id(1).unwrap(), vec![7, 3, 9], "{:?}", backend);
    }
}

#[test]
fn every_term_returns_exactly_its_record() {
    let dir = TempDir::new().unwrap();
    let lists = vec![
        (10, vec![tf(1), tf(2)]),
        (20, vec![]),
        (30, vec![tf(5), tf(1), tf(5)]),
        (40, vec![tf(8)]),
    ];
    build(
        dir.path(),
        &[("alpha", 10), ("beta", 20), ("gamma", 30), ("delta", 40)],
        &lists,
        &[1, 2, 5, 8],
    );
    let p = InvIndexProvider::open(dir.path()).unwrap();

    for (term_id, postings) in &lists {
        let expected: Vec<u64> = postings.iter().map(|p| p.doc_id).collect();
        assert_eq!(p.lookup_by_id(*term_id).unwrap(), expected, "term {}", term_id);
    }
    assert_eq!(p.lookup_by_term("gamma").unwrap(), vec![5, 1, 5]);
    assert!(p.lookup_by_term("beta").unwrap().is_empty());
}

#[test]
fn repeated_lookups_do_not_disturb_each_other() {
    let dir = TempDir::new().unwrap();
    build(
        dir.path(),
        &[("a", 1), ("b", 2)],
        &[(1, vec![tf(1), tf(2)]), (2, vec![tf(3)])],
        &[1, 2, 3],
    );
    let p = InvIndexProvider::open(dir.path()).unwrap();

    for _ in 0..3 {
        assert_eq!(p.lookup_by_term("b").unwrap(), vec![3]);
        assert_eq!(p.lookup_by_term("a").unwrap(), vec![1, 2]);
    }
}

#[test]
fn positions_payload_is_skipped() {
    let dir = TempDir::new().unwrap();
    let w = IndexFilesWriter::new(dir.path(), PayloadLayout::Positions);
    w.write_dictionary(&Dictionary::from_entries([("p", 1), ("q", 2)]).unwrap())
        .unwrap();
    w.write_postings_and_offsets(&[
        (
            1,
            vec![
                Posting::new(11, PayloadLayout::encode_positions(&[0, 5, 17])),
                Posting::new(4, PayloadLayout::encode_positions(&[2])),
            ],
        ),
        (2, vec![Posting::new(6, PayloadLayout::encode_positions(&[]))]),
    ])
    .unwrap();
    w.write_documents(&[]).unwrap();

    let p = InvIndexProvider::open_with(
        dir.path(),
        OpenOptions::new().payload(PayloadLayout::Positions),
    )
    .unwrap();
    assert_eq!(p.lookup_by_term("p").unwrap(), vec![11, 4]);
    assert_eq!(p.lookup_by_term("q").unwrap(), vec![6]);
}

// ---------------------------------------------------------------------------
// Tests: Corpus Document List
// ---------------------------------------------------------------------------

#[test]
fn corpus_list_sorted_with_duplicates() {
    let dir = TempDir::new().unwrap();
    build(dir.path(), &[], &[], &[5, 1, 1]);
    let p = InvIndexProvider::open(dir.path()).unwrap();

    assert_eq!(p.all_document_ids(), &[1, 1, 5]);
}

#[test]
fn corpus_list_is_stable_across_calls() {
    let dir = TempDir::new().unwrap();
    build(dir.path(), &[("x", 1)], &[(1, vec![tf(2)])], &[9, 4, 6]);
    let p = InvIndexProvider::open(dir.path()).unwrap();

    let first = p.all_document_ids();
    p.lookup_by_term("x").unwrap();
    let second = p.all_document_ids();
    assert_eq!(first, second);
    assert_eq!(first.as_ptr(), second.as_ptr());
    assert!(first.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn corpus_list_independent_of_postings() {
    let dir = TempDir::new().unwrap();
    build(dir.path(), &[("x", 1)], &[(1, vec![tf(100)])], &[1, 2]);
    let p = InvIndexProvider::open(dir.path()).unwrap();

    assert_eq!(p.all_document_ids(), &[1, 2]);
    assert_eq!(p.lookup_by_term("x").unwrap(), vec![100]);
}

// ---------------------------------------------------------------------------
// Tests: Misses and Invariant Violations
// ---------------------------------------------------------------------------

#[test]
fn unknown_terms_and_ids_are_empty() {
    let dir = TempDir::new().unwrap();
    build(dir.path(), &[("x", 1)], &[(1, vec![tf(1)])], &[1]);
    let p = InvIndexProvider::open(dir.path()).unwrap();

    for term in ["", "X", "xx", "unknown"] {
        assert!(p.lookup_by_term(term).unwrap().is_empty(), "{:?}", term);
    }
    assert!(p.lookup_by_id(0).unwrap().is_empty());
    assert!(p.lookup_by_id(u64::MAX).unwrap().is_empty());
}

#[test]
fn offset_for_id_not_in_dictionary_is_unreachable() {
    let dir = TempDir::new().unwrap();
    build(
        dir.path(),
        &[("x", 1)],
        &[(1, vec![tf(1)]), (2, vec![tf(2)])],
        &[1, 2],
    );
    let p = InvIndexProvider::open(dir.path()).unwrap();

    assert!(p.lookup_by_id(2).unwrap().is_empty());
}

#[test]
fn missing_offset_is_fatal_not_empty() {
    let dir = TempDir::new().unwrap();
    build(
        dir.path(),
        &[("x", 1), ("y", 2)],
        &[(1, vec![tf(1)]), (2, vec![tf(2)])],
        &[1, 2],
    );
    // Rewrite offsets without term 2.
    let w = IndexFilesWriter::new(dir.path(), PayloadLayout::default());
    w.write_offsets(&[OffsetEntry::new(1, 0)]).unwrap();

    // Default: rejected at open.
    let err = match InvIndexProvider::open(dir.path()) {
        Ok(_) => panic!("open must reject an index with a missing offset"),
        Err(e) => e,
    };
    assert!(err.is_invariant_violation());

    // Deferred: the lookup fails loudly.
    let p = InvIndexProvider::open_with(dir.path(), OpenOptions::new().validate_offsets(false))
        .unwrap();
    let err = p.lookup_by_id(2).unwrap_err();
    assert!(matches!(err, IndexError::MissingOffset(2)));
    assert!(matches!(p.lookup_by_term("y"), Err(IndexError::MissingOffset(2))));
    assert_eq!(p.lookup_by_term("x").unwrap(), vec![1]);
}
