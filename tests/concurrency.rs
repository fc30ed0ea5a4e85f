//! Integration test: concurrent lookups.
//!
//! Validates that distinct providers on the same directory never interfere
//! and that a single provider shared across threads returns the same
//! results as sequential lookups on either store backend.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use inv_index::index::IndexFilesWriter;
use inv_index::index::format::DocumentRecord;
use inv_index::{
    Dictionary, InvIndexProvider, OpenOptions, PayloadLayout, Posting,
    StoreBackend,
};
use tempfile::TempDir;

const TERMS: u64 = 64;

fn expected(term_id: u64) -> Vec<u64> {
    // Deliberately unsorted, different length per term.
    (0..(term_id % 17 + 1)).map(|i| (term_id * 1000 + 997 * i) % 5003).collect()
}

fn build(dir: &Path) {
    let w = IndexFilesWriter::new(dir, PayloadLayout::default());
    let terms: Vec<(String, u64)> = (0..TERMS).map(|id| (format!("term{}", id), id)).collect();
    w.write_dictionary(&Dictionary::from_entries(terms).unwrap()).unwrap();

    let lists: Vec<(u64, Vec<Posting>)> = (0..TERMS)
        .map(|id| {
            let postings = expected(id)
                .into_iter()
                .map(|doc| Posting::new(doc, 1u32.to_le_bytes()))
                .collect();
            (id, postings)
        })
        .collect();
    w.write_postings_and_offsets(&lists).unwrap();
    w.write_documents(&[DocumentRecord::new(1, "one")]).unwrap();
}

#[test]
fn distinct_providers_do_not_interfere() {
    let dir = TempDir::new().unwrap();
    build(dir.path());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let path = dir.path().to_path_buf();
            thread::spawn(move || {
                let p = InvIndexProvider::open(&path).unwrap();
                for round in 0..20 {
                    let id = (t * 13 + round * 7) % TERMS;
                    assert_eq!(p.lookup_by_id(id).unwrap(), expected(id));
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn shared_provider_is_safe_on_both_backends() {
    let dir = TempDir::new().unwrap();
    build(dir.path());

    for backend in [StoreBackend::LockedFile, StoreBackend::Mmap] {
        let p = Arc::new(
            InvIndexProvider::open_with(dir.path(), OpenOptions::new().backend(backend)).unwrap(),
        );

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let p = Arc::clone(&p);
                thread::spawn(move || {
                    for round in 0..200u64 {
                        let id = (t * 31 + round * 11) % TERMS;
                        let term = format!("term{}", id);
                        assert_eq!(p.lookup_by_term(&term).unwrap(), expected(id));
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }
}
