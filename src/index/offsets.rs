//! Offset index: term id -> byte offset of the term's posting record.
//!
//! `offsets.bin` is a bare sequence of 16-byte `(term_id, offset)` pairs
//! with no header; the loader scans pairs until the stream ends.

use std::collections::HashMap;
use std::io::Read;

use tracing::{debug, warn};

use crate::config::LoadMode;
use crate::error::{IndexError, Result};
use crate::index::dictionary::Dictionary;
use crate::index::format::{Fill, OffsetEntry, OFFSETS_FILE};

#[derive(Debug, Default)]
pub struct OffsetIndex {
    offsets: HashMap<u64, u64>,
    /// Bytes of an incomplete trailing pair dropped by a tolerant load.
    truncated_bytes: usize,
}

impl OffsetIndex {
    /// Build from entries. A repeated term id keeps its last offset.
    pub fn from_entries<I: IntoIterator<Item = OffsetEntry>>(entries: I) -> Self {
        let mut index = Self::default();
        for e in entries {
            index.offsets.insert(e.term_id, e.offset);
        }
        index
    }

    /// Scan `(term_id, offset)` pairs until the stream ends.
    ///
    /// An incomplete trailing pair is dropped in `Tolerant` mode and is an
    /// `IndexError::Truncated` in `Strict` mode.
    pub fn load<R: Read>(r: &mut R, mode: LoadMode) -> Result<Self> {
        let mut index = Self::default();
        loop {
            match OffsetEntry::try_read_from(r)? {
                Fill::Complete(e) => {
                    index.offsets.insert(e.term_id, e.offset);
                }
                Fill::End => break,
                Fill::Partial(n) => {
                    if mode == LoadMode::Strict {
                        return Err(IndexError::Truncated {
                            file: OFFSETS_FILE,
                            detail: format!(
                                "{} trailing bytes after {} complete pairs",
                                n,
                                index.offsets.len()
                            ),
                        });
                    }
                    warn!(bytes = n, "dropping incomplete trailing pair in {}", OFFSETS_FILE);
                    index.truncated_bytes = n;
                    break;
                }
            }
        }
        debug!(entries = index.len(), "loaded offset index");
        Ok(index)
    }

    /// Offset of a term's posting record. O(1).
    pub fn get(&self, term_id: u64) -> Option<u64> {
        self.offsets.get(&term_id).copied()
    }

    pub fn contains(&self, term_id: u64) -> bool {
        self.offsets.contains_key(&term_id)
    }

    /// Dictionary term ids with no offset entry, sorted ascending.
    pub fn missing_from(&self, dictionary: &Dictionary) -> Vec<u64> {
        let mut missing: Vec<u64> = dictionary
            .term_ids()
            .filter(|id| !self.offsets.contains_key(id))
            .collect();
        missing.sort_unstable();
        missing
    }

    pub fn truncated_bytes(&self) -> usize {
        self.truncated_bytes
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
