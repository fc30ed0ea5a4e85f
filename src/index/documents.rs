//! Document id index: every document id in the corpus, sorted ascending.
//!
//! Loaded from `document_index.bin` (`count: u64` then `count` records of
//! `(doc_id, label)`). Labels are discarded. Duplicate ids are kept.

use std::io::Read;

use tracing::{debug, warn};

use crate::config::LoadMode;
use crate::error::{IndexError, Result};
use crate::index::format::{try_read_u64, DocumentRecord, Fill, DOCUMENT_INDEX_FILE};

#[derive(Debug, Default)]
pub struct DocumentIdIndex {
    doc_ids: Vec<u64>,
    /// Records declared by the count but absent from a tolerant load.
    missing_records: u64,
}

impl DocumentIdIndex {
    /// Build from ids in any order.
    pub fn from_ids(mut doc_ids: Vec<u64>) -> Self {
        doc_ids.sort_unstable();
        Self {
            doc_ids,
            missing_records: 0,
        }
    }

    /// Read the count-prefixed record stream and sort the ids.
    pub fn load<R: Read>(r: &mut R, mode: LoadMode) -> Result<Self> {
        let count = match try_read_u64(r)? {
            Fill::Complete(count) => count,
            Fill::End | Fill::Partial(_) => {
                if mode == LoadMode::Strict {
                    return Err(IndexError::Truncated {
                        file: DOCUMENT_INDEX_FILE,
                        detail: "missing document count".into(),
                    });
                }
                warn!("{} has no document count, treating as empty", DOCUMENT_INDEX_FILE);
                return Ok(Self::default());
            }
        };

        // The declared count is untrusted; grow as records arrive.
        let mut doc_ids = Vec::with_capacity(count.min(1 << 16) as usize);
        while (doc_ids.len() as u64) < count {
            match DocumentRecord::try_read_from(r)? {
                Fill::Complete(rec) => doc_ids.push(rec.doc_id),
                Fill::End | Fill::Partial(_) => break,
            }
        }

        let missing_records = count - doc_ids.len() as u64;
        if missing_records > 0 {
            if mode == LoadMode::Strict {
                return Err(IndexError::Truncated {
                    file: DOCUMENT_INDEX_FILE,
                    detail: format!("declared {} documents, found {}", count, doc_ids.len()),
                });
            }
            warn!(
                declared = count,
                found = doc_ids.len(),
                "{} ends before its declared count",
                DOCUMENT_INDEX_FILE
            );
        }

        doc_ids.sort_unstable();
        debug!(documents = doc_ids.len(), "loaded document index");
        Ok(Self {
            doc_ids,
            missing_records,
        })
    }

    /// All document ids, ascending. Duplicates are retained.
    pub fn doc_ids(&self) -> &[u64] {
        &self.doc_ids
    }

    pub fn missing_records(&self) -> u64 {
        self.missing_records
    }

    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }
}
