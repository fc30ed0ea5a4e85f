//! Encoding side of the index file contract.
//!
//! Fixture tooling, not part of the query surface: `InvIndexProvider` has no
//! write path and never touches files after `open()`. The writer creates a
//! fresh set of files from data the builder has already sorted and merged;
//! it performs no ordering of its own and cannot modify an opened index.
//! It is deliberately not re-exported from the crate root.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::index::dictionary::Dictionary;
use crate::index::format::{
    write_u64, DocumentRecord, OffsetEntry, DICTIONARY_FILE, DOCUMENT_INDEX_FILE, OFFSETS_FILE,
    POSTINGS_FILE,
};
use crate::index::postings::{write_record, PayloadLayout, Posting};

pub struct IndexFilesWriter {
    dir: PathBuf,
    layout: PayloadLayout,
}

impl IndexFilesWriter {
    pub fn new(dir: &Path, layout: PayloadLayout) -> Self {
        Self {
            dir: dir.to_path_buf(),
            layout,
        }
    }

    fn create(&self, name: &str) -> Result<BufWriter<File>> {
        Ok(BufWriter::new(File::create(self.dir.join(name))?))
    }

    /// Write `dict.bin`.
    pub fn write_dictionary(&self, dict: &Dictionary) -> Result<()> {
        let mut w = self.create(DICTIONARY_FILE)?;
        dict.write_to(&mut w)?;
        w.flush()?;
        Ok(())
    }

    /// Write `document_index.bin` with records in the given order.
    pub fn write_documents(&self, docs: &[DocumentRecord]) -> Result<()> {
        let mut w = self.create(DOCUMENT_INDEX_FILE)?;
        write_u64(&mut w, docs.len() as u64)?;
        for doc in docs {
            doc.write_to(&mut w)?;
        }
        w.flush()?;
        Ok(())
    }

    /// Write `offsets.bin` with pairs in the given order.
    pub fn write_offsets(&self, entries: &[OffsetEntry]) -> Result<()> {
        let mut w = self.create(OFFSETS_FILE)?;
        for e in entries {
            e.write_to(&mut w)?;
        }
        w.flush()?;
        Ok(())
    }

    /// Write `postings.bin`, one record per term in the given order, and
    /// return the offset entry of each record. Does not write `offsets.bin`.
    pub fn write_postings(&self, lists: &[(u64, Vec<Posting>)]) -> Result<Vec<OffsetEntry>> {
        let mut w = self.create(POSTINGS_FILE)?;
        let mut offset = 0u64;
        let mut entries = Vec::with_capacity(lists.len());
        for (term_id, postings) in lists {
            entries.push(OffsetEntry::new(*term_id, offset));
            offset += write_record(&mut w, postings, self.layout)?;
        }
        w.flush()?;
        debug!(records = entries.len(), bytes = offset, "wrote postings");
        Ok(entries)
    }

    /// Write postings and the matching offset index.
    pub fn write_postings_and_offsets(&self, lists: &[(u64, Vec<Posting>)]) -> Result<()> {
        let entries = self.write_postings(lists)?;
        self.write_offsets(&entries)
    }
}
