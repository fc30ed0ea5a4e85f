//! Read-only inverted index provider.
//!
//! `open()` loads the dictionary, offset index and document index into
//! memory and keeps a positioned-read handle to `postings.bin`. Each lookup
//! resolves term -> term id -> offset and decodes exactly one posting
//! record; nothing is cached between lookups.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::OpenOptions;
use crate::error::{IndexError, Result};
use crate::index::dictionary::Dictionary;
use crate::index::documents::DocumentIdIndex;
use crate::index::format::{
    DICTIONARY_FILE, DOCUMENT_INDEX_FILE, OFFSETS_FILE, POSTINGS_FILE, REQUIRED_FILES,
};
use crate::index::offsets::OffsetIndex;
use crate::index::postings::{DecodedRecord, PostingStore};
use crate::index::store::open_store;

/// What a tolerant load dropped from the end of each stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Bytes of an incomplete trailing pair in `offsets.bin`.
    pub offsets_truncated_bytes: usize,
    /// Records declared by `document_index.bin` but not present.
    pub documents_missing: u64,
}

impl LoadReport {
    /// True if every stream ended on a record boundary.
    pub fn is_complete(&self) -> bool {
        self.offsets_truncated_bytes == 0 && self.documents_missing == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub term_count: usize,
    pub offset_count: usize,
    pub document_count: usize,
    pub postings_bytes: u64,
}

pub struct InvIndexProvider {
    path: PathBuf,
    options: OpenOptions,
    dictionary: Dictionary,
    offsets: OffsetIndex,
    documents: DocumentIdIndex,
    postings: PostingStore,
}

impl InvIndexProvider {
    /// Open an index directory, using its persisted options if present.
    pub fn open(path: &Path) -> Result<Self> {
        Self::check_layout(path)?;
        let options = OpenOptions::read_from(path)?.unwrap_or_default();
        Self::load(path, options)
    }

    /// Open an index directory with explicit options.
    pub fn open_with(path: &Path, options: OpenOptions) -> Result<Self> {
        Self::check_layout(path)?;
        Self::load(path, options)
    }

    /// Load a directory that has passed `check_layout`.
    fn load(path: &Path, options: OpenOptions) -> Result<Self> {
        let postings = PostingStore::new(
            open_store(&path.join(POSTINGS_FILE), options.backend)?,
            options.payload,
            options.mode,
        );

        let mut r = BufReader::new(File::open(path.join(OFFSETS_FILE))?);
        let offsets = OffsetIndex::load(&mut r, options.mode)?;

        let mut r = BufReader::new(File::open(path.join(DOCUMENT_INDEX_FILE))?);
        let documents = DocumentIdIndex::load(&mut r, options.mode)?;

        let dictionary = Dictionary::read_from(BufReader::new(File::open(
            path.join(DICTIONARY_FILE),
        )?))?;

        if options.validate_offsets {
            let missing = offsets.missing_from(&dictionary);
            if let Some(&first) = missing.first() {
                return Err(IndexError::InconsistentIndex {
                    missing: missing.len(),
                    first,
                });
            }
        }

        info!(
            path = %path.display(),
            terms = dictionary.len(),
            documents = documents.len(),
            backend = ?options.backend,
            mode = ?options.mode,
            "opened inverted index"
        );

        Ok(Self {
            path: path.to_path_buf(),
            options,
            dictionary,
            offsets,
            documents,
            postings,
        })
    }

    /// Validate the directory contract before any file is read.
    fn check_layout(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(IndexError::DirectoryNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(IndexError::NotADirectory(path.to_path_buf()));
        }
        for name in REQUIRED_FILES {
            let file = path.join(name);
            if !file.is_file() {
                return Err(IndexError::MissingFile { name, path: file });
            }
        }
        Ok(())
    }

    /// Doc ids of every posting for `term`, in on-disk order (not sorted).
    ///
    /// An unknown term is a miss and yields an empty list.
    pub fn lookup_by_term(&self, term: &str) -> Result<Vec<u64>> {
        Ok(self
            .decode_by_term(term)?
            .map(|rec| rec.doc_ids)
            .unwrap_or_default())
    }

    /// Doc ids of every posting for `term_id`, in on-disk order (not sorted).
    ///
    /// An id unknown to the dictionary yields an empty list. A known id with
    /// no offset entry fails with `IndexError::MissingOffset`.
    pub fn lookup_by_id(&self, term_id: u64) -> Result<Vec<u64>> {
        Ok(self
            .decode_by_id(term_id)?
            .map(|rec| rec.doc_ids)
            .unwrap_or_default())
    }

    /// Like `lookup_by_term`, but keeps the decode details. `None` for an
    /// unknown term; `truncated` is set when a tolerant decode stopped early.
    pub fn decode_by_term(&self, term: &str) -> Result<Option<DecodedRecord>> {
        match self.dictionary.term_id(term) {
            Some(term_id) => {
                debug!(term, term_id, "resolved term");
                self.decode_record(term_id).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Like `lookup_by_id`, but keeps the decode details. `None` for an id
    /// unknown to the dictionary.
    pub fn decode_by_id(&self, term_id: u64) -> Result<Option<DecodedRecord>> {
        if !self.dictionary.contains_id(term_id) {
            return Ok(None);
        }
        self.decode_record(term_id).map(Some)
    }

    fn decode_record(&self, term_id: u64) -> Result<DecodedRecord> {
        let offset = self
            .offsets
            .get(term_id)
            .ok_or(IndexError::MissingOffset(term_id))?;
        self.postings.decode(offset)
    }

    /// Every document id in the corpus, sorted ascending, duplicates kept.
    ///
    /// Loaded independently of the postings; not the union of posting lists.
    pub fn all_document_ids(&self) -> &[u64] {
        self.documents.doc_ids()
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn options(&self) -> &OpenOptions {
        &self.options
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_report(&self) -> LoadReport {
        LoadReport {
            offsets_truncated_bytes: self.offsets.truncated_bytes(),
            documents_missing: self.documents.missing_records(),
        }
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            term_count: self.dictionary.len(),
            offset_count: self.offsets.len(),
            document_count: self.documents.len(),
            postings_bytes: self.postings.len(),
        }
    }
}
