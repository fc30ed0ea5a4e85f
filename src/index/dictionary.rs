//! Term dictionary: bidirectional term <-> term id mapping.
//!
//! Stored in `dict.bin` as a bincode-encoded, versioned list of
//! `(term, term_id)` entries. Both lookup directions are rebuilt on load;
//! the mapping must be one-to-one.

use std::collections::HashMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IndexError, Result};

/// Dictionary file format version.
pub const DICTIONARY_VERSION: u32 = 1;

/// On-disk shape of `dict.bin`.
#[derive(Debug, Serialize, Deserialize)]
struct DictionaryFile {
    version: u32,
    entries: Vec<(String, u64)>,
}

/// Immutable term <-> term id map.
#[derive(Debug, Default)]
pub struct Dictionary {
    by_term: HashMap<String, u64>,
    by_id: HashMap<u64, String>,
}

impl Dictionary {
    /// Build a dictionary from `(term, term_id)` pairs.
    ///
    /// Fails if a term or a term id appears twice.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut dict = Self::default();
        for (term, id) in entries {
            let term = term.into();
            if dict.by_id.contains_key(&id) {
                return Err(IndexError::InvalidFormat(format!(
                    "Dictionary assigns term id {} twice",
                    id
                )));
            }
            if dict.by_term.contains_key(&term) {
                return Err(IndexError::InvalidFormat(format!(
                    "Dictionary contains term {:?} twice",
                    term
                )));
            }
            dict.by_term.insert(term.clone(), id);
            dict.by_id.insert(id, term);
        }
        Ok(dict)
    }

    /// Deserialize a dictionary from `dict.bin` contents.
    ///
    /// The whole file is buffered first so that declared lengths are checked
    /// against the bytes actually present before anything is allocated.
    pub fn read_from<R: Read>(mut r: R) -> Result<Self> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Deserialize a dictionary from an in-memory `dict.bin` image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let file: DictionaryFile = bincode::deserialize(bytes)?;
        if file.version != DICTIONARY_VERSION {
            return Err(IndexError::InvalidFormat(format!(
                "Unsupported dictionary version: {}",
                file.version
            )));
        }
        let dict = Self::from_entries(file.entries)?;
        debug!(terms = dict.len(), "loaded dictionary");
        Ok(dict)
    }

    /// Serialize the dictionary, entries ordered by term id.
    pub fn write_to<W: Write>(&self, w: W) -> Result<()> {
        let mut entries: Vec<(String, u64)> = self
            .by_term
            .iter()
            .map(|(term, &id)| (term.clone(), id))
            .collect();
        entries.sort_by_key(|&(_, id)| id);

        let file = DictionaryFile {
            version: DICTIONARY_VERSION,
            entries,
        };
        bincode::serialize_into(w, &file)?;
        Ok(())
    }

    /// Term id for a term, or None if the term is unknown.
    pub fn term_id(&self, term: &str) -> Option<u64> {
        self.by_term.get(term).copied()
    }

    /// Term for a term id, or None if the id is unknown.
    pub fn term(&self, term_id: u64) -> Option<&str> {
        self.by_id.get(&term_id).map(String::as_str)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.by_term.contains_key(term)
    }

    pub fn contains_id(&self, term_id: u64) -> bool {
        self.by_id.contains_key(&term_id)
    }

    /// All term ids, in no particular order.
    pub fn term_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.by_id.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
