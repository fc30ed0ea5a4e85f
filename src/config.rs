//! Options controlling how an index directory is opened.
//!
//! Options may be persisted next to the index files as
//! `index_options.json`; `InvIndexProvider::open` picks them up when present.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::postings::PayloadLayout;

/// File name of the persisted options inside an index directory.
pub const OPTIONS_FILE: &str = "index_options.json";

/// How the loaders treat a stream that ends in the middle of a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Any short read is reported as `IndexError::Truncated`.
    Strict,
    /// A partial trailing unit is dropped and the complete prefix is kept.
    #[default]
    Tolerant,
}

/// Backend serving positioned reads from `postings.bin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// One file handle behind a mutex; each read is a seek plus read.
    #[default]
    LockedFile,
    /// Read-only memory map of the whole file.
    Mmap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    pub mode: LoadMode,
    /// Per-posting payload shape written by the builder's posting codec.
    pub payload: PayloadLayout,
    pub backend: StoreBackend,
    /// Check at open time that every dictionary term id has an offset.
    pub validate_offsets: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            mode: LoadMode::Tolerant,
            payload: PayloadLayout::default(),
            backend: StoreBackend::LockedFile,
            validate_offsets: true,
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn payload(mut self, payload: PayloadLayout) -> Self {
        self.payload = payload;
        self
    }

    pub fn backend(mut self, backend: StoreBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn validate_offsets(mut self, validate: bool) -> Self {
        self.validate_offsets = validate;
        self
    }

    /// Read options from an index directory. Returns None if the file doesn't exist.
    pub fn read_from(index_dir: &Path) -> Result<Option<Self>> {
        let path = index_dir.join(OPTIONS_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        let options: Self = serde_json::from_str(&contents)?;
        Ok(Some(options))
    }

    /// Write options to an index directory.
    pub fn write_to(&self, index_dir: &Path) -> Result<()> {
        let path = index_dir.join(OPTIONS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(())
    }
}
