//! Positioned-read access to the postings file.
//!
//! Lookups never share a read position. Each query reads through its own
//! `StoreCursor` over a `PositionedRead` backend, so concurrent lookups on
//! one provider cannot interleave a seek with another query's read.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

use memmap2::Mmap;

use crate::config::StoreBackend;
use crate::error::{IndexError, Result};
use crate::index::format::fill_buf;

/// Random access to an immutable byte store.
pub trait PositionedRead: Send + Sync {
    /// Read up to `buf.len()` bytes starting at `offset`. Returns the number
    /// of bytes read; fewer than requested means the store ended.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Total size in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Open `path` with the requested backend.
pub fn open_store(path: &Path, backend: StoreBackend) -> Result<Box<dyn PositionedRead>> {
    Ok(match backend {
        StoreBackend::LockedFile => Box::new(LockedFile::open(path)?),
        StoreBackend::Mmap => Box::new(MmapStore::open(path)?),
    })
}

// ── LockedFile ─────────────────────────────────────────────────────

/// One file handle guarded by a mutex. The seek and the read that follows
/// it happen under a single lock acquisition.
#[derive(Debug)]
pub struct LockedFile {
    file: Mutex<File>,
    len: u64,
}

impl LockedFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(IndexError::Io)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file: Mutex::new(file),
            len,
        })
    }
}

impl PositionedRead for LockedFile {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "postings handle lock poisoned"))?;
        file.seek(SeekFrom::Start(offset))?;
        fill_buf(&mut *file, buf)
    }

    fn len(&self) -> u64 {
        self.len
    }
}

// ── MmapStore ──────────────────────────────────────────────────────

/// Read-only memory map of the whole file.
#[derive(Debug)]
pub struct MmapStore {
    // Zero-length files are not mapped.
    map: Option<Mmap>,
}

impl MmapStore {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(IndexError::Io)?;
        if file.metadata()?.len() == 0 {
            return Ok(Self { map: None });
        }
        // Index files are immutable once written by the builder.
        let map = unsafe { Mmap::map(&file) }.map_err(IndexError::Io)?;
        Ok(Self { map: Some(map) })
    }

    fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }
}

impl PositionedRead for MmapStore {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.bytes();
        let start = match usize::try_from(offset) {
            Ok(start) if start < data.len() => start,
            _ => return Ok(0),
        };
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn len(&self) -> u64 {
        self.bytes().len() as u64
    }
}

// ── In-memory store ────────────────────────────────────────────────

impl PositionedRead for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = match usize::try_from(offset) {
            Ok(start) if start < self.len() => start,
            _ => return Ok(0),
        };
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }

    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }
}

// ── StoreCursor ────────────────────────────────────────────────────

/// A private read position over a shared store.
pub struct StoreCursor<'a> {
    store: &'a dyn PositionedRead,
    pos: u64,
}

impl<'a> StoreCursor<'a> {
    pub fn new(store: &'a dyn PositionedRead, pos: u64) -> Self {
        Self { store, pos }
    }

    /// Current absolute position in the store.
    pub fn position(&self) -> u64 {
        self.pos
    }
}

impl Read for StoreCursor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.store.read_at(self.pos, buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}
