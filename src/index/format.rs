//! Binary format types shared by the index files.
//!
//! An index directory holds four companion files written independently by
//! the index builder:
//!
//! ```text
//! dict.bin            bincode: versioned list of (term, term_id)
//! offsets.bin         (term_id: u64, offset: u64) * N        until EOF
//! document_index.bin  count: u64, (doc_id: u64, label: str) * count
//! postings.bin        [count: u64, (doc_id: u64, payload) * count] * terms
//! ```
//!
//! All integers are little-endian. Strings are `len: u64` followed by
//! `len` UTF-8 bytes.

use std::io::{self, Read, Write};

use crate::error::{IndexError, Result};

// ── File Names ────────────────────────────────────────────────────

pub const POSTINGS_FILE: &str = "postings.bin";
pub const OFFSETS_FILE: &str = "offsets.bin";
pub const DOCUMENT_INDEX_FILE: &str = "document_index.bin";
pub const DICTIONARY_FILE: &str = "dict.bin";

/// Files that must exist before an index directory can be opened.
pub const REQUIRED_FILES: [&str; 4] = [
    POSTINGS_FILE,
    OFFSETS_FILE,
    DOCUMENT_INDEX_FILE,
    DICTIONARY_FILE,
];

// ── Primitives ────────────────────────────────────────────────────

/// Outcome of reading one fixed or length-prefixed unit from a stream that
/// may end early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fill<T> {
    /// The whole unit was read.
    Complete(T),
    /// The stream ended exactly on a unit boundary.
    End,
    /// The stream ended after this many bytes of the unit.
    Partial(usize),
}

/// Read into `buf` until it is full or the stream ends. Returns bytes read.
pub fn fill_buf<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read a little-endian u64, reporting a short stream instead of failing.
pub fn try_read_u64<R: Read>(r: &mut R) -> io::Result<Fill<u64>> {
    let mut buf = [0u8; 8];
    Ok(match fill_buf(r, &mut buf)? {
        0 => Fill::End,
        8 => Fill::Complete(u64::from_le_bytes(buf)),
        n => Fill::Partial(n),
    })
}

/// Write a little-endian u64.
#[inline]
pub fn write_u64<W: Write>(w: &mut W, value: u64) -> Result<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string.
pub fn write_str<W: Write>(w: &mut W, s: &str) -> Result<()> {
    write_u64(w, s.len() as u64)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

// ── Offset Entry ──────────────────────────────────────────────────

/// One `(term_id, offset)` pair of the offset index.
///
/// ```text
/// Offset  Size  Field
/// 0       8     term_id: u64
/// 8       8     offset: u64
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetEntry {
    pub term_id: u64,
    /// Byte position of the term's posting record in `postings.bin`.
    pub offset: u64,
}

impl OffsetEntry {
    pub const SIZE: usize = 16;

    pub fn new(term_id: u64, offset: u64) -> Self {
        Self { term_id, offset }
    }

    /// Write entry to writer (16 bytes, little-endian).
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.term_id.to_le_bytes())?;
        w.write_all(&self.offset.to_le_bytes())?;
        Ok(())
    }

    /// Read one entry, reporting an incomplete trailing pair as `Partial`.
    pub fn try_read_from<R: Read>(r: &mut R) -> Result<Fill<Self>> {
        let mut buf = [0u8; Self::SIZE];
        Ok(match fill_buf(r, &mut buf)? {
            0 => Fill::End,
            Self::SIZE => Fill::Complete(Self {
                term_id: u64::from_le_bytes(le8(&buf[0..8])),
                offset: u64::from_le_bytes(le8(&buf[8..16])),
            }),
            n => Fill::Partial(n),
        })
    }
}

// ── Document Record ───────────────────────────────────────────────

/// One `(doc_id, label)` record of the document index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub doc_id: u64,
    /// Builder-assigned label (usually the source path). Not retained on load.
    pub label: String,
}

impl DocumentRecord {
    pub fn new(doc_id: u64, label: impl Into<String>) -> Self {
        Self {
            doc_id,
            label: label.into(),
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u64(w, self.doc_id)?;
        write_str(w, &self.label)
    }

    /// Read one record. A stream that ends anywhere inside the record is
    /// reported as `Partial` with the number of bytes consumed.
    pub fn try_read_from<R: Read>(r: &mut R) -> Result<Fill<Self>> {
        let mut head = [0u8; 16];
        let n = fill_buf(r, &mut head)?;
        if n == 0 {
            return Ok(Fill::End);
        }
        if n < head.len() {
            return Ok(Fill::Partial(n));
        }

        let doc_id = u64::from_le_bytes(le8(&head[0..8]));
        let label_len = u64::from_le_bytes(le8(&head[8..16]));

        // Bounded by what the stream actually holds, so a corrupt length
        // cannot force a huge allocation.
        let mut label = Vec::new();
        let got = r.by_ref().take(label_len).read_to_end(&mut label)?;
        if (got as u64) < label_len {
            return Ok(Fill::Partial(head.len() + got));
        }

        let label = String::from_utf8(label).map_err(|_| {
            IndexError::InvalidFormat(format!("Document {} label is not valid UTF-8", doc_id))
        })?;
        Ok(Fill::Complete(Self { doc_id, label }))
    }
}

#[inline]
fn le8(bytes: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(bytes);
    out
}

// ── Tests ──────────────────────────────────────────────────────────
