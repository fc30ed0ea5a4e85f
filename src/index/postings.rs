//! Posting store: decodes one posting record at a byte offset.
//!
//! # Record Layout
//!
//! ```text
//! count: u64
//! (doc_id: u64, payload) * count
//! ```
//!
//! The payload belongs to the builder's posting codec. This module only
//! knows its shape (`PayloadLayout`) so it can step over it and stay
//! aligned; only doc ids are kept.

use std::io::{self, BufReader, Read, Write};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::LoadMode;
use crate::error::{IndexError, Result};
use crate::index::format::{fill_buf, try_read_u64, write_u64, Fill, POSTINGS_FILE};
use crate::index::store::{PositionedRead, StoreCursor};

const READ_BUFFER_SIZE: usize = 8 * 1024;

// ── Payload Layout ─────────────────────────────────────────────────

/// Shape of the opaque per-posting payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadLayout {
    /// No payload bytes.
    Empty,
    /// Exactly `len` bytes per posting.
    Fixed { len: u32 },
    /// `n: u64` followed by `n` u32 positions.
    Positions,
}

impl Default for PayloadLayout {
    /// A u32 term frequency.
    fn default() -> Self {
        PayloadLayout::Fixed { len: 4 }
    }
}

impl PayloadLayout {
    /// Smallest encoded size of one posting (doc id plus payload).
    pub fn min_posting_size(&self) -> u64 {
        8 + match self {
            PayloadLayout::Empty => 0,
            PayloadLayout::Fixed { len } => *len as u64,
            PayloadLayout::Positions => 8,
        }
    }

    /// Encode a positions payload for the `Positions` layout.
    pub fn encode_positions(positions: &[u32]) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + positions.len() * 4);
        out.extend_from_slice(&(positions.len() as u64).to_le_bytes());
        for p in positions {
            out.extend_from_slice(&p.to_le_bytes());
        }
        out
    }

    /// Check that `payload` is one well-formed payload of this layout.
    pub fn check(&self, payload: &[u8]) -> Result<()> {
        let ok = match self {
            PayloadLayout::Empty => payload.is_empty(),
            PayloadLayout::Fixed { len } => payload.len() == *len as usize,
            PayloadLayout::Positions => {
                payload.len() >= 8 && {
                    let mut n = [0u8; 8];
                    n.copy_from_slice(&payload[..8]);
                    u64::from_le_bytes(n)
                        .checked_mul(4)
                        .map_or(false, |body| body == (payload.len() - 8) as u64)
                }
            }
        };
        if ok {
            Ok(())
        } else {
            Err(IndexError::InvalidFormat(format!(
                "Payload of {} bytes does not match layout {:?}",
                payload.len(),
                self
            )))
        }
    }

    /// Step over one payload. Returns the bytes consumed, or `Fill::Partial`
    /// if the stream ended inside it.
    fn skip<R: Read>(&self, r: &mut R) -> Result<Fill<u64>> {
        let body = match self {
            PayloadLayout::Empty => return Ok(Fill::Complete(0)),
            PayloadLayout::Fixed { len } => *len as u64,
            PayloadLayout::Positions => match try_read_u64(r)? {
                Fill::Complete(n) => {
                    let body = n.checked_mul(4).ok_or_else(|| {
                        IndexError::InvalidFormat(format!("Position count {} overflows", n))
                    })?;
                    return Ok(match skip_bytes(r, body)? {
                        got if got == body => Fill::Complete(8 + body),
                        got => Fill::Partial((8 + got) as usize),
                    });
                }
                Fill::End => return Ok(Fill::Partial(0)),
                Fill::Partial(n) => return Ok(Fill::Partial(n)),
            },
        };
        Ok(match skip_bytes(r, body)? {
            got if got == body => Fill::Complete(body),
            got => Fill::Partial(got as usize),
        })
    }
}

fn skip_bytes<R: Read>(r: &mut R, n: u64) -> io::Result<u64> {
    io::copy(&mut r.by_ref().take(n), &mut io::sink())
}

// ── Posting ────────────────────────────────────────────────────────

/// One posting as written by the builder: a doc id and its encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: u64,
    pub payload: Vec<u8>,
}

impl Posting {
    pub fn new(doc_id: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            doc_id,
            payload: payload.into(),
        }
    }
}

/// Encode one posting record. Returns the number of bytes written.
pub fn write_record<W: Write>(
    w: &mut W,
    postings: &[Posting],
    layout: PayloadLayout,
) -> Result<u64> {
    write_u64(w, postings.len() as u64)?;
    let mut written = 8u64;
    for p in postings {
        layout.check(&p.payload)?;
        write_u64(w, p.doc_id)?;
        w.write_all(&p.payload)?;
        written += 8 + p.payload.len() as u64;
    }
    Ok(written)
}

// ── Decoded Record ─────────────────────────────────────────────────

/// Result of decoding one posting record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    /// Doc ids in on-disk order.
    pub doc_ids: Vec<u64>,
    /// Offset of the first byte after the record.
    pub end_offset: u64,
    /// True if the store ended before the declared count was reached.
    pub truncated: bool,
}

// ── Posting Store ──────────────────────────────────────────────────

pub struct PostingStore {
    store: Box<dyn PositionedRead>,
    layout: PayloadLayout,
    mode: LoadMode,
}

impl PostingStore {
    pub fn new(store: Box<dyn PositionedRead>, layout: PayloadLayout, mode: LoadMode) -> Self {
        Self {
            store,
            layout,
            mode,
        }
    }

    /// Size of the postings file in bytes.
    pub fn len(&self) -> u64 {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Doc ids of the record at `offset`, in on-disk order (not sorted).
    /// Drops the `truncated` flag; use `decode` when that matters.
    pub fn read_doc_ids(&self, offset: u64) -> Result<Vec<u64>> {
        Ok(self.decode(offset)?.doc_ids)
    }

    /// Decode the record at `offset`, consuming exactly the bytes it declares.
    ///
    /// In `Tolerant` mode a record cut short by the end of the store yields
    /// the postings decoded so far; in `Strict` mode it is an error.
    pub fn decode(&self, offset: u64) -> Result<DecodedRecord> {
        if offset > self.store.len() {
            return Err(IndexError::InvalidFormat(format!(
                "Posting offset {} is past the end of {} ({} bytes)",
                offset,
                POSTINGS_FILE,
                self.store.len()
            )));
        }

        let mut r = BufReader::with_capacity(
            READ_BUFFER_SIZE,
            StoreCursor::new(&*self.store, offset),
        );
        let mut pos = offset;

        let count = match try_read_u64(&mut r)? {
            Fill::Complete(count) => count,
            Fill::End | Fill::Partial(_) => {
                return self.truncated(offset, Vec::new(), offset, "missing entry count");
            }
        };
        pos += 8;

        // The declared count is untrusted; cap the allocation by what could fit.
        let fits = (self.store.len() - pos.min(self.store.len())) / self.layout.min_posting_size();
        let mut doc_ids = Vec::with_capacity(count.min(fits) as usize);

        let mut id_buf = [0u8; 8];
        for _ in 0..count {
            if fill_buf(&mut r, &mut id_buf)? < id_buf.len() {
                return self.truncated(offset, doc_ids, pos, "entry cut inside doc id");
            }
            match self.layout.skip(&mut r)? {
                Fill::Complete(n) => pos += 8 + n,
                Fill::End | Fill::Partial(_) => {
                    return self.truncated(offset, doc_ids, pos, "entry cut inside payload");
                }
            }
            doc_ids.push(u64::from_le_bytes(id_buf));
        }

        Ok(DecodedRecord {
            doc_ids,
            end_offset: pos,
            truncated: false,
        })
    }

    fn truncated(
        &self,
        offset: u64,
        doc_ids: Vec<u64>,
        end_offset: u64,
        detail: &str,
    ) -> Result<DecodedRecord> {
        if self.mode == LoadMode::Strict {
            return Err(IndexError::Truncated {
                file: POSTINGS_FILE,
                detail: format!("record at offset {}: {}", offset, detail),
            });
        }
        warn!(
            offset,
            decoded = doc_ids.len(),
            "posting record truncated: {}",
            detail
        );
        Ok(DecodedRecord {
            doc_ids,
            end_offset,
            truncated: true,
        })
    }
}
