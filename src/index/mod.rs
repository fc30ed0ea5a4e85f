//! Read-only inverted index over four companion files.
//!
//! Provides:
//! - `format` -- file names and binary record types shared by the files
//! - `dictionary` -- term <-> term id map
//! - `offsets` -- term id -> posting record offset
//! - `documents` -- sorted corpus document ids
//! - `store` -- positioned reads over the postings file
//! - `postings` -- posting record decode
//! - `writer` -- fixture tooling: encoding side of the file contract
//! - `provider` -- the query facade

pub mod dictionary;
pub mod documents;
pub mod format;
pub mod offsets;
pub mod postings;
pub mod provider;
pub mod store;
pub mod writer;

pub use dictionary::Dictionary;
pub use documents::DocumentIdIndex;
pub use format::{DocumentRecord, OffsetEntry};
pub use offsets::OffsetIndex;
pub use postings::{DecodedRecord, PayloadLayout, Posting, PostingStore};
pub use provider::{IndexStats, InvIndexProvider, LoadReport};
pub use store::{LockedFile, MmapStore, PositionedRead, StoreCursor};
pub use writer::IndexFilesWriter;
