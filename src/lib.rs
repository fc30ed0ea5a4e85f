//! inv-index: read-only query access to a pre-built inverted index.
//!
//! The index builder writes four files into one directory (term
//! dictionary, term -> offset map, postings store, document index). This
//! crate reconciles them into an `InvIndexProvider` that answers "which
//! documents contain this term" by decoding a single posting record per
//! query.

pub mod config;
pub mod error;
pub mod index;

pub use config::{LoadMode, OpenOptions, StoreBackend};
pub use error::{IndexError, Result};
pub use index::{Dictionary, InvIndexProvider, PayloadLayout, Posting};
