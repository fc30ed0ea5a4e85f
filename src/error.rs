//! Error types for the inverted index provider

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Index directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Index path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Can not find {name} in index directory (expected at {path})")]
    MissingFile { name: &'static str, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Truncated {file}: {detail}")]
    Truncated { file: &'static str, detail: String },

    /// A term id known to the dictionary has no offset entry. The index files
    /// disagree with each other; this is never a lookup miss.
    #[error("Term id {0} is in the dictionary but has no postings offset")]
    MissingOffset(u64),

    #[error("{missing} dictionary term ids have no postings offset (first: {first})")]
    InconsistentIndex { missing: usize, first: u64 },
}

impl IndexError {
    /// Get error code for callers that report failures over a wire protocol
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::DirectoryNotFound(_) | IndexError::MissingFile { .. } => "NOT_FOUND",
            IndexError::NotADirectory(_) => "INVALID_LAYOUT",
            IndexError::InvalidFormat(_)
            | IndexError::Truncated { .. }
            | IndexError::Serialization(_) => "CORRUPT_INDEX",
            IndexError::MissingOffset(_) | IndexError::InconsistentIndex { .. } => {
                "INVARIANT_VIOLATION"
            }
            IndexError::Json(_) => "INVALID_CONFIG",
            IndexError::Io(_) => "IO_ERROR",
        }
    }

    /// True for failures of the directory contract checked before any file is read.
    pub fn is_layout_error(&self) -> bool {
        matches!(
            self,
            IndexError::DirectoryNotFound(_)
                | IndexError::NotADirectory(_)
                | IndexError::MissingFile { .. }
        )
    }

    /// True when the index files contradict each other.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            IndexError::MissingOffset(_) | IndexError::InconsistentIndex { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_errors_classified() {
        let err = IndexError::MissingFile {
            name: "postings.bin",
            path: PathBuf::from("/idx/postings.bin"),
        };
        assert!(err.is_layout_error());
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.to_string().contains("postings.bin"));

        let err = IndexError::NotADirectory(PathBuf::from("/idx"));
        assert!(err.is_layout_error());
        assert_eq!(err.code(), "INVALID_LAYOUT");
    }

    #[test]
    fn test_missing_offset_is_not_a_layout_error() {
        let err = IndexError::MissingOffset(42);
        assert!(!err.is_layout_error());
        assert!(err.is_invariant_violation());
        assert_eq!(err.code(), "INVARIANT_VIOLATION");
        assert!(err.to_string().contains("42"));
    }
}
