use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("vocabulary file not found at path: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read vocabulary: {reason}")]
    ReadFailed { reason: String },

    #[error("failed to parse vocabulary {path}: {reason}")]
    ParseFailed { path: PathBuf, reason: String },

    #[error("word '{word}' uses reserved padding id 0")]
    ReservedId { word: String },

    #[error("vocabulary is empty")]
    Empty,

    #[error("failed to write vocabulary: {reason}")]
    WriteFailed { reason: String },
}

impl From<std::io::Error> for VocabError {
    fn from(err: std::io::Error) -> Self {
        VocabError::ReadFailed {
            reason: err.to_string(),
        }
    }
}
