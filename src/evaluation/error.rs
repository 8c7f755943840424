use std::path::PathBuf;
use thiserror::Error;

use crate::model::ModelError;
use crate::tokenize::TokenizeError;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("dataset file not found at path: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read dataset: {reason}")]
    ReadFailed { reason: String },

    #[error("failed to write dataset: {reason}")]
    WriteFailed { reason: String },

    #[error("{path}:{line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("dataset files disagree on length: {first} first sentences, {second} second sentences, {labels} labels")]
    LengthMismatch {
        first: usize,
        second: usize,
        labels: usize,
    },

    #[error("dataset is empty")]
    Empty,

    #[error("tokenization failed: {0}")]
    Tokenize(#[from] TokenizeError),

    #[error("scoring pair {index} failed: {source}")]
    Scoring {
        index: usize,
        #[source]
        source: ModelError,
    },
}

impl From<std::io::Error> for EvalError {
    fn from(err: std::io::Error) -> Self {
        EvalError::ReadFailed {
            reason: err.to_string(),
        }
    }
}
