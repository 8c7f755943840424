use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found at path: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read catalog: {reason}")]
    ReadFailed { reason: String },

    #[error("failed to write catalog: {reason}")]
    WriteFailed { reason: String },
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::ReadFailed {
            reason: err.to_string(),
        }
    }
}
