use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("tokenizer not found at path: {path}")]
    TokenizerNotFound { path: PathBuf },

    #[error("failed to load tokenizer: {reason}")]
    LoadFailed { reason: String },

    #[error("segmentation failed: {reason}")]
    SegmentationFailed { reason: String },

    #[error("max_len must be greater than zero")]
    ZeroLength,
}
