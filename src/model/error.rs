use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("checkpoint not found at path: {path}")]
    CheckpointNotFound { path: PathBuf },

    #[error("unsupported checkpoint format: {path} (expected .safetensors, .pth, .pt or .bin)")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to load checkpoint: {reason}")]
    LoadFailed { reason: String },

    #[error("checkpoint is missing tensor '{name}'")]
    MissingTensor { name: String },

    #[error("shape mismatch for '{name}': checkpoint has {actual:?}, configuration expects {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("vocabulary uses id {max_id} but the embedding table only has {rows} rows")]
    VocabularyExceedsEmbedding { max_id: u32, rows: usize },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("model inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("invalid model configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ModelError {
    /// `true` for errors raised because checkpoint and configuration disagree on dimensions.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            ModelError::ShapeMismatch { .. } | ModelError::VocabularyExceedsEmbedding { .. }
        )
    }
}

impl From<candle_core::Error> for ModelError {
    fn from(err: candle_core::Error) -> Self {
        ModelError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::LoadFailed {
            reason: err.to_string(),
        }
    }
}
