use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::model::ModelError;
use crate::tokenize::TokenizeError;
use crate::vocab::VocabError;

/// Fatal errors while building an [`InferenceSession`](super::InferenceSession).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// An artifact (vocabulary, tokenizer, checkpoint, catalog) is missing or unreadable.
    #[error("failed to load {artifact}: {reason}")]
    Configuration {
        artifact: &'static str,
        reason: String,
    },

    /// The checkpoint loaded but does not fit the configured model.
    #[error("model rejected: {0}")]
    Model(ModelError),
}

impl SessionError {
    fn configuration(artifact: &'static str, err: impl std::fmt::Display) -> Self {
        SessionError::Configuration {
            artifact,
            reason: err.to_string(),
        }
    }

    /// `true` when checkpoint tensors disagree with the configured dimensions.
    pub fn is_shape_mismatch(&self) -> bool {
        match self {
            SessionError::Model(e) => {
                e.is_shape_mismatch() || matches!(e, ModelError::MissingTensor { .. })
            }
            _ => false,
        }
    }
}

impl From<VocabError> for SessionError {
    fn from(err: VocabError) -> Self {
        Self::configuration("vocabulary", err)
    }
}

impl From<TokenizeError> for SessionError {
    fn from(err: TokenizeError) -> Self {
        Self::configuration("tokenizer", err)
    }
}

impl From<CatalogError> for SessionError {
    fn from(err: CatalogError) -> Self {
        Self::configuration("catalog", err)
    }
}

impl From<ModelError> for SessionError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::CheckpointNotFound { .. }
            | ModelError::UnsupportedFormat { .. }
            | ModelError::LoadFailed { .. } => Self::configuration("checkpoint", err),
            other => SessionError::Model(other),
        }
    }
}
