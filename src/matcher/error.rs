use thiserror::Error;

use crate::model::ModelError;
use crate::tokenize::TokenizeError;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("tokenization failed: {0}")]
    Tokenize(#[from] TokenizeError),

    #[error("scoring failed: {0}")]
    Scoring(#[from] ModelError),

    #[error("all {failed} candidates failed to score, last error: {last_error}")]
    AllCandidatesFailed { failed: usize, last_error: String },

    #[error("match cancelled after {scanned} candidates")]
    Cancelled { scanned: usize },
}
