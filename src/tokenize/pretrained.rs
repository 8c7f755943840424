use std::path::{Path, PathBuf};

use tokenizers::Tokenizer;

use super::error::TokenizeError;
use super::segmenter::Segmenter;

/// File looked up when a tokenizer path names a directory.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Maps a model directory to its `tokenizer.json`; file paths pass through.
pub fn resolve_tokenizer_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(TOKENIZER_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Loads a tokenizer from a directory or an explicit `tokenizer.json` path.
pub fn load_tokenizer(path: &Path) -> Result<Tokenizer, TokenizeError> {
    let tokenizer_path = resolve_tokenizer_path(path);

    if !tokenizer_path.exists() {
        return Err(TokenizeError::TokenizerNotFound {
            path: tokenizer_path,
        });
    }

    Tokenizer::from_file(&tokenizer_path).map_err(|e| TokenizeError::LoadFailed {
        reason: format!("{}: {}", tokenizer_path.display(), e),
    })
}

/// Segments with a `tokenizers` pipeline and keeps only the surface tokens.
///
/// Ids produced by the tokenizer are discarded; words are looked up in the
/// address vocabulary like any other segmenter output.
pub struct PretrainedSegmenter {
    tokenizer: Tokenizer,
}

impl std::fmt::Debug for PretrainedSegmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PretrainedSegmenter").finish_non_exhaustive()
    }
}

impl PretrainedSegmenter {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    pub fn from_file(path: &Path) -> Result<Self, TokenizeError> {
        Ok(Self::new(load_tokenizer(path)?))
    }
}

impl Segmenter for PretrainedSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<String>, TokenizeError> {
        let encoding =
            self.tokenizer
                .encode(text, false)
                .map_err(|e| TokenizeError::SegmentationFailed {
                    reason: e.to_string(),
                })?;

        Ok(encoding
            .get_tokens()
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "pretrained"
    }
}
