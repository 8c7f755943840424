//! Text → fixed-length id sequences.
//!
//! - [`Segmenter`] splits text into words ([`MaxMatchSegmenter`] or [`PretrainedSegmenter`]).
//! - [`Indexer`] maps words through the [`Vocabulary`] and pads/truncates to `max_len`.

pub mod error;
pub mod pretrained;
pub mod segmenter;


pub use error::TokenizeError;
pub use pretrained::{
    PretrainedSegmenter, TOKENIZER_FILE, load_tokenizer, resolve_tokenizer_path,
};
pub use segmenter::{MaxMatchSegmenter, Segmenter};

use std::sync::Arc;

use candle_core::{Device, Tensor};
use tracing::debug;

use crate::constants::{DEFAULT_MAX_SEQ_LEN, PAD_ID};
use crate::vocab::Vocabulary;

/// Exactly `max_len` token ids; shorter inputs are zero-padded, longer ones truncated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedSequence {
    ids: Vec<u32>,
}

impl EncodedSequence {
    /// Pads or truncates `ids` to `max_len`.
    pub fn from_ids(mut ids: Vec<u32>, max_len: usize) -> Self {
        ids.resize(max_len, PAD_ID);
        Self { ids }
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of non-padding ids.
    pub fn non_padding(&self) -> usize {
        self.ids.iter().filter(|&&id| id != PAD_ID).count()
    }

    /// `(1, max_len)` u32 tensor.
    pub fn to_tensor(&self, device: &Device) -> candle_core::Result<Tensor> {
        Tensor::new(self.ids.as_slice(), device)?.unsqueeze(0)
    }
}

/// Segments text and maps each word to its vocabulary id.
pub struct Indexer {
    vocab: Arc<Vocabulary>,
    segmenter: Box<dyn Segmenter>,
    max_len: usize,
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("vocab_words", &self.vocab.len())
            .field("segmenter", &self.segmenter.name())
            .field("max_len", &self.max_len)
            .finish()
    }
}

impl Indexer {
    pub fn new(
        vocab: Arc<Vocabulary>,
        segmenter: Box<dyn Segmenter>,
        max_len: usize,
    ) -> Result<Self, TokenizeError> {
        if max_len == 0 {
            return Err(TokenizeError::ZeroLength);
        }
        Ok(Self {
            vocab,
            segmenter,
            max_len,
        })
    }

    /// Indexer using [`MaxMatchSegmenter`] over the same vocabulary.
    pub fn max_match(vocab: Arc<Vocabulary>, max_len: usize) -> Result<Self, TokenizeError> {
        let segmenter = MaxMatchSegmenter::new(Arc::clone(&vocab));
        Self::new(vocab, Box::new(segmenter), max_len)
    }

    /// [`Indexer::max_match`] with the default sequence length.
    pub fn with_default_len(vocab: Arc<Vocabulary>) -> Self {
        let segmenter = MaxMatchSegmenter::new(Arc::clone(&vocab));
        Self {
            vocab,
            segmenter: Box::new(segmenter),
            max_len: DEFAULT_MAX_SEQ_LEN,
        }
    }

    pub fn encode(&self, text: &str) -> Result<EncodedSequence, TokenizeError> {
        let mut ids = self.word_ids(text)?;
        let words = ids.len();
        ids.truncate(self.max_len);

        debug!(
            words,
            known = ids.iter().filter(|&&id| id != PAD_ID).count(),
            truncated = words > self.max_len,
            "Encoded text"
        );

        Ok(EncodedSequence::from_ids(ids, self.max_len))
    }

    /// One id per segmented word, neither padded nor truncated.
    pub fn word_ids(&self, text: &str) -> Result<Vec<u32>, TokenizeError> {
        let words = self.segmenter.segment(text)?;
        Ok(words.iter().map(|w| self.vocab.lookup(w).id()).collect())
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn segmenter_name(&self) -> &'static str {
        self.segmenter.name()
    }
}
