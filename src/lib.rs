//! addrmatch library crate (used by the `addrmatch` binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Artifacts
//! - [`Vocabulary`] - word → id dictionary, id `0` reserved for padding/unknown
//! - [`Indexer`], [`EncodedSequence`], [`Segmenter`] - address text to fixed-length ids
//! - [`Catalog`] - candidate addresses, one per line
//!
//! ## Model
//! - [`EsimModel`], [`EsimConfig`] - the sentence-pair scorer
//! - [`Checkpoint`] - `.safetensors` and PyTorch weight files
//!
//! ## Matching
//! - [`Matcher`], [`PairScorer`], [`MatchOutcome`] - linear best-match scan
//! - [`InferenceSession`] - everything above, loaded once from a [`Config`]
//!
//! ## Offline
//! - [`PairDataset`], [`evaluate`], [`EvalMetrics`] - precision/recall/F1 on labelled pairs
//!
//! ## Test/Mock Support
//! [`MockScorer`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod evaluation;
pub mod gateway;
pub mod matcher;
pub mod model;
pub mod session;
pub mod tokenize;
pub mod vocab;

pub use catalog::{Catalog, CatalogError, extract_unique_addresses};
pub use config::{Config, ConfigError};
pub use constants::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_HIDDEN_DIM, DEFAULT_MATCH_THRESHOLD, DEFAULT_MAX_SEQ_LEN,
    DEFAULT_VOCAB_SIZE, PAD_ID,
};
pub use evaluation::{
    Confusion, EvalError, EvalMetrics, PairDataset, PairExample, evaluate,
    evaluate_with_threshold, tokenize_dataset,
};
pub use matcher::{BestMatch, MatchError, MatchOutcome, Matcher, PairScorer, ScoredCandidate};
#[cfg(any(test, feature = "mock"))]
pub use matcher::MockScorer;
pub use model::{Checkpoint, EsimConfig, EsimModel, ModelError, select_device};
pub use session::{InferenceSession, SessionError, SessionSummary};
pub use tokenize::{
    EncodedSequence, Indexer, MaxMatchSegmenter, PretrainedSegmenter, Segmenter, TokenizeError,
};
pub use vocab::{TokenId, VocabError, Vocabulary};
