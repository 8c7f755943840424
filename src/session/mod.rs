//! Loaded artifacts for one matching deployment.
//!
//! An [`InferenceSession`] owns the indexer, the scorer and the catalog. It is built
//! once and passed by reference to every match call; nothing in it changes after
//! construction, so an `Arc<InferenceSession>` can serve concurrent requests.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::SessionError;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::matcher::{MatchError, MatchOutcome, Matcher, PairScorer, ScoredCandidate};
use crate::model::{EsimModel, select_device};
use crate::tokenize::{Indexer, PretrainedSegmenter};
use crate::vocab::Vocabulary;

/// Counts reported by readiness checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub vocabulary_words: usize,
    pub catalog_entries: usize,
    pub skipped_catalog_lines: usize,
    pub max_seq_len: usize,
    pub segmenter: &'static str,
    pub scorer: &'static str,
}

pub struct InferenceSession<S: PairScorer = EsimModel> {
    indexer: Indexer,
    scorer: S,
    catalog: Catalog,
}

impl<S: PairScorer> std::fmt::Debug for InferenceSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceSession")
            .field("indexer", &self.indexer)
            .field("scorer", &self.scorer.mode())
            .field("catalog_entries", &self.catalog.len())
            .finish()
    }
}

impl InferenceSession<EsimModel> {
    /// Loads vocabulary, segmenter, checkpoint and catalog described by `config`.
    ///
    /// Any missing or unreadable artifact aborts with [`SessionError::Configuration`];
    /// a checkpoint that does not fit the configured dimensions aborts with
    /// [`SessionError::Model`] before any inference runs.
    pub fn load(config: &Config) -> Result<Self, SessionError> {
        let started = Instant::now();
        config.validate()?;

        let indexer = load_indexer(config)?;

        let device = select_device(config.force_cpu)?;
        let model = EsimModel::load(&config.checkpoint_path, config.model_config(), &device)?;
        model.check_vocabulary(indexer.vocab())?;

        let catalog = Catalog::load(&config.catalog_path)?;
        if catalog.is_empty() {
            warn!(
                path = %config.catalog_path.display(),
                "Catalog is empty, every query will report no match"
            );
        }

        let session = Self::from_parts(indexer, model, catalog);
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            vocabulary_words = session.indexer.vocab().len(),
            catalog_entries = session.catalog.len(),
            segmenter = session.indexer.segmenter_name(),
            "Inference session ready"
        );
        Ok(session)
    }
}

/// Loads the vocabulary and builds the configured segmenter around it.
///
/// Uses the pretrained tokenizer when `tokenizer_path` is set, vocabulary
/// max-match segmentation otherwise.
pub fn load_indexer(config: &Config) -> Result<Indexer, SessionError> {
    let vocab = Arc::new(Vocabulary::load_json(&config.vocab_path)?);

    let indexer = match &config.tokenizer_path {
        Some(path) => {
            let segmenter = PretrainedSegmenter::from_file(path)?;
            Indexer::new(vocab, Box::new(segmenter), config.max_seq_len)?
        }
        None => Indexer::max_match(vocab, config.max_seq_len)?,
    };

    info!(
        segmenter = indexer.segmenter_name(),
        max_len = indexer.max_len(),
        "Indexer ready"
    );
    Ok(indexer)
}

impl<S: PairScorer> InferenceSession<S> {
    pub fn from_parts(indexer: Indexer, scorer: S, catalog: Catalog) -> Self {
        Self {
            indexer,
            scorer,
            catalog,
        }
    }

    pub fn matcher(&self) -> Matcher<'_, S> {
        Matcher::new(&self.indexer, &self.scorer)
    }

    /// Best catalog match for `query`.
    pub fn match_query(&self, query: &str) -> Result<MatchOutcome, MatchError> {
        self.matcher().best_match(query, &self.catalog)
    }

    /// [`InferenceSession::match_query`] that stops once `cancel` is raised.
    pub fn match_query_cancellable(
        &self,
        query: &str,
        cancel: &AtomicBool,
    ) -> Result<MatchOutcome, MatchError> {
        self.matcher()
            .best_match_cancellable(query, &self.catalog, cancel)
    }

    /// The `top_n` highest-scoring candidates for `query`.
    pub fn rank(&self, query: &str, top_n: usize) -> Result<Vec<ScoredCandidate>, MatchError> {
        self.matcher().rank(query, &self.catalog, top_n)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            vocabulary_words: self.indexer.vocab().len(),
            catalog_entries: self.catalog.len(),
            skipped_catalog_lines: self.catalog.skipped_lines(),
            max_seq_len: self.indexer.max_len(),
            segmenter: self.indexer.segmenter_name(),
            scorer: self.scorer.mode(),
        }
    }

    pub fn indexer(&self) -> &Indexer {
        &self.indexer
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
