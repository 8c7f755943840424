//! Best-match search over a catalog.
//!
//! A linear scan: every candidate is encoded like the query and scored by a
//! [`PairScorer`]. The first candidate to reach the maximum score wins, so ties
//! resolve to the earlier catalog position. There is no caching, pruning or early
//! exit; cost is `O(N)` model calls.
//!
//! A candidate that fails to encode or score is skipped with a warning and the scan
//! continues.

pub mod error;
pub mod scorer;
pub mod types;


pub use error::MatchError;
#[cfg(any(test, feature = "mock"))]
pub use scorer::MockScorer;
pub use scorer::PairScorer;
pub use types::{BestMatch, MatchOutcome, ScoredCandidate};

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::tokenize::{EncodedSequence, Indexer};

/// Scans a catalog for the best match of a query.
pub struct Matcher<'a, S: PairScorer + ?Sized> {
    indexer: &'a Indexer,
    scorer: &'a S,
}

impl<'a, S: PairScorer + ?Sized> Matcher<'a, S> {
    pub fn new(indexer: &'a Indexer, scorer: &'a S) -> Self {
        Self { indexer, scorer }
    }

    /// Returns the highest-scoring candidate, [`MatchOutcome::NoMatch`] for an empty
    /// catalog, or [`MatchOutcome::EmptyInput`] for a blank query.
    pub fn best_match(&self, query: &str, catalog: &Catalog) -> Result<MatchOutcome, MatchError> {
        self.scan(query, catalog, None)
    }

    /// Like [`Matcher::best_match`], but stops with [`MatchError::Cancelled`] once
    /// `cancel` is set. The flag is checked before each candidate.
    pub fn best_match_cancellable(
        &self,
        query: &str,
        catalog: &Catalog,
        cancel: &AtomicBool,
    ) -> Result<MatchOutcome, MatchError> {
        self.scan(query, catalog, Some(cancel))
    }

    /// Scores every candidate and returns the `top_n` best, highest first.
    ///
    /// Equal scores keep catalog order.
    pub fn rank(
        &self,
        query: &str,
        catalog: &Catalog,
        top_n: usize,
    ) -> Result<Vec<ScoredCandidate>, MatchError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let query_ids = self.indexer.encode(query)?;

        let mut scored: Vec<ScoredCandidate> = catalog
            .iter()
            .enumerate()
            .filter_map(|(position, candidate)| {
                match self.score_candidate(&query_ids, candidate) {
                    Ok(score) => Some(ScoredCandidate {
                        candidate: candidate.to_string(),
                        score,
                        position,
                    }),
                    Err(e) => {
                        warn!(position, error = %e, "Skipping candidate");
                        None
                    }
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_n);
        Ok(scored)
    }

    fn scan(
        &self,
        query: &str,
        catalog: &Catalog,
        cancel: Option<&AtomicBool>,
    ) -> Result<MatchOutcome, MatchError> {
        if query.trim().is_empty() {
            debug!("Empty query, skipping model");
            return Ok(MatchOutcome::EmptyInput);
        }

        if catalog.is_empty() {
            info!("Catalog has no candidates");
            return Ok(MatchOutcome::NoMatch);
        }

        let query_ids = self.indexer.encode(query)?;
        debug!(
            query_len = query.len(),
            known_tokens = query_ids.non_padding(),
            candidates = catalog.len(),
            scorer = self.scorer.mode(),
            "Starting catalog scan"
        );

        let mut best: Option<BestMatch> = None;
        let mut failed = 0usize;
        let mut last_error = None;

        for (position, candidate) in catalog.iter().enumerate() {
            // Acquire pairs with the Release store of whoever raises the flag.
            if cancel.is_some_and(|flag| flag.load(Ordering::Acquire)) {
                warn!(scanned = position, "Catalog scan cancelled");
                return Err(MatchError::Cancelled { scanned: position });
            }

            let score = match self.score_candidate(&query_ids, candidate) {
                Ok(score) => score,
                Err(e) => {
                    warn!(position, error = %e, "Skipping candidate");
                    failed += 1;
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            let best_score = best.as_ref().map_or(f32::NEG_INFINITY, |b| b.score);
            if score > best_score {
                best = Some(BestMatch {
                    candidate: candidate.to_string(),
                    score,
                    position,
                });
            }
        }

        match best {
            Some(best) => {
                info!(
                    score = best.score,
                    position = best.position,
                    skipped = failed,
                    "Best match selected"
                );
                Ok(MatchOutcome::Match(best))
            }
            None if failed > 0 => Err(MatchError::AllCandidatesFailed {
                failed,
                last_error: last_error.unwrap_or_default(),
            }),
            None => Ok(MatchOutcome::NoMatch),
        }
    }

    fn score_candidate(
        &self,
        query_ids: &EncodedSequence,
        candidate: &str,
    ) -> Result<f32, MatchError> {
        let candidate_ids = self.indexer.encode(candidate)?;
        let score = self.scorer.score(query_ids, &candidate_ids)?;
        debug!(candidate_len = candidate.len(), score, "Scored candidate");
        Ok(score)
    }
}
