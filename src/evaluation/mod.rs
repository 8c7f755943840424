//! Offline evaluation of a [`PairScorer`] on a labelled pair dataset.
//!
//! A pair is predicted positive when its score is strictly above the threshold
//! (`0.5` by default). Ratios whose denominator is zero are reported as `0.0`.

pub mod dataset;
pub mod error;


pub use dataset::{
    FIRST_FILE, LABELS_FILE, PairDataset, PairExample, SECOND_FILE, TokenizeSummary,
    tokenize_dataset,
};
pub use error::EvalError;

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::constants::DEFAULT_MATCH_THRESHOLD;
use crate::matcher::PairScorer;

/// Binary confusion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Confusion {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl Confusion {
    pub fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn metrics(&self) -> EvalMetrics {
        let precision = ratio(self.true_positives, self.true_positives + self.false_positives);
        let recall = ratio(self.true_positives, self.true_positives + self.false_negatives);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        EvalMetrics {
            precision,
            recall,
            f1,
            accuracy: ratio(self.true_positives + self.true_negatives, self.total()),
            support: self.true_positives + self.false_negatives,
            confusion: *self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvalMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
    /// Number of positive labels.
    pub support: usize,
    pub confusion: Confusion,
}

impl std::fmt::Display for EvalMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Precision: {:.4}", self.precision)?;
        writeln!(f, "Recall: {:.4}", self.recall)?;
        writeln!(f, "F1 Score: {:.4}", self.f1)?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        write!(f, "Support: {}/{}", self.support, self.confusion.total())
    }
}

/// [`evaluate_with_threshold`] at the default threshold.
pub fn evaluate<S: PairScorer + ?Sized>(
    scorer: &S,
    dataset: &PairDataset,
) -> Result<EvalMetrics, EvalError> {
    evaluate_with_threshold(scorer, dataset, DEFAULT_MATCH_THRESHOLD)
}

/// Scores every pair and compares `score > threshold` with the label.
///
/// A scoring failure aborts the run.
pub fn evaluate_with_threshold<S: PairScorer + ?Sized>(
    scorer: &S,
    dataset: &PairDataset,
    threshold: f32,
) -> Result<EvalMetrics, EvalError> {
    if dataset.is_empty() {
        return Err(EvalError::Empty);
    }

    let started = Instant::now();
    let mut confusion = Confusion::default();

    for (index, example) in dataset.iter().enumerate() {
        let score = scorer
            .score(&example.first, &example.second)
            .map_err(|source| EvalError::Scoring { index, source })?;
        confusion.record(score > threshold, example.is_positive());

        if (index + 1) % 1000 == 0 {
            debug!(scored = index + 1, total = dataset.len(), "Evaluation progress");
        }
    }

    let metrics = confusion.metrics();
    info!(
        pairs = dataset.len(),
        scorer = scorer.mode(),
        threshold,
        precision = metrics.precision,
        recall = metrics.recall,
        f1 = metrics.f1,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Evaluation complete"
    );
    Ok(metrics)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
