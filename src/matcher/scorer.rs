use crate::model::ModelError;
use crate::tokenize::EncodedSequence;

/// Scores one `(query, candidate)` pair.
///
/// Implementations must be pure with respect to their inputs so repeated scans
/// of the same catalog return the same result.
pub trait PairScorer: Send + Sync {
    fn score(&self, query: &EncodedSequence, candidate: &EncodedSequence)
    -> Result<f32, ModelError>;

    /// Name reported by readiness checks.
    fn mode(&self) -> &'static str;
}

/// Deterministic scorer for tests and model-free demos.
///
/// Rewards a shared leading run of known ids most, then any other shared known ids.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct MockScorer;

#[cfg(any(test, feature = "mock"))]
impl PairScorer for MockScorer {
    fn score(
        &self,
        query: &EncodedSequence,
        candidate: &EncodedSequence,
    ) -> Result<f32, ModelError> {
        use crate::constants::PAD_ID;

        let prefix = query
            .ids()
            .iter()
            .zip(candidate.ids())
            .take_while(|(q, c)| q == c && **q != PAD_ID)
            .count();

        let shared = query
            .ids()
            .iter()
            .filter(|&&id| id != PAD_ID && candidate.ids().contains(&id))
            .count();

        let raw = 2.0 * prefix as f32 + shared as f32;
        Ok(raw / (raw + 1.0))
    }

    fn mode(&self) -> &'static str {
        "mock"
    }
}
