//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants from primary ones to avoid drift.
//!
//! # Dimension Invariants
//!
//! The model dimensions below are the defaults of the reference address model. Runtime
//! configuration goes through [`EsimConfig`](crate::model::EsimConfig); a checkpoint whose
//! tensors disagree with the configured dimensions is rejected before any inference.

/// Reserved id for padding and for words missing from the vocabulary.
pub const PAD_ID: u32 = 0;

/// Fixed length of every encoded sequence.
pub const DEFAULT_MAX_SEQ_LEN: usize = 128;

/// Embedding table rows of the reference model (vocabulary words + padding row).
pub const DEFAULT_VOCAB_SIZE: usize = 44_018;

/// Width of one embedding row (word2vec 100 + GloVe 100).
pub const DEFAULT_EMBEDDING_DIM: usize = 200;

/// Hidden size of each LSTM direction.
pub const DEFAULT_HIDDEN_DIM: usize = 128;

/// Dropout applied inside the classifier head during training.
pub const DEFAULT_DROPOUT: f32 = 0.5;

/// Score above which a pair is counted as a match during evaluation.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.5;

/// Upper bound for a single catalog scan issued from the HTTP surface.
pub const DEFAULT_MATCH_TIMEOUT_SECS: u64 = 30;

/// Bidirectional encoding doubles the per-direction width.
pub const fn encoded_width(hidden_dim: usize) -> usize {
    hidden_dim * 2
}

/// `[x, aligned, x - aligned, x * aligned]` per position.
pub const fn enriched_width(hidden_dim: usize) -> usize {
    encoded_width(hidden_dim) * 4
}

/// `[max_a, mean_a, max_b, mean_b]` after the composition encoder.
pub const fn pooled_width(hidden_dim: usize) -> usize {
    encoded_width(hidden_dim) * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_widths() {
        assert_eq!(encoded_width(DEFAULT_HIDDEN_DIM), 256);
        assert_eq!(enriched_width(DEFAULT_HIDDEN_DIM), 1024);
        assert_eq!(pooled_width(DEFAULT_HIDDEN_DIM), 1024);
    }

    #[test]
    fn test_pad_id_is_zero() {
        assert_eq!(PAD_ID, 0);
    }
}
