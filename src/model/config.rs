use crate::constants::{
    DEFAULT_DROPOUT, DEFAULT_EMBEDDING_DIM, DEFAULT_HIDDEN_DIM, DEFAULT_MAX_SEQ_LEN,
    DEFAULT_VOCAB_SIZE, encoded_width, enriched_width, pooled_width,
};

use super::error::ModelError;

/// Parameter names, following the PyTorch module layout of the trained model.
pub mod names {
    pub const EMBEDDING: &str = "embedding";
    pub const INPUT_ENCODER: &str = "lstm1";
    pub const COMPOSITION_ENCODER: &str = "lstm2";
    pub const CLASSIFIER: &str = "fc";
    pub const CLASSIFIER_HIDDEN: &str = "0";
    pub const CLASSIFIER_OUTPUT: &str = "3";
}

#[derive(Debug, Clone, PartialEq)]
/// Dimensions of the sentence-pair model.
pub struct EsimConfig {
    /// Embedding table rows, padding row included.
    pub vocab_size: usize,
    /// Width of one embedding row.
    pub embedding_dim: usize,
    /// Hidden size of each LSTM direction.
    pub hidden_dim: usize,
    /// Fixed length of encoded sequences.
    pub max_seq_len: usize,
    /// Classifier dropout (training only).
    pub dropout: f32,
}

impl Default for EsimConfig {
    fn default() -> Self {
        Self {
            vocab_size: DEFAULT_VOCAB_SIZE,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            hidden_dim: DEFAULT_HIDDEN_DIM,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            dropout: DEFAULT_DROPOUT,
        }
    }
}

impl EsimConfig {
    pub fn new(vocab_size: usize, embedding_dim: usize, hidden_dim: usize) -> Self {
        Self {
            vocab_size,
            embedding_dim,
            hidden_dim,
            ..Default::default()
        }
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let dims = [
            ("vocab_size", self.vocab_size),
            ("embedding_dim", self.embedding_dim),
            ("hidden_dim", self.hidden_dim),
            ("max_seq_len", self.max_seq_len),
        ];
        if let Some((name, _)) = dims.iter().find(|(_, v)| *v == 0) {
            return Err(ModelError::InvalidConfig {
                reason: format!("{name} must be greater than zero"),
            });
        }

        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ModelError::InvalidConfig {
                reason: format!("dropout must be in [0, 1), got {}", self.dropout),
            });
        }

        Ok(())
    }

    /// Width of the contextual encoding (both directions).
    pub fn encoded_dim(&self) -> usize {
        encoded_width(self.hidden_dim)
    }

    /// Width of the alignment-enriched representation.
    pub fn enriched_dim(&self) -> usize {
        enriched_width(self.hidden_dim)
    }

    /// Width of the classifier input.
    pub fn pooled_dim(&self) -> usize {
        pooled_width(self.hidden_dim)
    }

    /// Every parameter the model reads, with its expected shape.
    pub fn expected_shapes(&self) -> Vec<(String, Vec<usize>)> {
        let h = self.hidden_dim;
        let mut shapes = vec![(
            format!("{}.weight", names::EMBEDDING),
            vec![self.vocab_size, self.embedding_dim],
        )];

        for (prefix, in_dim) in [
            (names::INPUT_ENCODER, self.embedding_dim),
            (names::COMPOSITION_ENCODER, self.enriched_dim()),
        ] {
            for suffix in ["", "_reverse"] {
                shapes.push((format!("{prefix}.weight_ih_l0{suffix}"), vec![4 * h, in_dim]));
                shapes.push((format!("{prefix}.weight_hh_l0{suffix}"), vec![4 * h, h]));
                shapes.push((format!("{prefix}.bias_ih_l0{suffix}"), vec![4 * h]));
                shapes.push((format!("{prefix}.bias_hh_l0{suffix}"), vec![4 * h]));
            }
        }

        let hidden = format!("{}.{}", names::CLASSIFIER, names::CLASSIFIER_HIDDEN);
        let output = format!("{}.{}", names::CLASSIFIER, names::CLASSIFIER_OUTPUT);
        shapes.push((format!("{hidden}.weight"), vec![h, self.pooled_dim()]));
        shapes.push((format!("{hidden}.bias"), vec![h]));
        shapes.push((format!("{output}.weight"), vec![1, h]));
        shapes.push((format!("{output}.bias"), vec![1]));

        shapes
    }
}
