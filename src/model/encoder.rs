use candle_core::{D, Result, Tensor};
use candle_nn::rnn::{Direction, LSTM, LSTMConfig, RNN, lstm};
use candle_nn::{Embedding, Module, VarBuilder, embedding};

/// Bidirectional single-layer LSTM over `(batch, seq, features)` input.
///
/// Weights use the PyTorch naming (`weight_ih_l0`, `weight_ih_l0_reverse`, ...).
#[derive(Debug, Clone)]
pub struct BiLstm {
    forward: LSTM,
    backward: LSTM,
}

impl BiLstm {
    pub fn new(in_dim: usize, hidden_dim: usize, vb: VarBuilder) -> Result<Self> {
        let forward = lstm(in_dim, hidden_dim, LSTMConfig::default(), vb.clone())?;
        let backward = lstm(
            in_dim,
            hidden_dim,
            LSTMConfig {
                direction: Direction::Backward,
                ..Default::default()
            },
            vb,
        )?;
        Ok(Self { forward, backward })
    }

    /// `(batch, seq, in_dim)` → `(batch, seq, 2 * hidden_dim)`.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let fwd_states = self.forward.seq(xs)?;
        let fwd = self.forward.states_to_tensor(&fwd_states)?;

        let reversed = reverse_time(xs)?;
        let bwd_states = self.backward.seq(&reversed)?;
        let bwd = reverse_time(&self.backward.states_to_tensor(&bwd_states)?)?;

        Tensor::cat(&[&fwd, &bwd], D::Minus1)
    }
}

/// Flips the sequence axis (dim 1).
pub(crate) fn reverse_time(xs: &Tensor) -> Result<Tensor> {
    let len = xs.dim(1)?;
    let order: Vec<u32> = (0..len as u32).rev().collect();
    let order = Tensor::new(order.as_slice(), xs.device())?;
    xs.index_select(&order, 1)
}

/// Embedding lookup followed by the input BiLSTM.
///
/// One instance encodes both sentences of a pair.
#[derive(Debug, Clone)]
pub struct SequenceEncoder {
    embedding: Embedding,
    lstm: BiLstm,
}

impl SequenceEncoder {
    pub fn new(
        vocab_size: usize,
        embedding_dim: usize,
        hidden_dim: usize,
        embedding_vb: VarBuilder,
        lstm_vb: VarBuilder,
    ) -> Result<Self> {
        let embedding = embedding(vocab_size, embedding_dim, embedding_vb)?;
        let lstm = BiLstm::new(embedding_dim, hidden_dim, lstm_vb)?;
        Ok(Self { embedding, lstm })
    }

    /// `(batch, seq)` ids → `(batch, seq, 2 * hidden_dim)`.
    pub fn forward(&self, ids: &Tensor) -> Result<Tensor> {
        let embedded = self.embedding.forward(ids)?;
        self.lstm.forward(&embedded)
    }

    pub fn embeddings(&self) -> &Tensor {
        self.embedding.embeddings()
    }
}
