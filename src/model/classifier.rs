use candle_core::{Result, Tensor};
use candle_nn::{Dropout, Linear, Module, VarBuilder, linear, ops::sigmoid};

use super::config::names;

/// `Linear → ReLU → Dropout → Linear → sigmoid`.
#[derive(Debug, Clone)]
pub struct ClassifierHead {
    hidden: Linear,
    dropout: Dropout,
    output: Linear,
}

impl ClassifierHead {
    pub fn new(in_dim: usize, hidden_dim: usize, dropout: f32, vb: VarBuilder) -> Result<Self> {
        let hidden = linear(in_dim, hidden_dim, vb.pp(names::CLASSIFIER_HIDDEN))?;
        let output = linear(hidden_dim, 1, vb.pp(names::CLASSIFIER_OUTPUT))?;
        Ok(Self {
            hidden,
            dropout: Dropout::new(dropout),
            output,
        })
    }

    /// `(batch, in_dim)` → `(batch, 1)` scores in `[0, 1]`.
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let xs = self.hidden.forward(xs)?.relu()?;
        let xs = self.dropout.forward(&xs, train)?;
        sigmoid(&self.output.forward(&xs)?)
    }
}
