//! Attention-based sentence-pair model (ESIM).
//!
//! Forward pass for a pair `(a, b)` of id sequences:
//!
//! 1. [`SequenceEncoder`]: embedding lookup + BiLSTM, shared by both sentences.
//! 2. [`soft_align`]: dot-product affinity, row/column softmax, aligned counterparts.
//! 3. [`enrich`]: `[x, x̃, x - x̃, x * x̃]` per position.
//! 4. Composition BiLSTM (separate weights, shared by both sentences) + [`pool_pair`].
//! 5. [`ClassifierHead`]: MLP ending in a sigmoid, one score per pair.
//!
//! Inference is synchronous and holds no interior state, so a loaded model can be
//! shared across threads behind an `Arc`.

pub mod alignment;
pub mod checkpoint;
pub mod classifier;
pub mod config;
pub mod device;
pub mod encoder;
pub mod error;
pub mod pooling;

#[cfg(test)]
mod tests;

pub use alignment::{Alignment, enrich, soft_align};
pub use checkpoint::{
    Checkpoint, CheckpointFormat, CheckpointMetadata, WRAPPED_PARAMS_KEY,
    read_safetensors_metadata,
};
pub use classifier::ClassifierHead;
pub use config::{EsimConfig, names};
pub use device::select_device;
pub use encoder::{BiLstm, SequenceEncoder};
pub use error::ModelError;
pub use pooling::{max_mean_pool, pool_pair};

use std::path::Path;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use tracing::{debug, info};

use crate::matcher::PairScorer;
use crate::tokenize::EncodedSequence;
use crate::vocab::Vocabulary;

pub struct EsimModel {
    config: EsimConfig,
    encoder: SequenceEncoder,
    composition: BiLstm,
    classifier: ClassifierHead,
    device: Device,
}

impl std::fmt::Debug for EsimModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsimModel")
            .field("config", &self.config)
            .field("device", &format!("{:?}", self.device))
            .finish()
    }
}

impl EsimModel {
    /// Builds the model from a [`VarBuilder`] (checkpoint tensors or a fresh `VarMap`).
    pub fn new(config: EsimConfig, vb: VarBuilder) -> Result<Self, ModelError> {
        config.validate()?;
        let device = vb.device().clone();

        let encoder = SequenceEncoder::new(
            config.vocab_size,
            config.embedding_dim,
            config.hidden_dim,
            vb.pp(names::EMBEDDING),
            vb.pp(names::INPUT_ENCODER),
        )
        .map_err(|e| load_failed("input encoder", e))?;

        let composition = BiLstm::new(
            config.enriched_dim(),
            config.hidden_dim,
            vb.pp(names::COMPOSITION_ENCODER),
        )
        .map_err(|e| load_failed("composition encoder", e))?;

        let classifier = ClassifierHead::new(
            config.pooled_dim(),
            config.hidden_dim,
            config.dropout,
            vb.pp(names::CLASSIFIER),
        )
        .map_err(|e| load_failed("classifier", e))?;

        Ok(Self {
            config,
            encoder,
            composition,
            classifier,
            device,
        })
    }

    /// Validates the checkpoint against `config`, then binds its weights.
    pub fn from_checkpoint(
        checkpoint: Checkpoint,
        config: EsimConfig,
        device: &Device,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        checkpoint.validate(&config)?;
        Self::new(config, checkpoint.into_var_builder(device))
    }

    /// Loads weights from a `.safetensors` or PyTorch checkpoint file.
    pub fn load(path: &Path, config: EsimConfig, device: &Device) -> Result<Self, ModelError> {
        let checkpoint = Checkpoint::load(path, device)?;
        let model = Self::from_checkpoint(checkpoint, config, device)?;

        info!(
            path = %path.display(),
            vocab_size = model.config.vocab_size,
            embedding_dim = model.config.embedding_dim,
            hidden_dim = model.config.hidden_dim,
            "Address model ready"
        );
        Ok(model)
    }

    /// Fails when the vocabulary references ids beyond the embedding table.
    pub fn check_vocabulary(&self, vocab: &Vocabulary) -> Result<(), ModelError> {
        if vocab.embedding_rows() > self.config.vocab_size {
            return Err(ModelError::VocabularyExceedsEmbedding {
                max_id: vocab.max_id(),
                rows: self.config.vocab_size,
            });
        }
        Ok(())
    }

    /// `(batch, La)` and `(batch, Lb)` ids → `(batch, 1)` scores.
    pub fn forward_t(
        &self,
        a_ids: &Tensor,
        b_ids: &Tensor,
        train: bool,
    ) -> candle_core::Result<Tensor> {
        let a = self.encoder.forward(a_ids)?;
        let b = self.encoder.forward(b_ids)?;

        let aligned = soft_align(&a, &b)?;
        let a_enriched = enrich(&a, &aligned.a_aligned)?;
        let b_enriched = enrich(&b, &aligned.b_aligned)?;

        let a_composed = self.composition.forward(&a_enriched)?;
        let b_composed = self.composition.forward(&b_enriched)?;

        let pooled = pool_pair(&a_composed, &b_composed)?;
        self.classifier.forward_t(&pooled, train)
    }

    pub fn forward(&self, a_ids: &Tensor, b_ids: &Tensor) -> candle_core::Result<Tensor> {
        self.forward_t(a_ids, b_ids, false)
    }

    /// Alignment of the contextual encodings of a pair, for inspection.
    pub fn align(&self, a: &EncodedSequence, b: &EncodedSequence) -> Result<Alignment, ModelError> {
        let a = self.encoder.forward(&a.to_tensor(&self.device)?)?;
        let b = self.encoder.forward(&b.to_tensor(&self.device)?)?;
        Ok(soft_align(&a, &b)?)
    }

    /// Similarity of one pair in `[0, 1]`.
    pub fn score(&self, a: &EncodedSequence, b: &EncodedSequence) -> Result<f32, ModelError> {
        let a_ids = a.to_tensor(&self.device)?;
        let b_ids = b.to_tensor(&self.device)?;

        let scores = self.forward(&a_ids, &b_ids)?.flatten_all()?.to_vec1::<f32>()?;
        let score = scores.first().copied().ok_or_else(|| ModelError::InferenceFailed {
            reason: "model produced no output".to_string(),
        })?;

        debug!(score, "Scored pair");
        Ok(score)
    }

    pub fn config(&self) -> &EsimConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl PairScorer for EsimModel {
    fn score(
        &self,
        query: &EncodedSequence,
        candidate: &EncodedSequence,
    ) -> Result<f32, ModelError> {
        EsimModel::score(self, query, candidate)
    }

    fn mode(&self) -> &'static str {
        "esim"
    }
}

fn load_failed(part: &str, err: candle_core::Error) -> ModelError {
    ModelError::LoadFailed {
        reason: format!("failed to build {part}: {err}"),
    }
}
