//! Checkpoint loading.
//!
//! Two layouts are accepted for both safetensors and PyTorch pickles:
//! - a raw parameter snapshot (`embedding.weight`, `lstm1.weight_ih_l0`, ...)
//! - a wrapped snapshot whose parameters sit under [`WRAPPED_PARAMS_KEY`], next to
//!   training metadata such as `epoch` and `best_f1`.
//!
//! Inference only needs the parameters. Metadata is read when the format exposes it
//! (the safetensors `__metadata__` header) and is optional everywhere.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use safetensors::SafeTensors;
use tracing::{debug, info, warn};

use super::config::EsimConfig;
use super::error::ModelError;

/// Key of the parameter sub-object in a wrapped snapshot.
pub const WRAPPED_PARAMS_KEY: &str = "model_state_dict";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointFormat {
    SafeTensors,
    Pickle,
}

impl CheckpointFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "safetensors" => Some(Self::SafeTensors),
            "pth" | "pt" | "bin" => Some(Self::Pickle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Training metadata stored alongside the parameters.
pub struct CheckpointMetadata {
    pub epoch: Option<u64>,
    pub best_f1: Option<f64>,
}

impl CheckpointMetadata {
    fn from_header(header: &HashMap<String, String>) -> Self {
        Self {
            epoch: header.get("epoch").and_then(|v| v.trim().parse().ok()),
            best_f1: header.get("best_f1").and_then(|v| v.trim().parse().ok()),
        }
    }
}

/// Parameters of a trained model, keyed by PyTorch parameter name.
#[derive(Debug)]
pub struct Checkpoint {
    path: Option<PathBuf>,
    tensors: HashMap<String, Tensor>,
    metadata: CheckpointMetadata,
}

impl Checkpoint {
    /// Loads a checkpoint onto `device`, converting every tensor to f32.
    pub fn load(path: &Path, device: &Device) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::CheckpointNotFound {
                path: path.to_path_buf(),
            });
        }

        let format =
            CheckpointFormat::from_path(path).ok_or_else(|| ModelError::UnsupportedFormat {
                path: path.to_path_buf(),
            })?;

        let (tensors, metadata) = match format {
            CheckpointFormat::SafeTensors => {
                let bytes = std::fs::read(path)?;
                let tensors =
                    candle_core::safetensors::load_buffer(&bytes, device).map_err(|e| {
                        ModelError::LoadFailed {
                            reason: format!("{}: {}", path.display(), e),
                        }
                    })?;
                let metadata = match header_metadata(&bytes) {
                    Ok(header) => CheckpointMetadata::from_header(&header),
                    Err(e) => {
                        warn!(error = %e, "Ignoring unreadable checkpoint metadata");
                        CheckpointMetadata::default()
                    }
                };
                (unwrap_params(tensors), metadata)
            }
            CheckpointFormat::Pickle => (read_pickle(path)?, CheckpointMetadata::default()),
        };

        let tensors = tensors
            .into_iter()
            .map(|(name, t)| Ok((name, t.to_dtype(DType::F32)?.to_device(device)?)))
            .collect::<Result<HashMap<_, _>, candle_core::Error>>()?;

        if tensors.is_empty() {
            return Err(ModelError::LoadFailed {
                reason: format!("{} contains no tensors", path.display()),
            });
        }

        info!(
            path = %path.display(),
            tensors = tensors.len(),
            epoch = ?metadata.epoch,
            best_f1 = ?metadata.best_f1,
            "Checkpoint loaded"
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            tensors,
            metadata,
        })
    }

    /// Wraps in-memory tensors (raw or `model_state_dict.`-prefixed names).
    pub fn from_tensors(tensors: HashMap<String, Tensor>) -> Self {
        Self {
            path: None,
            tensors: unwrap_params(tensors),
            metadata: CheckpointMetadata::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn metadata(&self) -> &CheckpointMetadata {
        &self.metadata
    }

    pub fn tensor(&self, name: &str) -> Option<&Tensor> {
        self.tensors.get(name)
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Checks every parameter the model reads against `config`.
    ///
    /// Runs before any weights are bound so a mismatch never reaches inference.
    pub fn validate(&self, config: &EsimConfig) -> Result<(), ModelError> {
        for (name, expected) in config.expected_shapes() {
            let tensor = self
                .tensors
                .get(&name)
                .ok_or_else(|| ModelError::MissingTensor { name: name.clone() })?;

            let actual = tensor.dims().to_vec();
            if actual != expected {
                return Err(ModelError::ShapeMismatch {
                    name,
                    expected,
                    actual,
                });
            }
        }

        let unused = self
            .tensors
            .len()
            .saturating_sub(config.expected_shapes().len());
        if unused > 0 {
            debug!(unused, "Checkpoint carries tensors the model does not read");
        }
        Ok(())
    }

    /// Consumes the checkpoint into a [`VarBuilder`] for model construction.
    pub fn into_var_builder(self, device: &Device) -> VarBuilder<'static> {
        VarBuilder::from_tensors(self.tensors, DType::F32, device)
    }
}

/// Strips the [`WRAPPED_PARAMS_KEY`] prefix when present, dropping sibling entries.
fn unwrap_params(tensors: HashMap<String, Tensor>) -> HashMap<String, Tensor> {
    let prefix = format!("{WRAPPED_PARAMS_KEY}.");
    if !tensors.keys().any(|k| k.starts_with(&prefix)) {
        return tensors;
    }

    debug!("Unwrapping '{}' parameters", WRAPPED_PARAMS_KEY);
    tensors
        .into_iter()
        .filter_map(|(name, t)| name.strip_prefix(&prefix).map(|n| (n.to_string(), t)))
        .collect()
}

fn read_pickle(path: &Path) -> Result<HashMap<String, Tensor>, ModelError> {
    let wrapped = candle_core::pickle::read_all_with_key(path, Some(WRAPPED_PARAMS_KEY));
    let tensors = match wrapped {
        Ok(tensors) if !tensors.is_empty() => {
            debug!("Loaded wrapped state dict");
            tensors
        }
        Ok(_) | Err(_) => {
            debug!("No wrapped state dict, reading raw parameters");
            candle_core::pickle::read_all_with_key(path, None).map_err(|e| {
                ModelError::LoadFailed {
                    reason: format!("{}: {}", path.display(), e),
                }
            })?
        }
    };
    Ok(tensors.into_iter().collect())
}

/// Reads the string map stored under `__metadata__` in a safetensors file.
///
/// Returns an empty map when the header has no metadata.
pub fn read_safetensors_metadata(path: &Path) -> Result<HashMap<String, String>, ModelError> {
    header_metadata(&std::fs::read(path)?)
}

fn header_metadata(bytes: &[u8]) -> Result<HashMap<String, String>, ModelError> {
    let (_, metadata) = SafeTensors::read_metadata(bytes).map_err(|e| ModelError::LoadFailed {
        reason: format!("invalid safetensors header: {e}"),
    })?;
    Ok(metadata.metadata().clone().unwrap_or_default())
}
