//! Explicitly constructed model handle with a build lifecycle.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use super::checkpoint;
use super::config::{AttentionVariant, ModelConfig, PositionalEncoding};
use super::init::WeightInitializer;
use super::transformer::ModelWeights;
use super::update::ParameterUpdater;
use crate::errors::ModelError;
use crate::inference::{InferenceEngine, TextGenerator};
use crate::kernels::Activation;

/// Lifecycle of a [`ModelHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelState {
    Uninitialized,
    Building,
    Ready,
    Failed(String),
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelState::Uninitialized => f.write_str("uninitialized"),
            ModelState::Building => f.write_str("building"),
            ModelState::Ready => f.write_str("ready"),
            ModelState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Informational description of a built model.
#[derive(Debug, Clone, Serialize)]
pub struct ArchitectureInfo {
    pub model_type: &'static str,
    pub vocabulary_size: usize,
    pub embedding_dim: usize,
    pub hidden_layer_sizes: Vec<usize>,
    pub attention_heads: usize,
    pub head_dim: usize,
    pub transformer_layers: usize,
    pub feed_forward_dim: usize,
    pub max_sequence_length: usize,
    pub activation: Activation,
    pub positional_encoding: PositionalEncoding,
    pub attention: AttentionVariant,
    pub total_parameters: usize,
    pub memory_estimate_mb: f64,
}

/// Owns the model's weights once built. Engines created from the handle share
/// the weights read-only.
pub struct ModelHandle {
    config: ModelConfig,
    state: ModelState,
    weights: Option<Arc<ModelWeights>>,
    total_params: usize,
}

impl ModelHandle {
    /// Validate the config; the handle starts `Uninitialized`.
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        config.validate()?;
        Ok(Self {
            config,
            state: ModelState::Uninitialized,
            weights: None,
            total_params: 0,
        })
    }

    /// Wrap already-built weights (e.g. from a checkpoint); the handle is `Ready`.
    pub fn from_weights(weights: ModelWeights) -> Result<Self, ModelError> {
        weights.validate_shapes()?;
        let total_params = weights.parameter_count();
        Ok(Self {
            config: weights.config.clone(),
            state: ModelState::Ready,
            weights: Some(Arc::new(weights)),
            total_params,
        })
    }

    /// Load a JSON checkpoint written by [`ModelHandle::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        Self::from_weights(checkpoint::load_checkpoint(path)?)
    }

    /// Initialize all weights from `rng`. Building twice is an error.
    pub fn build<R: Rng>(&mut self, rng: R) -> Result<(), ModelError> {
        match self.state {
            ModelState::Uninitialized => {}
            ModelState::Ready => return Err(ModelError::AlreadyBuilt),
            ref other => return Err(ModelError::NotReady(other.to_string())),
        }
        self.state = ModelState::Building;
        info!(
            "Building model: {} layers, {} heads, embedding dim {}",
            self.config.transformer_layers, self.config.attention_heads, self.config.embedding_dim
        );

        match WeightInitializer::new(rng).build_weights(&self.config) {
            Ok(weights) => {
                self.total_params = weights.parameter_count();
                self.weights = Some(Arc::new(weights));
                self.state = ModelState::Ready;
                info!(
                    "Model ready: {} parameters, {:.1} MB",
                    self.total_params,
                    self.memory_estimate_mb()
                );
                Ok(())
            }
            Err(e) => {
                self.state = ModelState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Build from a fixed seed.
    pub fn build_seeded(&mut self, seed: u64) -> Result<(), ModelError> {
        self.build(StdRng::seed_from_u64(seed))
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ModelState::Ready
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Shared weights; `NotReady` until built.
    pub fn weights(&self) -> Result<&Arc<ModelWeights>, ModelError> {
        self.weights
            .as_ref()
            .ok_or_else(|| ModelError::NotReady(self.state.to_string()))
    }

    /// Forward engine over a snapshot of the current weights.
    pub fn engine(&self) -> Result<InferenceEngine, ModelError> {
        Ok(InferenceEngine::new(Arc::clone(self.weights()?)))
    }

    /// Generator over a snapshot of the current weights.
    pub fn generator(&self) -> Result<TextGenerator, ModelError> {
        Ok(TextGenerator::new(self.engine()?))
    }

    /// Total scalar parameter count (0 before build).
    pub fn parameter_count(&self) -> usize {
        self.total_params
    }

    /// `parameter_count * 8 bytes` in MiB.
    pub fn memory_estimate_mb(&self) -> f64 {
        (self.total_params * super::transformer::BYTES_PER_PARAMETER) as f64 / (1024.0 * 1024.0)
    }

    pub fn architecture(&self) -> ArchitectureInfo {
        let c = &self.config;
        ArchitectureInfo {
            model_type: "transformer-language-model",
            vocabulary_size: c.vocabulary_size,
            embedding_dim: c.embedding_dim,
            hidden_layer_sizes: c.hidden_layer_sizes.clone(),
            attention_heads: c.attention_heads,
            head_dim: c.head_dim(),
            transformer_layers: c.transformer_layers,
            feed_forward_dim: c.feed_forward_dim(),
            max_sequence_length: c.max_sequence_length,
            activation: c.activation,
            positional_encoding: c.positional_encoding,
            attention: c.attention,
            total_parameters: self.total_params,
            memory_estimate_mb: self.memory_estimate_mb(),
        }
    }

    /// Run an update against a copy of the weights and publish it if its shapes
    /// still validate. Engines created earlier keep reading their snapshot.
    pub fn apply_update(&mut self, updater: &mut dyn ParameterUpdater) -> anyhow::Result<()> {
        let current = self.weights()?;
        let mut next = ModelWeights::clone(current);
        updater.update(&mut next)?;
        next.validate_shapes()?;
        self.weights = Some(Arc::new(next));
        Ok(())
    }

    /// Write a JSON checkpoint of every weight.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        checkpoint::save_checkpoint(self.weights()?, path)
    }
}

/// Validate `config` and build it, from `seed` or from entropy.
pub fn build_model(config: ModelConfig, seed: Option<u64>) -> Result<ModelHandle, ModelError> {
    let mut handle = ModelHandle::new(config)?;
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    handle.build(rng)?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_config() -> ModelConfig {
        ModelConfig {
            vocabulary_size: 10,
            embedding_dim: 8,
            hidden_layer_sizes: vec![],
            attention_heads: 2,
            transformer_layers: 1,
            max_sequence_length: 4,
            ..Default::default()
        }
    }

    #[test]
    fn lifecycle_uninitialized_to_ready() {
        let mut handle = ModelHandle::new(tiny_config()).unwrap();
        assert_eq!(handle.state(), &ModelState::Uninitialized);
        assert!(matches!(handle.engine(), Err(ModelError::NotReady(_))));
        handle.build_seeded(3).unwrap();
        assert!(handle.is_ready());
        assert!(handle.engine().is_ok());
    }

    #[test]
    fn second_build_is_rejected() {
        let mut handle = build_model(tiny_config(), Some(1)).unwrap();
        let before = handle.parameter_count();
        assert!(matches!(handle.build_seeded(1), Err(ModelError::AlreadyBuilt)));
        assert_eq!(handle.parameter_count(), before);
    }

    #[test]
    fn invalid_config_fails_before_build() {
        let config = ModelConfig {
            attention_heads: 3,
            ..tiny_config()
        };
        assert!(matches!(
            ModelHandle::new(config),
            Err(ModelError::InvalidConfig { .. })
        ));

        let oversized = ModelConfig {
            embedding_dim: usize::MAX / 2 - 1,
            attention_heads: 1,
            ..tiny_config()
        };
        assert!(matches!(
            ModelHandle::new(oversized),
            Err(ModelError::InvalidConfig { field: "model", .. })
        ));
    }

    #[test]
    fn parameter_count_sums_every_tensor() {
        let handle = build_model(tiny_config(), Some(5)).unwrap();
        let (v, d, s) = (10, 8, 4);
        let block = 4 * d * d + (d * 4 * d + 4 * d) + (4 * d * d + d) + 4 * d;
        let expected = v * d + s * d + block + (d * v + v);
        assert_eq!(handle.parameter_count(), expected);
        let mb = expected as f64 * 8.0 / (1024.0 * 1024.0);
        assert!((handle.memory_estimate_mb() - mb).abs() < 1e-12);
        assert_eq!(handle.architecture().total_parameters, expected);
    }
}
