//! Small ready-built models for demos, tests and benchmarks.

use super::config::ModelConfig;
use super::handle::{build_model, ModelHandle};
use crate::errors::ModelError;

/// Config of the demo model for a vocabulary of `vocab_size` tokens.
pub fn demo_config(vocab_size: usize) -> ModelConfig {
    ModelConfig {
        vocabulary_size: vocab_size,
        embedding_dim: 32,
        hidden_layer_sizes: vec![64],
        attention_heads: 4,
        transformer_layers: 2,
        max_sequence_length: 64,
        ..Default::default()
    }
}

/// Demo model with random weights.
pub fn create_demo_model(vocab_size: usize) -> Result<ModelHandle, ModelError> {
    build_model(demo_config(vocab_size), None)
}

/// Deterministic demo model from a seed (for tests and golden outputs).
pub fn create_demo_model_seeded(vocab_size: usize, seed: u64) -> Result<ModelHandle, ModelError> {
    build_model(demo_config(vocab_size), Some(seed))
}
