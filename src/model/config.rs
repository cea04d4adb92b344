//! Model configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::kernels::Activation;

/// How position information is added to token embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionalEncoding {
    /// Randomly initialized table, same init as every other weight matrix.
    #[default]
    Learned,
    /// Fixed sin/cos table.
    Sinusoidal,
}

/// Which self-attention computation each block runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionVariant {
    /// Multi-head causal scaled dot-product attention followed by the output projection.
    #[default]
    ScaledDotProduct,
    /// The value projection is passed through as the attention output.
    ValueOnly,
}

/// Configuration for a transformer language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of rows in the token embedding table and width of the logits.
    pub vocabulary_size: usize,
    /// Width of every hidden state.
    pub embedding_dim: usize,
    /// Dense layers between the last block and the language-model head.
    pub hidden_layer_sizes: Vec<usize>,
    /// Number of attention heads; must divide `embedding_dim`.
    pub attention_heads: usize,
    /// Number of transformer blocks.
    pub transformer_layers: usize,
    /// Rows in the positional table; hard cap on sequence length during generation.
    pub max_sequence_length: usize,
    /// Not used at inference.
    pub dropout_rate: f64,
    /// Not used at inference.
    pub learning_rate: f64,
    pub activation: Activation,
    pub positional_encoding: PositionalEncoding,
    pub attention: AttentionVariant,
    /// Added to the variance before the square root in layer norm.
    pub layer_norm_eps: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vocabulary_size: 1_024,
            embedding_dim: 128,
            hidden_layer_sizes: vec![256],
            attention_heads: 8,
            transformer_layers: 4,
            max_sequence_length: 256,
            dropout_rate: 0.1,
            learning_rate: 1e-4,
            activation: Activation::Gelu,
            positional_encoding: PositionalEncoding::Learned,
            attention: AttentionVariant::ScaledDotProduct,
            layer_norm_eps: 1e-5,
        }
    }
}

impl ModelConfig {
    /// Width of one attention head.
    pub fn head_dim(&self) -> usize {
        self.embedding_dim / self.attention_heads.max(1)
    }

    /// Inner width of the feed-forward sublayer.
    pub fn feed_forward_dim(&self) -> usize {
        self.embedding_dim.saturating_mul(4)
    }

    /// Input width of the language-model head.
    pub fn head_input_dim(&self) -> usize {
        self.hidden_layer_sizes
            .last()
            .copied()
            .unwrap_or(self.embedding_dim)
    }

    /// Check every dimension and range; fails on the first violation.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.vocabulary_size == 0 {
            return Err(ModelError::config("vocabulary_size", "must be positive"));
        }
        if self.embedding_dim == 0 {
            return Err(ModelError::config("embedding_dim", "must be positive"));
        }
        if self.attention_heads == 0 {
            return Err(ModelError::config("attention_heads", "must be positive"));
        }
        if self.embedding_dim % self.attention_heads != 0 {
            return Err(ModelError::config(
                "embedding_dim",
                format!(
                    "{} is not divisible by attention_heads {}",
                    self.embedding_dim, self.attention_heads
                ),
            ));
        }
        if self.transformer_layers == 0 {
            return Err(ModelError::config("transformer_layers", "must be positive"));
        }
        if self.max_sequence_length == 0 {
            return Err(ModelError::config("max_sequence_length", "must be positive"));
        }
        if let Some(i) = self.hidden_layer_sizes.iter().position(|&s| s == 0) {
            return Err(ModelError::config(
                "hidden_layer_sizes",
                format!("entry {i} must be positive"),
            ));
        }
        if !(0.0..1.0).contains(&self.dropout_rate) {
            return Err(ModelError::config(
                "dropout_rate",
                format!("{} is outside [0, 1)", self.dropout_rate),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelError::config(
                "learning_rate",
                format!("{} must be positive and finite", self.learning_rate),
            ));
        }
        if !(self.layer_norm_eps.is_finite() && self.layer_norm_eps > 0.0) {
            return Err(ModelError::config(
                "layer_norm_eps",
                format!("{} must be positive and finite", self.layer_norm_eps),
            ));
        }
        if self.checked_parameter_bytes().is_none() {
            return Err(ModelError::config("model", "parameter count overflows usize"));
        }
        Ok(())
    }

    /// Bytes of every tensor the config implies, `None` on overflow.
    fn checked_parameter_bytes(&self) -> Option<usize> {
        let d = self.embedding_dim;
        let ffn = d.checked_mul(4)?;
        let dense = |rows: usize, cols: usize| rows.checked_mul(cols)?.checked_add(cols);

        let attention = d.checked_mul(d)?.checked_mul(4)?;
        let norms = d.checked_mul(4)?;
        let block = attention
            .checked_add(dense(d, ffn)?)?
            .checked_add(dense(ffn, d)?)?
            .checked_add(norms)?;

        let mut total = self
            .vocabulary_size
            .checked_mul(d)?
            .checked_add(self.max_sequence_length.checked_mul(d)?)?
            .checked_add(block.checked_mul(self.transformer_layers)?)?;
        let mut width = d;
        for &size in &self.hidden_layer_sizes {
            total = total.checked_add(dense(width, size)?)?;
            width = size;
        }
        total = total.checked_add(dense(width, self.vocabulary_size)?)?;
        total.checked_mul(std::mem::size_of::<f64>())
    }

    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: ModelConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ModelError) -> &'static str {
        match err {
            ModelError::InvalidConfig { field, .. } => field,
            other => panic!("expected InvalidConfig, got {other}"),
        }
    }

    #[test]
    fn default_is_valid() {
        ModelConfig::default().validate().unwrap();
    }

    #[test]
    fn heads_must_divide_embedding_dim() {
        let config = ModelConfig {
            embedding_dim: 10,
            attention_heads: 4,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "embedding_dim");
    }

    #[test]
    fn zero_vocabulary_rejected() {
        let config = ModelConfig {
            vocabulary_size: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "vocabulary_size");
    }

    #[test]
    fn zero_hidden_layer_rejected() {
        let config = ModelConfig {
            hidden_layer_sizes: vec![16, 0],
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "hidden_layer_sizes");
    }

    #[test]
    fn dropout_range_checked() {
        let config = ModelConfig {
            dropout_rate: 1.0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "dropout_rate");
    }

    #[test]
    fn oversized_dims_rejected() {
        let config = ModelConfig {
            embedding_dim: usize::MAX / 2 - 1,
            attention_heads: 1,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "model");

        let config = ModelConfig {
            vocabulary_size: usize::MAX / 64,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "model");
    }

    #[test]
    fn derived_dims() {
        let config = ModelConfig {
            embedding_dim: 8,
            attention_heads: 2,
            hidden_layer_sizes: vec![],
            ..Default::default()
        };
        assert_eq!(config.head_dim(), 4);
        assert_eq!(config.feed_forward_dim(), 32);
        assert_eq!(config.head_input_dim(), 8);
    }

    #[test]
    fn json_missing_fields_use_defaults() {
        let config: ModelConfig =
            serde_json::from_str(r#"{"vocabulary_size": 12, "activation": "relu"}"#).unwrap();
        assert_eq!(config.vocabulary_size, 12);
        assert_eq!(config.activation, Activation::Relu);
        assert_eq!(config.embedding_dim, ModelConfig::default().embedding_dim);
    }
}
