//! Weight containers for the transformer language model.
//!
//! All weight matrices are stored `[in_features, out_features]` so a layer is
//! applied as `x @ W (+ b)` with `x` holding one token per row.

use serde::{Deserialize, Serialize};

use super::config::ModelConfig;
use crate::errors::ModelError;
use crate::kernels::Matrix;

/// Bytes per stored scalar, used for the memory estimate.
pub const BYTES_PER_PARAMETER: usize = std::mem::size_of::<f64>();

/// Token and position tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embeddings {
    /// `[vocabulary_size, embedding_dim]`; row `i` embeds token id `i`.
    pub tokens: Matrix,
    /// `[max_sequence_length, embedding_dim]`.
    pub positions: Matrix,
}

/// Query/key/value/output projections, each `[embedding_dim, embedding_dim]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionWeights {
    pub query: Matrix,
    pub key: Matrix,
    pub value: Matrix,
    pub output: Matrix,
}

/// Dense layer: weight `[in, out]` plus bias `[out]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weight: Matrix,
    pub bias: Vec<f64>,
}

impl DenseLayer {
    pub fn in_features(&self) -> usize {
        self.weight.rows()
    }

    pub fn out_features(&self) -> usize {
        self.weight.cols()
    }

    pub fn parameter_count(&self) -> usize {
        self.weight.len() + self.bias.len()
    }

    fn validate(&self, context: &str, in_features: usize, out_features: usize) -> Result<(), ModelError> {
        self.weight
            .expect_shape(&format!("{context} weight"), in_features, out_features)?;
        expect_len(&format!("{context} bias"), &self.bias, out_features)
    }
}

/// Layer-norm scale (`gamma`) and shift (`beta`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerNormParams {
    pub gamma: Vec<f64>,
    pub beta: Vec<f64>,
}

impl LayerNormParams {
    /// Identity transform: `gamma = 1`, `beta = 0`.
    pub fn identity(dim: usize) -> Self {
        Self {
            gamma: vec![1.0; dim],
            beta: vec![0.0; dim],
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.gamma.len() + self.beta.len()
    }
}

/// Feed-forward sublayer: `embedding_dim -> 4 * embedding_dim -> embedding_dim`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedForwardWeights {
    pub up: DenseLayer,
    pub down: DenseLayer,
}

/// One transformer block: attention, add & norm, feed-forward, add & norm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformerBlock {
    pub attention: AttentionWeights,
    pub feed_forward: FeedForwardWeights,
    pub norm1: LayerNormParams,
    pub norm2: LayerNormParams,
}

impl TransformerBlock {
    pub fn parameter_count(&self) -> usize {
        self.attention.query.len()
            + self.attention.key.len()
            + self.attention.value.len()
            + self.attention.output.len()
            + self.feed_forward.up.parameter_count()
            + self.feed_forward.down.parameter_count()
            + self.norm1.parameter_count()
            + self.norm2.parameter_count()
    }
}

/// Dense hidden stack plus the language-model head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputHead {
    pub hidden: Vec<DenseLayer>,
    /// `[head_input_dim, vocabulary_size]` plus `[vocabulary_size]` bias.
    pub lm_head: DenseLayer,
}

/// Every weight of one model instance. Shapes are fixed for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelWeights {
    pub config: ModelConfig,
    pub embeddings: Embeddings,
    pub blocks: Vec<TransformerBlock>,
    pub output: OutputHead,
}

impl ModelWeights {
    pub fn vocab_size(&self) -> usize {
        self.config.vocabulary_size
    }

    pub fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    pub fn num_layers(&self) -> usize {
        self.blocks.len()
    }

    /// Scalars across all matrices (`rows * cols`) and vectors (length).
    pub fn parameter_count(&self) -> usize {
        let embeddings = self.embeddings.tokens.len() + self.embeddings.positions.len();
        let blocks: usize = self.blocks.iter().map(TransformerBlock::parameter_count).sum();
        let hidden: usize = self.output.hidden.iter().map(DenseLayer::parameter_count).sum();
        embeddings + blocks + hidden + self.output.lm_head.parameter_count()
    }

    /// `parameter_count * 8 bytes`, in MiB.
    pub fn memory_estimate_mb(&self) -> f64 {
        (self.parameter_count() * BYTES_PER_PARAMETER) as f64 / (1024.0 * 1024.0)
    }

    /// Check every tensor against the shapes the config implies.
    pub fn validate_shapes(&self) -> Result<(), ModelError> {
        let c = &self.config;
        c.validate()?;
        let d = c.embedding_dim;
        self.embeddings
            .tokens
            .expect_shape("token embeddings", c.vocabulary_size, d)?;
        self.embeddings
            .positions
            .expect_shape("position embeddings", c.max_sequence_length, d)?;

        if self.blocks.len() != c.transformer_layers {
            return Err(ModelError::mismatch(
                "transformer block count",
                c.transformer_layers,
                self.blocks.len(),
            ));
        }
        for (i, block) in self.blocks.iter().enumerate() {
            let ctx = |name: &str| format!("block {i} {name}");
            block.attention.query.expect_shape(&ctx("query"), d, d)?;
            block.attention.key.expect_shape(&ctx("key"), d, d)?;
            block.attention.value.expect_shape(&ctx("value"), d, d)?;
            block.attention.output.expect_shape(&ctx("output"), d, d)?;
            block
                .feed_forward
                .up
                .validate(&ctx("ffn up"), d, c.feed_forward_dim())?;
            block
                .feed_forward
                .down
                .validate(&ctx("ffn down"), c.feed_forward_dim(), d)?;
            expect_len(&ctx("norm1 gamma"), &block.norm1.gamma, d)?;
            expect_len(&ctx("norm1 beta"), &block.norm1.beta, d)?;
            expect_len(&ctx("norm2 gamma"), &block.norm2.gamma, d)?;
            expect_len(&ctx("norm2 beta"), &block.norm2.beta, d)?;
        }

        if self.output.hidden.len() != c.hidden_layer_sizes.len() {
            return Err(ModelError::mismatch(
                "output hidden layer count",
                c.hidden_layer_sizes.len(),
                self.output.hidden.len(),
            ));
        }
        let mut width = d;
        for (i, (layer, &size)) in self
            .output
            .hidden
            .iter()
            .zip(&c.hidden_layer_sizes)
            .enumerate()
        {
            layer.validate(&format!("output hidden {i}"), width, size)?;
            width = size;
        }
        self.output
            .lm_head
            .validate("lm head", width, c.vocabulary_size)
    }
}

fn expect_len(context: &str, v: &[f64], expected: usize) -> Result<(), ModelError> {
    if v.len() != expected {
        return Err(ModelError::mismatch(context, expected, v.len()));
    }
    Ok(())
}
