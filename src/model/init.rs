//! Randomized weight initialization (Xavier/Glorot uniform).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{ModelConfig, PositionalEncoding};
use super::transformer::{
    AttentionWeights, DenseLayer, Embeddings, FeedForwardWeights, LayerNormParams, ModelWeights,
    OutputHead, TransformerBlock,
};
use crate::errors::ModelError;
use crate::kernels::Matrix;

/// Half-width of the uniform range for bias noise.
const BIAS_NOISE: f64 = 0.01;

/// `sqrt(6 / (rows + cols))`.
pub fn xavier_limit(rows: usize, cols: usize) -> f64 {
    (6.0 / (rows + cols) as f64).sqrt()
}

/// Fixed sin/cos positional table `[rows, dim]`.
pub fn sinusoidal_table(rows: usize, dim: usize) -> Matrix {
    Matrix::from_fn(rows, dim, |pos, i| {
        let pos = pos as f64;
        if i % 2 == 0 {
            (pos / 10_000f64.powf(i as f64 / dim as f64)).sin()
        } else {
            (pos / 10_000f64.powf((i - 1) as f64 / dim as f64)).cos()
        }
    })
}

/// Draws every weight from an injected random source, so a seeded source
/// reproduces a model exactly.
pub struct WeightInitializer<R> {
    rng: R,
}

impl WeightInitializer<StdRng> {
    /// Deterministic initializer for tests and golden outputs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> WeightInitializer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Every element uniform in `[-limit, limit]`, `limit = sqrt(6 / (rows + cols))`.
    pub fn matrix(&mut self, rows: usize, cols: usize) -> Matrix {
        if rows + cols == 0 {
            return Matrix::empty(cols);
        }
        let limit = xavier_limit(rows, cols);
        let rng = &mut self.rng;
        Matrix::from_fn(rows, cols, |_, _| rng.gen_range(-limit..=limit))
    }

    /// Constant `value` when given, otherwise noise in `[-0.01, 0.01]`.
    pub fn vector(&mut self, size: usize, value: Option<f64>) -> Vec<f64> {
        match value {
            Some(v) => vec![v; size],
            None => (0..size)
                .map(|_| self.rng.gen_range(-BIAS_NOISE..=BIAS_NOISE))
                .collect(),
        }
    }

    pub fn dense(&mut self, in_features: usize, out_features: usize) -> DenseLayer {
        DenseLayer {
            weight: self.matrix(in_features, out_features),
            bias: self.vector(out_features, None),
        }
    }

    fn block(&mut self, config: &ModelConfig) -> TransformerBlock {
        let d = config.embedding_dim;
        let attention = AttentionWeights {
            query: self.matrix(d, d),
            key: self.matrix(d, d),
            value: self.matrix(d, d),
            output: self.matrix(d, d),
        };
        let feed_forward = FeedForwardWeights {
            up: self.dense(d, config.feed_forward_dim()),
            down: self.dense(config.feed_forward_dim(), d),
        };
        TransformerBlock {
            attention,
            feed_forward,
            norm1: LayerNormParams::identity(d),
            norm2: LayerNormParams::identity(d),
        }
    }

    /// Embeddings, then each block in order, then the output head.
    pub fn build_weights(&mut self, config: &ModelConfig) -> Result<ModelWeights, ModelError> {
        config.validate()?;

        let d = config.embedding_dim;
        let tokens = self.matrix(config.vocabulary_size, d);
        let positions = match config.positional_encoding {
            PositionalEncoding::Learned => self.matrix(config.max_sequence_length, d),
            PositionalEncoding::Sinusoidal => sinusoidal_table(config.max_sequence_length, d),
        };

        let blocks = (0..config.transformer_layers)
            .map(|_| self.block(config))
            .collect();

        let mut width = d;
        let mut hidden = Vec::with_capacity(config.hidden_layer_sizes.len());
        for &size in &config.hidden_layer_sizes {
            hidden.push(self.dense(width, size));
            width = size;
        }
        let lm_head = self.dense(width, config.vocabulary_size);

        Ok(ModelWeights {
            config: config.clone(),
            embeddings: Embeddings { tokens, positions },
            blocks,
            output: OutputHead { hidden, lm_head },
        })
    }
}
