//! Inference engine: forward pass through the transformer language model.

use std::sync::Arc;

use anyhow::Result;
use rayon::prelude::*;

use super::cache::KVCache;
use crate::errors::ModelError;
use crate::kernels::{add_in_place, layer_norm, linear, mat_mul, softmax, softmax_in_place, Matrix};
use crate::model::{
    AttentionVariant, AttentionWeights, FeedForwardWeights, ModelConfig, ModelWeights,
    TransformerBlock,
};

/// Result of [`InferenceEngine::forward`].
#[derive(Debug, Clone)]
pub struct ForwardOutput {
    /// Next-token logits for the last position, `[vocabulary_size]`.
    pub logits: Vec<f64>,
    /// `softmax(logits)`.
    pub probabilities: Vec<f64>,
    /// Final block output for every position, `[seq_len, embedding_dim]`.
    pub hidden_states: Matrix,
}

/// Runs the forward pass over a shared, read-only snapshot of the weights.
/// Cloning an engine is cheap; clones share the weights.
#[derive(Clone)]
pub struct InferenceEngine {
    weights: Arc<ModelWeights>,
}

impl InferenceEngine {
    pub fn new(weights: Arc<ModelWeights>) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ModelWeights {
        &self.weights
    }

    pub fn config(&self) -> &ModelConfig {
        &self.weights.config
    }

    pub fn vocab_size(&self) -> usize {
        self.weights.vocab_size()
    }

    pub fn max_sequence_length(&self) -> usize {
        self.weights.config.max_sequence_length
    }

    /// Full forward pass: last-position logits and probabilities plus every
    /// position's final hidden state.
    pub fn forward(&self, input_ids: &[usize]) -> Result<ForwardOutput> {
        let hidden_states = self.hidden_states(input_ids)?;
        let logits = self.last_position_logits(&hidden_states)?;
        let probabilities = softmax(&logits);
        Ok(ForwardOutput {
            logits,
            probabilities,
            hidden_states,
        })
    }

    /// Next-token logits for the last position, `[vocabulary_size]`.
    pub fn forward_last(&self, input_ids: &[usize]) -> Result<Vec<f64>> {
        let hidden = self.hidden_states(input_ids)?;
        self.last_position_logits(&hidden)
    }

    /// Logits for every position, `[seq_len, vocabulary_size]`.
    pub fn forward_all(&self, input_ids: &[usize]) -> Result<Matrix> {
        let hidden = self.hidden_states(input_ids)?;
        self.project_output(&hidden)
    }

    /// Final block output for every position, `[seq_len, embedding_dim]`.
    pub fn hidden_states(&self, input_ids: &[usize]) -> Result<Matrix> {
        if input_ids.is_empty() {
            return Err(ModelError::EmptyInput.into());
        }
        let mut hidden = self.embed(input_ids, 0)?;
        for block in &self.weights.blocks {
            hidden = self.forward_block(block, &hidden)?;
        }
        Ok(hidden)
    }

    /// Token embeddings plus positional rows, positions counted from
    /// `start_position`.
    ///
    /// Out-of-range ids clamp to the last vocabulary row and positions past the
    /// table saturate to its last row.
    pub fn embed(&self, input_ids: &[usize], start_position: usize) -> Result<Matrix, ModelError> {
        let tokens = &self.weights.embeddings.tokens;
        let positions = &self.weights.embeddings.positions;
        let last_token = tokens.rows().saturating_sub(1);
        let last_position = positions.rows().saturating_sub(1);

        let mut out = Matrix::zeros(input_ids.len(), tokens.cols())?;
        for (i, &id) in input_ids.iter().enumerate() {
            let position = start_position.saturating_add(i).min(last_position);
            let row = out.row_mut(i);
            row.copy_from_slice(tokens.row(id.min(last_token)));
            for (x, &p) in row.iter_mut().zip(positions.row(position)) {
                *x += p;
            }
        }
        Ok(out)
    }

    /// One block: attention, add & norm, feed-forward, add & norm.
    pub fn forward_block(&self, block: &TransformerBlock, input: &Matrix) -> Result<Matrix> {
        let attended = self.attention(&block.attention, input)?;
        self.finish_block(block, input, &attended)
    }

    fn finish_block(&self, block: &TransformerBlock, input: &Matrix, attended: &Matrix) -> Result<Matrix> {
        let eps = self.weights.config.layer_norm_eps;
        let mut hidden = input.clone();
        add_in_place(&mut hidden, attended)?;
        layer_norm(&mut hidden, &block.norm1.gamma, &block.norm1.beta, eps)?;

        let ff = self.feed_forward(&block.feed_forward, &hidden)?;
        add_in_place(&mut hidden, &ff)?;
        layer_norm(&mut hidden, &block.norm2.gamma, &block.norm2.beta, eps)?;
        Ok(hidden)
    }

    /// Causal self-attention over `[seq_len, embedding_dim]`.
    pub fn attention(&self, weights: &AttentionWeights, hidden: &Matrix) -> Result<Matrix> {
        if self.weights.config.attention == AttentionVariant::ValueOnly {
            return Ok(mat_mul(hidden, &weights.value)?);
        }

        let q = mat_mul(hidden, &weights.query)?;
        let k = mat_mul(hidden, &weights.key)?;
        let v = mat_mul(hidden, &weights.value)?;
        let heads = self.weights.config.attention_heads;

        let dim = q.cols();
        let mut context = Matrix::zeros(q.rows(), dim)?;
        if dim > 0 {
            context
                .as_mut_slice()
                .par_chunks_mut(dim)
                .enumerate()
                .for_each(|(i, out)| attend_row(q.row(i), &k, &v, i + 1, heads, out));
        }
        Ok(mat_mul(&context, &weights.output)?)
    }

    /// `activation(x @ up + b) @ down + b`.
    pub fn feed_forward(&self, weights: &FeedForwardWeights, hidden: &Matrix) -> Result<Matrix> {
        let mut inner = linear(hidden, &weights.up.weight, Some(&weights.up.bias))?;
        self.weights.config.activation.apply_in_place(&mut inner);
        Ok(linear(&inner, &weights.down.weight, Some(&weights.down.bias))?)
    }

    /// Hidden dense stack, then the language-model head. Rows are positions.
    pub fn project_output(&self, hidden: &Matrix) -> Result<Matrix> {
        let head = &self.weights.output;
        let activation = self.weights.config.activation;
        let mut x = hidden.clone();
        for layer in &head.hidden {
            x = linear(&x, &layer.weight, Some(&layer.bias))?;
            activation.apply_in_place(&mut x);
        }
        Ok(linear(&x, &head.lm_head.weight, Some(&head.lm_head.bias))?)
    }

    fn last_position_logits(&self, hidden: &Matrix) -> Result<Vec<f64>> {
        let last = hidden.last_row().ok_or(ModelError::EmptyInput)?;
        let logits = self.project_output(&Matrix::row_vector(last))?;
        Ok(logits.row(0).to_vec())
    }

    /// Empty cache sized for this model.
    pub fn create_cache(&self) -> KVCache {
        KVCache::new(&self.weights.config)
    }

    /// Feed one token at position `cache.len()` and return next-token logits.
    ///
    /// Produces the same logits as [`InferenceEngine::forward_last`] over the
    /// whole prefix. If this returns an error the cache should be cleared.
    pub fn forward_step(&self, token: usize, cache: &mut KVCache) -> Result<Vec<f64>> {
        if cache.is_full() {
            return Err(ModelError::CacheFull(cache.capacity()).into());
        }
        if cache.num_layers() != self.weights.blocks.len() {
            return Err(
                ModelError::mismatch("kv cache layers", self.weights.blocks.len(), cache.num_layers())
                    .into(),
            );
        }

        let position = cache.len();
        let heads = self.weights.config.attention_heads;
        let mut hidden = self.embed(&[token], position)?;
        for (layer, block) in self.weights.blocks.iter().enumerate() {
            let weights = &block.attention;
            let k = mat_mul(&hidden, &weights.key)?;
            let v = mat_mul(&hidden, &weights.value)?;
            cache.append(layer, k.row(0), v.row(0))?;

            let attended = match self.weights.config.attention {
                AttentionVariant::ValueOnly => v,
                AttentionVariant::ScaledDotProduct => {
                    let q = mat_mul(&hidden, &weights.query)?;
                    let (keys, values) = cache
                        .layer(layer)
                        .ok_or_else(|| ModelError::mismatch("kv cache layer", layer, cache.num_layers()))?;
                    let mut context = Matrix::zeros(1, q.cols())?;
                    attend_row(q.row(0), keys, values, position + 1, heads, context.row_mut(0));
                    mat_mul(&context, &weights.output)?
                }
            };
            hidden = self.finish_block(block, &hidden, &attended)?;
        }
        cache.advance()?;

        let logits = self.project_output(&hidden)?;
        Ok(logits.row(0).to_vec())
    }
}

/// Multi-head attention for one query row against `keys`/`values`.
///
/// Key positions `>= visible` are masked to `-inf` before the softmax so they
/// get exactly zero weight. Heads are contiguous `head_dim` slices of the row;
/// their outputs are written side by side into `out`.
fn attend_row(query: &[f64], keys: &Matrix, values: &Matrix, visible: usize, heads: usize, out: &mut [f64]) {
    let head_dim = query.len() / heads;
    let scale = (head_dim as f64).sqrt();
    let mut scores = vec![0.0; keys.rows()];

    for h in 0..heads {
        let span = h * head_dim..(h + 1) * head_dim;
        let q = &query[span.clone()];
        for (j, score) in scores.iter_mut().enumerate() {
            *score = if j < visible {
                dot(q, &keys.row(j)[span.clone()]) / scale
            } else {
                f64::NEG_INFINITY
            };
        }
        softmax_in_place(&mut scores);

        let out = &mut out[span.clone()];
        out.fill(0.0);
        for (j, &w) in scores.iter().enumerate() {
            if w == 0.0 {
                continue;
            }
            for (o, &x) in out.iter_mut().zip(&values.row(j)[span.clone()]) {
                *o += w * x;
            }
        }
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{build_model, PositionalEncoding};

    fn config() -> ModelConfig {
        ModelConfig {
            vocabulary_size: 12,
            embedding_dim: 8,
            hidden_layer_sizes: vec![6],
            attention_heads: 2,
            transformer_layers: 2,
            max_sequence_length: 8,
            ..Default::default()
        }
    }

    fn engine(config: ModelConfig) -> InferenceEngine {
        build_model(config, Some(42)).unwrap().engine().unwrap()
    }

    #[test]
    fn forward_shapes() {
        let engine = engine(config());
        let out = engine.forward(&[1, 2, 3]).unwrap();
        assert_eq!(out.logits.len(), 12);
        assert_eq!(out.probabilities.len(), 12);
        assert_eq!(out.hidden_states.shape(), (3, 8));
        let sum: f64 = out.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = engine(config()).forward(&[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::EmptyInput)
        ));
    }

    #[test]
    fn out_of_range_ids_clamp_to_last_row() {
        let engine = engine(config());
        assert_eq!(
            engine.forward_last(&[4, 500]).unwrap(),
            engine.forward_last(&[4, 11]).unwrap()
        );
    }

    #[test]
    fn long_inputs_saturate_positions() {
        let engine = engine(config());
        let ids: Vec<usize> = (0..11).map(|i| i % 12).collect();
        let out = engine.forward(&ids).unwrap();
        assert_eq!(out.hidden_states.rows(), 11);
        let embedded = engine.embed(&[3, 3], 7).unwrap();
        assert_eq!(embedded.row(0), embedded.row(1));
    }

    #[test]
    fn later_tokens_do_not_change_earlier_positions() {
        let engine = engine(config());
        let a = engine.forward_all(&[1, 5, 7, 2]).unwrap();
        let b = engine.forward_all(&[1, 5, 9, 10]).unwrap();
        assert_eq!(a.row(0), b.row(0));
        assert_eq!(a.row(1), b.row(1));
        assert_ne!(a.row(2), b.row(2));
    }

    #[test]
    fn normalized_rows_have_zero_mean_unit_variance() {
        let engine = engine(config());
        let hidden = engine.hidden_states(&[3, 4, 5]).unwrap();
        for row in hidden.iter_rows() {
            let n = row.len() as f64;
            let mean = row.iter().sum::<f64>() / n;
            let var = row.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            assert!(mean.abs() < 1e-9);
            assert!((var - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn cached_steps_match_full_forward() {
        for attention in [AttentionVariant::ScaledDotProduct, AttentionVariant::ValueOnly] {
            let engine = engine(ModelConfig {
                attention,
                positional_encoding: PositionalEncoding::Sinusoidal,
                ..config()
            });
            let ids = [2, 7, 7, 1, 9];
            let mut cache = engine.create_cache();
            for (i, &id) in ids.iter().enumerate() {
                let step = engine.forward_step(id, &mut cache).unwrap();
                assert_eq!(step, engine.forward_last(&ids[..=i]).unwrap());
            }
            assert_eq!(cache.len(), ids.len());
        }
    }

    #[test]
    fn step_past_capacity_fails() {
        let engine = engine(ModelConfig {
            max_sequence_length: 2,
            ..config()
        });
        let mut cache = engine.create_cache();
        engine.forward_step(1, &mut cache).unwrap();
        engine.forward_step(2, &mut cache).unwrap();
        let err = engine.forward_step(3, &mut cache).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::CacheFull(2))
        ));
    }

    #[test]
    fn value_only_skips_score_computation() {
        let engine = engine(ModelConfig {
            attention: AttentionVariant::ValueOnly,
            ..config()
        });
        let block = &engine.weights().blocks[0];
        let x = engine.embed(&[1, 2], 0).unwrap();
        let attended = engine.attention(&block.attention, &x).unwrap();
        assert_eq!(attended, mat_mul(&x, &block.attention.value).unwrap());
    }
}
