//! KV cache for incremental autoregressive decoding.

use crate::errors::ModelError;
use crate::kernels::Matrix;
use crate::model::ModelConfig;

/// Per-layer key and value rows, `[positions, embedding_dim]` each, for every
/// position decoded so far. Capacity is the model's `max_sequence_length`.
#[derive(Debug, Clone)]
pub struct KVCache {
    keys: Vec<Matrix>,
    values: Vec<Matrix>,
    len: usize,
    capacity: usize,
}

impl KVCache {
    pub fn new(config: &ModelConfig) -> Self {
        let empty = || Matrix::empty(config.embedding_dim);
        Self {
            keys: (0..config.transformer_layers).map(|_| empty()).collect(),
            values: (0..config.transformer_layers).map(|_| empty()).collect(),
            len: 0,
            capacity: config.max_sequence_length,
        }
    }

    /// Positions stored so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    pub fn num_layers(&self) -> usize {
        self.keys.len()
    }

    /// Forget every position (start a new sequence).
    pub fn clear(&mut self) {
        for m in self.keys.iter_mut().chain(self.values.iter_mut()) {
            *m = Matrix::empty(m.cols());
        }
        self.len = 0;
    }

    /// Append one position's key and value rows for `layer`.
    ///
    /// Every layer must be appended once before calling [`KVCache::advance`].
    pub fn append(&mut self, layer: usize, key: &[f64], value: &[f64]) -> Result<(), ModelError> {
        if self.is_full() {
            return Err(ModelError::CacheFull(self.capacity));
        }
        let layers = self.keys.len();
        let (keys, values) = match (self.keys.get_mut(layer), self.values.get_mut(layer)) {
            (Some(k), Some(v)) => (k, v),
            _ => return Err(ModelError::mismatch("kv cache layer index", layers, layer)),
        };
        let width = keys.cols();
        if key.len() != width || value.len() != width {
            return Err(ModelError::mismatch(
                format!("kv cache layer {layer} row width"),
                width,
                if key.len() != width { key.len() } else { value.len() },
            ));
        }
        if keys.rows() != self.len {
            return Err(ModelError::mismatch(
                format!("kv cache layer {layer} rows"),
                self.len,
                keys.rows(),
            ));
        }
        keys.push_row(key)?;
        values.push_row(value)?;
        Ok(())
    }

    /// Commit the position appended to every layer.
    pub fn advance(&mut self) -> Result<(), ModelError> {
        let next = self.len + 1;
        if let Some(layer) = self.keys.iter().position(|k| k.rows() != next) {
            return Err(ModelError::mismatch(
                format!("kv cache layer {layer} rows"),
                next,
                self.keys[layer].rows(),
            ));
        }
        self.len = next;
        Ok(())
    }

    /// `(keys, values)` of `layer`, including any row appended but not yet
    /// committed.
    pub fn layer(&self, layer: usize) -> Option<(&Matrix, &Matrix)> {
        Some((self.keys.get(layer)?, self.values.get(layer)?))
    }
}
