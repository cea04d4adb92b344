//! Central error types for wordformer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Shape overflow in {context}: {rows}x{cols} elements do not fit in usize")]
    ShapeOverflow {
        context: String,
        rows: usize,
        cols: usize,
    },

    #[error("Input token sequence must not be empty")]
    EmptyInput,

    #[error("Model is not ready (state: {0})")]
    NotReady(String),

    #[error("Model has already been built")]
    AlreadyBuilt,

    #[error("KV cache full: capacity {0} positions")]
    CacheFull(usize),

    #[error("Invalid checkpoint: {0}")]
    InvalidCheckpoint(String),

    #[error("Invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        ModelError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>, rows: usize, cols: usize) -> Self {
        ModelError::ShapeOverflow {
            context: context.into(),
            rows,
            cols,
        }
    }

    pub(crate) fn mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        ModelError::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}
