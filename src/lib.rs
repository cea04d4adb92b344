//! # wordformer
//!
//! Word-level transformer language model inference in pure Rust.
//!
//! ## Architecture
//!
//! - **Vocabulary**: word tokenizer with fixed special tokens and built-in word lists
//! - **Kernels**: dense `f64` matrices, rayon-parallel mat-mul, layer norm, softmax
//! - **Model**: seeded Xavier initialization, post-norm transformer blocks with
//!   causal multi-head attention, JSON checkpoints
//! - **Inference**: full and KV-cached forward passes, temperature/top-k sampling,
//!   bounded streaming generation

pub mod errors;
pub mod inference;
pub mod kernels;
pub mod model;
pub mod tokenizer;

pub use errors::ModelError;
pub use inference::{
    sample_top_k, ForwardOutput, GenerationConfig, GenerationResult, GenerationToken,
    InferenceEngine, KVCache, LogitProcessor, RepetitionPenaltyProcessor, StopReason,
    SuppressTokensProcessor, TextGenerator,
};
pub use kernels::{argmax, layer_norm, mat_mul, softmax, Activation, Matrix};
pub use model::{
    build_model, create_demo_model, create_demo_model_seeded, demo_config, ArchitectureInfo,
    AttentionVariant, ModelConfig, ModelHandle, ModelState, ModelWeights, ParameterUpdater,
    PositionalEncoding, WeightInitializer,
};
pub use tokenizer::{Vocabulary, VocabularyStats, BOS_ID, EOS_ID, MASK_ID, PAD_ID, UNK_ID};
