//! Inference and text generation.

pub mod cache;
pub mod engine;
pub mod generator;
pub mod logit_processors;
pub mod sampling;
pub mod streaming;

pub use cache::KVCache;
pub use engine::{ForwardOutput, InferenceEngine};
pub use generator::{GenerationConfig, GenerationResult, TextGenerator};
pub use logit_processors::{
    LogitProcessor, ProcessorChain, RepetitionPenaltyProcessor, SuppressTokensProcessor,
};
pub use sampling::{
    check_temperature, sample_greedy, sample_top_k, sample_top_k_with_draw, top_k_candidates,
    MIN_TEMPERATURE,
};
pub use streaming::{GenerationToken, StopReason};
