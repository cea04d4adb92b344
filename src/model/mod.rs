//! Model configuration, weights, initialization and lifecycle.

pub mod checkpoint;
pub mod config;
pub mod demo;
pub mod handle;
pub mod init;
pub mod transformer;
pub mod update;

pub use checkpoint::{load_checkpoint, save_checkpoint};
pub use config::{AttentionVariant, ModelConfig, PositionalEncoding};
pub use demo::{create_demo_model, create_demo_model_seeded, demo_config};
pub use handle::{build_model, ArchitectureInfo, ModelHandle, ModelState};
pub use init::{sinusoidal_table, xavier_limit, WeightInitializer};
pub use transformer::{
    AttentionWeights, DenseLayer, Embeddings, FeedForwardWeights, LayerNormParams, ModelWeights,
    OutputHead, TransformerBlock, BYTES_PER_PARAMETER,
};
pub use update::ParameterUpdater;
