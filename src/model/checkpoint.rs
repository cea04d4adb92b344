//! JSON checkpoints: the config plus every weight tensor.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::transformer::ModelWeights;
use crate::errors::ModelError;

const CHECKPOINT_FORMAT: &str = "wordformer-checkpoint";
const CHECKPOINT_VERSION: u32 = 1;

#[derive(Serialize)]
struct CheckpointRef<'a> {
    format: &'a str,
    version: u32,
    weights: &'a ModelWeights,
}

#[derive(Deserialize)]
struct Checkpoint {
    format: String,
    version: u32,
    weights: ModelWeights,
}

/// Save weights to a JSON checkpoint.
pub fn save_checkpoint(weights: &ModelWeights, path: impl AsRef<Path>) -> Result<(), ModelError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(
        &mut writer,
        &CheckpointRef {
            format: CHECKPOINT_FORMAT,
            version: CHECKPOINT_VERSION,
            weights,
        },
    )?;
    writer.flush()?;
    info!(
        "Saved checkpoint to {} ({} parameters)",
        path.display(),
        weights.parameter_count()
    );
    Ok(())
}

/// Load and shape-check a checkpoint written by [`save_checkpoint`].
pub fn load_checkpoint(path: impl AsRef<Path>) -> Result<ModelWeights, ModelError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let checkpoint: Checkpoint = serde_json::from_reader(reader)?;

    if checkpoint.format != CHECKPOINT_FORMAT {
        return Err(ModelError::InvalidCheckpoint(format!(
            "unknown format {:?}",
            checkpoint.format
        )));
    }
    if checkpoint.version != CHECKPOINT_VERSION {
        return Err(ModelError::InvalidCheckpoint(format!(
            "unsupported version {}",
            checkpoint.version
        )));
    }

    let weights = checkpoint.weights;
    weights
        .validate_shapes()
        .map_err(|e| ModelError::InvalidCheckpoint(e.to_string()))?;
    info!(
        "Loaded checkpoint from {} ({} parameters)",
        path.display(),
        weights.parameter_count()
    );
    Ok(weights)
}
