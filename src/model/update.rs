//! Extension point for weight updates.
//!
//! The crate ships no training loop. An optimizer backed by any autodiff
//! library can implement [`ParameterUpdater`] and run through
//! [`ModelHandle::apply_update`](super::ModelHandle::apply_update), which hands it
//! a private copy and publishes the result only if every shape still checks out.

use anyhow::Result;

use super::transformer::ModelWeights;

/// Mutates model weights in place. Shapes must be preserved; the handle
/// re-validates them after every update.
pub trait ParameterUpdater {
    fn update(&mut self, weights: &mut ModelWeights) -> Result<()>;
}

impl<F> ParameterUpdater for F
where
    F: FnMut(&mut ModelWeights) -> Result<()>,
{
    fn update(&mut self, weights: &mut ModelWeights) -> Result<()> {
        self(weights)
    }
}
