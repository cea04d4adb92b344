//! Autoregressive text generation with temperature and top-k sampling.

use std::ops::ControlFlow;
use std::time::Instant;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::cache::KVCache;
use super::engine::InferenceEngine;
use super::logit_processors::{LogitProcessor, ProcessorChain, RepetitionPenaltyProcessor};
use super::sampling::{check_temperature, sample_top_k};
use super::streaming::{GenerationToken, StopReason};
use crate::errors::ModelError;
use crate::tokenizer::{EOS_ID, PAD_ID};

/// Sampling and stopping parameters for one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Upper bound on newly generated tokens.
    pub max_length: usize,
    pub temperature: f64,
    /// `0` keeps the whole vocabulary.
    pub top_k: usize,
    /// Seed for the sampling RNG; `None` draws from entropy.
    pub seed: Option<u64>,
    /// `1.0` disables the penalty.
    pub repetition_penalty: f64,
    /// Sampling any of these ends generation.
    pub stop_tokens: Vec<usize>,
    /// Decode incrementally with a KV cache instead of recomputing the prefix.
    pub use_cache: bool,
}

impl GenerationConfig {
    /// Reject a temperature or repetition penalty that is not positive and finite.
    pub fn validate(&self) -> Result<(), ModelError> {
        check_temperature(self.temperature)?;
        RepetitionPenaltyProcessor::new(self.repetition_penalty).check()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: 50,
            temperature: 0.7,
            top_k: 40,
            seed: None,
            repetition_penalty: 1.0,
            stop_tokens: vec![EOS_ID, PAD_ID],
            use_cache: true,
        }
    }
}

/// Output of a generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    /// Prompt (after any truncation) followed by the generated tokens.
    pub ids: Vec<usize>,
    pub prompt_len: usize,
    pub stop_reason: StopReason,
    pub time_ms: f64,
}

impl GenerationResult {
    /// Only the newly generated tokens.
    pub fn new_tokens(&self) -> &[usize] {
        &self.ids[self.prompt_len..]
    }
}

/// Text generator wrapping the inference engine.
pub struct TextGenerator {
    engine: InferenceEngine,
    processors: ProcessorChain,
}

impl TextGenerator {
    pub fn new(engine: InferenceEngine) -> Self {
        Self {
            engine,
            processors: ProcessorChain::new(),
        }
    }

    /// Add a processor applied to the logits at every step, after the
    /// repetition penalty from the config.
    pub fn with_processor<P: LogitProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.add_boxed(Box::new(processor));
        self
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Extend `prompt_ids`; returns the prompt followed by the generated tokens.
    pub fn generate(&self, prompt_ids: &[usize], config: &GenerationConfig) -> Result<Vec<usize>> {
        Ok(self.generate_with_details(prompt_ids, config)?.ids)
    }

    pub fn generate_with_details(
        &self,
        prompt_ids: &[usize],
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        self.generate_streaming(prompt_ids, config, |_| ControlFlow::Continue(()))
    }

    /// Generate, reporting each sampled token to `on_token`. Returning
    /// `ControlFlow::Break` from a `Token` event stops after that token.
    /// A final `Done` event is always sent.
    pub fn generate_streaming<F>(
        &self,
        prompt_ids: &[usize],
        config: &GenerationConfig,
        on_token: F,
    ) -> Result<GenerationResult>
    where
        F: FnMut(&GenerationToken) -> ControlFlow<()>,
    {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.generate_with_rng(prompt_ids, config, &mut rng, on_token)
    }

    /// Core loop with an injected random source.
    ///
    /// Stops when a stop token is sampled, after `max_length` new tokens, when
    /// the sequence reaches `max_sequence_length`, or when `on_token` breaks.
    pub fn generate_with_rng<R, F>(
        &self,
        prompt_ids: &[usize],
        config: &GenerationConfig,
        rng: &mut R,
        mut on_token: F,
    ) -> Result<GenerationResult>
    where
        R: Rng + ?Sized,
        F: FnMut(&GenerationToken) -> ControlFlow<()>,
    {
        config.validate()?;
        if prompt_ids.is_empty() {
            return Err(ModelError::EmptyInput.into());
        }
        let start = Instant::now();
        let max_seq = self.engine.max_sequence_length();
        let mut ids = if prompt_ids.len() > max_seq {
            warn!(
                "Prompt of {} tokens truncated to the last {} (max sequence length)",
                prompt_ids.len(),
                max_seq
            );
            prompt_ids[prompt_ids.len() - max_seq..].to_vec()
        } else {
            prompt_ids.to_vec()
        };
        let prompt_len = ids.len();

        let penalty = RepetitionPenaltyProcessor::new(config.repetition_penalty);
        let mut cache = config.use_cache.then(|| self.engine.create_cache());

        let reason = loop {
            let generated = ids.len() - prompt_len;
            if generated >= config.max_length {
                break StopReason::MaxLength;
            }
            if ids.len() >= max_seq {
                break StopReason::ContextFull;
            }

            let mut logits = match cache.as_mut() {
                Some(cache) if generated == 0 => self.prefill(&ids, cache)?,
                Some(cache) => self.engine.forward_step(ids[ids.len() - 1], cache)?,
                None => self.engine.forward_last(&ids)?,
            };
            if !penalty.is_noop() {
                penalty.process(&mut logits, &ids)?;
            }
            self.processors.process(&mut logits, &ids)?;

            let next = sample_top_k(&logits, config.temperature, config.top_k, rng)?;
            ids.push(next);
            let flow = on_token(&GenerationToken::Token {
                id: next,
                position: ids.len() - 1,
            });
            if config.stop_tokens.contains(&next) {
                break StopReason::EndToken;
            }
            if flow.is_break() {
                break StopReason::Cancelled;
            }
        };

        let time_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "Generation stopped ({}): {} new tokens, {} total, {:.1} ms",
            reason,
            ids.len() - prompt_len,
            ids.len(),
            time_ms
        );
        let _ = on_token(&GenerationToken::Done {
            reason,
            total_tokens: ids.len(),
            time_ms,
        });
        Ok(GenerationResult {
            ids,
            prompt_len,
            stop_reason: reason,
            time_ms,
        })
    }

    /// Feed the whole prompt through the cache; returns the last logits.
    fn prefill(&self, ids: &[usize], cache: &mut KVCache) -> Result<Vec<f64>> {
        cache.clear();
        let mut logits = Vec::new();
        for &id in ids {
            logits = self.engine.forward_step(id, cache)?;
        }
        Ok(logits)
    }
}
