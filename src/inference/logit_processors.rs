//! Logit processors: composable transformations applied before sampling.
//!
//! Processors can be chained: logits → proc1 → proc2 → sample.

use std::collections::HashSet;

use anyhow::Result;

use crate::errors::ModelError;

/// Process logits in place before sampling.
pub trait LogitProcessor: Send + Sync {
    /// Apply the processor. `context` is the full sequence so far (prompt and
    /// generated tokens).
    fn process(&self, logits: &mut [f64], context: &[usize]) -> Result<()>;
}

/// Repetition penalty (CTRL-style): every token already in the context has a
/// positive logit divided by `penalty` and a negative one multiplied by it.
/// Each distinct token is penalized once.
#[derive(Clone, Debug)]
pub struct RepetitionPenaltyProcessor {
    pub penalty: f64,
}

impl RepetitionPenaltyProcessor {
    pub fn new(penalty: f64) -> Self {
        Self { penalty }
    }

    /// A penalty of 1 changes nothing.
    pub fn is_noop(&self) -> bool {
        (self.penalty - 1.0).abs() < 1e-12
    }

    /// The penalty must be positive and finite.
    pub fn check(&self) -> Result<(), ModelError> {
        if self.penalty.is_finite() && self.penalty > 0.0 {
            Ok(())
        } else {
            Err(ModelError::config(
                "repetition_penalty",
                format!("{} must be positive and finite", self.penalty),
            ))
        }
    }
}

impl LogitProcessor for RepetitionPenaltyProcessor {
    fn process(&self, logits: &mut [f64], context: &[usize]) -> Result<()> {
        self.check()?;
        if self.is_noop() {
            return Ok(());
        }
        let seen: HashSet<usize> = context.iter().copied().collect();
        for tid in seen {
            if let Some(v) = logits.get_mut(tid) {
                *v = if *v > 0.0 {
                    *v / self.penalty
                } else {
                    *v * self.penalty
                };
            }
        }
        Ok(())
    }
}

/// Sets the logits of the given token ids to negative infinity.
#[derive(Clone, Debug)]
pub struct SuppressTokensProcessor {
    pub token_ids: Vec<usize>,
}

impl SuppressTokensProcessor {
    pub fn new(token_ids: Vec<usize>) -> Self {
        Self { token_ids }
    }
}

impl LogitProcessor for SuppressTokensProcessor {
    fn process(&self, logits: &mut [f64], _context: &[usize]) -> Result<()> {
        for &tid in &self.token_ids {
            if let Some(v) = logits.get_mut(tid) {
                *v = f64::NEG_INFINITY;
            }
        }
        Ok(())
    }
}

/// Chain of processors, applied in order.
#[derive(Default)]
pub struct ProcessorChain {
    processors: Vec<Box<dyn LogitProcessor>>,
}

impl ProcessorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_processor<P: LogitProcessor + 'static>(mut self, p: P) -> Self {
        self.processors.push(Box::new(p));
        self
    }

    pub fn add_boxed(&mut self, p: Box<dyn LogitProcessor>) {
        self.processors.push(p);
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn process(&self, logits: &mut [f64], context: &[usize]) -> Result<()> {
        for p in &self.processors {
            p.process(logits, context)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repetition_penalty_scales_by_sign() {
        let mut logits = vec![2.0, -2.0, 1.0];
        RepetitionPenaltyProcessor::new(2.0)
            .process(&mut logits, &[0, 1, 0, 1])
            .unwrap();
        assert_eq!(logits, vec![1.0, -4.0, 1.0]);
    }

    #[test]
    fn unit_penalty_is_noop() {
        let mut logits = vec![2.0, -2.0];
        RepetitionPenaltyProcessor::new(1.0)
            .process(&mut logits, &[0, 1])
            .unwrap();
        assert_eq!(logits, vec![2.0, -2.0]);
    }

    #[test]
    fn non_positive_penalty_errors() {
        for penalty in [0.0, -2.0, f64::NAN] {
            let mut logits = vec![2.0, -2.0];
            assert!(RepetitionPenaltyProcessor::new(penalty)
                .process(&mut logits, &[0])
                .is_err());
            assert_eq!(logits, vec![2.0, -2.0]);
        }
    }

    #[test]
    fn suppress_ignores_out_of_range_ids() {
        let mut logits = vec![0.0; 3];
        SuppressTokensProcessor::new(vec![1, 99])
            .process(&mut logits, &[])
            .unwrap();
        assert_eq!(logits[1], f64::NEG_INFINITY);
        assert_eq!(logits[0], 0.0);
    }

    #[test]
    fn chain_applies_in_order() {
        let chain = ProcessorChain::new()
            .add_processor(RepetitionPenaltyProcessor::new(2.0))
            .add_processor(SuppressTokensProcessor::new(vec![2]));
        assert_eq!(chain.len(), 2);
        let mut logits = vec![4.0, 1.0, 3.0];
        chain.process(&mut logits, &[0]).unwrap();
        assert_eq!(logits, vec![2.0, 1.0, f64::NEG_INFINITY]);
    }
}
