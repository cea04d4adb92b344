//! Next-token sampling: temperature scaling, top-k filtering and inverse-CDF draws.

use std::cmp::Ordering;

use anyhow::Result;
use rand::Rng;

use crate::errors::ModelError;
use crate::kernels::{argmax, softmax_in_place};

/// Positive temperatures are clamped to at least this value.
pub const MIN_TEMPERATURE: f64 = 1e-6;

/// Temperature must be positive and finite.
pub fn check_temperature(temperature: f64) -> Result<(), ModelError> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(())
    } else {
        Err(ModelError::config(
            "temperature",
            format!("{temperature} must be positive and finite"),
        ))
    }
}

/// Candidate `(token_id, probability)` pairs after temperature and top-k,
/// highest first. Equal scores keep ascending id order.
///
/// `top_k == 0` or `top_k > logits.len()` keeps every token. NaN logits are
/// treated as `-inf`. Probabilities are a softmax over the kept candidates only.
/// `temperature` is expected to pass [`check_temperature`].
pub fn top_k_candidates(logits: &[f64], temperature: f64, top_k: usize) -> Vec<(usize, f64)> {
    let t = temperature.max(MIN_TEMPERATURE);
    let mut indexed: Vec<(usize, f64)> = logits
        .iter()
        .enumerate()
        .map(|(i, &v)| (i, if v.is_nan() { f64::NEG_INFINITY } else { v / t }))
        .collect();
    // `sort_by` is stable, so ties stay in id order.
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let k = if top_k == 0 { indexed.len() } else { top_k.min(indexed.len()) };
    indexed.truncate(k);

    let mut probs: Vec<f64> = indexed.iter().map(|&(_, v)| v).collect();
    softmax_in_place(&mut probs);
    indexed
        .iter()
        .zip(probs)
        .map(|(&(id, _), p)| (id, p))
        .collect()
}

/// Sample with a caller-supplied uniform draw in `[0, 1)`.
///
/// Walks the candidates in order and returns the first whose cumulative
/// probability reaches `draw`. If rounding leaves every bucket short, the
/// highest-probability candidate is returned.
pub fn sample_top_k_with_draw(
    logits: &[f64],
    temperature: f64,
    top_k: usize,
    draw: f64,
) -> Result<usize> {
    if logits.is_empty() {
        anyhow::bail!("logits must not be empty");
    }
    check_temperature(temperature)?;
    let candidates = top_k_candidates(logits, temperature, top_k);
    let mut cum = 0.0;
    for &(id, p) in &candidates {
        cum += p;
        if draw <= cum {
            return Ok(id);
        }
    }
    Ok(candidates[0].0)
}

/// Sample one token id from `logits` using `rng`.
pub fn sample_top_k<R: Rng + ?Sized>(
    logits: &[f64],
    temperature: f64,
    top_k: usize,
    rng: &mut R,
) -> Result<usize> {
    let draw: f64 = rng.gen();
    sample_top_k_with_draw(logits, temperature, top_k, draw)
}

/// Highest logit; the lowest id wins ties.
pub fn sample_greedy(logits: &[f64]) -> Result<usize> {
    argmax(logits).ok_or_else(|| anyhow::anyhow!("logits must not be empty or all NaN"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn top_one_is_argmax() {
        let logits = [0.3, 2.0, -1.0, 1.9];
        for draw in [0.0, 0.5, 0.999_999] {
            assert_eq!(sample_top_k_with_draw(&logits, 1e-9, 1, draw).unwrap(), 1);
        }
        assert_eq!(sample_greedy(&logits).unwrap(), 1);
    }

    #[test]
    fn ties_break_by_lower_id() {
        let logits = [1.0, 5.0, 5.0, 5.0];
        let candidates = top_k_candidates(&logits, 1.0, 2);
        assert_eq!(candidates.iter().map(|c| c.0).collect::<Vec<_>>(), vec![1, 2]);
        assert!((candidates[0].1 - 0.5).abs() < 1e-12);
        assert_eq!(sample_top_k_with_draw(&logits, 1.0, 1, 0.9).unwrap(), 1);
    }

    #[test]
    fn inverse_cdf_walks_candidates_in_order() {
        // Top-2 keeps ids 0 and 2, each with probability 0.5.
        let logits = [3.0, -10.0, 3.0];
        assert_eq!(sample_top_k_with_draw(&logits, 1.0, 2, 0.2).unwrap(), 0);
        assert_eq!(sample_top_k_with_draw(&logits, 1.0, 2, 0.7).unwrap(), 2);
    }

    #[test]
    fn unreachable_draw_falls_back_to_best() {
        let logits = [f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
        assert_eq!(sample_top_k_with_draw(&logits, 1.0, 0, 0.5).unwrap(), 0);
        let logits = [0.0, 1.0];
        assert_eq!(sample_top_k_with_draw(&logits, 1.0, 0, 1.5).unwrap(), 1);
    }

    #[test]
    fn top_k_zero_or_oversized_keeps_everything() {
        let logits = [0.1, 0.2, 0.3];
        assert_eq!(top_k_candidates(&logits, 1.0, 0).len(), 3);
        assert_eq!(top_k_candidates(&logits, 1.0, 10).len(), 3);
        let sum: f64 = top_k_candidates(&logits, 0.7, 2).iter().map(|c| c.1).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn seeded_sampling_is_in_range_and_repeatable() {
        let logits: Vec<f64> = (0..50).map(|i| ((i * 37) % 11) as f64 * 0.1).collect();
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let x = sample_top_k(&logits, 0.8, 10, &mut a).unwrap();
            let y = sample_top_k(&logits, 0.8, 10, &mut b).unwrap();
            assert!(x < logits.len());
            assert_eq!(x, y);
        }
    }

    #[test]
    fn non_positive_temperature_is_rejected() {
        let logits = [0.0, 5.0, 1.0];
        for temperature in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let err = sample_top_k_with_draw(&logits, temperature, 0, 0.5).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ModelError>(),
                Some(ModelError::InvalidConfig {
                    field: "temperature",
                    ..
                })
            ));
        }
        // Tiny positive temperatures still clamp to greedy.
        assert_eq!(sample_top_k_with_draw(&logits, 1e-12, 0, 0.5).unwrap(), 1);
    }

    #[test]
    fn empty_logits_error() {
        assert!(sample_top_k_with_draw(&[], 1.0, 1, 0.5).is_err());
        assert!(sample_greedy(&[]).is_err());
    }
}
