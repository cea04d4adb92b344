//! Elementwise and row-wise operations: residual add, bias, layer norm,
//! activations and softmax.

use serde::{Deserialize, Serialize};

use super::matrix::Matrix;
use crate::errors::ModelError;

/// Nonlinearity between dense layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Tanh approximation of GELU.
    #[default]
    Gelu,
    Relu,
}

impl Activation {
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Gelu => gelu(x),
            Activation::Relu => relu(x),
        }
    }

    /// Apply to every element in place.
    pub fn apply_in_place(self, m: &mut Matrix) {
        for x in m.as_mut_slice() {
            *x = self.apply(*x);
        }
    }
}

/// `0.5 x (1 + tanh(sqrt(2/pi) (x + 0.044715 x^3)))`
#[inline]
pub fn gelu(x: f64) -> f64 {
    const SQRT_2_OVER_PI: f64 = 0.797_884_560_802_865_4;
    0.5 * x * (1.0 + (SQRT_2_OVER_PI * (x + 0.044_715 * x * x * x)).tanh())
}

#[inline]
pub fn relu(x: f64) -> f64 {
    x.max(0.0)
}

/// `a += b` elementwise (residual connection).
pub fn add_in_place(a: &mut Matrix, b: &Matrix) -> Result<(), ModelError> {
    if a.shape() != b.shape() {
        return Err(ModelError::mismatch(
            format!("residual add {:?} + {:?}", a.shape(), b.shape()),
            a.len(),
            b.len(),
        ));
    }
    for (x, &y) in a.as_mut_slice().iter_mut().zip(b.as_slice()) {
        *x += y;
    }
    Ok(())
}

/// Add `bias` to every row.
pub fn add_bias(m: &mut Matrix, bias: &[f64]) -> Result<(), ModelError> {
    if bias.len() != m.cols() {
        return Err(ModelError::mismatch("bias length", m.cols(), bias.len()));
    }
    for r in 0..m.rows() {
        for (x, &b) in m.row_mut(r).iter_mut().zip(bias) {
            *x += b;
        }
    }
    Ok(())
}

/// Normalize one row in place: `gamma * (x - mean) / sqrt(var + eps) + beta`.
///
/// Variance is the population variance of the row.
pub fn layer_norm_row(row: &mut [f64], gamma: &[f64], beta: &[f64], eps: f64) {
    let n = row.len() as f64;
    if row.is_empty() {
        return;
    }
    let mean = row.iter().sum::<f64>() / n;
    let variance = row.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    let std = (variance + eps).sqrt();
    for ((x, &g), &b) in row.iter_mut().zip(gamma).zip(beta) {
        *x = g * ((*x - mean) / std) + b;
    }
}

/// Row-wise layer normalization with learned scale `gamma` and shift `beta`.
pub fn layer_norm(m: &mut Matrix, gamma: &[f64], beta: &[f64], eps: f64) -> Result<(), ModelError> {
    if gamma.len() != m.cols() {
        return Err(ModelError::mismatch("layer norm gamma", m.cols(), gamma.len()));
    }
    if beta.len() != m.cols() {
        return Err(ModelError::mismatch("layer norm beta", m.cols(), beta.len()));
    }
    for r in 0..m.rows() {
        layer_norm_row(m.row_mut(r), gamma, beta, eps);
    }
    Ok(())
}

/// Numerically stable softmax of one row: subtracts the row max first.
///
/// `-inf` entries receive exactly zero probability. A row that is entirely
/// `-inf` (or empty) yields all zeros rather than NaN.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let mut out = logits.to_vec();
    softmax_in_place(&mut out);
    out
}

/// In-place variant of [`softmax`].
pub fn softmax_in_place(values: &mut [f64]) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        if max == f64::INFINITY {
            // Saturated logits: split mass evenly over the +inf entries.
            let hits = values.iter().filter(|v| **v == f64::INFINITY).count() as f64;
            for v in values.iter_mut() {
                *v = if *v == f64::INFINITY { 1.0 / hits } else { 0.0 };
            }
        } else {
            values.iter_mut().for_each(|v| *v = 0.0);
        }
        return;
    }
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
}

/// Index of the largest value; the first one wins on ties. NaNs are skipped.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gelu_reference_points() {
        assert_eq!(gelu(0.0), 0.0);
        assert!((gelu(1.0) - 0.841_192).abs() < 1e-6);
        assert!((gelu(-1.0) + 0.158_808).abs() < 1e-6);
        assert!(gelu(-10.0).abs() < 1e-12);
    }

    #[test]
    fn relu_clamps_negative() {
        assert_eq!(relu(-3.0), 0.0);
        assert_eq!(relu(2.5), 2.5);
        assert_eq!(Activation::Relu.apply(-1.0), 0.0);
    }

    #[test]
    fn layer_norm_standardizes_rows() {
        let mut m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0, 4.0], vec![10.0, -10.0, 5.0, 0.0]])
            .unwrap();
        let gamma = vec![1.0; 4];
        let beta = vec![0.0; 4];
        layer_norm(&mut m, &gamma, &beta, 1e-5).unwrap();
        for row in m.iter_rows() {
            let mean = row.iter().sum::<f64>() / 4.0;
            let var = row.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-9, "mean {mean}");
            assert!((var - 1.0).abs() < 1e-4, "var {var}");
        }
    }

    #[test]
    fn layer_norm_constant_row_is_finite() {
        let mut m = Matrix::from_rows(&[vec![3.0; 8]]).unwrap();
        layer_norm(&mut m, &[1.0; 8], &[0.5; 8], 1e-5).unwrap();
        assert!(m.as_slice().iter().all(|&x| (x - 0.5).abs() < 1e-12));
    }

    #[test]
    fn layer_norm_rejects_wrong_gamma() {
        let mut m = Matrix::zeros(2, 4).unwrap();
        assert!(layer_norm(&mut m, &[1.0; 3], &[0.0; 4], 1e-5).is_err());
    }

    #[test]
    fn softmax_masks_neg_infinity() {
        let p = softmax(&[1.0, f64::NEG_INFINITY, 1.0]);
        assert_eq!(p[1], 0.0);
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn softmax_large_logits_do_not_overflow() {
        let p = softmax(&[1000.0, 1000.0, 999.0]);
        assert!(p.iter().all(|x| x.is_finite()));
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn softmax_all_masked_is_zero() {
        let p = softmax(&[f64::NEG_INFINITY; 3]);
        assert_eq!(p, vec![0.0; 3]);
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[f64::NAN, -1.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn add_in_place_checks_shape() {
        let mut a = Matrix::zeros(2, 2).unwrap();
        assert!(add_in_place(&mut a, &Matrix::zeros(2, 3).unwrap()).is_err());
    }
}
