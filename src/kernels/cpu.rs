//! CPU matrix multiplication kernels.

#![allow(clippy::needless_range_loop)]

use rayon::prelude::*;

use super::matrix::Matrix;
use crate::errors::ModelError;

/// Below this many output scalars the rayon fan-out costs more than it saves.
const PARALLEL_THRESHOLD: usize = 4096;

/// `a [m, k] @ b [k, n] -> [m, n]`, parallel over output rows.
///
/// Each output element is accumulated over `k` in ascending order regardless of
/// how rows are scheduled, so results are bit-reproducible.
pub fn mat_mul(a: &Matrix, b: &Matrix) -> Result<Matrix, ModelError> {
    if a.cols() != b.rows() {
        return Err(ModelError::mismatch(
            format!(
                "mat_mul [{}x{}] @ [{}x{}]",
                a.rows(),
                a.cols(),
                b.rows(),
                b.cols()
            ),
            a.cols(),
            b.rows(),
        ));
    }
    let (m, n) = (a.rows(), b.cols());
    let mut out = Matrix::zeros(m, n)?;
    if n == 0 {
        return Ok(out);
    }

    let kernel = |(row, out_row): (usize, &mut [f64])| mat_mul_row(a.row(row), b, out_row);
    if m * n >= PARALLEL_THRESHOLD {
        out.as_mut_slice()
            .par_chunks_mut(n)
            .enumerate()
            .for_each(kernel);
    } else {
        out.as_mut_slice().chunks_mut(n).enumerate().for_each(kernel);
    }
    Ok(out)
}

/// One output row: `out = lhs_row @ b`, accumulated in k-major order.
#[inline]
fn mat_mul_row(lhs_row: &[f64], b: &Matrix, out: &mut [f64]) {
    for (k, &x) in lhs_row.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        let b_row = b.row(k);
        for j in 0..out.len() {
            out[j] += x * b_row[j];
        }
    }
}

/// Dense layer: `x @ weight + bias` (bias broadcast over rows).
pub fn linear(x: &Matrix, weight: &Matrix, bias: Option<&[f64]>) -> Result<Matrix, ModelError> {
    let mut out = mat_mul(x, weight)?;
    if let Some(bias) = bias {
        super::ops::add_bias(&mut out, bias)?;
    }
    Ok(out)
}
