//! Dense row-major matrix of `f64`.
//!
//! Every weight matrix, activation and logit table in the crate is a [`Matrix`].
//! Vectors (biases, layer-norm scale/shift) are plain `Vec<f64>`.

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Row-major 2-D matrix. `data.len() == rows * cols` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// All-zero matrix of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, ModelError> {
        let len = element_count("zeros", rows, cols)?;
        Ok(Self {
            rows,
            cols,
            data: vec![0.0; len],
        })
    }

    /// Matrix with no rows, `cols` wide.
    pub fn empty(cols: usize) -> Self {
        Self {
            rows: 0,
            cols,
            data: Vec::new(),
        }
    }

    /// Wrap a flat row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, ModelError> {
        let context = format!("matrix buffer for {rows}x{cols}");
        let len = element_count(&context, rows, cols)?;
        if data.len() != len {
            return Err(ModelError::mismatch(context, len, data.len()));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build from nested rows; every row must have the same width.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, ModelError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(ModelError::mismatch(format!("row {i} width"), cols, row.len()));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Single-row matrix holding `values`.
    pub fn row_vector(values: Vec<f64>) -> Self {
        Self {
            rows: 1,
            cols: values.len(),
            data: values,
        }
    }

    /// Build element-by-element from `f(row, col)`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of scalars.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // `chunks(0)` panics on zero-width matrices.
        (0..self.rows).map(move |r| self.row(r))
    }

    /// Append one row; its width must match.
    pub fn push_row(&mut self, values: &[f64]) -> Result<(), ModelError> {
        if self.rows > 0 && values.len() != self.cols {
            return Err(ModelError::mismatch("appended row width", self.cols, values.len()));
        }
        if self.rows == 0 {
            self.cols = values.len();
        }
        self.data.extend_from_slice(values);
        self.rows += 1;
        Ok(())
    }

    /// Copy of the last row.
    pub fn last_row(&self) -> Option<Vec<f64>> {
        self.rows.checked_sub(1).map(|r| self.row(r).to_vec())
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Check the stored buffer agrees with the declared shape (deserialized data).
    pub fn check_consistent(&self, context: &str) -> Result<(), ModelError> {
        let len = element_count(context, self.rows, self.cols)?;
        if self.data.len() != len {
            return Err(ModelError::mismatch(
                format!("{context} buffer"),
                len,
                self.data.len(),
            ));
        }
        Ok(())
    }

    /// Fail with a descriptive error unless the shape is exactly `(rows, cols)`.
    pub fn expect_shape(&self, context: &str, rows: usize, cols: usize) -> Result<(), ModelError> {
        self.check_consistent(context)?;
        if self.rows != rows {
            return Err(ModelError::mismatch(format!("{context} rows"), rows, self.rows));
        }
        if self.cols != cols {
            return Err(ModelError::mismatch(format!("{context} cols"), cols, self.cols));
        }
        Ok(())
    }
}

/// `rows * cols`, or `ShapeOverflow` if it does not fit.
fn element_count(context: &str, rows: usize, cols: usize) -> Result<usize, ModelError> {
    rows.checked_mul(cols)
        .ok_or_else(|| ModelError::overflow(context, rows, cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_bad_length() {
        assert!(Matrix::from_vec(2, 3, vec![0.0; 5]).is_err());
        let m = Matrix::from_vec(2, 3, (0..6).map(f64::from).collect()).unwrap();
        assert_eq!(m.get(1, 2), 5.0);
        assert_eq!(m.row(1), &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn from_rows_rejects_ragged() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { .. }));
    }

    #[test]
    fn push_row_grows_and_checks_width() {
        let mut m = Matrix::empty(0);
        m.push_row(&[1.0, 2.0]).unwrap();
        m.push_row(&[3.0, 4.0]).unwrap();
        assert_eq!(m.shape(), (2, 2));
        assert!(m.push_row(&[1.0]).is_err());
        assert_eq!(m.last_row(), Some(vec![3.0, 4.0]));
    }

    #[test]
    fn expect_shape_reports_mismatch() {
        let m = Matrix::zeros(3, 4).unwrap();
        assert!(m.expect_shape("w", 3, 4).is_ok());
        assert!(m.expect_shape("w", 4, 3).is_err());
    }

    #[test]
    fn overflowing_shapes_are_errors() {
        let huge = 1usize << (usize::BITS / 2);
        assert!(matches!(
            Matrix::zeros(huge, huge),
            Err(ModelError::ShapeOverflow { .. })
        ));
        assert!(matches!(
            Matrix::from_vec(huge, huge, Vec::new()),
            Err(ModelError::ShapeOverflow { .. })
        ));
        // A deserialized matrix whose declared shape wraps to zero elements.
        let forged: Matrix =
            serde_json::from_value(serde_json::json!({"rows": huge, "cols": huge, "data": []}))
                .unwrap();
        assert!(matches!(
            forged.expect_shape("forged", huge, huge),
            Err(ModelError::ShapeOverflow { .. })
        ));
    }
}
