//! Dense row-major containers for operand matrices and feature-map tensors
//!
//! Deliberately minimal: the golden model needs exact index arithmetic and
//! nothing else. Matrices are created per invocation and never mutated after
//! the producing operation returns.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TritoneError};
use crate::trit::Trit;

/// Dense row-major matrix
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Matrix<T> {
    /// All-default (zero) matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }

    /// Build from a flat row-major buffer; fails on length mismatch
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(TritoneError::ShapeMismatch {
                expected: vec![rows, cols],
                actual: vec![data.len()],
            });
        }
        Ok(Self { rows, cols, data })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col] = value;
    }

    /// Borrow one row as a slice
    #[inline]
    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Flat row-major view
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Copy of the sub-block rows `r0..r1`, cols `c0..c1`
    pub fn submatrix(&self, r0: usize, r1: usize, c0: usize, c1: usize) -> Self {
        debug_assert!(r0 <= r1 && r1 <= self.rows && c0 <= c1 && c1 <= self.cols);
        let mut out = Self::zeros(r1 - r0, c1 - c0);
        for r in r0..r1 {
            for c in c0..c1 {
                out.set(r - r0, c - c0, self.get(r, c));
            }
        }
        out
    }

    /// Transposed copy
    pub fn transposed(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.set(c, r, self.get(r, c));
            }
        }
        out
    }
}

impl Matrix<i64> {
    /// Validate an integer matrix into the ternary weight domain.
    ///
    /// Fails fast with [`TritoneError::InvalidWeight`] on the first entry
    /// outside {-1, 0, +1}, before any arithmetic happens downstream.
    pub fn to_ternary(&self) -> Result<Matrix<Trit>> {
        let mut data = Vec::with_capacity(self.data.len());
        for row in 0..self.rows {
            for col in 0..self.cols {
                let value = self.get(row, col);
                let trit = Trit::from_i64(value)
                    .ok_or(TritoneError::InvalidWeight { value, row, col })?;
                data.push(trit);
            }
        }
        Matrix::from_vec(self.rows, self.cols, data)
    }

    /// Uniform random matrix in `[lo, hi]` from a caller-provided generator
    pub fn random<R: Rng>(rows: usize, cols: usize, lo: i64, hi: i64, rng: &mut R) -> Self {
        let data = (0..rows * cols).map(|_| rng.gen_range(lo..=hi)).collect();
        Self { rows, cols, data }
    }
}

impl Matrix<Trit> {
    /// Uniform random ternary matrix from a caller-provided generator
    pub fn random_ternary<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let data = (0..rows * cols).map(|_| Trit::random(rng)).collect();
        Self { rows, cols, data }
    }

    /// Widen back to an integer matrix
    pub fn to_i64(&self) -> Matrix<i64> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|t| t.as_i64()).collect(),
        }
    }
}

/// Feature-map tensor in (channels, height, width) layout, row-major
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tensor {
    channels: usize,
    height: usize,
    width: usize,
    data: Vec<i64>,
}

impl Tensor {
    /// All-zero tensor
    pub fn zeros(channels: usize, height: usize, width: usize) -> Self {
        Self {
            channels,
            height,
            width,
            data: vec![0; channels * height * width],
        }
    }

    /// Build from a flat (C, H, W) row-major buffer; fails on length mismatch
    pub fn from_vec(channels: usize, height: usize, width: usize, data: Vec<i64>) -> Result<Self> {
        if data.len() != channels * height * width {
            return Err(TritoneError::ShapeMismatch {
                expected: vec![channels, height, width],
                actual: vec![data.len()],
            });
        }
        Ok(Self {
            channels,
            height,
            width,
            data,
        })
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Shape as (channels, height, width)
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.channels, self.height, self.width)
    }

    #[inline]
    pub fn get(&self, channel: usize, y: usize, x: usize) -> i64 {
        debug_assert!(channel < self.channels && y < self.height && x < self.width);
        self.data[(channel * self.height + y) * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, channel: usize, y: usize, x: usize, value: i64) {
        debug_assert!(channel < self.channels && y < self.height && x < self.width);
        self.data[(channel * self.height + y) * self.width + x] = value;
    }

    /// Flat (C, H, W) row-major view
    #[inline]
    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    /// Uniform random tensor in `[lo, hi]` from a caller-provided generator
    pub fn random<R: Rng>(
        channels: usize,
        height: usize,
        width: usize,
        lo: i64,
        hi: i64,
        rng: &mut R,
    ) -> Self {
        let data = (0..channels * height * width)
            .map(|_| rng.gen_range(lo..=hi))
            .collect();
        Self {
            channels,
            height,
            width,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_indexing() {
        let m = Matrix::from_vec(2, 3, vec![1i64, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(m.get(0, 0), 1);
        assert_eq!(m.get(0, 2), 3);
        assert_eq!(m.get(1, 0), 4);
        assert_eq!(m.row(1), &[4, 5, 6]);
    }

    #[test]
    fn test_matrix_shape_mismatch() {
        assert!(Matrix::from_vec(2, 2, vec![1i64, 2, 3]).is_err());
    }

    #[test]
    fn test_transposed() {
        let m = Matrix::from_vec(2, 3, vec![1i64, 2, 3, 4, 5, 6]).unwrap();
        let t = m.transposed();
        assert_eq!(t.rows(), 3);
        assert_eq!(t.cols(), 2);
        assert_eq!(t.get(2, 0), 3);
        assert_eq!(t.get(0, 1), 4);
        assert_eq!(t.transposed(), m);
    }

    #[test]
    fn test_to_ternary_validates() {
        let good = Matrix::from_vec(2, 2, vec![1i64, 0, -1, 1]).unwrap();
        assert!(good.to_ternary().is_ok());

        let bad = Matrix::from_vec(2, 2, vec![1i64, 0, 2, 1]).unwrap();
        match bad.to_ternary().unwrap_err() {
            TritoneError::InvalidWeight { value, row, col } => {
                assert_eq!(value, 2);
                assert_eq!((row, col), (1, 0));
            }
            other => panic!("expected InvalidWeight, got {other:?}"),
        }
    }

    #[test]
    fn test_tensor_layout() {
        let mut t = Tensor::zeros(2, 3, 4);
        t.set(1, 2, 3, 42);
        assert_eq!(t.get(1, 2, 3), 42);
        assert_eq!(t.as_slice()[(1 * 3 + 2) * 4 + 3], 42);
        assert_eq!(t.shape(), (2, 3, 4));
    }

    #[test]
    fn test_serde_round_trip() {
        let m = Matrix::from_vec(2, 2, vec![1i64, -1, 0, 1]).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        let back: Matrix<i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
