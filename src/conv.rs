//! Convolution lowering: im2col / col2im reshaping
//!
//! Lowers a (C, H, W) feature map to the column matrix consumed by the GEMM
//! engine. Zero-padding is applied first; patches are extracted in row-major
//! output order (output row outer, output column inner), and each column is
//! the patch flattened channel-major, then patch-row, then patch-column.
//!
//! `col2im` is the exact inverse reshape of already-computed output columns;
//! no padding removal is involved.

use crate::error::{Result, TritoneError};
use crate::matrix::{Matrix, Tensor};

/// Output spatial dimensions of a convolution
pub fn output_dims(
    height: usize,
    width: usize,
    kernel: usize,
    stride: usize,
    padding: usize,
) -> (usize, usize) {
    let oh = (height + 2 * padding - kernel) / stride + 1;
    let ow = (width + 2 * padding - kernel) / stride + 1;
    (oh, ow)
}

/// Lower a (C, H, W) tensor to columns of shape (C * kernel^2, OH * OW)
pub fn im2col(input: &Tensor, kernel: usize, stride: usize, padding: usize) -> Matrix<i64> {
    let (c, h, w) = input.shape();
    let (oh, ow) = output_dims(h, w, kernel, stride, padding);

    let mut col = Matrix::zeros(c * kernel * kernel, oh * ow);

    for oy in 0..oh {
        for ox in 0..ow {
            let col_idx = oy * ow + ox;
            let y0 = (oy * stride) as i64 - padding as i64;
            let x0 = (ox * stride) as i64 - padding as i64;
            // Channel-major, then patch-row, then patch-column
            for ch in 0..c {
                for ky in 0..kernel {
                    for kx in 0..kernel {
                        let y = y0 + ky as i64;
                        let x = x0 + kx as i64;
                        let value = if y >= 0 && y < h as i64 && x >= 0 && x < w as i64 {
                            input.get(ch, y as usize, x as usize)
                        } else {
                            0 // zero padding
                        };
                        let row_idx = (ch * kernel + ky) * kernel + kx;
                        col.set(row_idx, col_idx, value);
                    }
                }
            }
        }
    }

    col
}

/// Reshape an (OC, OH * OW) column matrix back to an (OC, OH, OW) tensor
pub fn col2im(col: &Matrix<i64>, channels: usize, height: usize, width: usize) -> Result<Tensor> {
    if col.rows() != channels || col.cols() != height * width {
        return Err(TritoneError::ShapeMismatch {
            expected: vec![channels, height * width],
            actual: vec![col.rows(), col.cols()],
        });
    }

    let mut out = Tensor::zeros(channels, height, width);
    for ch in 0..channels {
        for y in 0..height {
            for x in 0..width {
                out.set(ch, y, x, col.get(ch, y * width + x));
            }
        }
    }
    Ok(out)
}
