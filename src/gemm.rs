//! Dense ternary GEMM built on the MAC unit, with accounting statistics
//!
//! Computes `output = activations @ weights^T` where weights are constrained
//! to {-1, 0, +1}. The per-cell accumulation order k = 0..K-1 is part of the
//! numeric contract: the systolic simulator's cycle snapshots are checked
//! against results produced in exactly this order.
//!
//! # Example
//! ```
//! use tritone::{gemm, mac::MacConfig, matrix::Matrix};
//!
//! let a = Matrix::from_vec(1, 5, vec![10, 20, -15, 0, 50]).unwrap();
//! let w = Matrix::from_vec(1, 5, vec![1, -1, 1, 0, -1]).unwrap();
//! let (out, stats) = gemm(&a, &w, &MacConfig::default()).unwrap();
//! assert_eq!(out.get(0, 0), -75);
//! assert_eq!(stats.zero_skipped, 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TritoneError};
use crate::mac::{mac, MacConfig};
use crate::matrix::Matrix;
use crate::trit::Trit;

/// MAC accounting for one GEMM invocation.
///
/// Only the two counters are stored; skip ratio and effective MAC count are
/// derived on demand and can never drift out of sync.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemmStats {
    /// M * N * K
    pub total_macs: u64,
    /// Operations skipped due to zero weights
    pub zero_skipped: u64,
}

impl GemmStats {
    /// Fraction of MACs skipped (0.0 for an empty GEMM)
    pub fn skip_ratio(&self) -> f64 {
        if self.total_macs == 0 {
            0.0
        } else {
            self.zero_skipped as f64 / self.total_macs as f64
        }
    }

    /// MACs that performed arithmetic
    pub fn effective_macs(&self) -> u64 {
        self.total_macs - self.zero_skipped
    }

    /// Fold another invocation's counters into this one (model aggregation)
    pub fn accumulate(&mut self, other: &GemmStats) {
        self.total_macs += other.total_macs;
        self.zero_skipped += other.zero_skipped;
    }
}

/// Ternary GEMM over raw integer weights.
///
/// Validates every weight entry into the ternary domain before any
/// arithmetic; fails with [`TritoneError::InvalidWeight`] otherwise.
pub fn gemm(
    activations: &Matrix<i64>,
    weights: &Matrix<i64>,
    config: &MacConfig,
) -> Result<(Matrix<i64>, GemmStats)> {
    let ternary = weights.to_ternary()?;
    gemm_ternary(activations, &ternary, config)
}

/// Ternary GEMM over pre-validated weights.
///
/// Shapes: activations (M, K), weights (N, K), output (M, N).
pub fn gemm_ternary(
    activations: &Matrix<i64>,
    weights: &Matrix<Trit>,
    config: &MacConfig,
) -> Result<(Matrix<i64>, GemmStats)> {
    if activations.cols() != weights.cols() {
        return Err(TritoneError::DimensionMismatch {
            activation_k: activations.cols(),
            weight_k: weights.cols(),
        });
    }

    let (m, k) = (activations.rows(), activations.cols());
    let n = weights.rows();

    let mut output = Matrix::zeros(m, n);
    let mut zero_skipped: u64 = 0;

    for i in 0..m {
        for j in 0..n {
            let mut acc: i64 = 0;
            // Fixed k order; do not reorder (cycle-snapshot contract)
            for kk in 0..k {
                let (next, skipped) = mac(activations.get(i, kk), weights.get(j, kk), acc, config);
                acc = next;
                if skipped {
                    zero_skipped += 1;
                }
            }
            output.set(i, j, acc);
        }
    }

    let stats = GemmStats {
        total_macs: (m * n * k) as u64,
        zero_skipped,
    };
    Ok((output, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn reference_matmul(a: &Matrix<i64>, w: &Matrix<i64>) -> Matrix<i64> {
        // Conventional integer dot product A @ W^T
        let mut out = Matrix::zeros(a.rows(), w.rows());
        for i in 0..a.rows() {
            for j in 0..w.rows() {
                let dot = (0..a.cols()).map(|k| a.get(i, k) * w.get(j, k)).sum();
                out.set(i, j, dot);
            }
        }
        out
    }

    #[test]
    fn test_documented_mac_trace() {
        // 0+10 -> -10 -> -25 -> skip -> -75
        let a = Matrix::from_vec(1, 5, vec![10, 20, -15, 0, 50]).unwrap();
        let w = Matrix::from_vec(1, 5, vec![1, -1, 1, 0, -1]).unwrap();
        let (out, stats) = gemm(&a, &w, &MacConfig::default()).unwrap();
        assert_eq!(out.get(0, 0), -75);
        assert_eq!(stats.total_macs, 5);
        assert_eq!(stats.zero_skipped, 1);
        assert_eq!(stats.effective_macs(), 4);
        assert!((stats.skip_ratio() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_matches_reference_dot_product() {
        let mut rng = StdRng::seed_from_u64(42);
        let cfg = MacConfig::default();
        for &(m, k, n) in &[(2, 2, 2), (4, 8, 4), (8, 16, 8), (3, 7, 5)] {
            let a = Matrix::random(m, k, -1000, 1000, &mut rng);
            let w = Matrix::random(n, k, -1, 1, &mut rng);
            let (out, stats) = gemm(&a, &w, &cfg).unwrap();
            assert_eq!(out, reference_matmul(&a, &w));
            assert_eq!(stats.total_macs, (m * n * k) as u64);
        }
    }

    #[test]
    fn test_zero_skip_count() {
        // zero_skipped = (number of zero weight entries) * M
        let a = Matrix::from_vec(3, 4, vec![1; 12]).unwrap();
        let w = Matrix::from_vec(2, 4, vec![0, 1, 0, -1, 0, 0, 0, 1]).unwrap();
        let (_, stats) = gemm(&a, &w, &MacConfig::default()).unwrap();
        // Row 0 has 2 zeros, row 1 has 3; each counted once per activation row
        assert_eq!(stats.zero_skipped, 3 * (2 + 3));
    }

    #[test]
    fn test_invalid_weight_rejected_before_arithmetic() {
        let a = Matrix::from_vec(1, 2, vec![1, 2]).unwrap();
        let w = Matrix::from_vec(1, 2, vec![1, 3]).unwrap();
        assert!(matches!(
            gemm(&a, &w, &MacConfig::default()),
            Err(TritoneError::InvalidWeight { value: 3, .. })
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = Matrix::<i64>::zeros(2, 3);
        let w = Matrix::<i64>::zeros(2, 4);
        assert!(matches!(
            gemm(&a, &w, &MacConfig::default()),
            Err(TritoneError::DimensionMismatch {
                activation_k: 3,
                weight_k: 4
            })
        ));
    }

    #[test]
    fn test_output_shape() {
        let a = Matrix::<i64>::zeros(5, 7);
        let w = Matrix::<i64>::zeros(3, 7);
        let (out, _) = gemm(&a, &w, &MacConfig::default()).unwrap();
        assert_eq!((out.rows(), out.cols()), (5, 3));
    }

    #[test]
    fn test_stats_serde() {
        let stats = GemmStats {
            total_macs: 100,
            zero_skipped: 25,
        };
        let json = serde_json::to_string(&stats).unwrap();
        let back: GemmStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
