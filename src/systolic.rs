//! Weight-stationary systolic array timing model
//!
//! Cycle-stepped model of the R x R processing-element grid. For one K-tile,
//! the weight sub-block is loaded once and stays stationary; activations
//! enter along the west edge staggered by row index, forming a diagonal
//! wavefront: at stream cycle c, row i consumes activation column c - i when
//! that index lies in [0, K). Each PE accumulates in place with the MAC
//! unit's add/subtract/skip rule, and a snapshot of the full partial-sum
//! grid is captured every cycle.
//!
//! Per tile: (R - 1) fill + K compute + (R - 1) drain cycles. After the
//! drain the grid has converged and must equal the GEMM engine's result for
//! the same tile. That equivalence is the whole point of this module: it is
//! checked by tests, and the RTL testbench checks the hardware against the
//! same snapshots.
//!
//! Larger operands are processed by iterating R x R tiles over M, N and K in
//! row-major tile order; partial sums persist across the K tiles of one
//! (M, N) output block.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TritoneError};
use crate::mac::{mac, MacConfig};
use crate::matrix::Matrix;
use crate::trit::Trit;

/// Systolic array configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystolicConfig {
    /// PE grid dimension R (the array is R x R)
    pub array_size: usize,
    /// Model packed weight loading (20% fewer load cycles) in estimates
    pub use_packing: bool,
    /// Model DMA overlap (weight loads hidden behind compute) in estimates
    pub use_dma: bool,
}

impl Default for SystolicConfig {
    fn default() -> Self {
        Self {
            array_size: 8,
            use_packing: true,
            use_dma: true,
        }
    }
}

/// Immutable partial-sum grid captured at one simulated cycle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Stream cycle within the current tile (0-based)
    pub cycle: u64,
    /// Grid dimension R
    pub size: usize,
    /// R x R partial sums, row-major
    pub psums: Vec<i64>,
}

impl Snapshot {
    /// Partial sum at PE (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.psums[row * self.size + col]
    }
}

/// Weight-stationary R x R processing-element grid
///
/// PE (i, j) accumulates output cell (i, j) of the current tile: i indexes
/// the activation row, j the stationary weight row (output column).
pub struct SystolicArray {
    size: usize,
    mac_config: MacConfig,
    /// Stationary weights, [j][k] row-major; zero outside the loaded tile
    weights: Vec<Trit>,
    /// Valid weight rows in the loaded tile (output columns)
    n_len: usize,
    /// Valid K width of the loaded tile
    k_len: usize,
    /// Partial sums, [i][j] row-major
    psums: Vec<i64>,
    /// Stream cycle within the current tile
    cycle: u64,
}

impl SystolicArray {
    pub fn new(config: &SystolicConfig, mac_config: MacConfig) -> Self {
        let size = config.array_size;
        Self {
            size,
            mac_config,
            weights: vec![Trit::Zero; size * size],
            n_len: 0,
            k_len: 0,
            psums: vec![0; size * size],
            cycle: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Load stationary weights for one K-tile and restart the stream clock.
    ///
    /// `tile` holds up to R weight rows (output columns) by up to R weight
    /// columns (the K slice). Partial sums are NOT cleared: K tiles of the
    /// same output block accumulate into the same grid.
    pub fn load_weights(&mut self, tile: &Matrix<Trit>) -> Result<()> {
        if tile.rows() > self.size || tile.cols() > self.size {
            return Err(TritoneError::ShapeMismatch {
                expected: vec![self.size, self.size],
                actual: vec![tile.rows(), tile.cols()],
            });
        }
        self.weights.fill(Trit::Zero);
        for j in 0..tile.rows() {
            for k in 0..tile.cols() {
                self.weights[j * self.size + k] = tile.get(j, k);
            }
        }
        self.n_len = tile.rows();
        self.k_len = tile.cols();
        self.cycle = 0;
        Ok(())
    }

    /// Clear partial sums before starting a new (M, N) output block
    pub fn reset_psums(&mut self) {
        self.psums.fill(0);
    }

    /// Cycles to fully process one loaded tile: (R-1) fill + K + (R-1) drain
    pub fn cycles_per_tile(&self) -> u64 {
        (self.size - 1 + self.k_len + self.size - 1) as u64
    }

    /// Advance one cycle, streaming from the given activation tile
    /// (up to R rows by the loaded K width), and capture a snapshot.
    pub fn step(&mut self, activations: &Matrix<i64>) -> Snapshot {
        let rows = activations.rows().min(self.size);
        for i in 0..rows {
            // Diagonal wavefront: row i is i cycles behind row 0
            let k = self.cycle as i64 - i as i64;
            if k < 0 || k >= self.k_len as i64 {
                continue;
            }
            let act = activations.get(i, k as usize);
            for j in 0..self.n_len {
                let weight = self.weights[j * self.size + k as usize];
                let (next, _) = mac(act, weight, self.psums[i * self.size + j], &self.mac_config);
                self.psums[i * self.size + j] = next;
            }
        }
        self.cycle += 1;
        self.snapshot()
    }

    /// Snapshot of the current partial-sum grid
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cycle: self.cycle,
            size: self.size,
            psums: self.psums.clone(),
        }
    }

    /// Run one loaded tile to convergence, capturing every cycle
    pub fn run_tile(&mut self, activations: &Matrix<i64>) -> Vec<Snapshot> {
        let cycles = self.cycles_per_tile();
        let mut snapshots = Vec::with_capacity(cycles as usize);
        for _ in 0..cycles {
            snapshots.push(self.step(activations));
        }
        snapshots
    }
}

/// Full matrix multiply on the systolic timing model.
///
/// Tiles M, N and K by the array size in row-major tile order and writes
/// each output block's converged grid into the result. Returns the output
/// matrix and every per-cycle snapshot in stream order.
///
/// The output must equal [`crate::gemm::gemm_ternary`] for the same
/// operands; only the timing differs.
pub fn systolic_gemm(
    activations: &Matrix<i64>,
    weights: &Matrix<Trit>,
    config: &SystolicConfig,
    mac_config: &MacConfig,
) -> Result<(Matrix<i64>, Vec<Snapshot>)> {
    if activations.cols() != weights.cols() {
        return Err(TritoneError::DimensionMismatch {
            activation_k: activations.cols(),
            weight_k: weights.cols(),
        });
    }

    let (m, k) = (activations.rows(), activations.cols());
    let n = weights.rows();
    let r = config.array_size;

    let mut output = Matrix::zeros(m, n);
    let mut snapshots = Vec::new();
    let mut array = SystolicArray::new(config, *mac_config);

    for m0 in (0..m).step_by(r) {
        let m1 = (m0 + r).min(m);
        for n0 in (0..n).step_by(r) {
            let n1 = (n0 + r).min(n);
            array.reset_psums();

            for k0 in (0..k).step_by(r) {
                let k1 = (k0 + r).min(k);
                let weight_tile = weights.submatrix(n0, n1, k0, k1);
                let act_tile = activations.submatrix(m0, m1, k0, k1);
                array.load_weights(&weight_tile)?;
                snapshots.extend(array.run_tile(&act_tile));
            }

            let converged = array.snapshot();
            for i in m0..m1 {
                for j in n0..n1 {
                    output.set(i, j, converged.get(i - m0, j - n0));
                }
            }
        }
    }

    Ok((output, snapshots))
}

/// Analytic cycle estimate for one GEMM on the array
///
/// Consumed by the benchmark tooling; carries no numeric contract beyond
/// the tile arithmetic it is derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleEstimate {
    pub total_cycles: u64,
    pub active_cycles: u64,
    pub stall_cycles: u64,
    pub m_tiles: usize,
    pub n_tiles: usize,
    pub k_tiles: usize,
    pub cycles_per_tile: u64,
}

impl CycleEstimate {
    /// active / total (0.0 when nothing runs)
    pub fn utilization(&self) -> f64 {
        if self.total_cycles == 0 {
            0.0
        } else {
            self.active_cycles as f64 / self.total_cycles as f64
        }
    }
}

fn ceil_div(n: usize, d: usize) -> usize {
    n.div_ceil(d)
}

/// Estimate cycle counts for an (M, K) x (N, K) GEMM on the array.
///
/// Weight-stationary accounting: one weight-load phase per tile (20% cheaper
/// with packing), K compute cycles, R-1 drain. DMA overlap hides weight
/// loads behind compute; without it they serialize per K tile.
pub fn estimate_cycles(m: usize, n: usize, k: usize, config: &SystolicConfig) -> CycleEstimate {
    let r = config.array_size;
    let m_tiles = ceil_div(m, r);
    let n_tiles = ceil_div(n, r);
    let k_tiles = ceil_div(k, r);

    let mut weight_load = r as u64;
    if config.use_packing {
        // ceil(0.8 * R)
        weight_load = (weight_load * 4).div_ceil(5);
    }

    let drain = (r - 1) as u64;
    let cycles_per_tile = weight_load + k as u64 + drain;

    let dma_stall = if config.use_dma {
        0
    } else {
        weight_load * k_tiles as u64
    };

    let total_tiles = (m_tiles * n_tiles) as u64;
    let total_cycles = total_tiles * cycles_per_tile + dma_stall;
    let active_cycles = total_tiles * k as u64;

    CycleEstimate {
        total_cycles,
        active_cycles,
        stall_cycles: total_cycles - active_cycles,
        m_tiles,
        n_tiles,
        k_tiles,
        cycles_per_tile,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemm::gemm_ternary;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(r: usize) -> SystolicConfig {
        SystolicConfig {
            array_size: r,
            ..SystolicConfig::default()
        }
    }

    #[test]
    fn test_identity_weights_pass_through() {
        // W = I means output = activations
        let r = 4;
        let mut rng = StdRng::seed_from_u64(123);
        let a = Matrix::random(r, r, -100, 100, &mut rng);
        let mut w = Matrix::<Trit>::zeros(r, r);
        for i in 0..r {
            w.set(i, i, Trit::Positive);
        }
        let (out, _) = systolic_gemm(&a, &w, &config(r), &MacConfig::default()).unwrap();
        assert_eq!(out, a);
    }

    #[test]
    fn test_converges_to_gemm_for_all_tile_sizes() {
        let mac_config = MacConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        for &r in &[2usize, 4, 8] {
            for &(m, k, n) in &[(2, 2, 2), (4, 8, 4), (8, 8, 8), (5, 9, 7), (8, 16, 8)] {
                let a = Matrix::random(m, k, -1000, 1000, &mut rng);
                let w = Matrix::random_ternary(n, k, &mut rng);
                let (expected, _) = gemm_ternary(&a, &w, &mac_config).unwrap();
                let (out, _) = systolic_gemm(&a, &w, &config(r), &mac_config).unwrap();
                assert_eq!(out, expected, "R={} M={} K={} N={}", r, m, k, n);
            }
        }
    }

    #[test]
    fn test_snapshot_every_cycle() {
        let r = 4;
        let k = 4;
        let mut rng = StdRng::seed_from_u64(7);
        let a = Matrix::random(r, k, -50, 50, &mut rng);
        let w = Matrix::random_ternary(r, k, &mut rng);
        let (_, snapshots) = systolic_gemm(&a, &w, &config(r), &MacConfig::default()).unwrap();
        // Single tile: (R-1) + K + (R-1) snapshots, cycles numbered from 1
        assert_eq!(snapshots.len(), (r - 1) + k + (r - 1));
        for (idx, snap) in snapshots.iter().enumerate() {
            assert_eq!(snap.cycle, idx as u64 + 1);
            assert_eq!(snap.psums.len(), r * r);
        }
    }

    #[test]
    fn test_diagonal_wavefront_staggering() {
        // Single +1 weight column: PE (i, 0) first changes at cycle i + 1
        let r = 4;
        let a = Matrix::from_vec(r, 1, vec![5, 5, 5, 5]).unwrap();
        let w = Matrix::from_vec(r, 1, vec![Trit::Positive; 4]).unwrap();
        let (_, snapshots) = systolic_gemm(&a, &w, &config(r), &MacConfig::default()).unwrap();
        for i in 0..r {
            let first_active = snapshots
                .iter()
                .position(|s| s.get(i, 0) != 0)
                .expect("row never became active");
            assert_eq!(first_active, i, "row {} fill latency", i);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = Matrix::<i64>::zeros(2, 3);
        let w = Matrix::<Trit>::zeros(2, 4);
        assert!(systolic_gemm(&a, &w, &config(4), &MacConfig::default()).is_err());
    }

    #[test]
    fn test_estimate_tile_counts() {
        let est = estimate_cycles(64, 64, 64, &SystolicConfig::default());
        assert_eq!((est.m_tiles, est.n_tiles, est.k_tiles), (8, 8, 8));
        assert!(est.total_cycles > est.active_cycles);
        assert!(est.utilization() > 0.0 && est.utilization() <= 1.0);
        assert_eq!(est.stall_cycles, est.total_cycles - est.active_cycles);
    }

    #[test]
    fn test_estimate_dma_overlap_hides_loads() {
        let with_dma = estimate_cycles(64, 64, 256, &SystolicConfig::default());
        let without = estimate_cycles(
            64,
            64,
            256,
            &SystolicConfig {
                use_dma: false,
                ..SystolicConfig::default()
            },
        );
        assert!(without.total_cycles > with_dma.total_cycles);
    }

    #[test]
    fn test_snapshot_serde() {
        let snap = Snapshot {
            cycle: 3,
            size: 2,
            psums: vec![1, -2, 3, 0],
        };
        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
