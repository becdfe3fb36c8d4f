//! Reduction engine: saturating sum/abssum, selecting max/min
//!
//! Sum and abssum saturate to the signed 32-bit accumulator range instead
//! of wrapping; max and min select an existing element and never saturate.
//! The operators are commutative and associative, so the tree-structured
//! hardware reduction and a linear scan produce the identical value - only
//! their modeled latencies differ.

use serde::{Deserialize, Serialize};

/// Reduction operation select
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReduceOp {
    Sum,
    Max,
    Min,
    AbsSum,
}

/// Timing model for the same reduction value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReduceTiming {
    /// Balanced combine tree: ceil(log2 N) cycles
    Tree,
    /// Sequential scan: N - 1 cycles
    Linear,
}

/// Saturating bounds of the 32-bit reduction accumulator
const SUM_MIN: i128 = i32::MIN as i128;
const SUM_MAX: i128 = i32::MAX as i128;

/// Apply one reduction over the data.
///
/// Sums are accumulated exactly in a wide register and saturated once at
/// the end; combination order therefore cannot change the result. An empty
/// input reduces to 0.
pub fn reduce(data: &[i64], op: ReduceOp) -> i64 {
    match op {
        ReduceOp::Sum => {
            let total: i128 = data.iter().map(|&v| v as i128).sum();
            total.clamp(SUM_MIN, SUM_MAX) as i64
        }
        ReduceOp::AbsSum => {
            let total: i128 = data.iter().map(|&v| (v as i128).abs()).sum();
            total.clamp(SUM_MIN, SUM_MAX) as i64
        }
        ReduceOp::Max => data.iter().copied().max().unwrap_or(0),
        ReduceOp::Min => data.iter().copied().min().unwrap_or(0),
    }
}

/// Modeled latency in cycles for reducing `n` elements
pub fn latency_cycles(n: usize, timing: ReduceTiming) -> u32 {
    if n <= 1 {
        return 0;
    }
    match timing {
        ReduceTiming::Tree => usize::BITS - (n - 1).leading_zeros(),
        ReduceTiming::Linear => (n - 1) as u32,
    }
}
