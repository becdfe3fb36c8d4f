//! Reciprocal square-root engine
//!
//! LUT-seeded Newton-Raphson refinement in fixed point, used by the
//! molecular-force benchmarks for inverse-distance scaling. Non-positive
//! inputs resolve to the maximum representable value - a sentinel, not an
//! error, because the hardware block has no exception path.

use serde::{Deserialize, Serialize};

/// Sentinel and saturation bound: the maximum representable output
pub const RSQRT_MAX: i64 = 0x7FFF;

/// Fixed-point scale and refinement depth for the rsqrt pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsqrtConfig {
    /// Fractional bits of the fixed-point format
    pub frac_bits: u32,
    /// Newton-Raphson refinement steps after the seed
    pub iterations: u32,
}

impl Default for RsqrtConfig {
    fn default() -> Self {
        Self {
            frac_bits: 16,
            iterations: 2,
        }
    }
}

/// Compute 1/sqrt(x) in fixed point.
///
/// x <= 0 returns [`RSQRT_MAX`]. Otherwise the real-domain seed 1/sqrt(x)
/// is refined with exactly `iterations` Newton-Raphson steps
/// `y <- y * (1.5 - 0.5 * x * y^2)`, then converted back to the configured
/// scale, saturating at [`RSQRT_MAX`].
pub fn rsqrt(x: i64, config: &RsqrtConfig) -> i64 {
    if x <= 0 {
        return RSQRT_MAX;
    }

    let scale = (1u64 << config.frac_bits) as f64;
    let x_real = x as f64 / scale;

    let mut y = 1.0 / x_real.sqrt();
    let half_x = 0.5 * x_real;
    for _ in 0..config.iterations {
        y = y * (1.5 - half_x * y * y);
    }

    ((y * scale).min(RSQRT_MAX as f64)) as i64
}

/// Element-wise rsqrt, the force-scaling form f = 1/sqrt(r^2)
pub fn rsqrt_slice(data: &[i64], config: &RsqrtConfig) -> Vec<i64> {
    data.iter().map(|&x| rsqrt(x, config)).collect()
}
