//! Fixed-point nonlinear approximation unit
//!
//! Models the LUT-driven sigmoid/tanh/exp/log block: scale the fixed-point
//! input to a real value, evaluate, then rescale and truncate into the
//! output format. The function set is fixed by the hardware ISA, hence the
//! closed enum.
//!
//! Domain edges resolve to fixed sentinels, never errors - the hardware
//! block has no exception path:
//!
//! - sigmoid: scaled input at or below -20 produces 0
//! - exp: real input clamped to [-10, 10], output clamped to 32767
//! - log: input <= 0 produces -32768

use serde::{Deserialize, Serialize};

/// Nonlinear function select
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NonlinearFn {
    Sigmoid,
    Tanh,
    Exp,
    Log,
}

/// Fixed-point quantization parameters
///
/// Defaults model the hardware unit: Q8.8 in, Q1.15 out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonlinearConfig {
    /// Fractional bits of the input format
    pub frac_bits_in: u32,
    /// Fractional bits of the output format
    pub frac_bits_out: u32,
}

impl Default for NonlinearConfig {
    fn default() -> Self {
        Self {
            frac_bits_in: 8,
            frac_bits_out: 15,
        }
    }
}

/// Sentinel for log of a non-positive input
pub const LOG_SENTINEL: i64 = -32768;

/// Exp output clamp before rescale
pub const EXP_CLAMP: f64 = 32767.0;

/// Apply one nonlinear function to a fixed-point value
pub fn apply(x: i64, func: NonlinearFn, config: &NonlinearConfig) -> i64 {
    let scale_in = (1u64 << config.frac_bits_in) as f64;
    let scale_out = (1u64 << config.frac_bits_out) as f64;
    let x_real = x as f64 / scale_in;

    match func {
        NonlinearFn::Sigmoid => {
            // Deep-negative inputs underflow to exactly 0 (stability region)
            if x_real > -20.0 {
                let y = 1.0 / (1.0 + (-x_real).exp());
                (y * scale_out) as i64
            } else {
                0
            }
        }
        NonlinearFn::Tanh => (x_real.tanh() * scale_out) as i64,
        NonlinearFn::Exp => {
            let clamped = x_real.clamp(-10.0, 10.0);
            let y = clamped.exp().min(EXP_CLAMP);
            // Rescale relative to the Q1.15 reference format
            (y * 2f64.powi(config.frac_bits_out as i32 - 15)) as i64
        }
        NonlinearFn::Log => {
            if x_real <= 0.0 {
                LOG_SENTINEL
            } else {
                (x_real.ln() * scale_out) as i64
            }
        }
    }
}

/// Apply one nonlinear function element-wise
pub fn apply_slice(data: &[i64], func: NonlinearFn, config: &NonlinearConfig) -> Vec<i64> {
    data.iter().map(|&x| apply(x, func, config)).collect()
}
