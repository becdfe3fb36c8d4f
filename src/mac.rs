//! Single ternary multiply-accumulate step with zero-skip
//!
//! The hardware MAC never multiplies: the ternary weight selects between
//! add, subtract, and skip. A zero weight performs no arithmetic at all and
//! reports the skip so callers can account for it.
//!
//! Weight-domain validation does not happen here. Weights are [`Trit`], so an
//! invalid value cannot reach this unit; raw integers must be validated at
//! the boundary (see `Matrix::to_ternary`).

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::trit::Trit;

/// Precision configuration for the MAC datapath, in trits.
///
/// Passed explicitly to every call so multiple widths can coexist in one
/// test run; there are no module-level width constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacConfig {
    /// Activation word width (8 trits: range ±3280)
    pub activation_trits: usize,
    /// Accumulator word width (27 trits)
    pub accumulator_trits: usize,
}

impl Default for MacConfig {
    fn default() -> Self {
        Self {
            activation_trits: 8,
            accumulator_trits: 27,
        }
    }
}

impl MacConfig {
    /// Largest representable activation magnitude
    pub fn activation_max(&self) -> i64 {
        codec::max_value(self.activation_trits)
    }

    /// Largest representable accumulator magnitude
    pub fn accumulator_max(&self) -> i64 {
        codec::max_value(self.accumulator_trits)
    }
}

/// One ternary MAC step: returns the new accumulator and whether the
/// operation was skipped due to a zero weight.
///
/// The accumulator saturates at the configured width instead of wrapping.
#[inline]
pub fn mac(activation: i64, weight: Trit, accumulator: i64, config: &MacConfig) -> (i64, bool) {
    match weight {
        Trit::Zero => (accumulator, true),
        Trit::Positive => (saturate(accumulator + activation, config), false),
        Trit::Negative => (saturate(accumulator - activation, config), false),
    }
}

#[inline]
fn saturate(value: i64, config: &MacConfig) -> i64 {
    let max = config.accumulator_max();
    value.clamp(-max, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_rules() {
        let cfg = MacConfig::default();
        assert_eq!(mac(10, Trit::Positive, 5, &cfg), (15, false));
        assert_eq!(mac(10, Trit::Negative, 5, &cfg), (-5, false));
        assert_eq!(mac(10, Trit::Zero, 5, &cfg), (5, true));
    }

    #[test]
    fn test_zero_skip_performs_no_arithmetic() {
        let cfg = MacConfig::default();
        // Skip leaves even an out-of-range accumulator untouched
        let big = cfg.accumulator_max() + 1000;
        assert_eq!(mac(10, Trit::Zero, big, &cfg), (big, true));
    }

    #[test]
    fn test_saturation() {
        let cfg = MacConfig {
            activation_trits: 8,
            accumulator_trits: 3, // range ±13
        };
        assert_eq!(mac(10, Trit::Positive, 10, &cfg), (13, false));
        assert_eq!(mac(10, Trit::Negative, -10, &cfg), (-13, false));
    }

    #[test]
    fn test_trace_from_pe_vectors() {
        // The PE stimulus sequence: weight +1 over [10, 20, -15, 0, 50]
        let cfg = MacConfig::default();
        let mut acc = 0;
        for act in [10, 20, -15, 0, 50] {
            let (next, _) = mac(act, Trit::Positive, acc, &cfg);
            acc = next;
        }
        assert_eq!(acc, 65);
    }
}
