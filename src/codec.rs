//! Balanced-ternary codec and hardware field packing
//!
//! Converts integers to/from fixed-width balanced-ternary digit sequences
//! (least-significant digit first) and packs digits into the 2-bit fields
//! used by the RTL test format.
//!
//! Two incompatible 2-bit encodings exist in the hardware and are kept as
//! two separately named codecs:
//!
//! - [`GeneralCode`] for activations/accumulators: 0→00, +1→01, -1→10, 11 invalid
//! - [`WeightCode`] for stationary weights: -1→00, 0→01, +1→10
//!
//! Never conflate them; a weight field and an activation field with the same
//! bits decode to different trits.
//!
//! # Example
//! ```
//! use tritone::codec;
//!
//! let digits = codec::encode(-75, 8).unwrap();
//! assert_eq!(codec::decode(&digits), -75);
//!
//! // 8 trits -> 16 bits -> 4 hex digits
//! assert_eq!(codec::encode_hex(0, 8).unwrap().len(), 4);
//! ```

use crate::error::{Result, TritoneError};
use crate::trit::Trit;

/// Largest magnitude representable in `width` trits: (3^width - 1) / 2
pub fn max_value(width: usize) -> i64 {
    let mut pow: i64 = 1;
    for _ in 0..width {
        pow = pow.saturating_mul(3);
    }
    (pow - 1) / 2
}

/// Encode an integer as `width` balanced-ternary digits, LSD first.
///
/// Standard balanced conversion: repeated division by 3, a remainder of 2
/// maps to digit -1 with a +1 carry into the running quotient.
///
/// Fails with [`TritoneError::Range`] when the value does not fit in
/// `width` digits.
pub fn encode(value: i64, width: usize) -> Result<Vec<Trit>> {
    let max = max_value(width);
    if value > max || value < -max {
        return Err(TritoneError::Range {
            value,
            trits: width,
            max,
        });
    }

    let mut digits = Vec::with_capacity(width);
    let mut temp = value;
    for _ in 0..width {
        match temp.rem_euclid(3) {
            0 => digits.push(Trit::Zero),
            1 => digits.push(Trit::Positive),
            _ => {
                digits.push(Trit::Negative);
                temp += 1;
            }
        }
        temp = temp.div_euclid(3);
    }
    Ok(digits)
}

/// Decode balanced-ternary digits (LSD first) back to an integer.
pub fn decode(digits: &[Trit]) -> i64 {
    let mut value: i64 = 0;
    let mut power: i64 = 1;
    for digit in digits {
        value += digit.as_i64() * power;
        power = power.saturating_mul(3);
    }
    value
}

/// 2-bit field code for general values (activations, accumulators)
///
/// 0→00, +1→01, -1→10; 11 marks an invalid field.
pub struct GeneralCode;

impl GeneralCode {
    /// Invalid field marker
    pub const INVALID: u8 = 0b11;

    /// Encode one trit as its 2-bit general field
    #[inline]
    pub const fn bits(trit: Trit) -> u8 {
        match trit {
            Trit::Zero => 0b00,
            Trit::Positive => 0b01,
            Trit::Negative => 0b10,
        }
    }

    /// Decode a 2-bit general field, None for the invalid code
    #[inline]
    pub const fn trit(bits: u8) -> Option<Trit> {
        match bits {
            0b00 => Some(Trit::Zero),
            0b01 => Some(Trit::Positive),
            0b10 => Some(Trit::Negative),
            _ => None,
        }
    }
}

/// 2-bit field code for ternary weights
///
/// -1→00, 0→01, +1→10. This deliberately differs from [`GeneralCode`];
/// the divergence is flagged for verification against the real hardware.
pub struct WeightCode;

impl WeightCode {
    /// Encode one weight as its 2-bit weight field
    #[inline]
    pub const fn bits(weight: Trit) -> u8 {
        match weight {
            Trit::Negative => 0b00,
            Trit::Zero => 0b01,
            Trit::Positive => 0b10,
        }
    }

    /// Decode a 2-bit weight field, None for the unused code 11
    #[inline]
    pub const fn trit(bits: u8) -> Option<Trit> {
        match bits {
            0b00 => Some(Trit::Negative),
            0b01 => Some(Trit::Zero),
            0b10 => Some(Trit::Positive),
            _ => None,
        }
    }
}

/// Hex width of a packed `width`-trit field: ceil(width * 2 / 4) digits
#[inline]
pub const fn hex_width(width: usize) -> usize {
    (width * 2 + 3) / 4
}

/// Pack general-code digits into an uppercase hex string for `$readmemh`.
///
/// Most-significant digit packed first; left-padded with zero bits to a
/// nibble boundary. Supports up to 63 trits (126 bits).
pub fn pack_general_hex(digits: &[Trit]) -> String {
    debug_assert!(digits.len() <= 63);
    let mut packed: u128 = 0;
    for digit in digits.iter().rev() {
        packed = (packed << 2) | GeneralCode::bits(*digit) as u128;
    }
    format!("{:0width$X}", packed, width = hex_width(digits.len()))
}

/// Encode a value directly to its packed hex field
///
/// An 8-trit value packs to 4 hex digits, a 27-trit accumulator to 14.
pub fn encode_hex(value: i64, width: usize) -> Result<String> {
    Ok(pack_general_hex(&encode(value, width)?))
}

/// Pack one weight row MSB-first with the weight code, right-padded with
/// the weight zero code to a 4-bit boundary.
pub fn pack_weight_row_hex(weights: &[Trit]) -> String {
    debug_assert!(weights.len() <= 62);
    let mut packed: u128 = 0;
    let mut bits = 0usize;
    for weight in weights {
        packed = (packed << 2) | WeightCode::bits(*weight) as u128;
        bits += 2;
    }
    while bits % 4 != 0 {
        packed = (packed << 2) | WeightCode::bits(Trit::Zero) as u128;
        bits += 2;
    }
    format!("{:0width$X}", packed, width = bits / 4)
}

/// Single weight field as a 2-character binary string ("00", "01", "10")
pub fn weight_field_bin(weight: Trit) -> String {
    format!("{:02b}", WeightCode::bits(weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_value() {
        assert_eq!(max_value(1), 1);
        assert_eq!(max_value(2), 4);
        assert_eq!(max_value(3), 13);
        // 8-trit range is ±3280
        assert_eq!(max_value(8), 3280);
    }

    #[test]
    fn test_encode_known_digits() {
        // 5 = -1*3^0 + -1*3^1 + 1*3^2
        let digits = encode(5, 3).unwrap();
        assert_eq!(digits, vec![Trit::Negative, Trit::Negative, Trit::Positive]);

        let zero = encode(0, 4).unwrap();
        assert!(zero.iter().all(|d| d.is_zero()));
    }

    #[test]
    fn test_round_trip_exhaustive_small_widths() {
        for width in 1..=6 {
            let max = max_value(width);
            for v in -max..=max {
                let digits = encode(v, width).unwrap();
                assert_eq!(digits.len(), width);
                assert_eq!(decode(&digits), v, "width={} v={}", width, v);
            }
        }
    }

    #[test]
    fn test_range_error() {
        let err = encode(3281, 8).unwrap_err();
        match err {
            crate::TritoneError::Range { value, trits, max } => {
                assert_eq!(value, 3281);
                assert_eq!(trits, 8);
                assert_eq!(max, 3280);
            }
            other => panic!("expected Range, got {other:?}"),
        }
        assert!(encode(-3281, 8).is_err());
        assert!(encode(3280, 8).is_ok());
        assert!(encode(-3280, 8).is_ok());
    }

    #[test]
    fn test_codes_are_distinct() {
        // Same trit, different field bits: the two codecs must not be unified
        assert_eq!(GeneralCode::bits(Trit::Zero), 0b00);
        assert_eq!(WeightCode::bits(Trit::Zero), 0b01);
        assert_eq!(GeneralCode::bits(Trit::Negative), 0b10);
        assert_eq!(WeightCode::bits(Trit::Negative), 0b00);
        assert_eq!(GeneralCode::bits(Trit::Positive), 0b01);
        assert_eq!(WeightCode::bits(Trit::Positive), 0b10);
    }

    #[test]
    fn test_code_round_trip() {
        for t in [Trit::Negative, Trit::Zero, Trit::Positive] {
            assert_eq!(GeneralCode::trit(GeneralCode::bits(t)), Some(t));
            assert_eq!(WeightCode::trit(WeightCode::bits(t)), Some(t));
        }
        assert_eq!(GeneralCode::trit(0b11), None);
        assert_eq!(WeightCode::trit(0b11), None);
    }

    #[test]
    fn test_hex_widths() {
        // 8 trits -> 16 bits -> 4 hex; 27 trits -> 54 bits -> 14 hex
        assert_eq!(hex_width(8), 4);
        assert_eq!(hex_width(27), 14);
        assert_eq!(encode_hex(0, 8).unwrap(), "0000");
        assert_eq!(encode_hex(0, 27).unwrap().len(), 14);
    }

    #[test]
    fn test_pack_general_hex_msd_first() {
        // digits LSD first: [+1, 0, 0, -1] -> MSD order fields 10 00 00 01
        // = 0b10000001 = 0x81
        let digits = vec![Trit::Positive, Trit::Zero, Trit::Zero, Trit::Negative];
        assert_eq!(pack_general_hex(&digits), "81");
    }

    #[test]
    fn test_pack_weight_row() {
        // [+1, -1] -> 10 00 = 0x8
        assert_eq!(pack_weight_row_hex(&[Trit::Positive, Trit::Negative]), "8");
        // Odd row pads with the weight zero code (01):
        // [+1] -> 10 01 = 0x9
        assert_eq!(pack_weight_row_hex(&[Trit::Positive]), "9");
    }

    #[test]
    fn test_weight_field_bin() {
        assert_eq!(weight_field_bin(Trit::Negative), "00");
        assert_eq!(weight_field_bin(Trit::Zero), "01");
        assert_eq!(weight_field_bin(Trit::Positive), "10");
    }
}
