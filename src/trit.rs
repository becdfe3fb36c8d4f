//! Trit - the balanced-ternary digit, strictly {-1, 0, +1}
//!
//! Every weight and every balanced-ternary digit in the model is a `Trit`.
//! Using a closed enum instead of raw integers makes invalid weights
//! unrepresentable past the validation boundary: the MAC unit and the
//! systolic array never need to re-check the weight domain.
//!
//! # Example
//! ```
//! use tritone::Trit;
//!
//! let w = Trit::from_i64(-1).unwrap();
//! assert!(w.is_negative());
//! assert_eq!(w.as_i64(), -1);
//!
//! // Out-of-domain values are rejected at the boundary
//! assert!(Trit::from_i64(2).is_none());
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Balanced-ternary digit / hardware weight value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum Trit {
    /// Digit -1 (subtract in the MAC datapath)
    Negative = -1,
    /// Digit 0 (zero-skip in the MAC datapath)
    #[default]
    Zero = 0,
    /// Digit +1 (add in the MAC datapath)
    Positive = 1,
}

impl Trit {
    /// Convert to i8
    #[inline]
    pub const fn as_i8(self) -> i8 {
        self as i8
    }

    /// Convert to i64
    #[inline]
    pub const fn as_i64(self) -> i64 {
        self as i8 as i64
    }

    /// Try to convert from i8, returns None for values outside {-1, 0, +1}
    #[inline]
    pub const fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Self::Negative),
            0 => Some(Self::Zero),
            1 => Some(Self::Positive),
            _ => None,
        }
    }

    /// Try to convert from i64, returns None for values outside {-1, 0, +1}
    #[inline]
    pub const fn from_i64(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Self::Negative),
            0 => Some(Self::Zero),
            1 => Some(Self::Positive),
            _ => None,
        }
    }

    /// Quantize an arbitrary integer to its sign
    #[inline]
    pub const fn from_sign(value: i64) -> Self {
        if value > 0 {
            Self::Positive
        } else if value < 0 {
            Self::Negative
        } else {
            Self::Zero
        }
    }

    /// Is this the zero digit?
    #[inline]
    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Zero)
    }

    /// Is this the -1 digit?
    #[inline]
    pub const fn is_negative(self) -> bool {
        matches!(self, Self::Negative)
    }

    /// Is this the +1 digit?
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }

    /// Draw a uniformly random trit (used for test-vector weight matrices)
    #[inline]
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        match rng.gen_range(-1i8..=1) {
            -1 => Self::Negative,
            0 => Self::Zero,
            _ => Self::Positive,
        }
    }
}

impl From<Trit> for i8 {
    fn from(t: Trit) -> i8 {
        t.as_i8()
    }
}

impl TryFrom<i8> for Trit {
    type Error = &'static str;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Trit::from_i8(value).ok_or("trit must be -1, 0, or +1")
    }
}
