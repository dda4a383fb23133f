//! The sign of a `BigFloat`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `+1` or `-1`. Every `BigFloat` carries one, including NaN (where it is
/// ignored) and the two zeros (where it is the only thing that
/// distinguishes `+0` from `-0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::FromRepr)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(i8)]
#[must_use]
pub enum Sign {
    /// Negative.
    Neg = -1,
    /// Positive.
    Pos = 1,
}

impl Sign {
    /// Flip the sign.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Sign::Neg => Sign::Pos,
            Sign::Pos => Sign::Neg,
        }
    }

    /// `true` for [`Sign::Neg`].
    #[must_use]
    pub const fn is_negative(self) -> bool {
        matches!(self, Sign::Neg)
    }

    /// As `+1`/`-1`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Combine two signs the way multiplication would.
    #[must_use]
    pub const fn mul(self, other: Sign) -> Sign {
        match (self, other) {
            (Sign::Neg, Sign::Neg) | (Sign::Pos, Sign::Pos) => Sign::Pos,
            _ => Sign::Neg,
        }
    }
}

impl core::ops::Neg for Sign {
    type Output = Sign;

    fn neg(self) -> Sign {
        self.flip()
    }
}

impl core::ops::Mul for Sign {
    type Output = Sign;

    fn mul(self, other: Sign) -> Sign {
        Sign::mul(self, other)
    }
}
