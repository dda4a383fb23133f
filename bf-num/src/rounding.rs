//! Rounding-mode enumeration shared by every operation that truncates an
//! exact real value to a finite precision.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sign::Sign;

/// Which of the five IEEE-754-style directed or nearest rounding rules to
/// apply when an exact value cannot be represented at the target
/// precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::FromRepr, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
#[must_use]
pub enum RoundingMode {
    /// Round to nearest, ties to even.
    RNDN = 0,
    /// Round toward zero (truncate).
    RNDZ = 1,
    /// Round toward `+infinity`.
    RNDU = 2,
    /// Round toward `-infinity`.
    RNDD = 3,
    /// Round away from zero.
    RNDA = 4,
}

impl RoundingMode {
    /// `true` if this mode, applied to a value of the given sign, always
    /// truncates (never increases the magnitude): `RNDZ` unconditionally,
    /// `RNDD` for a non-negative result, `RNDU` for a negative one.
    #[must_use]
    pub const fn is_directed_down_for(self, sign: Sign) -> bool {
        match self {
            RoundingMode::RNDZ => true,
            RoundingMode::RNDD => !sign.is_negative(),
            RoundingMode::RNDU => sign.is_negative(),
            _ => false,
        }
    }

    /// `true` if this mode, applied to a value of the given sign, always
    /// rounds away from zero (increases the magnitude whenever the exact
    /// value isn't already representable): `RNDA` unconditionally, `RNDD`
    /// for a negative result, `RNDU` for a non-negative one.
    #[must_use]
    pub const fn is_directed_up_for(self, sign: Sign) -> bool {
        match self {
            RoundingMode::RNDA => true,
            RoundingMode::RNDU => !sign.is_negative(),
            RoundingMode::RNDD => sign.is_negative(),
            _ => false,
        }
    }

    /// Whether a directed (non-`RNDN`) mode rounds a value of the given
    /// sign up (away from zero) given that the discarded tail is nonzero
    /// (`inexact`). Must not be called with `RNDN`.
    #[must_use]
    pub const fn directed_rounds_up(self, sign: Sign, inexact: bool) -> bool {
        debug_assert!(!self.is_nearest());
        inexact && self.is_directed_up_for(sign)
    }

    /// `true` for the single mode that ties to even (`RNDN`).
    #[must_use]
    pub const fn is_nearest(self) -> bool {
        matches!(self, RoundingMode::RNDN)
    }

    /// The sign a fully-cancelled (exact-zero) sum should take under this
    /// mode when the inputs' zero signs disagree (spec.md §4.1): every mode
    /// picks `+0` except `RNDD`, which picks `-0`.
    #[must_use]
    pub const fn mixed_zero_sign(self) -> Sign {
        match self {
            RoundingMode::RNDD => Sign::Neg,
            _ => Sign::Pos,
        }
    }
}
