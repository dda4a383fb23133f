//! The IEEE-style "less / equal / greater" rounding indicator shared by
//! every operation in the workspace that rounds an exact value to a
//! finite precision.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sign of `rounded_result - exact_result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[must_use]
pub enum Ternary {
    /// The returned value is less than the exact value.
    Less = -1,
    /// The returned value equals the exact value: rounding was exact.
    Equal = 0,
    /// The returned value is greater than the exact value.
    Greater = 1,
}

impl Ternary {
    /// As the conventional `{-1, 0, 1}` integer encoding.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Ternary::Less => -1,
            Ternary::Equal => 0,
            Ternary::Greater => 1,
        }
    }

    /// Build a `Ternary` from a `{-1, 0, 1}` value. Any other input is a
    /// logic error in the caller.
    #[must_use]
    pub fn from_i32(v: i32) -> Self {
        match v.signum() {
            -1 => Ternary::Less,
            0 => Ternary::Equal,
            1 => Ternary::Greater,
            _ => unreachable!(),
        }
    }

    /// Flip the direction: `Less <-> Greater`, `Equal` unchanged. Used when
    /// a computation is carried out on the absolute value of a negative
    /// sum and the sign must be folded back in.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Ternary::Less => Ternary::Greater,
            Ternary::Equal => Ternary::Equal,
            Ternary::Greater => Ternary::Less,
        }
    }

    /// `true` if rounding was exact.
    #[must_use]
    pub const fn is_exact(self) -> bool {
        matches!(self, Ternary::Equal)
    }
}

impl core::ops::Neg for Ternary {
    type Output = Ternary;

    fn neg(self) -> Ternary {
        self.negate()
    }
}
