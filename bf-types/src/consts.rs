//! Shared exponent/precision typedefs and library-wide range constants.

use crate::Limb;

/// Binary exponent, signed, wide enough that `maxexp + logn` never overflows
/// for any `rn` representable in a `usize`.
pub type Exp = i64;

/// Mantissa precision, in bits. Always `>= 1`.
pub type Prec = u32;

/// Width, in bits, of a single [`crate::Limb`].
pub const LIMB_BITS: u32 = Limb::BITS;

/// Smallest exponent a regular (non-singular) [`crate::Limb`]-backed value
/// may carry. Mirrors the library-wide `EMIN` a `BigFloat` collaborator
/// would enforce via its range-check operation.
pub const EMIN: Exp = -(1 << 30);

/// Largest exponent a regular value may carry.
pub const EMAX: Exp = (1 << 30) - 1;

/// Sentinel used internally for "no regular exponent seen yet" before it is
/// modelled as an `Option<Exp>` at the interface (spec Design Notes §9).
pub const EXP_MIN_SENTINEL: Exp = EMIN - 1;
