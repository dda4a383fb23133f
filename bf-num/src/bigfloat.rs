//! The `BigFloat` value type: sign, kind, precision, exponent and a
//! normalised mantissa stored as little-endian limbs.

use bf_types::limb::Limb;
use bf_types::{Exp, Prec, Ternary, EMAX, EMIN, LIMB_BITS};

use crate::sign::Sign;

/// The non-sign part of a `BigFloat`'s classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::FromRepr)]
#[repr(u8)]
#[must_use]
pub enum Kind {
    /// Not a Number. Sign is meaningless.
    Nan = 0,
    /// Infinity (signed via the value's `sign` field).
    Inf = 1,
    /// Zero (signed via the value's `sign` field).
    Zero = 2,
    /// A finite, normalised, nonzero value with `precision` mantissa bits.
    Regular = 3,
}

/// Number of [`Limb`]s needed to hold `prec` mantissa bits.
#[must_use]
pub fn limbs_for_precision(prec: Prec) -> usize {
    debug_assert!(prec >= 1);
    ((prec + LIMB_BITS - 1) / LIMB_BITS) as usize
}

/// An arbitrary-precision binary floating-point number: `±0.b1 b2 ... bq *
/// 2^e` for `Regular` values, or one of the singular kinds.
///
/// Mirrors the contract a `BigFloat` collaborator exposes to the
/// summation engine (spec.md §6.1): sign, kind, precision, exponent and
/// mantissa-limb access, singular-value predicates, and the mutators the
/// engine's output needs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct BigFloat {
    sign: Sign,
    kind: Kind,
    precision: Prec,
    exponent: Exp,
    /// Little-endian limbs, normalised (top bit of the top limb set) for
    /// `Regular` values. Unused (empty) for singular kinds.
    mantissa: Vec<Limb>,
}

impl BigFloat {
    /// A positive NaN placeholder. NaN carries no meaningful sign.
    pub fn nan() -> Self {
        BigFloat {
            sign: Sign::Pos,
            kind: Kind::Nan,
            precision: 1,
            exponent: 0,
            mantissa: Vec::new(),
        }
    }

    /// `±infinity`.
    pub fn inf(sign: Sign) -> Self {
        BigFloat {
            sign,
            kind: Kind::Inf,
            precision: 1,
            exponent: 0,
            mantissa: Vec::new(),
        }
    }

    /// `±0`.
    pub fn zero(sign: Sign) -> Self {
        BigFloat {
            sign,
            kind: Kind::Zero,
            precision: 1,
            exponent: 0,
            mantissa: Vec::new(),
        }
    }

    /// A zeroed-out `Regular` placeholder at the given precision, used as
    /// an output buffer before a mutator or the summation engine fills it
    /// in. The mantissa is all-zero and therefore *not* normalised; callers
    /// must call [`BigFloat::set_exponent`] and write a normalised mantissa
    /// via [`BigFloat::mantissa_mut`] before treating the value as finished.
    pub fn new_regular_uninit(precision: Prec) -> Self {
        assert!(precision >= 1, "precision must be >= 1");
        BigFloat {
            sign: Sign::Pos,
            kind: Kind::Regular,
            precision,
            exponent: 0,
            mantissa: vec![0; limbs_for_precision(precision)],
        }
    }

    /// Construct a `Regular` value directly from its normalised limbs.
    /// `mantissa` must have length `limbs_for_precision(precision)` and its
    /// top bit set; both are checked with `debug_assert!`.
    pub fn from_parts(sign: Sign, exponent: Exp, precision: Prec, mantissa: Vec<Limb>) -> Self {
        debug_assert_eq!(mantissa.len(), limbs_for_precision(precision));
        debug_assert_ne!(mantissa.last().copied().unwrap_or(0) & top_bit_mask(precision), 0);
        BigFloat {
            sign,
            kind: Kind::Regular,
            precision,
            exponent,
            mantissa,
        }
    }

    // -- queries --------------------------------------------------------

    /// The value's sign.
    pub const fn sign(&self) -> Sign {
        self.sign
    }

    /// The value's classification.
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Binary exponent. Meaningful only for `Regular` values.
    pub const fn exponent(&self) -> Exp {
        self.exponent
    }

    /// Mantissa precision, in bits. Meaningful only for `Regular` values.
    pub const fn precision(&self) -> Prec {
        self.precision
    }

    /// Read-only view of the mantissa limbs, little-endian.
    pub fn mantissa_limbs(&self) -> &[Limb] {
        &self.mantissa
    }

    /// `true` for NaN.
    pub const fn is_nan(&self) -> bool {
        matches!(self.kind, Kind::Nan)
    }

    /// `true` for `+infinity` or `-infinity`.
    pub const fn is_inf(&self) -> bool {
        matches!(self.kind, Kind::Inf)
    }

    /// `true` for `+0` or `-0`.
    pub const fn is_zero(&self) -> bool {
        matches!(self.kind, Kind::Zero)
    }

    /// `true` for any non-`Regular` value (NaN, infinity, or zero).
    pub const fn is_singular(&self) -> bool {
        !matches!(self.kind, Kind::Regular)
    }

    /// `true` for a finite, nonzero, normalised value.
    pub const fn is_pure(&self) -> bool {
        matches!(self.kind, Kind::Regular)
    }

    // -- mutators ---------------------------------------------------------

    /// Turn this value into NaN.
    pub fn set_nan(&mut self) {
        self.kind = Kind::Nan;
        self.mantissa.clear();
    }

    /// Turn this value into `±infinity`.
    pub fn set_inf_with_sign(&mut self, sign: Sign) {
        self.kind = Kind::Inf;
        self.sign = sign;
        self.mantissa.clear();
    }

    /// Turn this value into `±0`.
    pub fn set_zero_with_sign(&mut self, sign: Sign) {
        self.kind = Kind::Zero;
        self.sign = sign;
        self.mantissa.clear();
    }

    /// Overwrite the exponent. Only meaningful once the value is `Regular`.
    pub fn set_exponent(&mut self, e: Exp) {
        self.exponent = e;
    }

    /// Overwrite the sign, independent of kind.
    pub fn set_sign(&mut self, sign: Sign) {
        self.sign = sign;
    }

    /// A writable view over the mantissa limbs, sized for this value's
    /// precision. Allocates a zeroed buffer on first use if this value
    /// hadn't been initialised as `Regular` yet.
    pub fn mantissa_mut(&mut self) -> &mut [Limb] {
        if self.mantissa.len() != limbs_for_precision(self.precision) {
            self.mantissa = vec![0; limbs_for_precision(self.precision)];
        }
        self.kind = Kind::Regular;
        &mut self.mantissa
    }

    /// Clamp the exponent of a `Regular` value to `[EMIN, EMAX]`, turning
    /// the value into a correctly-signed infinity (overflow) or zero
    /// (underflow) if it falls outside that range, and adjusting `ternary`
    /// to stay consistent with the clamp. No-op (returns `ternary`
    /// unchanged) for singular values or exponents already in range.
    pub fn range_check(&mut self, ternary: Ternary) -> Ternary {
        if !self.is_pure() {
            return ternary;
        }
        if self.exponent > EMAX {
            let sign = self.sign;
            self.set_inf_with_sign(sign);
            return match sign {
                Sign::Pos => Ternary::Greater,
                Sign::Neg => Ternary::Less,
            };
        }
        if self.exponent < EMIN {
            let sign = self.sign;
            self.set_zero_with_sign(sign);
            return match sign {
                Sign::Pos => Ternary::Less,
                Sign::Neg => Ternary::Greater,
            };
        }
        ternary
    }
}

/// Mask selecting the normalisation bit: the mantissa is stored
/// top-justified (`b1` is always the top bit of the top limb; any padding
/// implied by a precision that isn't a multiple of [`LIMB_BITS`] lives as
/// zero bits at the bottom of the lowest limb), so this is precision
/// independent.
fn top_bit_mask(_precision: Prec) -> Limb {
    1 << (LIMB_BITS - 1)
}

#[allow(dead_code)]
fn assert_normalised(mantissa: &[Limb], precision: Prec) {
    debug_assert_eq!(mantissa.len(), limbs_for_precision(precision));
    debug_assert_ne!(mantissa.last().copied().unwrap_or(0) & top_bit_mask(precision), 0);
}
