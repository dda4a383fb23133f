//! Single left-to-right pass classifying special values and locating the
//! regular inputs the rest of the dispatcher needs (spec.md §4.1;
//! SPEC_FULL.md §2 — one combined pass rather than a re-scan per fast
//! path).

use bf_num::{BigFloat, Exp, Kind, RoundingMode, Sign};

/// Outcome of scanning the input list once.
pub enum Classification<'a> {
    /// At least one NaN, or infinities of opposite sign, were present.
    Nan,
    /// No NaN, and every infinity present shares this sign.
    Inf(Sign),
    /// No NaN, no infinity, and every input was a zero.
    AllZero(Sign),
    /// At least one regular (finite, nonzero) input.
    Regular {
        /// Maximum exponent among the regular inputs.
        maxexp: Exp,
        /// Count of regular inputs.
        rn: usize,
        /// The first regular input encountered (used by the `rn <= 2` fast
        /// paths).
        first: &'a BigFloat,
        /// The second regular input encountered, if `rn >= 2`.
        second: Option<&'a BigFloat>,
    },
}

/// Scan `inputs` once, classifying special values and tracking the data the
/// `rn <= 2` fast paths and the general `sum_aux` path both need.
pub fn prescan<'a>(inputs: &[&'a BigFloat], rnd: RoundingMode) -> Classification<'a> {
    let mut saw_nan = false;
    let mut inf_sign: Option<Sign> = None;
    let mut mixed_inf = false;
    let mut sign_zero: Option<Sign> = None;
    let mut mixed_zero_forced = false;
    let mut maxexp: Option<Exp> = None;
    let mut rn = 0usize;
    let mut first: Option<&BigFloat> = None;
    let mut second: Option<&BigFloat> = None;

    for &x in inputs {
        match x.kind() {
            Kind::Nan => saw_nan = true,
            Kind::Inf => match inf_sign {
                None => inf_sign = Some(x.sign()),
                Some(s) if s != x.sign() => mixed_inf = true,
                Some(_) => {}
            },
            Kind::Zero => {
                if mixed_zero_forced {
                    // Already forced by an earlier sign mismatch; the spec's
                    // `sign_zero = rnd == MPFR_RNDD ? -1 : 1` is a one-shot
                    // assignment, not re-derived on every subsequent zero.
                } else {
                    match sign_zero {
                        None => sign_zero = Some(x.sign()),
                        Some(s) if s != x.sign() => {
                            sign_zero = Some(rnd.mixed_zero_sign());
                            mixed_zero_forced = true;
                        }
                        Some(_) => {}
                    }
                }
            }
            Kind::Regular => {
                rn += 1;
                maxexp = Some(maxexp.map_or(x.exponent(), |m| m.max(x.exponent())));
                if first.is_none() {
                    first = Some(x);
                } else if second.is_none() {
                    second = Some(x);
                }
            }
        }
    }

    if saw_nan || mixed_inf {
        return Classification::Nan;
    }
    if let Some(s) = inf_sign {
        return Classification::Inf(s);
    }
    if rn == 0 {
        return Classification::AllZero(sign_zero.unwrap_or(Sign::Pos));
    }
    Classification::Regular {
        maxexp: maxexp.expect("rn > 0 implies at least one regular exponent"),
        rn,
        first: first.expect("rn > 0 implies `first` was set"),
        second,
    }
}
