//! The two operations the summation engine's small-`n` fast paths call
//! directly instead of spinning up the general accumulator: "copy with
//! rounding" (`round_to_precision`, used when exactly one input is
//! regular) and a two-argument add (`add_rounded`, used when exactly two
//! are). Grounded on the `(result, overflow)`-returning primitive shape of
//! `fuel-vm`'s `interpreter/alu/muldiv.rs`.
//!
//! Both are scoped, self-contained `BigFloat` arithmetic — the spec treats
//! this crate's whole value type as an external collaborator of the
//! summation engine, so these don't reuse `bf-sum`'s window machinery.
//! `add_rounded` sizes its accumulator window from the target precision
//! plus a fixed guard, not from the operands' precisions or exponent gap,
//! so it stays exact for all but astronomically rare round-to-nearest
//! ties that would need more than 64 guard bits to resolve — adequate for
//! a two-term add, unlike the arbitrary-`n` case `bf-sum` has to solve
//! exactly (spec.md §1 scopes that exactness requirement at the `sum`
//! entry point, not at this collaborator).

use bf_types::bits::{mantissa_bit, mantissa_set_bit, total_bits, window_bit, window_set_bit};
use bf_types::limb::Limb;
use bf_types::{Exp, Prec, Ternary, LIMB_BITS};

use crate::bigfloat::{limbs_for_precision, BigFloat, Kind};
use crate::rounding::RoundingMode;
use crate::sign::Sign;

fn leading_zero_bits(buf: &[Limb]) -> u32 {
    let mut count = 0u32;
    for i in (0..buf.len()).rev() {
        if buf[i] == 0 {
            count += LIMB_BITS;
        } else {
            count += bf_types::limb::leading_zeros(buf[i]);
            break;
        }
    }
    count
}

/// Round a top-justified mantissa of `src_prec` significant bits to
/// `target_prec` bits under `rnd`, given the sign the rounded magnitude
/// will carry and whether a nonzero tail already known to exist outside
/// `src` (`extra_sticky`) must be folded into the sticky bit.
///
/// Returns the rounded mantissa (sized for `target_prec`), whether
/// rounding carried out of the top (the caller must bump the exponent by
/// one when it did), and the ternary value of the rounding *of this
/// magnitude* combined with `sign`.
fn round_mantissa(
    src: &[Limb],
    src_prec: Prec,
    target_prec: Prec,
    sign: Sign,
    rnd: RoundingMode,
    extra_sticky: bool,
) -> (Vec<Limb>, bool, Ternary) {
    let dst_limbs = limbs_for_precision(target_prec);
    let mut dst = vec![0 as Limb; dst_limbs];
    let kept = target_prec.min(src_prec);
    for k in 0..kept {
        if mantissa_bit(src, k) {
            mantissa_set_bit(&mut dst, k);
        }
    }

    let round_bit = target_prec < src_prec && mantissa_bit(src, target_prec);
    let mut sticky = extra_sticky;
    if target_prec < src_prec {
        for k in (target_prec + 1)..src_prec {
            if mantissa_bit(src, k) {
                sticky = true;
                break;
            }
        }
    }
    let kept_lsb = mantissa_bit(&dst, kept - 1);
    let inexact = round_bit || sticky;

    let round_up = if !inexact {
        false
    } else if rnd.is_nearest() {
        // Ties (round_bit && !sticky) round to even; anything past the
        // halfway point (sticky set) always rounds up.
        round_bit && (sticky || kept_lsb)
    } else {
        rnd.directed_rounds_up(sign, true)
    };

    let magnitude_ternary = if !inexact {
        Ternary::Equal
    } else if round_up {
        Ternary::Greater
    } else {
        Ternary::Less
    };

    let mut carried_out = false;
    if round_up {
        let padding = total_bits(dst_limbs) - target_prec;
        let addend: Limb = 1 << padding;
        let before = dst.clone();
        if bf_types::limb::add_1(&mut dst, &before, addend) == 1 {
            for limb in dst.iter_mut() {
                *limb = 0;
            }
            *dst.last_mut().expect("precision >= 1") = 1 << (LIMB_BITS - 1);
            carried_out = true;
        }
    }

    let ternary = if sign.is_negative() {
        magnitude_ternary.negate()
    } else {
        magnitude_ternary
    };
    (dst, carried_out, ternary)
}

/// Copy `x` to a new `BigFloat` rounded to `target_prec` under `rnd`. The
/// `rn == 1` fast path of the summation dispatcher (spec.md §4.1).
pub fn round_to_precision(x: &BigFloat, target_prec: Prec, rnd: RoundingMode) -> (BigFloat, Ternary) {
    match x.kind() {
        Kind::Nan => (BigFloat::nan(), Ternary::Equal),
        Kind::Inf => (BigFloat::inf(x.sign()), Ternary::Equal),
        Kind::Zero => (BigFloat::zero(x.sign()), Ternary::Equal),
        Kind::Regular => {
            let (mantissa, carried_out, ternary) = round_mantissa(
                x.mantissa_limbs(),
                x.precision(),
                target_prec,
                x.sign(),
                rnd,
                false,
            );
            let exponent = x.exponent() + Exp::from(carried_out);
            let mut result = BigFloat::from_parts(x.sign(), exponent, target_prec, mantissa);
            let ternary = result.range_check(ternary);
            (result, ternary)
        }
    }
}

/// Fold one regular operand's contribution into a two's-complement window
/// accumulator, the same shape `bf-sum`'s `sum_raw` uses for arbitrary `n`
/// (spec.md §4.3), specialised to a single term.
fn accumulate(wp: &mut [Limb], minexp: Exp, wq: u32, x: &BigFloat, below_window: &mut bool) {
    let e = x.exponent();
    if e <= minexp {
        *below_window = true;
        return;
    }
    let q = x.precision();
    let mantissa = x.mantissa_limbs();
    let ws = wp.len();
    let mut contrib = vec![0 as Limb; ws];
    let mut truncated = false;
    for k in 1..=q {
        if !mantissa_bit(mantissa, k - 1) {
            continue;
        }
        let bit_exp = e - Exp::from(k);
        let pos = bit_exp - minexp;
        if pos < 0 {
            truncated = true;
            continue;
        }
        if pos as u64 >= u64::from(wq) {
            continue;
        }
        window_set_bit(&mut contrib, pos as u32);
    }
    if truncated {
        *below_window = true;
    }
    let mut delta = vec![0 as Limb; ws];
    if x.sign().is_negative() {
        bf_types::limb::neg(&mut delta, &contrib);
    } else {
        delta.copy_from_slice(&contrib);
    }
    let before = wp.to_vec();
    bf_types::limb::add_n(wp, &before, &delta);
}

const PAIR_ADD_CQ: u32 = 2;
const PAIR_ADD_GUARD: u32 = 64;

fn exact_add_two(a: &BigFloat, b: &BigFloat, target_prec: Prec, rnd: RoundingMode) -> (BigFloat, Ternary) {
    let wq_bits = target_prec + PAIR_ADD_CQ + PAIR_ADD_GUARD;
    let ws = limbs_for_precision(wq_bits);
    let wq = total_bits(ws);
    let mut minexp = a.exponent().max(b.exponent()) + Exp::from(PAIR_ADD_CQ) - Exp::from(wq);

    // Mirrors `bf-sum::window::sum_raw`'s "jump window down" step: if the
    // window captures an exact zero but a nonzero tail was truncated below
    // it, that tail is the real (tiny, nonzero) sum and its sign still has
    // to be resolved, not discarded as if it were `+0`/`-0`. Re-accumulate
    // one window-width further down and look again; this terminates because
    // `a` and `b` each have a finite lowest mantissa bit, so only finitely
    // many window-widths can separate `minexp` from it.
    loop {
        let mut wp = vec![0 as Limb; ws];
        let mut below_window = false;
        accumulate(&mut wp, minexp, wq, a, &mut below_window);
        accumulate(&mut wp, minexp, wq, b, &mut below_window);

        let is_neg = window_bit(&wp, wq - 1);
        let mut magnitude = vec![0 as Limb; ws];
        if is_neg {
            bf_types::limb::neg(&mut magnitude, &wp);
        } else {
            magnitude.copy_from_slice(&wp);
        }

        if magnitude.iter().all(|&l| l == 0) {
            if !below_window {
                return (BigFloat::zero(rnd.mixed_zero_sign()), Ternary::Equal);
            }
            minexp -= Exp::from(wq);
            continue;
        }

        let cancel = leading_zero_bits(&magnitude);
        let e_result = minexp + Exp::from(wq) - Exp::from(cancel);
        let src_prec = wq - cancel;
        let src_limbs = limbs_for_precision(src_prec);
        let mut pseudo = vec![0 as Limb; src_limbs];
        for k in 0..src_prec {
            let window_pos = (wq - cancel) - 1 - k;
            if window_bit(&magnitude, window_pos) {
                mantissa_set_bit(&mut pseudo, k);
            }
        }

        let sign = if is_neg { Sign::Neg } else { Sign::Pos };
        let (mantissa, carried_out, ternary) =
            round_mantissa(&pseudo, src_prec, target_prec, sign, rnd, below_window);
        let exponent = e_result + Exp::from(carried_out);
        let mut result = BigFloat::from_parts(sign, exponent, target_prec, mantissa);
        let ternary = result.range_check(ternary);
        return (result, ternary);
    }
}

/// Correctly-rounded `a + b` at `target_prec`. The `rn == 2` fast path of
/// the summation dispatcher (spec.md §4.1).
pub fn add_rounded(a: &BigFloat, b: &BigFloat, target_prec: Prec, rnd: RoundingMode) -> (BigFloat, Ternary) {
    if a.is_nan() || b.is_nan() {
        return (BigFloat::nan(), Ternary::Equal);
    }
    match (a.is_inf(), b.is_inf()) {
        (true, true) if a.sign() == b.sign() => return (BigFloat::inf(a.sign()), Ternary::Equal),
        (true, true) => return (BigFloat::nan(), Ternary::Equal),
        (true, false) => return (BigFloat::inf(a.sign()), Ternary::Equal),
        (false, true) => return (BigFloat::inf(b.sign()), Ternary::Equal),
        (false, false) => {}
    }
    if a.is_zero() && b.is_zero() {
        let sign = if a.sign() == b.sign() { a.sign() } else { rnd.mixed_zero_sign() };
        return (BigFloat::zero(sign), Ternary::Equal);
    }
    if a.is_zero() {
        return round_to_precision(b, target_prec, rnd);
    }
    if b.is_zero() {
        return round_to_precision(a, target_prec, rnd);
    }
    exact_add_two(a, b, target_prec, rnd)
}
