//! Final rounding and Table Maker's Dilemma resolution (spec.md §4.4): turn
//! the accumulator `sum_raw` leaves behind into a rounded `BigFloat` and a
//! ternary indicator.

use bf_num::bigfloat::limbs_for_precision;
use bf_num::{BigFloat, Exp, Limb, Prec, RoundingMode, Sign, Ternary};

use crate::bits::{mantissa_set_bit, total_bits, window_bit};
use crate::window::{sum_raw, Window};

/// Extra bits of margin requested on the first `sum_raw` pass so that most
/// calls resolve without ever needing the TMD secondary pass.
const GUARD_BITS: Prec = 3;

/// Lower bound on how far below the rounding bit the TMD secondary window
/// reaches, and the cap on that span (spec.md's `err` bound can in
/// principle be astronomically far below; this keeps worst-case allocation
/// bounded while still covering every realistic gap).
const SECONDARY_MIN_SPAN: u32 = 64;
const SECONDARY_MAX_SPAN: u32 = 8192;

enum TmdKind {
    MachineNumber,
    Midpoint,
}

/// Run the full two-pass engine over `rn >= 3` regular `inputs`, with
/// pre-scan result `maxexp`, producing a rounded `BigFloat` at precision `p`
/// and its ternary indicator.
pub fn sum_aux(inputs: &[&BigFloat], rn: usize, maxexp: Exp, p: Prec, rnd: RoundingMode) -> (BigFloat, Ternary) {
    let mut window = Window::initial(maxexp, p, rn);
    match sum_raw(&mut window, inputs, p + GUARD_BITS) {
        crate::window::SumRawOutcome::ExactZero => (BigFloat::zero(rnd.mixed_zero_sign()), Ternary::Equal),
        crate::window::SumRawOutcome::Done { cancel, e, maxexp2 } => {
            finish(&window, inputs, cancel, e, maxexp2, p, rnd)
        }
    }
}

fn magnitude_of(window: &Window) -> (bool, Vec<Limb>) {
    let is_neg = window_bit(&window.wp, window.wq - 1);
    let mut magnitude = vec![0 as Limb; window.ws];
    if is_neg {
        bf_types::limb::neg(&mut magnitude, &window.wp);
    } else {
        magnitude.copy_from_slice(&window.wp);
    }
    (is_neg, magnitude)
}

#[allow(clippy::too_many_arguments)]
fn finish(
    window: &Window,
    inputs: &[&BigFloat],
    cancel: u32,
    e: Exp,
    maxexp2: Option<Exp>,
    p: Prec,
    rnd: RoundingMode,
) -> (BigFloat, Ternary) {
    // `sum_raw` only returns `Done` with `cancel == wq` in the degenerate
    // case where the whole accumulator is the all-ones word (value -1 at
    // this window's finest granularity) rather than true cancellation to
    // zero (which it reports as `ExactZero` instead); `sig` below is then 0
    // and the rounding path degrades gracefully to "no significant bits".
    let (is_neg, magnitude) = magnitude_of(window);
    let sign = if is_neg { Sign::Neg } else { Sign::Pos };
    let sig = window.wq - cancel;

    let round_bit_pos = (sig > p).then(|| sig - p - 1);
    let round_bit = round_bit_pos.is_some_and(|pos| window_bit(&magnitude, pos));
    let window_sticky_below = |upto: u32| (0..upto).any(|pos| window_bit(&magnitude, pos));

    let err_exp = maxexp2.map(|m| m + Exp::from(window.logn));

    // `round_bit_pos` is `None` whenever `sig <= p`: cancellation left the
    // window with no more significant bits than the target precision, so
    // there is no bit at exponent `e - p - 1` inside the window to serve as
    // a rounding bit. If `maxexp2` is `None` too, nothing was ever dropped
    // below the window and the captured value is exactly the real sum. But
    // if `maxexp2` is `Some`, a genuine nonzero tail was dropped below
    // `window.minexp` (which, when `sig <= p`, sits at or above `e - p`) and
    // its sign still has to be resolved — the original's `sum_aux` forces
    // this as the `u <= minexp` case, unconditionally treating it as a TMD
    // on a machine number so the secondary pass always runs.
    let forced_tail_tmd = round_bit_pos.is_none() && maxexp2.is_some();

    let tmd = if forced_tail_tmd {
        Some(TmdKind::MachineNumber)
    } else {
        round_bit_pos.zip(err_exp).and_then(|(round_bit_pos, err_exp)| {
            let d = (e - Exp::from(p)) - err_exp;
            if d < 2 {
                return None;
            }
            let dm1 = (d - 1) as u32;
            if round_bit_pos < dm1 {
                return None;
            }
            let start = round_bit_pos - dm1;
            let all_zero = (start..round_bit_pos).all(|pos| !window_bit(&magnitude, pos));
            let all_one = (start..round_bit_pos).all(|pos| window_bit(&magnitude, pos));
            if (!round_bit && all_zero) || (round_bit && all_one) {
                Some(TmdKind::MachineNumber)
            } else if rnd.is_nearest() && ((round_bit && all_zero) || (!round_bit && all_one)) {
                Some(TmdKind::Midpoint)
            } else {
                None
            }
        })
    };

    match tmd {
        None => {
            let sticky = round_bit_pos.is_some_and(window_sticky_below);
            round_and_build(&magnitude, sig, p, sign, round_bit, sticky, e, rnd)
        }
        Some(kind) => {
            // The ordinary (non-forced) TMD path scopes the secondary pass
            // to the tail below the rounding bit, `e - p`. The forced path
            // has no rounding bit inside the window at all: the unresolved
            // tail starts at the window's own floor, `window.minexp`.
            let top_exp = if forced_tail_tmd { window.minexp } else { e - Exp::from(p) };
            resolve_tmd(
                window,
                inputs,
                &magnitude,
                sig,
                p,
                sign,
                round_bit,
                e,
                maxexp2.expect("tmd implies maxexp2"),
                kind,
                top_exp,
                rnd,
            )
        }
    }
}

/// Round the top `p` bits of `magnitude` (an LSB-indexed window buffer with
/// `sig` significant bits) and build the final `BigFloat`.
#[allow(clippy::too_many_arguments)]
fn round_and_build(
    magnitude: &[Limb],
    sig: u32,
    p: Prec,
    sign: Sign,
    round_bit: bool,
    sticky: bool,
    e: Exp,
    rnd: RoundingMode,
) -> (BigFloat, Ternary) {
    let dst_limbs = limbs_for_precision(p);
    let mut dst = vec![0 as Limb; dst_limbs];
    let kept = p.min(sig);
    for k in 0..kept {
        let pos = sig - 1 - k;
        if window_bit(magnitude, pos) {
            mantissa_set_bit(&mut dst, k);
        }
    }

    let kept_lsb = if kept == 0 { false } else { crate::bits::mantissa_bit(&dst, kept - 1) };
    let inexact = round_bit || sticky;
    let round_up = if !inexact {
        false
    } else if rnd.is_nearest() {
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
        let padding = total_bits(dst_limbs) - p;
        let addend: Limb = 1 << padding;
        let before = dst.clone();
        if bf_types::limb::add_1(&mut dst, &before, addend) == 1 {
            for limb in dst.iter_mut() {
                *limb = 0;
            }
            *dst.last_mut().expect("precision >= 1") = 1 << (bf_types::LIMB_BITS - 1);
            carried_out = true;
        }
    }

    let ternary = if sign.is_negative() {
        magnitude_ternary.negate()
    } else {
        magnitude_ternary
    };

    let exponent = e + Exp::from(carried_out);
    let mut result = BigFloat::from_parts(sign, exponent, p, dst);
    let ternary = result.range_check(ternary);
    (result, ternary)
}

/// Resolve the Table Maker's Dilemma by running a second, narrower
/// `sum_raw` pass over the tail below `top_exp` and reading the sign of
/// what comes back (spec.md §4.4). `top_exp` is `e - p` (the ordinary case,
/// where the tail starts right below the rounding bit) or `window.minexp`
/// (the forced case, where `sig <= p` left no rounding bit inside the
/// window and the whole unresolved tail sits below the window's floor).
#[allow(clippy::too_many_arguments)]
fn resolve_tmd(
    window: &Window,
    inputs: &[&BigFloat],
    magnitude: &[Limb],
    sig: u32,
    p: Prec,
    sign: Sign,
    round_bit: bool,
    e: Exp,
    maxexp2: Exp,
    kind: TmdKind,
    top_exp: Exp,
    rnd: RoundingMode,
) -> (BigFloat, Ternary) {
    let err_exp = maxexp2 + Exp::from(window.logn);
    let wanted_span = (top_exp - err_exp).clamp(i64::from(SECONDARY_MIN_SPAN), i64::from(SECONDARY_MAX_SPAN)) as u32;
    let mut secondary = Window::secondary(top_exp, wanted_span, SECONDARY_MAX_SPAN, window.cq, window.logn);
    let sst = match sum_raw(&mut secondary, inputs, 0) {
        crate::window::SumRawOutcome::ExactZero => 0i32,
        crate::window::SumRawOutcome::Done { .. } => {
            if window_bit(&secondary.wp, secondary.wq - 1) {
                -1
            } else {
                1
            }
        }
    };

    if sst == 0 {
        // The tail is exactly zero: the candidate already resolved by
        // `round_bit` and the identical bits above it is the exact value.
        let sticky = false;
        return round_and_build(magnitude, sig, p, sign, round_bit, sticky, e, rnd);
    }

    // sst is guaranteed nonzero past the early return above.
    let ternary = match kind {
        TmdKind::MachineNumber if rnd.is_directed_down_for(sign) => Ternary::Less,
        TmdKind::MachineNumber if rnd.is_directed_up_for(sign) => Ternary::Greater,
        TmdKind::MachineNumber => {
            if sst > 0 {
                Ternary::Less
            } else {
                Ternary::Greater
            }
        }
        TmdKind::Midpoint => {
            if sst > 0 {
                Ternary::Greater
            } else {
                Ternary::Less
            }
        }
    };

    // `ternary` is the signed (sign-aware) outcome straight from the table
    // above; convert back to magnitude terms to decide which of the two
    // candidate magnitudes to emit (round up iff the emitted magnitude is
    // the larger one, which for a negative sign means the *smaller* result).
    let magnitude_ternary = if sign.is_negative() { ternary.negate() } else { ternary };
    let round_up = magnitude_ternary == Ternary::Greater;
    let _ = round_bit; // already folded into `ternary` via the TMD table above

    let dst_limbs = limbs_for_precision(p);
    let mut dst = vec![0 as Limb; dst_limbs];
    let kept = p.min(sig);
    for k in 0..kept {
        let pos = sig - 1 - k;
        if window_bit(magnitude, pos) {
            mantissa_set_bit(&mut dst, k);
        }
    }
    let mut carried_out = false;
    if round_up {
        let padding = total_bits(dst_limbs) - p;
        let addend: Limb = 1 << padding;
        let before = dst.clone();
        if bf_types::limb::add_1(&mut dst, &before, addend) == 1 {
            for limb in dst.iter_mut() {
                *limb = 0;
            }
            *dst.last_mut().expect("precision >= 1") = 1 << (bf_types::LIMB_BITS - 1);
            carried_out = true;
        }
    }
    let exponent = e + Exp::from(carried_out);
    let mut result = BigFloat::from_parts(sign, exponent, p, dst);
    let ternary = result.range_check(ternary);
    (result, ternary)
}
