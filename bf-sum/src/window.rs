//! The two's-complement bit window that stands in for the exact partial sum
//! (spec.md §3, §4.2, §4.3), and `sum_raw`, the iterative block-accumulation
//! engine built on top of it.
//!
//! The inner loop is modelled as the small state machine spec.md's Design
//! Notes (§9) ask for — `Accumulate-block -> Classify -> (Return |
//! Shift-and-reiterate | Jump-window-down)` — rather than the unfinished
//! `while (0)` draft the loop could otherwise mimic. Unlike the reference
//! engine, each iteration re-derives the block from the inputs rather than
//! incrementally shifting the previous accumulator in place; this trades the
//! reference engine's O(1)-amortised shift for an accumulator whose value is
//! always a direct, easily-checked function of `(minexp, top_exp)`, at the
//! cost of rescanning inputs on every shift/jump iteration (bounded, since
//! each iteration strictly decreases `minexp`).

use bf_num::{BigFloat, Exp, Limb, Prec};

use crate::bits::{count_cancel, mantissa_bit, total_bits, window_bit, window_set_bit};

/// The accumulator and the exponent bookkeeping `sum_raw` mutates as it
/// iterates.
#[derive(Debug)]
pub struct Window {
    /// `ws`-limb two's-complement accumulator, LSB-indexed.
    pub wp: Vec<Limb>,
    /// Number of limbs in `wp`.
    pub ws: usize,
    /// `ws * W`: total bit width of the accumulator.
    pub wq: u32,
    /// Binary exponent of the accumulator's least-significant bit.
    pub minexp: Exp,
    /// Exclusive upper bound on the exponent of a bit this window may ever
    /// hold (spec.md's `maxexp`, the "block's top"). Bits at or above this
    /// exponent are outside the block currently being summed and are
    /// dropped rather than accumulated.
    pub top_exp: Exp,
    /// Carry-margin guard bits (`logn + 1`).
    pub cq: u32,
    /// `ceil(log2(rn))`.
    pub logn: u32,
}

impl Window {
    /// Build the initial window for a pass over `rn` regular inputs whose
    /// maximum exponent is `maxexp`, sized for output precision `p`
    /// (spec.md §4.2).
    pub fn initial(maxexp: Exp, p: Prec, rn: usize) -> Self {
        let logn = ceil_log2(rn as u64);
        let cq = logn + 1;
        let ws = bf_num::bigfloat::limbs_for_precision(cq + p + logn + 2);
        let wq = total_bits(ws);
        debug_assert!(wq - cq - p >= 4, "window too narrow for the requested precision");
        let minexp = maxexp + Exp::from(cq) - Exp::from(wq);
        Window {
            wp: vec![0; ws],
            ws,
            wq,
            minexp,
            top_exp: maxexp,
            cq,
            logn,
        }
    }

    /// Build a narrower window for the TMD secondary pass (spec.md §4.4): a
    /// window covering the tail below `top_exp` (exclusive), sized to reach
    /// at least `min_span` bits below `top_exp`, capped at `max_span` to
    /// bound worst-case allocation when the bound on the ignored tail
    /// (`err`) is astronomically far below `top_exp`.
    pub fn secondary(top_exp: Exp, min_span: u32, max_span: u32, cq: u32, logn: u32) -> Self {
        let span = min_span.min(max_span).max(1);
        let ws = bf_num::bigfloat::limbs_for_precision(span + cq);
        let wq = total_bits(ws);
        let minexp = top_exp + Exp::from(cq) - Exp::from(wq);
        Window {
            wp: vec![0; ws],
            ws,
            wq,
            minexp,
            top_exp,
            cq,
            logn,
        }
    }
}

/// `ceil(log2(n))`, `0` for `n <= 1`.
pub fn ceil_log2(n: u64) -> u32 {
    if n <= 1 {
        0
    } else {
        64 - (n - 1).leading_zeros()
    }
}

fn bump_maxexp2(maxexp2: &mut Option<Exp>, candidate: Exp) {
    *maxexp2 = Some(maxexp2.map_or(candidate, |m| m.max(candidate)));
}

/// Fold one regular input's bits into `window.wp`, within `[window.minexp,
/// window.top_exp)`. Returns the candidate update to `maxexp2` contributed
/// by this input (spec.md §4.3 step 2).
fn accumulate_one(window: &mut Window, x: &BigFloat) -> Option<Exp> {
    let e = x.exponent();
    if e <= window.minexp {
        return Some(e);
    }
    let q = x.precision();
    let mantissa = x.mantissa_limbs();
    let mut contrib = vec![0 as Limb; window.ws];
    let mut truncated_below = false;
    for k in 1..=q {
        if !mantissa_bit(mantissa, k - 1) {
            continue;
        }
        let bit_exp = e - Exp::from(k);
        if bit_exp >= window.top_exp {
            continue;
        }
        if bit_exp < window.minexp {
            truncated_below = true;
            continue;
        }
        let pos = (bit_exp - window.minexp) as u32;
        window_set_bit(&mut contrib, pos);
    }
    let mut delta = vec![0 as Limb; window.ws];
    if x.sign().is_negative() {
        bf_types::limb::neg(&mut delta, &contrib);
    } else {
        delta.copy_from_slice(&contrib);
    }
    let before = window.wp.clone();
    bf_types::limb::add_n(&mut window.wp, &before, &delta);
    truncated_below.then_some(window.minexp)
}

/// Re-derive `window.wp` from scratch by scanning every regular input
/// (spec.md §4.3 step 2), returning `maxexp2`.
fn accumulate_block(window: &mut Window, inputs: &[&BigFloat]) -> Option<Exp> {
    bf_types::limb::zero(&mut window.wp);
    let mut maxexp2 = None;
    for x in inputs {
        if !x.is_pure() {
            continue;
        }
        if let Some(candidate) = accumulate_one(window, x) {
            bump_maxexp2(&mut maxexp2, candidate);
        }
    }
    maxexp2
}

/// Outcome of a `sum_raw` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumRawOutcome {
    /// The exact sum restricted to this and every lower window is zero.
    ExactZero,
    /// A nonzero partial sum with `cancel` leading identical bits, result
    /// MSB exponent `e`, and the upper bound `maxexp2` on any bit this
    /// window had to ignore below it (`None` if nothing was ignored).
    Done { cancel: u32, e: Exp, maxexp2: Option<Exp> },
}

/// The block-accumulation engine (spec.md §4.3). Loops accumulate/classify
/// until either the window is provably exact-zero all the way down, or the
/// ignored tail is bounded tightly enough relative to `target_prec`.
pub fn sum_raw(window: &mut Window, inputs: &[&BigFloat], target_prec: Prec) -> SumRawOutcome {
    let span = tracing::debug_span!("sum_raw", wq = window.wq, target_prec);
    let _enter = span.enter();
    loop {
        let maxexp2 = accumulate_block(window, inputs);
        let is_neg = window_bit(&window.wp, window.wq - 1);
        let sign_word: Limb = if is_neg { Limb::MAX } else { 0 };
        let cancel = count_cancel(&window.wp, sign_word);

        if cancel == window.wq && !is_neg {
            match maxexp2 {
                None => {
                    tracing::debug!("sum_raw: exact zero");
                    return SumRawOutcome::ExactZero;
                }
                Some(m) => {
                    window.top_exp = m;
                    window.minexp = m - Exp::from(window.wq - window.cq);
                    tracing::debug!(new_minexp = window.minexp, "sum_raw: jump window down");
                    continue;
                }
            }
        }

        let e = window.minexp + Exp::from(window.wq) - Exp::from(cancel);
        let err = maxexp2.map(|m| m + Exp::from(window.logn));
        let ok = match err {
            None => true,
            Some(err_exp) => err_exp <= e - Exp::from(target_prec),
        };
        tracing::debug!(cancel, e, ?err, ok, "sum_raw: classified block");
        if ok {
            return SumRawOutcome::Done { cancel, e, maxexp2 };
        }

        let err_minus_e = err.map_or(0, |errv| (errv - e).max(0));
        let shiftq = Exp::from(cancel) - 2 - err_minus_e;
        if shiftq <= 0 {
            // cancel is too small relative to the error margin to make
            // guaranteed progress by shifting; widen the window downward by
            // a full limb instead. Bounded: minexp strictly decreases.
            window.minexp -= Exp::from(bf_types::LIMB_BITS);
            tracing::debug!("sum_raw: widening window, shiftq non-positive");
            continue;
        }
        window.minexp -= shiftq;
        tracing::debug!(shiftq, new_minexp = window.minexp, "sum_raw: shift and reiterate");
    }
}
