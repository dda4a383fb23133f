//! Sort-based reference path (spec.md §4.5), kept alongside the two-pass
//! engine purely for differential testing: sort the regular inputs by
//! decreasing exponent and fold them left to right at successively wider
//! working precision until two successive widenings agree on the rounded
//! result, which stands in for the exact "can-round" certificate the
//! two-pass engine derives analytically via `err`/`maxexp2`.
//!
//! Grounded on `itertools`' sorting/iterator-chaining style rather than
//! hand-rolled index juggling.

use bf_num::{BigFloat, Prec, RoundingMode, Ternary};
use itertools::Itertools;

use crate::prescan::{prescan, Classification};
use crate::regular_refs;

/// Extra bits of precision requested on the first folding pass.
const INITIAL_GUARD: Prec = 16;

/// Precision growth is capped here: past this many doublings the two passes
/// should already agree for any realistic cancellation pattern, and further
/// growth would risk unbounded work on adversarial input.
const MAX_DOUBLINGS: u32 = 32;

/// Sum `inputs` at precision `p` via repeated left-to-right folding,
/// independent of the `sum_raw`/`sum_aux` accumulator path. Intended for
/// cross-checking that path's output, not for production use: its
/// "converged" result is a practical proxy for provable correct rounding,
/// not a guarantee of it.
pub fn sum_legacy(inputs: &[&BigFloat], p: Prec, rnd: RoundingMode) -> (BigFloat, Ternary) {
    match prescan(inputs, rnd) {
        Classification::Nan => (BigFloat::nan(), Ternary::Equal),
        Classification::Inf(sign) => (BigFloat::inf(sign), Ternary::Equal),
        Classification::AllZero(sign) => (BigFloat::zero(sign), Ternary::Equal),
        Classification::Regular { first, second: None, .. } => bf_num::round_to_precision(first, p, rnd),
        Classification::Regular { first, second: Some(second), rn, .. } if rn == 2 => {
            bf_num::add_rounded(first, second, p, rnd)
        }
        Classification::Regular { .. } => fold_until_stable(inputs, p, rnd),
    }
}

fn fold_until_stable(inputs: &[&BigFloat], p: Prec, rnd: RoundingMode) -> (BigFloat, Ternary) {
    let sorted = regular_refs(inputs)
        .into_iter()
        .sorted_by_key(|x| core::cmp::Reverse(x.exponent()))
        .collect::<Vec<_>>();

    let mut working_prec = p + INITIAL_GUARD;
    let mut previous: Option<BigFloat> = None;
    for _ in 0..MAX_DOUBLINGS {
        let folded = fold_at_precision(&sorted, working_prec, rnd);
        let (candidate, ternary) = bf_num::round_to_precision(&folded, p, rnd);
        if previous.as_ref() == Some(&candidate) {
            return (candidate, ternary);
        }
        previous = Some(candidate);
        working_prec *= 2;
    }
    // Two successive doublings never agreed; return the last, widest-precision
    // candidate rather than looping forever on adversarial cancellation.
    let folded = fold_at_precision(&sorted, working_prec, rnd);
    bf_num::round_to_precision(&folded, p, rnd)
}

fn fold_at_precision(sorted: &[&BigFloat], working_prec: Prec, rnd: RoundingMode) -> BigFloat {
    let mut iter = sorted.iter().copied();
    let Some(first) = iter.next() else {
        return BigFloat::zero(rnd.mixed_zero_sign());
    };
    let (mut acc, _) = bf_num::round_to_precision(first, working_prec, rnd);
    for x in iter {
        acc = bf_num::add_rounded(&acc, x, working_prec, rnd).0;
    }
    acc
}
