//! Correctly-rounded summation of an arbitrary list of [`BigFloat`] values
//! (spec.md's `mpfr_sum`): given `n` inputs and a target precision `p`,
//! computes the single correctly-rounded `BigFloat` nearest the exact real
//! sum, plus the ternary indicator describing which way rounding moved.
//!
//! The engine is a pipeline of four pieces, each in its own module:
//!
//! - [`prescan`] classifies NaN/infinity/zero inputs in one pass and hands
//!   the dispatcher the data its fast paths need.
//! - [`window`] holds the two's-complement accumulator and `sum_raw`, the
//!   block-accumulation loop that narrows in on the sum's leading bits.
//! - [`sum_aux`] turns what `sum_raw` leaves behind into a rounded result,
//!   resolving the Table Maker's Dilemma with a second pass when needed.
//! - [`legacy`] is an independent sort-based reference path kept for
//!   differential testing against the two-pass engine above.
#![warn(missing_docs)]

pub mod bits;
pub mod error;
pub mod legacy;
pub mod prescan;
pub mod sum_aux;
pub mod window;

use bf_num::{BigFloat, Prec, RoundingMode, Ternary};

pub use error::SumError;
pub use prescan::Classification;

/// Compute the correctly-rounded sum of `inputs` at precision `p` under
/// rounding mode `rnd` (spec.md §4, §6.3).
///
/// Returns [`SumError::ZeroPrecision`] if `p == 0`; every other failure mode
/// (overflow, underflow, NaN propagation) is reported in-band through the
/// returned [`BigFloat`] and [`Ternary`].
pub fn sum(inputs: &[&BigFloat], p: Prec, rnd: RoundingMode) -> Result<(BigFloat, Ternary), SumError> {
    if p == 0 {
        return Err(SumError::ZeroPrecision);
    }
    let span = tracing::debug_span!("sum", n = inputs.len(), p);
    let _enter = span.enter();

    Ok(match prescan::prescan(inputs, rnd) {
        Classification::Nan => {
            tracing::debug!("sum: NaN input or mixed-sign infinities");
            (BigFloat::nan(), Ternary::Equal)
        }
        Classification::Inf(sign) => {
            tracing::debug!(?sign, "sum: infinite result");
            (BigFloat::inf(sign), Ternary::Equal)
        }
        Classification::AllZero(sign) => {
            tracing::debug!(?sign, "sum: every input was zero");
            (BigFloat::zero(sign), Ternary::Equal)
        }
        Classification::Regular { first, second: None, .. } => {
            tracing::debug!("sum: single regular input, rounding directly");
            bf_num::round_to_precision(first, p, rnd)
        }
        Classification::Regular { rn, first, second: Some(second), .. } if rn == 2 => {
            tracing::debug!("sum: two regular inputs, direct add");
            bf_num::add_rounded(first, second, p, rnd)
        }
        Classification::Regular { maxexp, rn, .. } => {
            tracing::debug!(rn, maxexp, "sum: general accumulator path");
            sum_aux::sum_aux(inputs, rn, maxexp, p, rnd)
        }
    })
}

/// All pure (finite, nonzero) references among `inputs`, in order.
pub(crate) fn regular_refs<'a>(inputs: &[&'a BigFloat]) -> Vec<&'a BigFloat> {
    inputs.iter().copied().filter(|x| x.is_pure()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf_num::RoundingMode::*;
    use bf_num::{Exp, Sign};

    fn regular(sign: Sign, exponent: Exp, bits: &[bool]) -> BigFloat {
        let precision = bits.len() as Prec;
        let mut out = BigFloat::new_regular_uninit(precision);
        {
            let m = out.mantissa_mut();
            for (k, &b) in bits.iter().enumerate() {
                if b {
                    crate::bits::mantissa_set_bit(m, k as Prec);
                }
            }
        }
        out.set_exponent(exponent);
        out.set_sign(sign);
        out
    }

    fn kept_bit(x: &BigFloat, k: Prec) -> bool {
        crate::bits::mantissa_bit(x.mantissa_limbs(), k)
    }

    // Scenario A (spec.md §8): massive cancellation between two large
    // opposite-sign terms leaves only the tiny middle term.
    #[test]
    fn scenario_a_cancellation_leaves_tiny_term() {
        let one = regular(Sign::Pos, 1, &[true]);
        let tiny = regular(Sign::Pos, -59, &[true]); // 2^-60
        let neg_one = regular(Sign::Neg, 1, &[true]);
        let refs = [&one, &tiny, &neg_one];
        let (r, t) = sum(&refs, 53, RNDN).unwrap();
        assert_eq!(t, Ternary::Equal);
        assert_eq!(r.sign(), Sign::Pos);
        assert_eq!(r.exponent(), -59);
        assert!(kept_bit(&r, 0));
    }

    // Scenario B (spec.md §8): two huge opposite-sign terms cancel exactly,
    // leaving a term many orders of magnitude smaller.
    #[test]
    fn scenario_b_huge_terms_cancel_to_small_survivor() {
        let huge = regular(Sign::Pos, 101, &[true]); // 2^100
        let one = regular(Sign::Pos, 1, &[true]);
        let neg_huge = regular(Sign::Neg, 101, &[true]);
        let refs = [&huge, &one, &neg_huge];
        let (r, t) = sum(&refs, 53, RNDN).unwrap();
        assert_eq!(t, Ternary::Equal);
        assert_eq!(r.sign(), Sign::Pos);
        assert_eq!(r.exponent(), 1);
        assert!(kept_bit(&r, 0));
    }

    // Scenario C (spec.md §8): an exact halfway case at the target
    // precision, where RNDN and RNDD must disagree.
    #[test]
    fn scenario_c_tie_breaks_differ_by_rounding_mode() {
        let one = regular(Sign::Pos, 1, &[true]); // 1.0
        let a = regular(Sign::Pos, -51, &[true]); // 2^-52
        let b = regular(Sign::Pos, -52, &[true]); // 2^-53
        let refs = [&one, &a, &b];

        // Tie-to-even rounds the odd kept LSB up; RNDD always truncates.
        let (nearest, t_nearest) = sum(&refs, 53, RNDN).unwrap();
        assert_eq!(t_nearest, Ternary::Greater);

        let (down, t_down) = sum(&refs, 53, RNDD).unwrap();
        assert_eq!(t_down, Ternary::Less);
        assert!(kept_bit(&down, 52));
        assert_ne!(nearest, down);
    }

    // Scenario D (spec.md §8): an input wider than the target precision
    // combines exactly with the rest of the terms.
    #[test]
    fn scenario_d_wide_input_combines_exactly() {
        let mut bits = vec![false; 54];
        bits[0] = true;
        bits[53] = true; // 2^53 + 1
        let wide = regular(Sign::Pos, 54, &bits);
        let half_a = regular(Sign::Pos, 0, &[true]);
        let half_b = regular(Sign::Pos, 0, &[true]);
        let refs = [&wide, &half_a, &half_b];
        let (r, t) = sum(&refs, 53, RNDN).unwrap();
        assert_eq!(t, Ternary::Equal); // 2^53 + 1 + 1 = 2^53 + 2, exact at 53 bits
        assert_eq!(r.exponent(), 54);
        assert!(kept_bit(&r, 0));
        assert!(kept_bit(&r, 52));
    }

    // Scenario E (spec.md §8), scaled down for test speed: many equal small
    // terms that must carry exactly into a single leading bit.
    #[test]
    fn scenario_e_many_equal_terms_carry_exactly() {
        let n = 1024;
        let term = regular(Sign::Pos, -9, &[true]); // 2^-10
        let values: Vec<BigFloat> = (0..n).map(|_| term.clone()).collect();
        let refs: Vec<&BigFloat> = values.iter().collect();
        let (r, t) = sum(&refs, 53, RNDN).unwrap();
        assert_eq!(t, Ternary::Equal);
        assert!(r.is_pure());
        assert_eq!(r.exponent(), 1); // 1024 * 2^-10 == 1.0
        assert!(kept_bit(&r, 0));
    }

    // Scenario F (spec.md §8): signed zeros combine per rounding mode.
    #[test]
    fn scenario_f_signed_zero_combination() {
        let pos_zero = BigFloat::zero(Sign::Pos);
        let neg_zero = BigFloat::zero(Sign::Neg);

        let (both_pos, _) = sum(&[&pos_zero, &pos_zero], 53, RNDN).unwrap();
        assert!(both_pos.is_zero() && both_pos.sign() == Sign::Pos);

        let (mixed_nearest, _) = sum(&[&pos_zero, &neg_zero], 53, RNDN).unwrap();
        assert!(mixed_nearest.is_zero() && mixed_nearest.sign() == Sign::Pos);

        let (mixed_down, _) = sum(&[&pos_zero, &neg_zero], 53, RNDD).unwrap();
        assert!(mixed_down.is_zero() && mixed_down.sign() == Sign::Neg);
    }

    // Scenario G (spec.md §8): opposite-signed infinities are indeterminate.
    #[test]
    fn scenario_g_opposite_infinities_are_nan() {
        let pos_inf = BigFloat::inf(Sign::Pos);
        let one = regular(Sign::Pos, 1, &[true]);
        let neg_inf = BigFloat::inf(Sign::Neg);
        let (r, _) = sum(&[&pos_inf, &one, &neg_inf], 53, RNDN).unwrap();
        assert!(r.is_nan());
    }

    #[test]
    fn zero_precision_is_rejected() {
        let one = regular(Sign::Pos, 1, &[true]);
        assert_eq!(sum(&[&one], 0, RNDN), Err(SumError::ZeroPrecision));
    }

    #[test]
    fn single_nan_input_dominates() {
        let nan = BigFloat::nan();
        let one = regular(Sign::Pos, 1, &[true]);
        let (r, _) = sum(&[&one, &nan], 53, RNDN).unwrap();
        assert!(r.is_nan());
    }

    #[test]
    fn same_sign_infinities_pass_through() {
        let a = BigFloat::inf(Sign::Pos);
        let b = BigFloat::inf(Sign::Pos);
        let (r, t) = sum(&[&a, &b], 53, RNDN).unwrap();
        assert!(r.is_inf() && r.sign() == Sign::Pos);
        assert_eq!(t, Ternary::Equal);
    }

    /// Deterministic pseudo-random regular value, parameterised by a
    /// quickcheck-supplied seed and an index distinguishing terms within
    /// one property-test case.
    fn synth(seed: u32, i: usize) -> BigFloat {
        let h = seed
            .wrapping_mul(2_654_435_761)
            .wrapping_add((i as u32).wrapping_mul(0x9e37_79b1));
        let sign = if h & 1 == 0 { Sign::Pos } else { Sign::Neg };
        let exponent = Exp::from((h >> 1) % 400) - 200;
        let precision: Prec = 40;
        let mut out = BigFloat::new_regular_uninit(precision);
        {
            let m = out.mantissa_mut();
            crate::bits::mantissa_set_bit(m, 0);
            let mut word = h.rotate_left(7).wrapping_mul(0x85eb_ca6b);
            for k in 1..precision {
                if (word >> (k % 31)) & 1 == 1 {
                    crate::bits::mantissa_set_bit(m, k);
                }
                word = word.wrapping_add(0x9e37_79b1);
            }
        }
        out.set_exponent(exponent);
        out.set_sign(sign);
        out
    }

    #[quickcheck_macros::quickcheck]
    fn singleton_matches_direct_rounding(seed: u32) -> bool {
        let x = synth(seed, 0);
        let (expected, expected_t) = bf_num::round_to_precision(&x, 40, RNDN);
        let (got, got_t) = sum(&[&x], 40, RNDN).unwrap();
        got == expected && got_t == expected_t
    }

    #[quickcheck_macros::quickcheck]
    fn pair_matches_add_rounded(seed: u32) -> bool {
        let a = synth(seed, 0);
        let b = synth(seed, 1);
        let (expected, expected_t) = bf_num::add_rounded(&a, &b, 40, RNDN);
        let (got, got_t) = sum(&[&a, &b], 40, RNDN).unwrap();
        got == expected && got_t == expected_t
    }

    #[quickcheck_macros::quickcheck]
    fn sum_is_invariant_under_reordering(seed: u32) -> bool {
        let values: Vec<BigFloat> = (0..6).map(|i| synth(seed, i)).collect();
        let forward: Vec<&BigFloat> = values.iter().collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        let (a, ta) = sum(&forward, 40, RNDN).unwrap();
        let (b, tb) = sum(&reversed, 40, RNDN).unwrap();
        a == b && ta == tb
    }

    #[quickcheck_macros::quickcheck]
    fn accumulator_agrees_with_legacy_path(seed: u32) -> bool {
        let values: Vec<BigFloat> = (0..8).map(|i| synth(seed, i)).collect();
        let refs: Vec<&BigFloat> = values.iter().collect();
        let (a, ta) = sum(&refs, 40, RNDN).unwrap();
        let (b, tb) = legacy::sum_legacy(&refs, 40, RNDN);
        a == b && ta == tb
    }

    // Property 8 (spec.md §8): if the exact sum is already representable at
    // the target precision, rounding must be a no-op: ternary 0 and the
    // returned bits equal the exact sum exactly.
    #[test]
    fn idempotent_when_exact_sum_already_fits() {
        let a = regular(Sign::Pos, 10, &[true, false, true]); // 0.101 * 2^10 = 640
        let b = regular(Sign::Pos, 2, &[true]); // 0.1 * 2^2 = 2
        let c = regular(Sign::Neg, 1, &[true]); // -(0.1 * 2^1) = -1
        let refs = [&a, &b, &c];
        let (r, t) = sum(&refs, 16, RNDN).unwrap();
        assert_eq!(t, Ternary::Equal);
        // 640 + 2 - 1 = 641 = 0.1010000001 * 2^10, exact well within 16 bits.
        assert_eq!(r.exponent(), 10);
        assert!(kept_bit(&r, 0));
        assert!(kept_bit(&r, 2));
        assert!(kept_bit(&r, 9));
        assert!(!kept_bit(&r, 1));
        assert!(!kept_bit(&r, 15));
    }

    /// Lexicographic real-value comparison of two regular `BigFloat`s,
    /// assuming both are positive, finite and nonzero: exponent first, then
    /// mantissa bits from the top down. Test-only; the production engine
    /// never needs to compare `BigFloat`s directly.
    fn magnitude_less(a: &BigFloat, b: &BigFloat) -> bool {
        if a.exponent() != b.exponent() {
            return a.exponent() < b.exponent();
        }
        let shared = a.precision().min(b.precision());
        for k in 0..shared {
            let (ba, bb) = (kept_bit(a, k), kept_bit(b, k));
            if ba != bb {
                return !ba;
            }
        }
        a.precision() < b.precision()
    }

    // Property 9 (spec.md §8): under a directed rounding mode, increasing
    // one positive term (others fixed) never decreases the rounded sum.
    #[quickcheck_macros::quickcheck]
    fn monotonic_under_directed_rounding_up(seed: u32) -> bool {
        let bits: Vec<Vec<bool>> = (0..5).map(|i| synth_bits(seed, i)).collect();
        let base: Vec<BigFloat> = (0..5).map(|i| regular(Sign::Pos, synth_exp(seed, i), &bits[i])).collect();
        let mut increased = base.clone();
        increased[0] = regular(Sign::Pos, synth_exp(seed, 0) + 4, &bits[0]);

        let before_refs: Vec<&BigFloat> = base.iter().collect();
        let after_refs: Vec<&BigFloat> = increased.iter().collect();
        let (before, _) = sum(&before_refs, 40, RNDU).unwrap();
        let (after, _) = sum(&after_refs, 40, RNDU).unwrap();
        !magnitude_less(&after, &before)
    }

    fn synth_exp(seed: u32, i: usize) -> Exp {
        synth(seed, i).exponent()
    }
    fn synth_bits(seed: u32, i: usize) -> Vec<bool> {
        let x = synth(seed, i);
        (0..x.precision()).map(|k| kept_bit(&x, k)).collect()
    }

    // Property 10 (spec.md §8): two inputs whose contributions both lie
    // entirely below the accumulator's resolution produce the same rounded
    // result and ternary regardless of exactly how far below they sit or
    // what bit pattern they carry — the engine only needs to know such a
    // tail exists, never its precise value.
    #[test]
    fn exponent_range_saturation_ignores_negligible_term_details() {
        let a = regular(Sign::Pos, 1, &[true]); // 1.0
        let negligible_a = regular(Sign::Pos, -2000, &[true]);
        let negligible_b = regular(Sign::Pos, -5000, &[true, false, true, true]);

        let (with_a, ta) = sum(&[&a, &negligible_a], 53, RNDN).unwrap();
        let (with_b, tb) = sum(&[&a, &negligible_b], 53, RNDN).unwrap();
        assert_eq!(with_a, with_b);
        assert_eq!(ta, tb);
        // Both truncate to 1.0 with the exact sum strictly above it.
        assert_eq!(with_a.exponent(), 1);
        assert_eq!(ta, Ternary::Less);

        // Sanity: a term that is *not* negligible at this precision — well
        // within the 53-bit resolution of 1.0, and exactly representable
        // once added — does change both the result and the ternary.
        let b = regular(Sign::Pos, -9, &[true]); // 2^-10
        let (with_sig, t_sig) = sum(&[&a, &b], 53, RNDN).unwrap();
        assert_ne!(with_a, with_sig);
        assert_eq!(t_sig, Ternary::Equal);
    }
}
