//! Bit-indexing helpers shared by the `BigFloat` mantissa representation
//! (`bf-num`) and the summation engine's window accumulator (`bf-sum`). Two
//! distinct conventions are in play, mirroring the two buffer shapes both
//! crates deal with:
//!
//! - a `BigFloat` mantissa is top-justified (bit `0` is `b1`, the top bit of
//!   the top limb);
//! - a two's-complement accumulator is LSB-indexed (bit `0` is the bottom
//!   bit of limb `0`), the natural indexing for an integer.

use crate::limb::Limb;
use crate::{Prec, LIMB_BITS};

/// Total bit width of a `limbs`-limb buffer.
pub fn total_bits(limbs: usize) -> u32 {
    limbs as u32 * LIMB_BITS
}

/// Read mantissa bit `k` (`0` = `b1`) of a top-justified mantissa buffer.
pub fn mantissa_bit(m: &[Limb], k: Prec) -> bool {
    let limb_from_top = k / LIMB_BITS;
    let limb_idx = m.len() - 1 - limb_from_top as usize;
    let bit_in_limb = LIMB_BITS - 1 - (k % LIMB_BITS);
    (m[limb_idx] >> bit_in_limb) & 1 == 1
}

/// Set mantissa bit `k` of a top-justified mantissa buffer.
pub fn mantissa_set_bit(m: &mut [Limb], k: Prec) {
    let limb_from_top = k / LIMB_BITS;
    let limb_idx = m.len() - 1 - limb_from_top as usize;
    let bit_in_limb = LIMB_BITS - 1 - (k % LIMB_BITS);
    m[limb_idx] |= 1 << bit_in_limb;
}

/// Read bit `pos` (`0` = LSB of limb 0) of an LSB-indexed window buffer.
pub fn window_bit(buf: &[Limb], pos: u32) -> bool {
    let limb_idx = (pos / LIMB_BITS) as usize;
    (buf[limb_idx] >> (pos % LIMB_BITS)) & 1 == 1
}

/// Set bit `pos` of an LSB-indexed window buffer.
pub fn window_set_bit(buf: &mut [Limb], pos: u32) {
    let limb_idx = (pos / LIMB_BITS) as usize;
    buf[limb_idx] |= 1 << (pos % LIMB_BITS);
}
