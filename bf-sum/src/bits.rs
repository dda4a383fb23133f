//! Bit-indexing helpers used by the window accumulator and the final
//! rounding/TMD extraction. The mantissa/window bit-indexing primitives
//! themselves live in `bf_types::bits` (shared with `bf-num`'s mantissa
//! code); this module re-exports them alongside `count_cancel`, which is
//! specific to the two's-complement window accumulator this crate uses.

use bf_types::limb::Limb;
use bf_types::LIMB_BITS;

pub use bf_types::bits::{mantissa_bit, mantissa_set_bit, total_bits, window_bit, window_set_bit};

/// Count of leading bits of `buf` (an LSB-indexed buffer, scanned from the
/// top limb down) equal to `sign_word` (`0` or `Limb::MAX`): the
/// two's-complement "cancellation" count (spec.md §4.3 step 3).
pub fn count_cancel(buf: &[Limb], sign_word: Limb) -> u32 {
    let mut count = 0u32;
    for i in (0..buf.len()).rev() {
        if buf[i] == sign_word {
            count += LIMB_BITS;
        } else {
            count += (buf[i] ^ sign_word).leading_zeros();
            break;
        }
    }
    count
}
