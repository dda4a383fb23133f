//! The one data-level misuse `sum` rejects outright instead of folding
//! into the in-band NaN/ternary channel (spec.md §7).

/// Error returned by [`crate::sum`] for a malformed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SumError {
    /// The requested output precision was zero. The library-wide precision
    /// invariant is `p >= 1`; every numerical failure mode (overflow,
    /// underflow, NaN propagation) is signalled in-band instead.
    #[error("target precision must be >= 1, got 0")]
    ZeroPrecision,
}
