//! The `BigFloat` value type consumed by the `bf-sum` summation engine.
//!
//! Everything in this crate is the "external collaborator" the summation
//! core is specified against: a normalised-mantissa arbitrary-precision
//! binary float, its sign and rounding-mode types, and the two operations
//! (`round_to_precision`, `add_rounded`) the engine's small-`n` fast paths
//! delegate to directly instead of spinning up the general accumulator.
#![warn(missing_docs)]

pub mod bigfloat;
pub mod ops;
pub mod rounding;
pub mod sign;

pub use bf_types::{Exp, Limb, Prec, Ternary, EMAX, EMIN};
pub use bigfloat::{BigFloat, Kind};
pub use ops::{add_rounded, round_to_precision};
pub use rounding::RoundingMode;
pub use sign::Sign;
