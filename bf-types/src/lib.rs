//! Limb-arithmetic primitives and shared numeric typedefs.
//!
//! This crate is the lowest layer of the `bf-sum` workspace: a fixed-width
//! unsigned-word type (`Limb`) and the handful of multi-limb primitives
//! (`add_n`, `sub_n`, shifts, negation, leading-zero count) that the
//! `BigFloat` mantissa representation in `bf-num` and the summation engine
//! in `bf-sum` are built from. Nothing here knows about signs, exponents,
//! or rounding.
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

pub mod bits;
pub mod consts;
pub mod limb;
pub mod ternary;

pub use consts::{Exp, Prec, EMAX, EMIN, LIMB_BITS};
pub use limb::Limb;
pub use ternary::Ternary;
