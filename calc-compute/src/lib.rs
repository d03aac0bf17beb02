//! Evaluation backend for the history calculator.
//!
//! Input is parsed by `calc_parser` and converted into a [`Formula`], a flattened symbolic
//! representation. Formulas can be inspected for free symbols, have symbols substituted,
//! evaluated into a [`Value`], and solved for a symbol when they are polynomial equations of
//! degree at most two.
//!
//! Numbers are exact rationals whenever possible (decimal input such as `0.1` is exact), and fall
//! back to arbitrary-precision floats for irrational results.

pub mod consts;
pub mod formula;
pub mod funcs;
pub mod numerical;
pub mod primitive;
pub mod symbolic;

pub use formula::Formula;
pub use numerical::{ctxt::Ctxt, number::Number, trig_mode::TrigMode, value::Value};
pub use symbolic::expr::{Primary, SymExpr};

/// Returns true if `name` is predefined by the backend: a constant or a function name. Such names
/// cannot be used as aliases.
pub fn is_reserved(name: &str) -> bool {
    consts::lookup(name).is_some() || funcs::is_builtin(name)
}
