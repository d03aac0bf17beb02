//! Numeric types and the context they are computed in.

pub mod ctxt;
pub mod error;
pub mod number;
pub mod trig_mode;
pub mod value;
