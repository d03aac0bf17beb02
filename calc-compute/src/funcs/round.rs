//! Rounding functions.

use calc_error::Error;
use crate::numerical::{ctxt::Ctxt, number::Number};
use rug::{Float, Rational};

/// Build a rounding function that is exact on rational input.
macro_rules! build_rounding {
    ($($name:ident; $doc:literal),* $(,)?) => {
        $(
            #[doc = $doc]
            pub fn $name(args: &[Number], _: &Ctxt) -> Result<Number, Error> {
                Ok(match &args[0] {
                    Number::Exact(r) => Number::Exact(Rational::from(r.clone().$name())),
                    Number::Approx(f) => Number::Approx(Float::from(f.clone().$name())),
                })
            }
        )*
    };
}

build_rounding! {
    round; "Round a number to the nearest integer, with ties rounding away from zero.",
    ceil; "Round a number up to the nearest integer.",
    floor; "Round a number down to the nearest integer.",
}
