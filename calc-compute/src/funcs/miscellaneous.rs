//! Logarithms, exponentials, absolute value, and the factorial.

use calc_error::Error;
use crate::numerical::{ctxt::Ctxt, error::OutOfDomain, number::Number};
use crate::primitive::int;
use rug::{Float, Integer, Rational};

/// Factorials of integers up to this value are computed exactly.
const MAX_EXACT_FACTORIAL: u32 = 10_000;

fn positive(name: &'static str, n: &Number) -> Result<Float, Error> {
    if n.is_negative() || n.is_zero() {
        Err(Error::spanless(OutOfDomain { name, reason: "is only defined for positive inputs" }))
    } else {
        Ok(n.to_float())
    }
}

/// The natural logarithm.
pub fn ln(args: &[Number], _: &Ctxt) -> Result<Number, Error> {
    Number::checked_float(positive("ln", &args[0])?.ln())
}

/// The logarithm in the given base, or base 10 if no base is given.
pub fn log(args: &[Number], _: &Ctxt) -> Result<Number, Error> {
    let n = positive("log", &args[0])?;
    let Some(base) = args.get(1) else {
        return Number::checked_float(n.log10());
    };

    let base = positive("log", base)?;
    if base == 1 {
        return Err(Error::spanless(OutOfDomain { name: "log", reason: "is not defined for base 1" }));
    }
    Number::checked_float(n.ln() / base.ln())
}

pub fn exp(args: &[Number], _: &Ctxt) -> Result<Number, Error> {
    if args[0].is_zero() {
        return Ok(Number::one());
    }
    Number::checked_float(args[0].to_float().exp())
}

pub fn abs(args: &[Number], _: &Ctxt) -> Result<Number, Error> {
    Ok(match &args[0] {
        Number::Exact(r) => Number::Exact(Rational::from(r.abs_ref())),
        Number::Approx(f) => Number::Approx(f.clone().abs()),
    })
}

/// The factorial, extended to non-integers with the gamma function.
pub fn factorial(args: &[Number], _: &Ctxt) -> Result<Number, Error> {
    let n = &args[0];
    if let Some(integer) = n.as_integer() {
        if n.is_negative() {
            return Err(Error::spanless(OutOfDomain {
                name: "factorial",
                reason: "is not defined for negative integers",
            }));
        }
        if let Some(small) = integer.to_u32().filter(|n| *n <= MAX_EXACT_FACTORIAL) {
            return Ok(Number::Exact(Rational::from(Integer::from(Integer::factorial(small)))));
        }
    }

    let value = n.to_float();
    if value.is_integer() && value < 0 {
        return Err(Error::spanless(OutOfDomain {
            name: "factorial",
            reason: "is not defined for negative integers",
        }));
    }
    Number::checked_float((value + 1u32).gamma())
}
