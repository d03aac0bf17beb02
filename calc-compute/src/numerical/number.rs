use calc_error::Error;
use crate::primitive::{float, int, rational, rational_from_decimal};
use rug::{ops::Pow, Float, Integer, Rational};
use std::{cmp::Ordering, fmt};
use super::error::{ComplexResult, DivisionByZero, NonFiniteResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer exponents up to this magnitude are computed exactly.
const MAX_EXACT_EXPONENT: u32 = 1 << 12;

/// Roots up to this index are attempted exactly.
const MAX_EXACT_ROOT: u32 = 64;

/// Relative tolerance used when comparing approximate numbers.
const APPROX_TOLERANCE: f64 = 1e-12;

/// A real number, either exact or approximate.
///
/// Arithmetic between two exact numbers stays exact. As soon as an approximate number is
/// involved, the result is approximate.
///
/// The [`PartialEq`] implementation is strict: an exact number never equals an approximate one.
/// Use [`Number::approx_eq`] to compare values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Number {
    /// An exact rational number.
    Exact(Rational),

    /// An approximation. Always finite.
    Approx(Float),
}

impl Number {
    pub fn zero() -> Self {
        Self::Exact(Rational::new())
    }

    pub fn one() -> Self {
        Self::Exact(rational(1))
    }

    /// Creates an exact integer.
    pub fn int(n: i64) -> Self {
        Self::Exact(rational(n))
    }

    /// Parses a decimal literal exactly.
    pub fn from_decimal(s: &str) -> Option<Self> {
        rational_from_decimal(s).map(Self::Exact)
    }

    /// Wraps a [`Float`], reporting non-finite values as errors.
    pub fn checked_float(value: Float) -> Result<Self, Error> {
        if value.is_finite() {
            Ok(Self::Approx(value))
        } else if value.is_nan() {
            Err(Error::spanless(ComplexResult))
        } else {
            Err(Error::spanless(NonFiniteResult))
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Exact(r) => r.cmp0() == Ordering::Equal,
            Self::Approx(f) => f.is_zero(),
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Self::Exact(r) => *r == 1,
            Self::Approx(f) => *f == 1,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Self::Exact(r) => r.cmp0() == Ordering::Less,
            Self::Approx(f) => *f < 0,
        }
    }

    /// If the number is an exact integer, returns a reference to it.
    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Self::Exact(r) if *r.denom() == 1 => Some(r.numer()),
            _ => None,
        }
    }

    /// Returns the number as a [`Float`].
    pub fn to_float(&self) -> Float {
        match self {
            Self::Exact(r) => float(r),
            Self::Approx(f) => f.clone(),
        }
    }

    /// Returns the nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Exact(r) => r.to_f64(),
            Self::Approx(f) => f.to_f64(),
        }
    }

    pub fn neg(&self) -> Self {
        match self {
            Self::Exact(r) => Self::Exact(Rational::from(-r)),
            Self::Approx(f) => Self::Approx(Float::with_val(f.prec(), -f)),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => Self::Exact(Rational::from(a + b)),
            _ => Self::Approx(self.to_float() + other.to_float()),
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => Self::Exact(Rational::from(a * b)),
            _ => Self::Approx(self.to_float() * other.to_float()),
        }
    }

    /// Returns `1 / self`.
    pub fn recip(&self) -> Result<Self, Error> {
        if self.is_zero() {
            return Err(Error::spanless(DivisionByZero));
        }
        match self {
            Self::Exact(r) => Ok(Self::Exact(r.clone().recip())),
            Self::Approx(f) => Self::checked_float(f.clone().recip()),
        }
    }

    /// Raises `self` to the power of `exp`, if the result can be represented exactly.
    ///
    /// Returns `Ok(None)` when either operand is approximate, or the result is irrational (such
    /// as `2^(1/2)`), or the exponent is too large to compute exactly.
    pub fn pow_exact(&self, exp: &Self) -> Result<Option<Self>, Error> {
        let (Self::Exact(base), Self::Exact(exp)) = (self, exp) else {
            return Ok(None);
        };

        match base.cmp0() {
            Ordering::Equal => {
                return match exp.cmp0() {
                    Ordering::Less => Err(Error::spanless(DivisionByZero)),
                    Ordering::Equal => Ok(Some(Self::one())),
                    Ordering::Greater => Ok(Some(Self::zero())),
                };
            },
            _ if *base == 1 => return Ok(Some(Self::one())),
            _ => {},
        }

        let (Some(numer), Some(denom)) = (exp.numer().to_i32(), exp.denom().to_u32()) else {
            return Ok(None);
        };
        if numer.unsigned_abs() > MAX_EXACT_EXPONENT || denom > MAX_EXACT_ROOT {
            return Ok(None);
        }

        let root = if denom == 1 {
            base.clone()
        } else {
            match exact_root(base, denom) {
                Some(root) => root,
                None => return Ok(None),
            }
        };

        Ok(Some(Self::Exact(root.pow(numer))))
    }

    /// Raises `self` to the power of `exp`, exactly if possible, approximately otherwise.
    pub fn pow(&self, exp: &Self) -> Result<Self, Error> {
        if let Some(exact) = self.pow_exact(exp)? {
            return Ok(exact);
        }

        let base = self.to_float();
        let power = exp.to_float();
        if base.is_zero() {
            return if power < 0 {
                Err(Error::spanless(DivisionByZero))
            } else {
                Ok(Self::Approx(float(if power.is_zero() { 1 } else { 0 })))
            };
        }

        if base < 0 && !power.is_integer() {
            // an exact exponent with an odd denominator still has a real result
            let Self::Exact(exp) = exp else {
                return Err(Error::spanless(ComplexResult));
            };
            if exp.denom().is_even() {
                return Err(Error::spanless(ComplexResult));
            }

            let magnitude = Self::checked_float(base.abs().pow(&power))?;
            return Ok(if exp.numer().is_odd() { magnitude.neg() } else { magnitude });
        }

        Self::checked_float(base.pow(&power))
    }

    /// Compares two numbers, allowing a small relative error when either is approximate.
    pub fn approx_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            _ => {
                let (a, b) = (self.to_f64(), other.to_f64());
                let scale = a.abs().max(b.abs()).max(1.0);
                (a - b).abs() <= APPROX_TOLERANCE * scale
            },
        }
    }
}

/// Returns the exact `n`th root of `value`, if it is rational.
fn exact_root(value: &Rational, n: u32) -> Option<Rational> {
    let negative = value.cmp0() == Ordering::Less;
    if negative && n % 2 == 0 {
        return None;
    }

    let exact_integer_root = |x: &Integer| -> Option<Integer> {
        let root = Integer::from(x.root_ref(n));
        (root.clone().pow(n) == *x).then_some(root)
    };

    let numer = exact_integer_root(&Integer::from(value.numer().abs_ref()))?;
    let denom = exact_integer_root(value.denom())?;
    let numer = if negative { -numer } else { numer };
    Some(rational((numer, denom)))
}

/// Writes a rational whose denominator only has the prime factors 2 and 5 as an exact decimal.
/// Returns [`None`] for other rationals.
fn terminating_decimal(value: &Rational) -> Option<String> {
    let mut denom = value.denom().clone();
    let (mut twos, mut fives) = (0u32, 0u32);
    while denom.is_divisible_u(2) {
        denom /= 2u32;
        twos += 1;
    }
    while denom.is_divisible_u(5) {
        denom /= 5u32;
        fives += 1;
    }
    if denom != 1 {
        return None;
    }

    let places = twos.max(fives) as usize;
    let scale = int(10).pow(places as u32) / value.denom().clone();
    let digits = (Integer::from(value.numer().abs_ref()) * scale).to_string();
    let digits = format!("{:0>width$}", digits, width = places + 1);
    let (whole, fraction) = digits.split_at(digits.len() - places);
    let sign = if value.cmp0() == Ordering::Less { "-" } else { "" };
    Some(format!("{}{}.{}", sign, whole, fraction))
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(r) if *r.denom() == 1 => write!(f, "{}", r.numer()),
            Self::Exact(r) => match terminating_decimal(r) {
                Some(decimal) => write!(f, "{}", decimal),
                None => write!(f, "{}/{}", r.numer(), r.denom()),
            },
            Self::Approx(value) => {
                let value = value.to_f64();
                if value == 0.0 {
                    write!(f, "0")
                } else if (1e-6..1e16).contains(&value.abs()) {
                    write!(f, "{}", value)
                } else {
                    write!(f, "{:e}", value)
                }
            },
        }
    }
}

impl From<Rational> for Number {
    fn from(value: Rational) -> Self {
        Self::Exact(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::int(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn exact(n: i64, d: i64) -> Number {
        Number::Exact(rational((n, d)))
    }

    #[test]
    fn decimal_display() {
        assert_eq!(exact(7, 4).to_string(), "1.75");
        assert_eq!(exact(-1, 8).to_string(), "-0.125");
        assert_eq!(exact(1, 10).to_string(), "0.1");
        assert_eq!(exact(1, 3).to_string(), "1/3");
        assert_eq!(Number::int(-10).to_string(), "-10");
    }

    #[test]
    fn approx_display() {
        assert_eq!(Number::Approx(float(2).sqrt()).to_string(), "1.4142135623730951");
        assert_eq!(Number::Approx(float(3)).to_string(), "3");
        assert_eq!(Number::Approx(float(1e20)).to_string(), "1e20");
    }

    #[test]
    fn exact_arithmetic() {
        let sum = exact(1, 10).add(&exact(2, 10));
        assert_eq!(sum, exact(3, 10));
        assert_eq!(exact(2, 3).mul(&exact(3, 4)), exact(1, 2));
        assert_eq!(exact(-4, 1).recip().unwrap(), exact(-1, 4));
    }

    #[test]
    fn exact_powers() {
        assert_eq!(Number::int(2).pow(&Number::int(10)).unwrap(), Number::int(1024));
        assert_eq!(Number::int(2).pow(&Number::int(-2)).unwrap(), exact(1, 4));
        assert_eq!(exact(4, 9).pow(&exact(1, 2)).unwrap(), exact(2, 3));
        assert_eq!(Number::int(-8).pow(&exact(1, 3)).unwrap(), Number::int(-2));
        assert_eq!(Number::int(2).pow_exact(&exact(1, 2)).unwrap(), None);
    }

    #[test]
    fn approximate_powers() {
        let root = Number::int(2).pow(&exact(1, 2)).unwrap();
        assert!(root.approx_eq(&Number::Approx(float(2).sqrt())));

        let cube_root = Number::int(-2).pow(&exact(1, 3)).unwrap();
        assert!(cube_root.approx_eq(&Number::Approx(-float(2).cbrt())));
    }

    #[test]
    fn power_errors() {
        assert_eq!(Number::zero().pow(&Number::int(-1)).unwrap_err().to_string(), "division by zero");
        assert_eq!(Number::int(-1).pow(&exact(1, 2)).unwrap_err().to_string(), "result is not a real number");
        assert!(Number::zero().recip().is_err());
    }

    #[test]
    fn zero_to_the_zero() {
        assert_eq!(Number::zero().pow(&Number::zero()).unwrap(), Number::one());
    }
}
