//! Functions to construct [`Integer`]s, [`Rational`]s, and [`Float`]s from various types.

use rug::{ops::Pow, Assign, Float, Integer, Rational};

/// The number of bits of precision to use when computing approximate values.
pub const PRECISION: u32 = 1 << 9;

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates a [`Rational`] with the given value.
pub fn rational<T>(n: T) -> Rational
where
    Rational: From<T>,
{
    Rational::from(n)
}

/// Creates a [`Float`] with the given value.
pub fn float<T>(n: T) -> Float
where
    Float: Assign<T>,
{
    Float::with_val(PRECISION, n)
}

/// Parses a decimal literal such as `12`, `0.5`, or `.25` into an exact [`Rational`].
///
/// Returns [`None`] if the string contains anything other than digits and at most one `.`.
pub fn rational_from_decimal(s: &str) -> Option<Rational> {
    let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{}{}", whole, fraction);
    let numer = Integer::from_str_radix(&digits, 10).ok()?;
    let denom = int(10).pow(fraction.len() as u32);
    Some(rational((numer, denom)))
}
