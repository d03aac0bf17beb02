//! Canonical builders for sums, products, and powers.
//!
//! Each builder accepts operands that are already simplified and returns the simplified
//! combination. Numbers are folded, like terms and like factors are combined, and the results
//! are kept in a canonical order: a product's numeric coefficient comes first, and a sum's
//! constant term comes last.

use calc_error::Error;
use crate::numerical::number::Number;
use crate::symbolic::expr::{Primary, SymExpr};
use super::Mode;

/// Splits a term into its numeric coefficient and the rest of the term.
///
/// - `5` -> `(5, 1)`
/// - `3*a` -> `(3, a)`
/// - `-1*a*b` -> `(-1, a*b)`
/// - `a` -> `(1, a)`
pub(crate) fn split_coefficient(term: &SymExpr) -> (Number, SymExpr) {
    match term {
        SymExpr::Primary(Primary::Number(n)) => (n.clone(), SymExpr::number(Number::one())),
        SymExpr::Mul(factors) => match factors.first().and_then(SymExpr::as_number) {
            Some(n) => (n.clone(), SymExpr::Mul(factors[1..].to_vec()).downgrade()),
            None => (Number::one(), term.clone()),
        },
        _ => (Number::one(), term.clone()),
    }
}

/// Multiplies `rest` by a numeric coefficient, without further simplification.
fn with_coefficient(coefficient: Number, rest: SymExpr) -> SymExpr {
    if coefficient.is_one() {
        return rest;
    }

    match rest {
        SymExpr::Mul(mut factors) => {
            factors.insert(0, SymExpr::number(coefficient));
            SymExpr::Mul(factors)
        },
        rest => SymExpr::Mul(vec![SymExpr::number(coefficient), rest]),
    }
}

/// Splits a factor into its base and exponent.
fn split_power(factor: SymExpr) -> (SymExpr, SymExpr) {
    match factor {
        SymExpr::Exp(base, exp) => (*base, *exp),
        factor => (factor, SymExpr::number(Number::one())),
    }
}

/// Adds terms together.
///
/// `0+a = a`, `a+a = 2a`, `2a+3a = 5a`, `1+2 = 3`
pub fn add(terms: Vec<SymExpr>) -> SymExpr {
    let mut constant = Number::zero();
    let mut combined: Vec<(SymExpr, Number)> = Vec::new();

    let mut stack = terms;
    stack.reverse();
    while let Some(term) = stack.pop() {
        match term {
            SymExpr::Add(inner) => stack.extend(inner.into_iter().rev()),
            SymExpr::Primary(Primary::Number(n)) => constant = constant.add(&n),
            term => {
                let (coefficient, rest) = split_coefficient(&term);

                // rest must be strictly equal
                match combined.iter_mut().find(|(existing, _)| *existing == rest) {
                    Some((_, existing)) => *existing = existing.add(&coefficient),
                    None => combined.push((rest, coefficient)),
                }
            },
        }
    }

    let mut out = combined
        .into_iter()
        .filter(|(_, coefficient)| !coefficient.is_zero())
        .map(|(rest, coefficient)| with_coefficient(coefficient, rest))
        .collect::<Vec<_>>();
    if !constant.is_zero() || (out.is_empty() && !constant.is_exact()) {
        out.push(SymExpr::number(constant));
    }

    SymExpr::Add(out).downgrade()
}

/// Multiplies factors together.
///
/// `1a = a`, `0a = 0`, `a*a = a^2`, `2*3 = 6`, `2(a+b) = 2a+2b`
pub fn mul(factors: Vec<SymExpr>, mode: Mode) -> Result<SymExpr, Error> {
    let mut coefficient = Number::one();
    let mut grouped: Vec<(SymExpr, SymExpr)> = Vec::new();

    let mut stack = factors;
    stack.reverse();
    while let Some(factor) = stack.pop() {
        match factor {
            SymExpr::Mul(inner) => stack.extend(inner.into_iter().rev()),
            SymExpr::Primary(Primary::Number(n)) => coefficient = coefficient.mul(&n),
            factor => {
                let (base, exp) = split_power(factor);
                match grouped.iter_mut().find(|(existing, _)| *existing == base) {
                    Some((_, existing)) => {
                        let sum = add(vec![existing.clone(), exp]);
                        *existing = sum;
                    },
                    None => grouped.push((base, exp)),
                }
            },
        }
    }

    if coefficient.is_zero() {
        return Ok(SymExpr::number(coefficient));
    }

    let mut out = Vec::with_capacity(grouped.len());
    for (base, exp) in grouped {
        match pow(base, exp, mode)? {
            SymExpr::Primary(Primary::Number(n)) => coefficient = coefficient.mul(&n),
            SymExpr::Mul(inner) => {
                for factor in inner {
                    match factor {
                        SymExpr::Primary(Primary::Number(n)) => coefficient = coefficient.mul(&n),
                        factor => out.push(factor),
                    }
                }
            },
            factor => out.push(factor),
        }
    }

    if coefficient.is_zero() {
        return Ok(SymExpr::number(coefficient));
    }

    // distribute a numeric coefficient over a single sum
    if !coefficient.is_one() && out.len() == 1 {
        if let SymExpr::Add(terms) = &out[0] {
            let terms = terms
                .iter()
                .map(|term| mul(vec![SymExpr::number(coefficient.clone()), term.clone()], mode))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(add(terms));
        }
    }

    if !coefficient.is_one() || out.is_empty() {
        out.insert(0, SymExpr::number(coefficient));
    }
    Ok(SymExpr::Mul(out).downgrade())
}

/// Raises `base` to the power of `exp`.
///
/// `a^0 = 1`, `a^1 = a`, `1^a = 1`, `(a^b)^n = a^(bn)`, `(ab)^n = a^n b^n` for integer `n`
pub fn pow(base: SymExpr, exp: SymExpr, mode: Mode) -> Result<SymExpr, Error> {
    if let (Some(b), Some(e)) = (base.as_number(), exp.as_number()) {
        if let Some(exact) = b.pow_exact(e)? {
            return Ok(SymExpr::number(exact));
        }
        if mode == Mode::Numeric || !b.is_exact() || !e.is_exact() {
            return Ok(SymExpr::number(b.pow(e)?));
        }
        return Ok(SymExpr::Exp(Box::new(base), Box::new(exp)));
    }

    if exp.as_number().is_some_and(Number::is_zero) {
        return Ok(SymExpr::number(Number::one()));
    }
    if exp.as_number().is_some_and(Number::is_one) {
        return Ok(base);
    }
    if base.as_number().is_some_and(Number::is_one) {
        return Ok(base);
    }

    let integer_exp = exp.as_number().and_then(Number::as_integer).is_some();
    match base {
        SymExpr::Exp(inner_base, inner_exp) if integer_exp => {
            let exp = mul(vec![*inner_exp, exp], mode)?;
            pow(*inner_base, exp, mode)
        },
        SymExpr::Mul(factors) if integer_exp => {
            let factors = factors
                .into_iter()
                .map(|factor| pow(factor, exp.clone(), mode))
                .collect::<Result<Vec<_>, _>>()?;
            mul(factors, mode)
        },
        base => Ok(SymExpr::Exp(Box::new(base), Box::new(exp))),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use crate::primitive::rational;
    use super::*;

    fn sym(name: &str) -> SymExpr {
        SymExpr::symbol(name)
    }

    fn num(n: i64) -> SymExpr {
        SymExpr::number(n)
    }

    #[test]
    fn combine_like_terms() {
        let sum = add(vec![sym("x"), num(2), SymExpr::Mul(vec![num(3), sym("x")]), num(-2)]);
        assert_eq!(sum, SymExpr::Mul(vec![num(4), sym("x")]));
    }

    #[test]
    fn cancel_terms() {
        let sum = add(vec![sym("x"), SymExpr::Mul(vec![num(-1), sym("x")])]);
        assert_eq!(sum, num(0));
    }

    #[test]
    fn combine_like_factors() {
        let product = mul(vec![sym("x"), num(2), sym("x")], Mode::Exact).unwrap();
        assert_eq!(product, SymExpr::Mul(vec![
            num(2),
            SymExpr::Exp(Box::new(sym("x")), Box::new(num(2))),
        ]));
    }

    #[test]
    fn cancel_factors() {
        let product = mul(vec![
            sym("x"),
            SymExpr::Exp(Box::new(sym("x")), Box::new(num(-1))),
        ], Mode::Exact).unwrap();
        assert_eq!(product, num(1));
    }

    #[test]
    fn zero_product() {
        assert_eq!(mul(vec![num(0), sym("x")], Mode::Exact).unwrap(), num(0));
    }

    #[test]
    fn distribute_coefficient() {
        let product = mul(vec![num(2), SymExpr::Add(vec![sym("x"), num(1)])], Mode::Exact).unwrap();
        assert_eq!(product, SymExpr::Add(vec![SymExpr::Mul(vec![num(2), sym("x")]), num(2)]));
    }

    #[test]
    fn irrational_powers_stay_exact() {
        let half = SymExpr::number(Number::Exact(rational((1, 2))));
        let root = pow(num(2), half.clone(), Mode::Exact).unwrap();
        assert_eq!(root, SymExpr::Exp(Box::new(num(2)), Box::new(half.clone())));

        let squared = mul(vec![root.clone(), root], Mode::Exact).unwrap();
        assert_eq!(squared, num(2));

        let approx = pow(num(2), half, Mode::Numeric).unwrap();
        assert!(approx.as_number().is_some_and(|n| !n.is_exact()));
    }

    #[test]
    fn power_of_power() {
        let inner = SymExpr::Exp(Box::new(sym("x")), Box::new(num(2)));
        assert_eq!(
            pow(inner, num(3), Mode::Exact).unwrap(),
            SymExpr::Exp(Box::new(sym("x")), Box::new(num(6))),
        );
    }

    #[test]
    fn divide_by_zero() {
        let err = pow(num(0), num(-1), Mode::Exact).unwrap_err();
        assert_eq!(err.to_string(), "division by zero");
    }
}
