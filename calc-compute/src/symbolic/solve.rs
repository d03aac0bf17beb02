//! Solving polynomial equations of degree one or two.
//!
//! The expression to solve is treated as `expr = 0`. It is simplified, then read as a polynomial
//! in the target symbol whose coefficients may contain other symbols. Linear and quadratic
//! polynomials are solved directly; anything else has no solutions as far as this module is
//! concerned.

use calc_error::Error;
use crate::numerical::{ctxt::Ctxt, number::Number};
use crate::primitive::rational;
use crate::symbolic::expr::{Primary, SymExpr};
use super::simplify::{evaluate, simplify};

/// The highest power of the target symbol that is expanded while reading a polynomial.
const MAX_EXPANDED_POWER: u32 = 4;

/// The maximum number of coefficients kept while reading a polynomial.
const MAX_COEFFICIENTS: usize = 9;

type Polynomial = Vec<SymExpr>;

fn zero() -> SymExpr {
    SymExpr::number(Number::zero())
}

fn poly_add(mut lhs: Polynomial, rhs: Polynomial) -> Polynomial {
    if lhs.len() < rhs.len() {
        lhs.resize(rhs.len(), zero());
    }
    for (i, coefficient) in rhs.into_iter().enumerate() {
        let existing = std::mem::replace(&mut lhs[i], zero());
        lhs[i] = SymExpr::Add(vec![existing, coefficient]);
    }
    lhs
}

fn poly_mul(lhs: &[SymExpr], rhs: &[SymExpr]) -> Option<Polynomial> {
    let len = lhs.len() + rhs.len() - 1;
    if len > MAX_COEFFICIENTS {
        return None;
    }

    let mut out = vec![Vec::new(); len];
    for (i, a) in lhs.iter().enumerate() {
        for (j, b) in rhs.iter().enumerate() {
            out[i + j].push(SymExpr::Mul(vec![a.clone(), b.clone()]));
        }
    }
    Some(out.into_iter().map(SymExpr::Add).collect())
}

/// Reads the expression as a polynomial in `symbol`, returning its coefficients from the
/// constant term upwards. Coefficients are not simplified.
fn polynomial(expr: &SymExpr, symbol: &str) -> Option<Polynomial> {
    if !expr.contains_symbol(symbol) {
        return Some(vec![expr.clone()]);
    }

    match expr {
        SymExpr::Primary(Primary::Symbol(_)) => Some(vec![zero(), SymExpr::number(Number::one())]),
        SymExpr::Primary(_) => None,
        SymExpr::Add(terms) => terms
            .iter()
            .try_fold(Vec::new(), |acc, term| Some(poly_add(acc, polynomial(term, symbol)?))),
        SymExpr::Mul(factors) => factors
            .iter()
            .try_fold(vec![SymExpr::number(Number::one())], |acc, factor| {
                poly_mul(&acc, &polynomial(factor, symbol)?)
            }),
        SymExpr::Exp(base, exp) => {
            let power = exp
                .as_number()
                .and_then(Number::as_integer)
                .and_then(|n| n.to_u32())
                .filter(|n| *n <= MAX_EXPANDED_POWER)?;
            let base = polynomial(base, symbol)?;
            (0..power).try_fold(vec![SymExpr::number(Number::one())], |acc, _| poly_mul(&acc, &base))
        },
    }
}

fn neg(expr: SymExpr) -> SymExpr {
    SymExpr::Mul(vec![SymExpr::number(Number::int(-1)), expr])
}

fn recip(expr: SymExpr) -> SymExpr {
    SymExpr::Exp(Box::new(expr), Box::new(SymExpr::number(Number::int(-1))))
}

/// Returns the real solutions of `expr = 0` for `symbol`.
///
/// Solutions are evaluated numerically, deduplicated, and sorted in ascending order when they are
/// all numbers. An expression that is not a polynomial of degree one or two in `symbol` has no
/// solutions.
pub fn solve(expr: &SymExpr, symbol: &str, ctxt: &Ctxt) -> Result<Vec<SymExpr>, Error> {
    let expr = simplify(expr, ctxt)?;
    let Some(coefficients) = polynomial(&expr, symbol) else {
        return Ok(Vec::new());
    };

    let mut coefficients = coefficients
        .iter()
        .map(|coefficient| simplify(coefficient, ctxt))
        .collect::<Result<Vec<_>, _>>()?;
    while coefficients.last().and_then(SymExpr::as_number).is_some_and(Number::is_zero) {
        coefficients.pop();
    }

    let roots = match coefficients.as_slice() {
        [c, b] => vec![SymExpr::Mul(vec![neg(c.clone()), recip(b.clone())])],
        [c, b, a] => {
            let discriminant = evaluate(&SymExpr::Add(vec![
                SymExpr::Exp(Box::new(b.clone()), Box::new(SymExpr::number(Number::int(2)))),
                SymExpr::Mul(vec![SymExpr::number(Number::int(-4)), a.clone(), c.clone()]),
            ]), ctxt)?;
            let denominator = recip(SymExpr::Mul(vec![SymExpr::number(Number::int(2)), a.clone()]));

            match discriminant.as_number() {
                Some(d) if d.is_negative() => Vec::new(),
                Some(d) if d.is_zero() => vec![SymExpr::Mul(vec![neg(b.clone()), denominator])],
                _ => {
                    let root = SymExpr::Exp(
                        Box::new(discriminant.clone()),
                        Box::new(SymExpr::number(Number::Exact(rational((1, 2))))),
                    );
                    vec![
                        SymExpr::Mul(vec![SymExpr::Add(vec![neg(b.clone()), neg(root.clone())]), denominator.clone()]),
                        SymExpr::Mul(vec![SymExpr::Add(vec![neg(b.clone()), root]), denominator]),
                    ]
                },
            }
        },
        _ => Vec::new(),
    };

    let mut solutions: Vec<SymExpr> = Vec::with_capacity(roots.len());
    for root in roots {
        let root = evaluate(&root, ctxt)?;
        let duplicate = solutions.iter().any(|existing| match (existing.as_number(), root.as_number()) {
            (Some(a), Some(b)) => a.approx_eq(b),
            _ => *existing == root,
        });
        if !duplicate {
            solutions.push(root);
        }
    }

    if solutions.iter().all(SymExpr::is_number) {
        solutions.sort_by(|a, b| {
            let (a, b) = (a.as_number().map_or(0.0, Number::to_f64), b.as_number().map_or(0.0, Number::to_f64));
            a.total_cmp(&b)
        });
    }

    Ok(solutions)
}

#[cfg(test)]
mod tests {
    use calc_parser::parser::{expr::Expr, Parser};
    use pretty_assertions::assert_eq;
    use crate::symbolic::expr::from_ast;
    use super::*;

    fn solutions(input: &str, symbol: &str) -> Vec<String> {
        let expr = from_ast(Parser::new(input).try_parse_full::<Expr>().unwrap()).unwrap();
        solve(&expr, symbol, &Ctxt::default())
            .unwrap()
            .into_iter()
            .map(|solution| solution.to_string())
            .collect()
    }

    #[test]
    fn linear() {
        assert_eq!(solutions("2x - 6", "x"), vec!["3"]);
        assert_eq!(solutions("0.5y + 1", "y"), vec!["-2"]);
    }

    #[test]
    fn quadratic() {
        assert_eq!(solutions("x^2 - 4", "x"), vec!["-2", "2"]);
        assert_eq!(solutions("x^2 - 2x + 1", "x"), vec!["1"]);
        assert!(solutions("x^2 + 1", "x").is_empty());
    }

    #[test]
    fn expanded_products() {
        assert_eq!(solutions("(x - 1)(x + 3)", "x"), vec!["-3", "1"]);
    }

    #[test]
    fn symbolic_coefficients() {
        assert_eq!(solutions("a x - 2", "x"), vec!["2 / a"]);
    }

    #[test]
    fn unsupported() {
        assert!(solutions("x^3 - 1", "x").is_empty());
        assert!(solutions("sin(x)", "x").is_empty());
        assert!(solutions("5", "x").is_empty());
    }
}
