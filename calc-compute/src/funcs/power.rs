//! Root functions, which are rewritten as powers so that they can be simplified exactly.
//!
//! `sqrt(x)` becomes `x^(1/2)`, `cbrt(x)` becomes `x^(1/3)`, and `root(x, n)` becomes `x^(1/n)`.

use crate::numerical::number::Number;
use crate::primitive::rational;
use crate::symbolic::expr::{Primary, SymExpr};

/// The names of the root functions.
pub const NAMES: [&str; 3] = ["sqrt", "cbrt", "root"];

/// Returns the number of arguments the root function with the given name takes.
pub fn arity(name: &str) -> Option<usize> {
    match name {
        "sqrt" | "cbrt" => Some(1),
        "root" => Some(2),
        _ => None,
    }
}

/// Rewrites a call to a root function as a power. The argument count must match [`arity`].
pub fn lower(name: &str, mut args: Vec<SymExpr>) -> Option<SymExpr> {
    if arity(name) != Some(args.len()) {
        return None;
    }

    let exponent = match name {
        "sqrt" => SymExpr::Primary(Primary::Number(Number::Exact(rational((1, 2))))),
        "cbrt" => SymExpr::Primary(Primary::Number(Number::Exact(rational((1, 3))))),
        _ => {
            let index = args.pop()?;
            SymExpr::Exp(Box::new(index), Box::new(SymExpr::Primary(Primary::Number(Number::int(-1)))))
        },
    };
    let radicand = args.pop()?;
    Some(SymExpr::Exp(Box::new(radicand), Box::new(exponent)))
}
