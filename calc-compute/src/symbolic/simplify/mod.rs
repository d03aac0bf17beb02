//! Simplification and numeric evaluation of expressions.
//!
//! Both operations rebuild the expression bottom-up through the canonical builders in [`rules`].
//! They differ in how they treat values that have no exact form:
//!
//! - [`simplify`] works in [`Mode::Exact`]. Irrational powers such as `2^(1/2)` are kept as
//! powers, constants such as `pi` are kept as symbols, and function calls are only folded when
//! their result is exact (`floor(2.5)` becomes `2`, `sin(1)` stays as is).
//! - [`evaluate`] works in [`Mode::Numeric`]. Constants and function calls with numeric arguments
//! are folded into approximate numbers.

pub mod rules;

use calc_error::Error;
use crate::consts;
use crate::funcs;
use crate::numerical::{ctxt::Ctxt, number::Number};
use crate::symbolic::expr::{Primary, SymExpr};

/// The maximum number of rebuild passes. Each pass can only expose a bounded amount of new
/// structure, so expressions settle quickly in practice.
const MAX_PASSES: usize = 8;

/// How values without an exact form are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Keep irrational values symbolic.
    Exact,

    /// Approximate irrational values.
    Numeric,
}

/// Simplifies the expression, keeping results exact.
pub fn simplify(expr: &SymExpr, ctxt: &Ctxt) -> Result<SymExpr, Error> {
    simplify_with(expr, Mode::Exact, ctxt)
}

/// Evaluates the expression as far as possible, approximating irrational values.
///
/// The result is a single number if the expression has no free symbols.
pub fn evaluate(expr: &SymExpr, ctxt: &Ctxt) -> Result<SymExpr, Error> {
    simplify_with(expr, Mode::Numeric, ctxt)
}

/// Rebuilds the expression in the given mode until it stops changing.
pub fn simplify_with(expr: &SymExpr, mode: Mode, ctxt: &Ctxt) -> Result<SymExpr, Error> {
    let mut current = rebuild(expr, mode, ctxt)?;
    for _ in 1..MAX_PASSES {
        let next = rebuild(&current, mode, ctxt)?;
        if next == current {
            break;
        }
        current = next;
    }
    Ok(current)
}

fn rebuild(expr: &SymExpr, mode: Mode, ctxt: &Ctxt) -> Result<SymExpr, Error> {
    match expr {
        SymExpr::Primary(Primary::Number(_)) => Ok(expr.clone()),
        SymExpr::Primary(Primary::Symbol(sym)) => match (mode, consts::lookup(sym)) {
            (Mode::Numeric, Some(value)) => Ok(SymExpr::number(Number::Approx(value.clone()))),
            _ => Ok(expr.clone()),
        },
        SymExpr::Primary(Primary::Call(name, args)) => {
            let args = args
                .iter()
                .map(|arg| rebuild(arg, mode, ctxt))
                .collect::<Result<Vec<_>, _>>()?;
            fold_call(name, args, mode, ctxt)
        },
        SymExpr::Add(terms) => {
            let terms = terms
                .iter()
                .map(|term| rebuild(term, mode, ctxt))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rules::add(terms))
        },
        SymExpr::Mul(factors) => {
            let factors = factors
                .iter()
                .map(|factor| rebuild(factor, mode, ctxt))
                .collect::<Result<Vec<_>, _>>()?;
            rules::mul(factors, mode)
        },
        SymExpr::Exp(base, exp) => {
            rules::pow(rebuild(base, mode, ctxt)?, rebuild(exp, mode, ctxt)?, mode)
        },
    }
}

/// Calls a builtin function if all of its arguments are numbers.
fn fold_call(name: &str, args: Vec<SymExpr>, mode: Mode, ctxt: &Ctxt) -> Result<SymExpr, Error> {
    let unfolded = |args: Vec<SymExpr>| -> Result<SymExpr, Error> {
        Ok(SymExpr::Primary(Primary::Call(name.to_string(), args)))
    };

    let Some(builtin) = funcs::find(name) else {
        return unfolded(args);
    };
    let Some(numbers) = args.iter().map(|arg| arg.as_number().cloned()).collect::<Option<Vec<_>>>() else {
        return unfolded(args);
    };

    let result = builtin.call(&numbers, ctxt)?;
    if mode == Mode::Exact && !result.is_exact() {
        return unfolded(args);
    }
    Ok(SymExpr::number(result))
}
