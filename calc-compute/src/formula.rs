//! A parsed piece of calculator input.

use calc_error::Diagnostic;
use calc_parser::parser::{binary::Binary, expr::Expr as AstExpr, token::op::BinOpKind, Parser};
use crate::numerical::{ctxt::Ctxt, number::Number, value::Value};
use crate::symbolic::{self, expr::{from_ast, SymExpr}};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Calculator input, parsed and converted into symbolic form.
///
/// Parsing never fails: input that cannot be parsed or converted becomes
/// [`Formula::Invalid`], carrying the diagnostics that explain why.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Formula {
    /// An expression, such as `2x + 1`.
    Expr(SymExpr),

    /// An equation, such as `x^2 = 4`.
    Equation(SymExpr, SymExpr),

    /// Input that could not be parsed.
    Invalid(Vec<Diagnostic>),
}

impl Formula {
    /// Parses the given source.
    pub fn parse(source: &str) -> Self {
        let ast = match Parser::new(source).try_parse_full::<AstExpr>() {
            Ok(ast) => ast,
            Err(err) => return Self::Invalid(vec![err.to_diagnostic()]),
        };

        let ast = match ast {
            AstExpr::Paren(paren) => paren.into_innermost(),
            ast => ast,
        };

        let converted = match ast {
            AstExpr::Binary(Binary { lhs, op, rhs, .. }) if op.kind == BinOpKind::Eq => {
                from_ast(*lhs).and_then(|lhs| Ok(Self::Equation(lhs, from_ast(*rhs)?)))
            },
            ast => from_ast(ast).map(Self::Expr),
        };
        converted.unwrap_or_else(|err| Self::Invalid(vec![err.to_diagnostic()]))
    }

    pub fn is_equation(&self) -> bool {
        matches!(self, Self::Equation(..))
    }

    /// Returns the diagnostics of an invalid formula.
    pub fn errors(&self) -> &[Diagnostic] {
        match self {
            Self::Invalid(errors) => errors,
            _ => &[],
        }
    }

    /// Returns the free symbols of the formula, sorted.
    pub fn symbols(&self) -> BTreeSet<String> {
        match self {
            Self::Expr(expr) => expr.symbols(),
            Self::Equation(lhs, rhs) => {
                let mut symbols = lhs.symbols();
                symbols.extend(rhs.symbols());
                symbols
            },
            Self::Invalid(_) => BTreeSet::new(),
        }
    }

    /// Replaces the bound symbols with the given expressions.
    pub fn substitute(&self, bindings: &HashMap<String, SymExpr>) -> Self {
        match self {
            Self::Expr(expr) => Self::Expr(expr.substitute(bindings)),
            Self::Equation(lhs, rhs) => Self::Equation(lhs.substitute(bindings), rhs.substitute(bindings)),
            Self::Invalid(errors) => Self::Invalid(errors.clone()),
        }
    }

    /// Evaluates the formula.
    ///
    /// An equation with no free symbols evaluates to whether both sides are equal. An equation
    /// with free symbols has no value.
    pub fn evaluate(&self, ctxt: &Ctxt) -> Value {
        let result = match self {
            Self::Invalid(errors) => return Value::Error(errors.clone()),
            Self::Expr(expr) => symbolic::evaluate(expr, ctxt).map(Value::from),
            Self::Equation(..) if !self.symbols().is_empty() => return Value::Undefined,
            Self::Equation(lhs, rhs) => symbolic::evaluate(lhs, ctxt).and_then(|lhs| {
                let rhs = symbolic::evaluate(rhs, ctxt)?;
                Ok(match (lhs.as_number(), rhs.as_number()) {
                    (Some(lhs), Some(rhs)) => Value::Boolean(lhs.approx_eq(rhs)),
                    _ => Value::Undefined,
                })
            }),
        };

        result.unwrap_or_else(|err| Value::Error(vec![err.to_diagnostic()]))
    }

    /// Solves an equation for the given symbol. Expressions and invalid formulas have no
    /// solutions, and neither do equations that cannot be solved.
    pub fn solve(&self, symbol: &str, ctxt: &Ctxt) -> Vec<Value> {
        let Self::Equation(lhs, rhs) = self else {
            return Vec::new();
        };

        let difference = SymExpr::Add(vec![
            lhs.clone(),
            SymExpr::Mul(vec![SymExpr::number(Number::int(-1)), rhs.clone()]),
        ]);
        symbolic::solve(&difference, symbol, ctxt)
            .map(|solutions| solutions.into_iter().map(Value::from).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr(expr) => write!(f, "{}", expr),
            Self::Equation(lhs, rhs) => write!(f, "{} = {}", lhs, rhs),
            Self::Invalid(errors) => match errors.first() {
                Some(err) => write!(f, "{}", err),
                None => write!(f, "invalid"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn evaluate(source: &str) -> Value {
        Formula::parse(source).evaluate(&Ctxt::default())
    }

    #[test]
    fn expressions() {
        assert_eq!(evaluate("1 + 2"), Value::Number(Number::int(3)));
        assert_eq!(evaluate("x + x").to_string(), "2 * x");
    }

    #[test]
    fn closed_equations_are_booleans() {
        assert_eq!(evaluate("1 + 1 = 2"), Value::Boolean(true));
        assert_eq!(evaluate("(1 = 2)"), Value::Boolean(false));
        assert_eq!(evaluate("sin(pi) = 0"), Value::Boolean(true));
    }

    #[test]
    fn open_equations_are_undefined() {
        assert_eq!(evaluate("x^2 = 4"), Value::Undefined);
    }

    #[test]
    fn solve_equations() {
        let solutions = Formula::parse("x^2 = 4").solve("x", &Ctxt::default());
        assert_eq!(solutions, vec![Value::Number(Number::int(-2)), Value::Number(Number::int(2))]);
        assert!(Formula::parse("x + 1").solve("x", &Ctxt::default()).is_empty());
    }

    #[test]
    fn invalid_input() {
        let formula = Formula::parse("1 +");
        assert_eq!(formula.errors().len(), 1);
        assert_eq!(formula.to_string(), "unexpected end of input");
        assert!(evaluate("1 / 0").is_error());
        assert!(evaluate("f(1, 2)").is_error());
    }

    #[test]
    fn substitution() {
        let formula = Formula::parse("a + b = 3");
        let bindings = HashMap::from([("a".to_string(), SymExpr::number(Number::int(1))), ("b".to_string(), SymExpr::number(Number::int(2)))]);
        let substituted = formula.substitute(&bindings);
        assert!(substituted.symbols().is_empty());
        assert_eq!(substituted.evaluate(&Ctxt::default()), Value::Boolean(true));
    }
}
