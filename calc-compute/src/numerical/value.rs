use calc_error::Diagnostic;
use crate::symbolic::expr::{Primary, SymExpr};
use std::fmt;
use super::number::Number;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The result of evaluating a formula.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// A real number.
    Number(Number),

    /// An expression that could not be reduced to a number, because it contains free symbols.
    Expr(SymExpr),

    /// The truth of an equation with no free symbols.
    Boolean(bool),

    /// The formula has no value, such as an equation with free symbols.
    Undefined,

    /// Evaluation failed.
    Error(Vec<Diagnostic>),
}

impl Value {
    /// Returns the errors held by this value, if any.
    pub fn errors(&self) -> &[Diagnostic] {
        match self {
            Self::Error(errors) => errors,
            _ => &[],
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the number held by this value, if any.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Converts the value into an expression that can be substituted into other formulas.
    ///
    /// Booleans, undefined values, and errors have no expression form.
    pub fn to_expr(&self) -> Option<SymExpr> {
        match self {
            Self::Number(n) => Some(SymExpr::Primary(Primary::Number(n.clone()))),
            Self::Expr(expr) => Some(expr.clone()),
            Self::Boolean(_) | Self::Undefined | Self::Error(_) => None,
        }
    }
}

impl From<SymExpr> for Value {
    fn from(expr: SymExpr) -> Self {
        match expr {
            SymExpr::Primary(Primary::Number(n)) => Self::Number(n),
            expr => Self::Expr(expr),
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Expr(expr) => write!(f, "{}", expr),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Undefined => write!(f, "undefined"),
            Self::Error(errors) => match errors.first() {
                Some(err) => write!(f, "{}", err),
                None => write!(f, "error"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn number_expressions_become_numbers() {
        let value = Value::from(SymExpr::Primary(Primary::Number(Number::int(4))));
        assert_eq!(value, Value::Number(Number::int(4)));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::Number(Number::int(-3)).to_string(), "-3");
    }

    #[test]
    fn only_numbers_and_expressions_substitute() {
        assert!(Value::Number(Number::one()).to_expr().is_some());
        assert!(Value::Boolean(false).to_expr().is_none());
        assert!(Value::Undefined.to_expr().is_none());
        assert!(Value::Error(Vec::new()).to_expr().is_none());
    }
}
