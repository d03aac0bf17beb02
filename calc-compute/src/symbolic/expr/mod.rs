//! A representation of mathematical expressions that is easier to manipulate than an AST.
//!
//! The [`Expr`](calc_parser::parser::expr::Expr) type from `calc_parser` is a recursive `enum`
//! that mirrors the input exactly. It's convenient for parsing, but not so much for algebraic
//! manipulation. [`SymExpr`] flattens the tree into lists of terms and factors, and expresses
//! subtraction and division in terms of addition, multiplication, and powers:
//!
//! - `a - b` is `a + (-1)*b`
//! - `a / b` is `a * b^(-1)`
//! - `sqrt(x)` is `x^(1/2)`
//!
//! # Strict equality
//!
//! The [`PartialEq`] implementation implements **strict equality**, not semantic equality. Two
//! expressions are strictly equal if:
//!
//! - They are the same type of expression (i.e. both [`SymExpr::Primary`], both
//! [`SymExpr::Add`], etc.).
//! - If both are [`SymExpr::Primary`], both expressions must have strictly equal values. An exact
//! number is never strictly equal to an approximate one.
//! - If both are [`SymExpr::Add`] or [`SymExpr::Mul`], both expressions must have strictly equal
//! terms / factors, in any order.
//! - If both are [`SymExpr::Exp`], both expressions must have strictly equal base and exponent.
//!
//! `x^2 + 2x + 1` and `(x + 1)^2` are semantically equal, but not strictly equal. Strict equality
//! never reports false positives, which makes it suitable for combining like terms.

mod convert;

pub use convert::from_ast;

use crate::consts;
use crate::numerical::number::Number;
use crate::primitive::rational;
use rug::Rational;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single term / factor, such as a number, variable, or function call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Primary {
    /// A number, such as `2`, `0.5`, or an approximation of `pi`.
    Number(Number),

    /// A variable, such as `x` or `y`.
    Symbol(String),

    /// A call to a builtin function, such as `sin(x)`.
    Call(String, Vec<SymExpr>),
}

impl fmt::Display for Primary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(num) => write!(f, "{}", num),
            Self::Symbol(sym) => write!(f, "{}", sym),
            Self::Call(name, args) => {
                write!(f, "{}(", name)?;
                let mut iter = args.iter();
                if let Some(arg) = iter.next() {
                    write!(f, "{}", arg)?;
                    for arg in iter {
                        write!(f, ", {}", arg)?;
                    }
                }
                write!(f, ")")
            },
        }
    }
}

/// A mathematical expression with information about its terms and factors.
///
/// For more information about this type, see the [module-level documentation](self).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SymExpr {
    /// A single term or factor.
    Primary(Primary),

    /// Multiple terms added together.
    Add(Vec<SymExpr>),

    /// Multiple factors multiplied together.
    Mul(Vec<SymExpr>),

    /// An expression raised to a power.
    Exp(Box<SymExpr>, Box<SymExpr>),
}

/// How tightly an expression binds when printed, from loosest to tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Binding {
    Term,
    Factor,
    Neg,
    Exp,
    Atom,
}

impl SymExpr {
    pub fn number(n: impl Into<Number>) -> Self {
        Self::Primary(Primary::Number(n.into()))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Primary(Primary::Symbol(name.into()))
    }

    /// If the expression is a number, returns a reference to it.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Primary(Primary::Number(n)) => Some(n),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        self.as_number().is_some()
    }

    /// If the expression is a symbol, returns its name.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Primary(Primary::Symbol(sym)) => Some(sym),
            _ => None,
        }
    }

    /// Trivially downgrades the expression into a simpler form.
    ///
    /// Some operations may result in an [`SymExpr::Add`] with zero / one term, or an
    /// [`SymExpr::Mul`] with zero / one factor. This function checks for these cases and
    /// simplifies the expression into the single term / factor, or the number 0 or 1.
    pub(crate) fn downgrade(self) -> Self {
        match self {
            Self::Add(mut terms) => match terms.len() {
                0 => Self::number(Number::zero()),
                1 => terms.remove(0),
                _ => Self::Add(terms),
            },
            Self::Mul(mut factors) => match factors.len() {
                0 => Self::number(Number::one()),
                1 => factors.remove(0),
                _ => Self::Mul(factors),
            },
            _ => self,
        }
    }

    /// Returns the free symbols of the expression. Constants such as `pi` are not free.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Primary(Primary::Number(_)) => {},
            Self::Primary(Primary::Symbol(sym)) => {
                if consts::lookup(sym).is_none() {
                    out.insert(sym.clone());
                }
            },
            Self::Primary(Primary::Call(_, args)) => {
                args.iter().for_each(|arg| arg.collect_symbols(out));
            },
            Self::Add(exprs) | Self::Mul(exprs) => {
                exprs.iter().for_each(|expr| expr.collect_symbols(out));
            },
            Self::Exp(base, exp) => {
                base.collect_symbols(out);
                exp.collect_symbols(out);
            },
        }
    }

    /// Returns true if the given symbol appears anywhere in the expression.
    pub fn contains_symbol(&self, name: &str) -> bool {
        match self {
            Self::Primary(Primary::Number(_)) => false,
            Self::Primary(Primary::Symbol(sym)) => sym == name,
            Self::Primary(Primary::Call(_, args)) => args.iter().any(|arg| arg.contains_symbol(name)),
            Self::Add(exprs) | Self::Mul(exprs) => exprs.iter().any(|expr| expr.contains_symbol(name)),
            Self::Exp(base, exp) => base.contains_symbol(name) || exp.contains_symbol(name),
        }
    }

    /// Replaces every occurrence of the bound symbols. No simplification is done.
    pub fn substitute(&self, bindings: &HashMap<String, SymExpr>) -> Self {
        match self {
            Self::Primary(Primary::Symbol(sym)) => match bindings.get(sym) {
                Some(value) => value.clone(),
                None => self.clone(),
            },
            Self::Primary(Primary::Number(_)) => self.clone(),
            Self::Primary(Primary::Call(name, args)) => Self::Primary(Primary::Call(
                name.clone(),
                args.iter().map(|arg| arg.substitute(bindings)).collect(),
            )),
            Self::Add(terms) => Self::Add(terms.iter().map(|term| term.substitute(bindings)).collect()),
            Self::Mul(factors) => Self::Mul(factors.iter().map(|factor| factor.substitute(bindings)).collect()),
            Self::Exp(base, exp) => Self::Exp(
                Box::new(base.substitute(bindings)),
                Box::new(exp.substitute(bindings)),
            ),
        }
    }

    /// If the expression prints with a leading minus sign, returns the expression without it.
    fn negated(&self) -> Option<Self> {
        match self {
            Self::Primary(Primary::Number(n)) if n.is_negative() => Some(Self::number(n.neg())),
            Self::Mul(factors) => {
                let coefficient = factors.first()?.as_number().filter(|n| n.is_negative())?;
                let mut rest = factors[1..].to_vec();
                let positive = coefficient.neg();
                if !positive.is_one() {
                    rest.insert(0, Self::number(positive));
                }
                Some(Self::Mul(rest).downgrade())
            },
            _ => None,
        }
    }

    fn binding(&self) -> Binding {
        match self {
            Self::Primary(Primary::Number(n)) if n.is_negative() => Binding::Neg,
            Self::Primary(Primary::Number(Number::Exact(r))) if !prints_as_decimal(r) => Binding::Factor,
            Self::Primary(_) => Binding::Atom,
            Self::Add(_) => Binding::Term,
            Self::Mul(_) if self.negated().is_some() => Binding::Neg,
            Self::Mul(_) => Binding::Factor,
            Self::Exp(_, exp) if is_half(exp) => Binding::Atom,
            Self::Exp(..) => Binding::Exp,
        }
    }

    /// Writes the expression, wrapping it in parentheses if it binds looser than `min`.
    fn fmt_within(&self, f: &mut fmt::Formatter<'_>, min: Binding) -> fmt::Result {
        if self.binding() < min {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }

    /// Splits the factors of a product into those that belong in the numerator and those that
    /// belong in the denominator when printed.
    fn fraction_parts(factors: &[SymExpr]) -> (Vec<SymExpr>, Vec<SymExpr>) {
        let mut numer = Vec::new();
        let mut denom = Vec::new();
        for factor in factors {
            match factor {
                Self::Primary(Primary::Number(Number::Exact(r))) if *r.denom() != 1 && !prints_as_decimal(r) => {
                    if *r.numer() != 1 {
                        numer.push(Self::number(rational(r.numer())));
                    }
                    denom.push(Self::number(rational(r.denom())));
                },
                Self::Exp(base, exp) => match exp.as_number().filter(|n| n.is_negative()) {
                    Some(n) if n.neg().is_one() => denom.push((**base).clone()),
                    Some(n) => denom.push(Self::Exp(base.clone(), Box::new(Self::number(n.neg())))),
                    None => numer.push(factor.clone()),
                },
                _ => numer.push(factor.clone()),
            }
        }
        (numer, denom)
    }
}

/// Returns true if the rational prints as an integer or a terminating decimal.
fn prints_as_decimal(r: &Rational) -> bool {
    let mut denom = r.denom().clone();
    while denom.is_divisible_u(2) {
        denom /= 2u32;
    }
    while denom.is_divisible_u(5) {
        denom /= 5u32;
    }
    denom == 1
}

fn is_half(expr: &SymExpr) -> bool {
    matches!(expr.as_number(), Some(Number::Exact(r)) if *r == rational((1, 2)))
}

/// Writes factors joined by ` * `.
fn fmt_product(f: &mut fmt::Formatter<'_>, factors: &[SymExpr]) -> fmt::Result {
    let mut iter = factors.iter();
    if let Some(factor) = iter.next() {
        factor.fmt_within(f, Binding::Factor)?;
        for factor in iter {
            write!(f, " * ")?;
            factor.fmt_within(f, Binding::Neg)?;
        }
    }
    Ok(())
}

impl fmt::Display for SymExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary(primary) => write!(f, "{}", primary),
            Self::Add(terms) => {
                let mut iter = terms.iter();
                if let Some(term) = iter.next() {
                    write!(f, "{}", term)?;
                    for term in iter {
                        match term.negated() {
                            Some(positive) => write!(f, " - {}", positive)?,
                            None => write!(f, " + {}", term)?,
                        }
                    }
                }
                Ok(())
            },
            Self::Mul(factors) => {
                if let Some(Number::Exact(r)) = factors.first().and_then(SymExpr::as_number) {
                    if *r == -1 && factors.len() > 1 {
                        write!(f, "-")?;
                        return Self::Mul(factors[1..].to_vec()).downgrade().fmt_within(f, Binding::Neg);
                    }
                }

                let (numer, denom) = Self::fraction_parts(factors);
                if denom.is_empty() {
                    return fmt_product(f, &numer);
                }

                if numer.is_empty() {
                    write!(f, "1")?;
                } else {
                    fmt_product(f, &numer)?;
                }
                write!(f, " / ")?;
                if denom.len() == 1 {
                    denom[0].fmt_within(f, Binding::Exp)
                } else {
                    write!(f, "(")?;
                    fmt_product(f, &denom)?;
                    write!(f, ")")
                }
            },
            Self::Exp(base, exp) => {
                if is_half(exp) {
                    return write!(f, "sqrt({})", base);
                }

                // powers are right-associative, so a power base needs parentheses
                if base.binding() <= Binding::Exp {
                    write!(f, "({})", base)?;
                } else {
                    write!(f, "{}", base)?;
                }
                write!(f, "^")?;

                let bare_exponent = exp.binding() == Binding::Atom
                    || exp.as_number().and_then(Number::as_integer).is_some();
                if bare_exponent {
                    write!(f, "{}", exp)
                } else {
                    write!(f, "({})", exp)
                }
            },
        }
    }
}

/// Checks if two expressions are **strictly** equal.
///
/// For more information about strict equality, see the [module-level documentation](self).
impl PartialEq for SymExpr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Primary(lhs), Self::Primary(rhs)) => lhs == rhs,
            (Self::Add(lhs), Self::Add(rhs)) | (Self::Mul(lhs), Self::Mul(rhs)) => {
                lhs.len() == rhs.len()
                    && lhs.iter().all(|lhs| rhs.contains(lhs))
            },
            (Self::Exp(lhs_base, lhs_exp), Self::Exp(rhs_base, rhs_exp)) => {
                lhs_base == rhs_base && lhs_exp == rhs_exp
            },
            _ => false,
        }
    }
}

impl From<Number> for SymExpr {
    fn from(n: Number) -> Self {
        Self::number(n)
    }
}
