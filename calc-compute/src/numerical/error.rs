//! Errors that can occur while converting or evaluating an expression.

use ariadne::Fmt;
use calc_attrs::ErrorKind;
use calc_error::EXPR;

/// A division by zero, including raising zero to a negative power.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "division by zero",
    labels = ["this expression divides by zero"],
)]
pub struct DivisionByZero;

/// The result of an operation is not a real number, such as `(-1)^0.5`.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "result is not a real number",
    labels = ["this operation"],
    help = "only real-valued results are supported",
)]
pub struct ComplexResult;

/// The result of an operation is too large to represent.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "result is too large to represent",
    labels = ["this operation"],
)]
pub struct NonFiniteResult;

/// A function was called with an argument outside of its domain.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("argument out of domain for `{}`", name),
    labels = ["this call"],
    help = format!("`{}` {}", name, reason),
)]
pub struct OutOfDomain {
    /// The name of the function.
    pub name: &'static str,

    /// A description of the valid domain, in the form "is only defined for ...".
    pub reason: &'static str,
}

/// A function with this name does not exist.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unknown function `{}`", name),
    labels = ["this function", ""],
    help = if suggestions.is_empty() {
        String::new()
    } else {
        format!("did you mean: {}", suggestions.iter().map(|s| format!("`{}`", s.fg(EXPR))).collect::<Vec<_>>().join(", "))
    },
)]
pub struct UnknownFunction {
    /// The name that was called.
    pub name: String,

    /// Builtin functions with similar names.
    pub suggestions: Vec<&'static str>,
}

/// A function was called with the wrong number of arguments.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("wrong number of arguments to `{}`", name),
    labels = [format!("this call has {} argument(s)", given), ""],
    help = format!("`{}` takes {}", name, expected),
)]
pub struct WrongArgumentCount {
    /// The name of the function.
    pub name: String,

    /// A description of the accepted argument count, such as "1 argument".
    pub expected: String,

    /// The number of arguments given.
    pub given: usize,
}

/// An `=` sign appeared somewhere other than the top level of the input.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "misplaced equation",
    labels = ["this `=` is inside another expression"],
    help = "an input can contain at most one `=`, separating the two sides of an equation",
)]
pub struct NestedEquation;

/// A number literal could not be read.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "invalid number",
    labels = ["this number"],
)]
pub struct InvalidNumber;

/// The formula refers to an entry whose own value is an error.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` has an error: {}", name, reason),
    labels = [],
    help = format!("fix `{}` to evaluate this expression", name),
)]
pub struct FailedDependency {
    /// The identifier of the failed entry.
    pub name: String,

    /// The first error of the failed entry.
    pub reason: String,
}
