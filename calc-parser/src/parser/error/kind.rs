use ariadne::Fmt;
use calc_attrs::ErrorKind;
use calc_error::EXPR;
use crate::tokenizer::TokenKind;

/// An intentionally useless error. This should only be used for non-fatal errors, as it contains
/// no useful information.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "an internal non-fatal error occurred while parsing",
    labels = ["here"],
    help = "you should never see this error; please report this as a bug"
)]
pub struct NonFatal;

/// The end of the source code was reached unexpectedly.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected end of input",
    labels = [format!("you might need to add another {} here", "expression".fg(EXPR))],
)]
pub struct UnexpectedEof;

/// The end of the source code was expected, but something else was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expected end of input",
    labels = [format!("I could not understand the remaining {} here", "expression".fg(EXPR))],
)]
pub struct ExpectedEof;

/// An unexpected token was encountered.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected token",
    labels = [format!("expected one of: {}", expected.iter().map(|t| format!("{:?}", t)).collect::<Vec<_>>().join(", "))],
    help = format!("found {:?}", found),
)]
pub struct UnexpectedToken {
    /// The token(s) that were expected.
    pub expected: &'static [TokenKind],

    /// The token that was found.
    pub found: TokenKind,
}

/// A `$` reference that was not rewritten into `\mathrm{...}` form.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected `$`",
    labels = ["this reference marker"],
    help = format!("references are written as {}", "\\mathrm{name}".fg(EXPR)),
)]
pub struct StrayDollar;

/// A `\mathrm{}` reference with no name inside the braces.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "empty reference",
    labels = ["this reference has no name"],
)]
pub struct EmptyReference;

/// A parenthesis or brace was not closed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unclosed {}", delimiter),
    labels = [format!("this {} needs to be closed", delimiter)],
    help = format!("add a closing {} at the end", closing),
)]
pub struct UnclosedDelimiter {
    /// The kind of delimiter, used in the message.
    pub delimiter: &'static str,

    /// The token that closes the delimiter.
    pub closing: &'static str,
}

/// Parentheses or braces with nothing inside.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "missing expression inside parenthesis",
    labels = ["add an expression here"],
)]
pub struct EmptyParenthesis;
