use crate::tokenizer::TokenKind;
use std::{fmt, ops::Range};
use super::{
    error::{kind, Error},
    expr::Expr,
    literal::LitSym,
    token::{CloseParen, OpenParen},
    Parser,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A function call, such as `log(8, 2)` or `\sin(x)`.
///
/// Whether the name actually refers to a function is decided later: a call to an unknown name
/// with one argument is read as implicit multiplication.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Call {
    /// The name of the function to call.
    pub name: LitSym,

    /// The arguments to the function.
    pub args: Vec<Expr>,

    /// The region of the source code that this function call was parsed from.
    pub span: Range<usize>,

    /// The span of the parentheses that surround the arguments.
    pub paren_span: Range<usize>,
}

impl Call {
    /// Returns the span of the function call.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Returns a set of two spans, where the first is the span of the function name (with the
    /// opening parenthesis) and the second is the span of the closing parenthesis.
    pub fn outer_span(&self) -> [Range<usize>; 2] {
        [
            self.name.span.start..self.paren_span.start + 1,
            self.paren_span.end - 1..self.paren_span.end,
        ]
    }

    /// Parses the parenthesized argument list following an already parsed function name.
    pub fn parse_args(input: &mut Parser, name: LitSym) -> Result<Self, Error> {
        let open = input.try_parse::<OpenParen>()?;
        let args = if input.peek_kind() == Some(TokenKind::CloseParen) {
            Vec::new()
        } else {
            input.parse_delimited::<Expr>(TokenKind::Comma)?
        };

        let close = input.try_parse::<CloseParen>().map_err(|_| {
            Error::new(vec![open.span.clone()], kind::UnclosedDelimiter {
                delimiter: "parenthesis",
                closing: "`)`",
            })
        })?;

        Ok(Self {
            span: name.span.start..close.span.end,
            name,
            args,
            paren_span: open.span.start..close.span.end,
        })
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}
