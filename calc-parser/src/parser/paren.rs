use crate::tokenizer::TokenKind;
use std::{fmt, ops::Range};
use super::{
    error::{kind, Error},
    expr::Expr,
    Parse,
    Parser,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A parenthesized expression. Both `( ... )` and LaTeX brace groups `{ ... }` parse into this.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Paren {
    /// The inner expression.
    pub expr: Box<Expr>,

    /// The region of the source code that this expression was parsed from.
    pub span: Range<usize>,
}

impl Paren {
    /// Returns the span of the parenthesized expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Returns the innermost expression, removing any number of redundant parentheses.
    pub fn into_innermost(self) -> Expr {
        let mut inner = *self.expr;
        while let Expr::Paren(paren) = inner {
            inner = *paren.expr;
        }
        inner
    }
}

/// Returns the token kind closing the given opening token, along with its name for errors.
fn closing_of(kind: TokenKind) -> Option<(TokenKind, &'static str, &'static str)> {
    match kind {
        TokenKind::OpenParen => Some((TokenKind::CloseParen, "parenthesis", "`)`")),
        TokenKind::OpenBrace => Some((TokenKind::CloseBrace, "brace", "`}`")),
        _ => None,
    }
}

impl Parse for Paren {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let open = input.next_token()?;
        let Some((close_kind, delimiter, closing)) = closing_of(open.kind) else {
            return Err(Error::new(vec![open.span], kind::UnexpectedToken {
                expected: &[TokenKind::OpenParen, TokenKind::OpenBrace],
                found: open.kind,
            }));
        };

        if input.peek_kind() == Some(close_kind) {
            let close = input.next_token()?;
            return Err(Error::new(vec![open.span.start..close.span.end], kind::EmptyParenthesis));
        }

        let expr = Expr::parse(input)?;
        match input.next_token() {
            Ok(close) if close.kind == close_kind => Ok(Self {
                expr: Box::new(expr),
                span: open.span.start..close.span.end,
            }),
            _ => Err(Error::new(vec![open.span], kind::UnclosedDelimiter { delimiter, closing })),
        }
    }
}

impl fmt::Display for Paren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.expr)
    }
}
