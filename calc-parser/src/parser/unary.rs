use crate::tokenizer::TokenKind;
use std::{fmt, ops::Range};
use super::{
    binary::Binary,
    error::Error,
    expr::Expr,
    token::op::{UnaryOp, UnaryOpKind},
    Parse,
    Parser,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A unary expression, such as `-x` or `5!`. Unary expressions can include nested expressions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Unary {
    /// The operand of the unary expression (left or right, depending on the associativity).
    pub operand: Box<Expr>,

    /// The operator of the unary expression.
    pub op: UnaryOp,

    /// The region of the source code that this unary expression was parsed from.
    pub span: Range<usize>,
}

impl Unary {
    /// Returns the span of the unary expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses a unary expression, or lower precedence expressions.
    ///
    /// A leading `-` takes as its operand everything that binds tighter than negation, so `-x^2`
    /// is `-(x^2)`. Trailing `!` operators apply to the primary expression directly before them.
    pub fn parse_or_lower(input: &mut Parser) -> Result<Expr, Error> {
        // unary plus has no effect
        if input.peek_kind() == Some(TokenKind::Add) {
            input.next_token()?;
            return Self::parse_or_lower(input);
        }

        if input.peek_kind() == Some(TokenKind::Sub) {
            let op = UnaryOp::parse(input)?;
            let operand = Self::parse_or_lower(input)?;
            let operand = Binary::parse_expr(input, operand, op.precedence())?;
            return Ok(Expr::Unary(Self {
                span: op.span.start..operand.span().end,
                operand: Box::new(operand),
                op,
            }));
        }

        let mut expr = Expr::parse_primary(input)?;
        while input.peek_kind() == Some(TokenKind::Factorial) {
            let op = UnaryOp::parse(input)?;
            expr = Expr::Unary(Self {
                span: expr.span().start..op.span.end,
                operand: Box::new(expr),
                op,
            });
        }

        Ok(expr)
    }
}

impl fmt::Display for Unary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op.kind {
            UnaryOpKind::Neg => write!(f, "{}{}", self.op, self.operand),
            UnaryOpKind::Factorial => write!(f, "{}{}", self.operand, self.op),
        }
    }
}
