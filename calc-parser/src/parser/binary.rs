use std::{fmt, ops::Range};
use super::{
    error::Error,
    expr::Expr,
    token::op::{BinOp, BinOpKind},
    unary::Unary,
    Associativity,
    Parser,
    Precedence,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A binary operator, or the implicit multiplication between two juxtaposed operands.
#[derive(Debug, Clone, PartialEq)]
enum BinOpExt {
    /// A binary operator, such as `+` or `*`.
    Op(BinOp),

    /// Implicit multiplication, such as `2x` or `x(x + 1)`.
    ///
    /// This is not a real operator, but it is treated as one for the purposes of parsing.
    ImplicitMultiplication,
}

impl BinOpExt {
    /// Returns the precedence of the binary operator.
    fn precedence(&self) -> Precedence {
        match self {
            BinOpExt::Op(op) => op.precedence(),
            BinOpExt::ImplicitMultiplication => Precedence::Factor,
        }
    }
}

/// A binary expression, such as `1 + 2`. Binary expressions can include nested expressions.
///
/// Equations (`lhs = rhs`) are binary expressions using [`BinOpKind::Eq`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Binary {
    /// The left-hand side of the binary expression.
    pub lhs: Box<Expr>,

    /// The operator of the binary expression.
    pub op: BinOp,

    /// The right-hand side of the binary expression.
    pub rhs: Box<Expr>,

    /// The region of the source code that this binary expression was parsed from.
    pub span: Range<usize>,
}

impl Binary {
    /// Returns the span of the binary expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Peeks at the next operator, returning it along with a parser positioned after it. Implicit
    /// multiplication consumes no tokens.
    fn peek_op<'source>(input: &Parser<'source>) -> Option<(BinOpExt, Parser<'source>)> {
        let mut input_ahead = input.clone();
        match input_ahead.try_parse::<BinOp>() {
            Ok(op) => Some((BinOpExt::Op(op), input_ahead)),
            Err(_) if input.at_primary() => Some((BinOpExt::ImplicitMultiplication, input.clone())),
            Err(_) => None,
        }
    }

    /// After parsing the left-hand-side, the operator, and the right-hand-side of a potential
    /// binary expression, parse ahead to see if the right-hand-side is incomplete.
    fn complete_rhs(
        input: &mut Parser,
        lhs: Expr,
        op: BinOpExt,
        mut rhs: Expr,
    ) -> Result<Expr, Error> {
        let precedence = op.precedence();

        // before creating the `lhs op rhs` node, check the precedence of the following operator,
        // if any: `3 + 4 * 5` must not become `(3 + 4) * 5`
        while let Some((next_op, _)) = Self::peek_op(input) {
            let next_precedence = next_op.precedence();
            let right_assoc = matches!(&next_op, BinOpExt::Op(op) if op.associativity() == Associativity::Right);
            if next_precedence > precedence || (next_precedence == precedence && right_assoc) {
                rhs = Self::parse_expr(input, rhs, next_precedence)?;
            } else {
                // lower precedence, or equal precedence and left-associativity: `1 * 2 + 3` or
                // `1 * 2 * 3`; the outer loop will pick this operator up
                break;
            }
        }

        let (start_span, end_span) = (lhs.span().start, rhs.span().end);
        let op = match op {
            BinOpExt::Op(op) => op,
            BinOpExt::ImplicitMultiplication => BinOp {
                kind: BinOpKind::Mul,
                implicit: true,
                span: lhs.span().end..rhs.span().start,
            },
        };

        Ok(Expr::Binary(Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
            span: start_span..end_span,
        }))
    }

    /// Parses binary operators following `lhs`, as long as they bind at least as tightly as
    /// `precedence`.
    pub fn parse_expr(
        input: &mut Parser,
        mut lhs: Expr,
        precedence: Precedence,
    ) -> Result<Expr, Error> {
        while let Some((op, input_ahead)) = Self::peek_op(input) {
            if op.precedence() < precedence {
                break;
            }

            input.set_cursor(&input_ahead);
            let rhs = Unary::parse_or_lower(input)?;
            lhs = Self::complete_rhs(input, lhs, op, rhs)?;
        }

        Ok(lhs)
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op.implicit {
            write!(f, "{} {}", self.lhs, self.rhs)
        } else {
            write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
        }
    }
}
