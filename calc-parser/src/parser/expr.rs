use crate::tokenizer::TokenKind;
use std::{fmt, ops::Range};
use super::{
    binary::Binary,
    call::Call,
    error::{kind, Error},
    literal::{LitSym, Literal, LitNum},
    paren::Paren,
    token::{op::{BinOp, BinOpKind}, CloseBracket, OpenBracket},
    unary::Unary,
    Parse,
    Parser,
    Precedence,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents any kind of expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A literal value.
    Literal(Literal),

    /// A parenthesized expression, such as `(1 + 2)`.
    Paren(Paren),

    /// A function call, such as `abs(-1)`.
    Call(Call),

    /// A unary operation, such as `-1` or `5!`.
    Unary(Unary),

    /// A binary operation, such as `1 + 2`.
    Binary(Binary),
}

impl Expr {
    /// Returns the span of the expression.
    pub fn span(&self) -> Range<usize> {
        match self {
            Expr::Literal(literal) => literal.span(),
            Expr::Paren(paren) => paren.span(),
            Expr::Call(call) => call.span(),
            Expr::Unary(unary) => unary.span(),
            Expr::Binary(binary) => binary.span(),
        }
    }

    /// Parses a primary expression: a literal, symbol, call, group, or LaTeX construct.
    pub fn parse_primary(input: &mut Parser) -> Result<Self, Error> {
        match input.peek_kind() {
            Some(TokenKind::Int | TokenKind::Float) => {
                Ok(Expr::Literal(Literal::Number(LitNum::parse(input)?)))
            },
            Some(TokenKind::Name | TokenKind::Command) => {
                let name = LitSym::parse(input)?;
                if input.peek_kind() == Some(TokenKind::OpenParen) {
                    Ok(Expr::Call(Call::parse_args(input, name)?))
                } else {
                    Ok(Expr::Literal(Literal::Symbol(name)))
                }
            },
            Some(TokenKind::Mathrm) => Ok(Expr::Literal(Literal::Symbol(LitSym::parse(input)?))),
            Some(TokenKind::OpenParen | TokenKind::OpenBrace) => Ok(Expr::Paren(Paren::parse(input)?)),
            Some(TokenKind::Frac) => parse_frac(input),
            Some(TokenKind::Sqrt) => parse_sqrt(input),
            _ => {
                let token = input.next_token()?;
                if token.lexeme == "$" {
                    Err(Error::new(vec![token.span], kind::StrayDollar))
                } else {
                    Err(Error::new(vec![token.span], kind::UnexpectedToken {
                        expected: &[
                            TokenKind::Int,
                            TokenKind::Float,
                            TokenKind::Name,
                            TokenKind::Mathrm,
                            TokenKind::OpenParen,
                        ],
                        found: token.kind,
                    }))
                }
            },
        }
    }
}

/// Parses `\frac{numerator}{denominator}` into a division.
fn parse_frac(input: &mut Parser) -> Result<Expr, Error> {
    let frac = input.next_token()?;
    let numerator = Paren::parse(input)?;
    let denominator = Paren::parse(input)?;
    let span = frac.span.start..denominator.span.end;

    Ok(Expr::Binary(Binary {
        lhs: Box::new(Expr::Paren(numerator)),
        op: BinOp {
            kind: BinOpKind::Div,
            implicit: false,
            span: frac.span,
        },
        rhs: Box::new(Expr::Paren(denominator)),
        span,
    }))
}

/// Parses `\sqrt{radicand}` into a call to `sqrt`, or `\sqrt[index]{radicand}` into a call to
/// `root`.
fn parse_sqrt(input: &mut Parser) -> Result<Expr, Error> {
    let sqrt = input.next_token()?;
    let index = if input.peek_kind() == Some(TokenKind::OpenBracket) {
        input.try_parse::<OpenBracket>()?;
        let index = Expr::parse(input)?;
        input.try_parse::<CloseBracket>()?;
        Some(index)
    } else {
        None
    };

    let radicand = Paren::parse(input)?;
    let paren_span = radicand.span();
    let span = sqrt.span.start..paren_span.end;
    let (name, args) = match index {
        Some(index) => ("root", vec![radicand.into_innermost(), index]),
        None => ("sqrt", vec![radicand.into_innermost()]),
    };

    Ok(Expr::Call(Call {
        name: LitSym {
            name: name.to_string(),
            span: sqrt.span,
        },
        args,
        span,
        paren_span,
    }))
}

impl Parse for Expr {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let lhs = Unary::parse_or_lower(input)?;
        Binary::parse_expr(input, lhs, Precedence::Any)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal) => literal.fmt(f),
            Expr::Paren(paren) => paren.fmt(f),
            Expr::Call(call) => call.fmt(f),
            Expr::Unary(unary) => unary.fmt(f),
            Expr::Binary(binary) => binary.fmt(f),
        }
    }
}
