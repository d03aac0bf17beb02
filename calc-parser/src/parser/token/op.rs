//! Operators, and the tokens they are parsed from.

use crate::{
    parser::{
        error::{Error, kind},
        Associativity,
        Parse,
        Parser,
        Precedence,
    },
    tokenizer::TokenKind,
};
use std::{fmt, ops::Range};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A unary operation. Negation is a prefix operator and factorial is a postfix operator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOpKind {
    Factorial,
    Neg,
}

impl UnaryOpKind {
    const TOKENS: &'static [TokenKind] = &[TokenKind::Factorial, TokenKind::Sub];

    fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Factorial => Some(Self::Factorial),
            TokenKind::Sub => Some(Self::Neg),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Factorial => "!",
            Self::Neg => "-",
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Factorial => Precedence::Factorial,
            Self::Neg => Precedence::Neg,
        }
    }

    /// Prefix operators are right-associative, postfix operators left-associative.
    pub fn associativity(&self) -> Associativity {
        match self {
            Self::Neg => Associativity::Right,
            Self::Factorial => Associativity::Left,
        }
    }
}

/// A binary operation. `=` is parsed as a binary operator with the lowest precedence, so that
/// `x^2 = 4` becomes an equation with an expression on each side.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinOpKind {
    Exp,
    Mul,
    Div,
    Add,
    Sub,
    Eq,
}

impl BinOpKind {
    const TOKENS: &'static [TokenKind] = &[
        TokenKind::Exp,
        TokenKind::Mul,
        TokenKind::Div,
        TokenKind::Add,
        TokenKind::Sub,
        TokenKind::Assign,
    ];

    /// `\cdot`, `\times` and `\div` are tokenized as [`TokenKind::Mul`] and [`TokenKind::Div`].
    fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Exp => Self::Exp,
            TokenKind::Mul => Self::Mul,
            TokenKind::Div => Self::Div,
            TokenKind::Add => Self::Add,
            TokenKind::Sub => Self::Sub,
            TokenKind::Assign => Self::Eq,
            _ => return None,
        })
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Exp => "^",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Eq => "=",
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Exp => Precedence::Exp,
            Self::Mul | Self::Div => Precedence::Factor,
            Self::Add | Self::Sub => Precedence::Term,
            Self::Eq => Precedence::Equation,
        }
    }

    /// Only exponentiation is right-associative: `2^3^2` is `2^(3^2)`.
    pub fn associativity(&self) -> Associativity {
        match self {
            Self::Exp => Associativity::Right,
            _ => Associativity::Left,
        }
    }
}

/// Consumes the next token and maps it to an operator kind, or fails listing the expected tokens.
fn parse_kind<K>(
    input: &mut Parser,
    expected: &'static [TokenKind],
    from_token: fn(TokenKind) -> Option<K>,
) -> Result<(K, Range<usize>), Error> {
    let token = input.next_token()?;
    match from_token(token.kind) {
        Some(kind) => Ok((kind, token.span)),
        None => Err(Error::new(vec![token.span.clone()], kind::UnexpectedToken {
            expected,
            found: token.kind,
        })),
    }
}

/// A unary operator, with the region of the source it was parsed from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnaryOp {
    pub kind: UnaryOpKind,
    pub span: Range<usize>,
}

impl UnaryOp {
    pub fn precedence(&self) -> Precedence {
        self.kind.precedence()
    }

    pub fn associativity(&self) -> Associativity {
        self.kind.associativity()
    }
}

impl Parse for UnaryOp {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let (kind, span) = parse_kind(input, UnaryOpKind::TOKENS, UnaryOpKind::from_token)?;
        Ok(Self { kind, span })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.symbol())
    }
}

/// A binary operator, with the region of the source it was parsed from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinOp {
    pub kind: BinOpKind,

    /// Whether the parser inserted this operator between two adjacent operands (`2x`, `3(x+1)`).
    /// Implicit operators span the gap between their operands.
    pub implicit: bool,

    pub span: Range<usize>,
}

impl BinOp {
    pub fn precedence(&self) -> Precedence {
        self.kind.precedence()
    }

    pub fn associativity(&self) -> Associativity {
        self.kind.associativity()
    }
}

impl Parse for BinOp {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let (kind, span) = parse_kind(input, BinOpKind::TOKENS, BinOpKind::from_token)?;
        Ok(Self { kind, implicit: false, span })
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.symbol())
    }
}
