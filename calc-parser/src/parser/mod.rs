pub mod binary;
pub mod call;
pub mod error;
pub mod expr;
pub mod literal;
pub mod paren;
pub mod token;
pub mod unary;

use calc_error::ErrorKind;
use error::{Error, kind};
use super::tokenizer::{tokenize_complete, Token, TokenKind};
use std::ops::Range;

/// A high-level parser for calculator input. This is the type to use to parse an arbitrary
/// piece of input into an abstract syntax tree.
#[derive(Debug, Clone)]
pub struct Parser<'source> {
    /// The tokens that this parser is currently parsing.
    tokens: Box<[Token<'source>]>,

    /// The index of the **next** token to be parsed.
    cursor: usize,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            tokens: tokenize_complete(source),
            cursor: 0,
        }
    }

    /// Creates an error that points at the current token, or the end of the source code if the
    /// cursor is at the end of the stream.
    pub fn error(&self, kind: impl ErrorKind + 'static) -> Error {
        Error::new(vec![self.span()], kind)
    }

    /// Returns a span pointing at the end of the source code.
    pub fn eof_span(&self) -> Range<usize> {
        self.tokens.last().map_or(0..0, |token| token.span.end..token.span.end)
    }

    /// Returns the span of the current token, or the end of the source code if the cursor is at
    /// the end of the stream.
    pub fn span(&self) -> Range<usize> {
        self.tokens
            .get(self.cursor)
            .map_or(self.eof_span(), |token| token.span.clone())
    }

    /// Moves the cursor to the position of another parser over the same source. Used after
    /// peeking ahead with a cloned parser.
    pub fn set_cursor(&mut self, other: &Parser<'source>) {
        self.cursor = other.cursor;
    }

    /// Returns the previous token. The cursor is not moved. Returns [`None`] if the cursor is at
    /// the beginning of the stream.
    pub fn prev_token(&self) -> Option<&Token<'source>> {
        self.tokens.get(self.cursor.checked_sub(1)?)
    }

    /// Returns the next non-whitespace token without advancing the cursor.
    pub fn peek_token(&self) -> Option<&Token<'source>> {
        self.tokens[self.cursor.min(self.tokens.len())..]
            .iter()
            .find(|token| !token.is_whitespace())
    }

    /// Returns the kind of the next non-whitespace token without advancing the cursor.
    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek_token().map(|token| token.kind)
    }

    /// Returns true if the next token can begin a primary expression, which means an implicit
    /// multiplication follows.
    pub fn at_primary(&self) -> bool {
        self.peek_kind().is_some_and(TokenKind::starts_primary)
    }

    /// Returns the next token to be parsed, then advances the cursor. Whitespace tokens are
    /// skipped.
    ///
    /// Returns an EOF error if there are no more tokens.
    pub fn next_token(&mut self) -> Result<Token<'source>, Error> {
        while self.cursor < self.tokens.len() {
            let token = &self.tokens[self.cursor];
            self.cursor += 1;
            if token.is_whitespace() {
                continue;
            } else {
                // cloning is cheap: only Range<_> is cloned
                return Ok(token.clone());
            }
        }

        Err(Error::new(vec![self.eof_span()], kind::UnexpectedEof))
    }

    /// Speculatively parses a value from the given stream of tokens. This function can be used
    /// in the [`Parse::parse`] implementation of a type with the given [`Parser`], as it will
    /// automatically backtrack the cursor position if parsing fails.
    ///
    /// If parsing is successful, the stream is advanced past the consumed tokens and the parsed
    /// value is returned. Otherwise, the stream is left unchanged and an error is returned.
    pub fn try_parse<T: Parse>(&mut self) -> Result<T, Error> {
        self.try_parse_with_fn(T::parse)
    }

    /// Speculatively parses a value from the given stream of tokens, using a custom parsing
    /// function to parse the value.
    ///
    /// If parsing is successful, the stream is advanced past the consumed tokens and the parsed
    /// value is returned. Otherwise, the stream is left unchanged and an error is returned.
    pub fn try_parse_with_fn<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Parser<'source>) -> Result<T, Error>,
    {
        let start = self.cursor;
        match f(self) {
            Ok(value) => Ok(value),
            err => {
                self.cursor = start;
                err
            },
        }
    }

    /// Parses one or more values separated by `delimiter`, stopping before the first token that
    /// is not a delimiter.
    pub fn parse_delimited<T: Parse>(&mut self, delimiter: TokenKind) -> Result<Vec<T>, Error> {
        let mut values = vec![T::parse(self)?];
        while self.peek_kind() == Some(delimiter) {
            self.next_token()?;
            values.push(T::parse(self)?);
        }
        Ok(values)
    }

    /// Attempts to parse a value from the given stream of tokens. All the tokens must be consumed
    /// by the parser; if not, an error is returned.
    pub fn try_parse_full<T: Parse>(&mut self) -> Result<T, Error> {
        let value = T::parse(self)?;
        match self.peek_token() {
            None => Ok(value),
            Some(token) => {
                let remaining = token.span.start..self.eof_span().end;
                Err(Error::new(vec![remaining], kind::ExpectedEof))
            },
        }
    }
}

/// Any type that can be parsed from a source of tokens.
pub trait Parse: Sized {
    /// Parses a value from the given stream of tokens, advancing the stream past the consumed
    /// tokens if parsing is successful.
    ///
    /// This function should be used by consumers of the library.
    fn parse(input: &mut Parser) -> Result<Self, Error>;
}

/// The associativity of a binary or unary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Associativity {
    /// The binary / unary operation is left-associative.
    ///
    /// For binary operations, this means `a op b op c` is evaluated as `(a op b) op c`. For unary
    /// operations, this means `a op op` is evaluated as `(a op) op` (the operators appear to the
    /// right of the operand).
    Left,

    /// The binary / unary operation is right-associative.
    ///
    /// For binary operations, this means `a op b op c` is evaluated as `a op (b op c)`. For unary
    /// operations, this means `op op a` is evaluated as `op (op a)` (the operators appear to the
    /// left of the operand).
    Right,
}

/// The precedence of an operation, in order from lowest precedence (evaluated last) to highest
/// precedence (evaluated first).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Precedence {
    /// Any precedence.
    Any,

    /// Precedence of the equation sign (`=`).
    Equation,

    /// Precedence of addition (`+`) and subtraction (`-`), which separate terms.
    Term,

    /// Precedence of multiplication (`*`) and division (`/`), which separate factors. Implicit
    /// multiplication shares this precedence.
    Factor,

    /// Precedence of unary subtraction (`-`).
    Neg,

    /// Precedence of exponentiation (`^`).
    Exp,

    /// Precedence of factorial (`!`).
    Factorial,
}

impl PartialOrd for Precedence {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        let left = *self as u8;
        let right = *other as u8;
        left.partial_cmp(&right)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    use binary::Binary;
    use call::Call;
    use expr::Expr;
    use literal::{Literal, LitNum, LitSym};
    use paren::Paren;
    use token::op::{BinOp, BinOpKind, UnaryOp, UnaryOpKind};
    use unary::Unary;

    fn parse(input: &str) -> Expr {
        Parser::new(input).try_parse_full::<Expr>().unwrap()
    }

    fn parse_err(input: &str) -> String {
        Parser::new(input).try_parse_full::<Expr>().unwrap_err().to_string()
    }

    #[test]
    fn literal_int() {
        assert_eq!(parse("16"), Expr::Literal(Literal::Number(LitNum {
            value: "16".to_string(),
            span: 0..2,
        })));
    }

    #[test]
    fn literal_float() {
        assert_eq!(parse("3.14"), Expr::Literal(Literal::Number(LitNum {
            value: "3.14".to_string(),
            span: 0..4,
        })));
    }

    #[test]
    fn literal_mathrm() {
        assert_eq!(parse("\\mathrm{b2}"), Expr::Literal(Literal::Symbol(LitSym {
            name: "b2".to_string(),
            span: 0..11,
        })));
    }

    #[test]
    fn latex_constant() {
        assert_eq!(parse("\\pi"), Expr::Literal(Literal::Symbol(LitSym {
            name: "pi".to_string(),
            span: 0..3,
        })));
    }

    #[test]
    fn binary_left_associativity() {
        assert_eq!(parse("3 - 2 - 1"), Expr::Binary(Binary {
            lhs: Box::new(Expr::Binary(Binary {
                lhs: Box::new(Expr::Literal(Literal::Number(LitNum {
                    value: "3".to_string(),
                    span: 0..1,
                }))),
                op: BinOp {
                    kind: BinOpKind::Sub,
                    implicit: false,
                    span: 2..3,
                },
                rhs: Box::new(Expr::Literal(Literal::Number(LitNum {
                    value: "2".to_string(),
                    span: 4..5,
                }))),
                span: 0..5,
            })),
            op: BinOp {
                kind: BinOpKind::Sub,
                implicit: false,
                span: 6..7,
            },
            rhs: Box::new(Expr::Literal(Literal::Number(LitNum {
                value: "1".to_string(),
                span: 8..9,
            }))),
            span: 0..9,
        }));
    }

    #[test]
    fn binary_right_associativity() {
        assert_eq!(parse("2 ^ 3 ^ 2"), Expr::Binary(Binary {
            lhs: Box::new(Expr::Literal(Literal::Number(LitNum {
                value: "2".to_string(),
                span: 0..1,
            }))),
            op: BinOp {
                kind: BinOpKind::Exp,
                implicit: false,
                span: 2..3,
            },
            rhs: Box::new(Expr::Binary(Binary {
                lhs: Box::new(Expr::Literal(Literal::Number(LitNum {
                    value: "3".to_string(),
                    span: 4..5,
                }))),
                op: BinOp {
                    kind: BinOpKind::Exp,
                    implicit: false,
                    span: 6..7,
                },
                rhs: Box::new(Expr::Literal(Literal::Number(LitNum {
                    value: "2".to_string(),
                    span: 8..9,
                }))),
                span: 4..9,
            })),
            span: 0..9,
        }));
    }

    #[test]
    fn unary_minus_binds_looser_than_exp() {
        assert_eq!(parse("-x^2"), Expr::Unary(Unary {
            operand: Box::new(Expr::Binary(Binary {
                lhs: Box::new(Expr::Literal(Literal::Symbol(LitSym {
                    name: "x".to_string(),
                    span: 1..2,
                }))),
                op: BinOp {
                    kind: BinOpKind::Exp,
                    implicit: false,
                    span: 2..3,
                },
                rhs: Box::new(Expr::Literal(Literal::Number(LitNum {
                    value: "2".to_string(),
                    span: 3..4,
                }))),
                span: 1..4,
            })),
            op: UnaryOp {
                kind: UnaryOpKind::Neg,
                span: 0..1,
            },
            span: 0..4,
        }));
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(parse("2x"), Expr::Binary(Binary {
            lhs: Box::new(Expr::Literal(Literal::Number(LitNum {
                value: "2".to_string(),
                span: 0..1,
            }))),
            op: BinOp {
                kind: BinOpKind::Mul,
                implicit: true,
                span: 1..1,
            },
            rhs: Box::new(Expr::Literal(Literal::Symbol(LitSym {
                name: "x".to_string(),
                span: 1..2,
            }))),
            span: 0..2,
        }));
    }

    #[test]
    fn call_with_args() {
        assert_eq!(parse("log(8, 2)"), Expr::Call(Call {
            name: LitSym {
                name: "log".to_string(),
                span: 0..3,
            },
            args: vec![
                Expr::Literal(Literal::Number(LitNum {
                    value: "8".to_string(),
                    span: 4..5,
                })),
                Expr::Literal(Literal::Number(LitNum {
                    value: "2".to_string(),
                    span: 7..8,
                })),
            ],
            span: 0..9,
            paren_span: 3..9,
        }));
    }

    #[test]
    fn braces_group() {
        assert_eq!(parse("{1}"), Expr::Paren(Paren {
            expr: Box::new(Expr::Literal(Literal::Number(LitNum {
                value: "1".to_string(),
                span: 1..2,
            }))),
            span: 0..3,
        }));
    }

    #[test]
    fn display_precedence() {
        assert_eq!(parse("2 + 3 * 4").to_string(), "2 + 3 * 4");
        assert_eq!(parse("(2 + 3) * 4").to_string(), "(2 + 3) * 4");
        assert_eq!(parse("1 + 2x^2").to_string(), "1 + 2 x ^ 2");
        assert_eq!(parse("-3!").to_string(), "-3!");
    }

    #[test]
    fn display_latex() {
        assert_eq!(parse("\\frac{1}{2}").to_string(), "(1) / (2)");
        assert_eq!(parse("\\sqrt{x}").to_string(), "sqrt(x)");
        assert_eq!(parse("\\sqrt[3]{8}").to_string(), "root(8, 3)");
        assert_eq!(parse("\\left(1 + 2\\right) \\cdot 3").to_string(), "(1 + 2) * 3");
        assert_eq!(parse("\\sin(x)").to_string(), "sin(x)");
    }

    #[test]
    fn unary_plus_is_ignored() {
        assert_eq!(parse("+x").to_string(), "x");
        assert_eq!(parse("2 * +3").to_string(), "2 * 3");
    }

    #[test]
    fn equation() {
        assert_eq!(parse("x^2 = 4").to_string(), "x ^ 2 = 4");
        assert_eq!(parse("\\mathrm{a0} + x = 2y").to_string(), "a0 + x = 2 y");
    }

    #[test]
    fn errors() {
        assert_eq!(parse_err("1 +"), "unexpected end of input");
        assert_eq!(parse_err("(1 + 2"), "unclosed parenthesis");
        assert_eq!(parse_err("1 )"), "expected end of input");
        assert_eq!(parse_err("()"), "missing expression inside parenthesis");
        assert_eq!(parse_err("$a0"), "unexpected `$`");
        assert_eq!(parse_err("\\mathrm{}"), "empty reference");
    }
}
