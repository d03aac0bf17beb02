use logos::Logos;
use std::ops::Range;

/// The different kinds of tokens that can be produced by the tokenizer.
#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    #[regex(r"[\n\r]+")]
    NewLine,

    #[regex(r"[ \t]+")]
    #[regex(r"\\[,;: ]")]
    Whitespace,

    /// LaTeX sizing commands (`\left`, `\right`). They carry no meaning for the calculator and
    /// are skipped like whitespace.
    #[token("\\left")]
    #[token("\\right")]
    Sizing,

    #[token("+")]
    Add,

    #[token("-")]
    Sub,

    #[token("*")]
    #[token("\\cdot")]
    #[token("\\times")]
    Mul,

    #[token("/")]
    #[token("\\div")]
    Div,

    #[token("^")]
    Exp,

    #[token("!")]
    Factorial,

    #[token("=")]
    Assign,

    #[token(",")]
    Comma,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[token("{")]
    OpenBrace,

    #[token("}")]
    CloseBrace,

    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,

    #[token("\\frac")]
    Frac,

    #[token("\\sqrt")]
    Sqrt,

    /// A reference written as `\mathrm{name}`.
    #[regex(r"\\mathrm\{[a-zA-Z0-9_]*\}")]
    Mathrm,

    /// Any other LaTeX command, such as `\pi` or `\sin`.
    #[regex(r"\\[a-zA-Z]+")]
    Command,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Name,

    #[regex(r"[0-9]+")]
    Int,

    #[regex(r"[0-9]*\.[0-9]+")]
    Float,

    #[regex(r".", priority = 0)]
    Symbol,
}

impl TokenKind {
    /// Returns true if the token is skipped by the parser.
    pub fn is_whitespace(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::NewLine | TokenKind::Sizing)
    }

    /// Returns true if a primary expression can start with this token. Used to detect implicit
    /// multiplication.
    pub fn starts_primary(self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::Name
                | TokenKind::Command
                | TokenKind::Mathrm
                | TokenKind::OpenParen
                | TokenKind::OpenBrace
                | TokenKind::Frac
                | TokenKind::Sqrt
        )
    }
}

/// A token produced by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'source> {
    /// The region of the source code that this token originated from.
    pub span: Range<usize>,

    /// The kind of token.
    pub kind: TokenKind,

    /// The raw lexeme that was parsed into this token.
    pub lexeme: &'source str,
}

impl Token<'_> {
    /// Returns true if the token represents whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.kind.is_whitespace()
    }
}
