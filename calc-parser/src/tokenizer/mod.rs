pub mod token;

use logos::{Lexer, Logos};
pub use token::{Token, TokenKind};

/// Returns an iterator over the token kinds produced by the tokenizer.
pub fn tokenize(input: &str) -> Lexer<TokenKind> {
    TokenKind::lexer(input)
}

/// Returns an owned array containing all of the tokens produced by the tokenizer. This allows us
/// to backtrack in case of an error.
///
/// Input the lexer cannot match becomes a [`TokenKind::Symbol`], so the parser can point at it.
pub fn tokenize_complete(input: &str) -> Box<[Token]> {
    let mut lexer = tokenize(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        tokens.push(Token {
            span: lexer.span(),
            kind: result.unwrap_or(TokenKind::Symbol),
            lexeme: lexer.slice(),
        });
    }

    tokens.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    /// Compares the tokens produced by the tokenizer to the raw expected tokens.
    fn compare_tokens<'source, const N: usize>(input: &'source str, expected: [(TokenKind, &'source str); N]) {
        let mut lexer = tokenize(input);

        for (expected_kind, expected_lexeme) in expected.into_iter() {
            assert_eq!(lexer.next(), Some(Ok(expected_kind)));
            assert_eq!(lexer.slice(), expected_lexeme);
        }

        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn basic_expr() {
        compare_tokens(
            "1 + 2",
            [
                (TokenKind::Int, "1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Add, "+"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Int, "2"),
            ],
        );
    }

    #[test]
    fn decimals() {
        compare_tokens(
            "0.5+.25",
            [
                (TokenKind::Float, "0.5"),
                (TokenKind::Add, "+"),
                (TokenKind::Float, ".25"),
            ],
        );
    }

    #[test]
    fn latex_commands() {
        compare_tokens(
            "\\frac{\\mathrm{a0}}{2}\\cdot\\pi",
            [
                (TokenKind::Frac, "\\frac"),
                (TokenKind::OpenBrace, "{"),
                (TokenKind::Mathrm, "\\mathrm{a0}"),
                (TokenKind::CloseBrace, "}"),
                (TokenKind::OpenBrace, "{"),
                (TokenKind::Int, "2"),
                (TokenKind::CloseBrace, "}"),
                (TokenKind::Mul, "\\cdot"),
                (TokenKind::Command, "\\pi"),
            ],
        );
    }

    #[test]
    fn sizing_and_spacing() {
        compare_tokens(
            "\\left(x\\right)\\,y",
            [
                (TokenKind::Sizing, "\\left"),
                (TokenKind::OpenParen, "("),
                (TokenKind::Name, "x"),
                (TokenKind::Sizing, "\\right"),
                (TokenKind::CloseParen, ")"),
                (TokenKind::Whitespace, "\\,"),
                (TokenKind::Name, "y"),
            ],
        );
    }

    #[test]
    fn names_with_digits() {
        compare_tokens(
            "a0 b12x 3y",
            [
                (TokenKind::Name, "a0"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "b12x"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Int, "3"),
                (TokenKind::Name, "y"),
            ],
        );
    }

    #[test]
    fn unknown_characters() {
        compare_tokens(
            "$a",
            [
                (TokenKind::Symbol, "$"),
                (TokenKind::Name, "a"),
            ],
        );
    }
}
