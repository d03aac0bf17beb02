pub mod op;

use crate::{
    parser::{error::{kind, Error}, Parser, Parse},
    tokenizer::TokenKind,
};
use std::ops::Range;

/// Declares a marker type for a delimiter token, so that the parser can request it by type with
/// `input.try_parse::<OpenParen>()`.
macro_rules! delimiters {
    ($($name:ident)*) => {
        $(
            #[derive(Clone, Debug, PartialEq)]
            pub(crate) struct $name {
                pub(crate) span: Range<usize>,
            }

            impl Parse for $name {
                fn parse(input: &mut Parser) -> Result<Self, Error> {
                    let token = input.next_token()?;
                    if token.kind != TokenKind::$name {
                        return Err(Error::new(vec![token.span], kind::UnexpectedToken {
                            expected: &[TokenKind::$name],
                            found: token.kind,
                        }));
                    }
                    Ok(Self { span: token.span })
                }
            }
        )*
    };
}

delimiters!(OpenParen CloseParen OpenBracket CloseBracket);
