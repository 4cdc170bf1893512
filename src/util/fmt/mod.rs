use std::fmt;

use crate::token::TokenKind;

pub mod error;
pub mod tree;

/// Displays a token kind as it would appear in a diagnostic: punctuation and
/// keywords are quoted in backticks, while descriptive kinds (literals, end of
/// file) are written as plain words.
pub struct Quoted(pub TokenKind);

impl fmt::Display for Quoted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let Quoted(kind) = *self;
        match kind {
            String | Number | Identifier | Eof | Unknown => f.write_str(kind.as_str()),
            _ => write!(f, "`{kind}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Quoted;
    use crate::token::TokenKind;

    #[test]
    fn test_quoted() {
        assert_eq!(Quoted(TokenKind::Semicolon).to_string(), "`;`");
        assert_eq!(Quoted(TokenKind::While).to_string(), "`while`");
        assert_eq!(Quoted(TokenKind::LessEq).to_string(), "`=<`");
        assert_eq!(Quoted(TokenKind::Identifier).to_string(), "identifier");
        assert_eq!(Quoted(TokenKind::Eof).to_string(), "end of file");
    }
}
