//! Token definitions for the Lua lexer

use crate::frontend::token_types::{self, TypeId};
use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub type_id: TypeId,
    /// Raw source lexeme
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(type_id: TypeId, text: impl Into<String>, span: Span) -> Self {
        Self { type_id, text: text.into(), span }
    }

    pub fn eof(span: Span) -> Self {
        Self::new(token_types::EOF, "<EOF>", span)
    }

    pub fn is_eof(&self) -> bool {
        self.type_id == token_types::EOF
    }

    /// How the token is quoted in syntax error messages
    pub fn near(&self) -> String {
        if self.is_eof() {
            "<eof>".to_string()
        } else {
            format!("'{}'", self.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near() {
        let token = Token::new(token_types::WHILE, "while", Span::dummy());
        assert_eq!(token.near(), "'while'");
        assert_eq!(Token::eof(Span::dummy()).near(), "<eof>");
    }
}
