//! Error handling for the Lua front end and driver

use std::path::PathBuf;

use crate::frontend::token_types::TypeId;
use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the pipeline can report
#[derive(Error, Debug)]
pub enum Error {
    // ==================== Configuration ====================

    #[error("no Lua file(s) provided as a command line parameter")]
    NoInputFiles,

    #[error("cannot read `{}`: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ==================== Lexer Errors ====================

    #[error("{message}")]
    Lex { message: String, span: Span },

    // ==================== Parser Errors ====================

    #[error("{expected} expected near {got}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },

    #[error("{message}")]
    Syntax { message: String, span: Span },

    // ==================== Printer Errors ====================

    #[error("no display name for token type {type_id}: grammar and name table disagree")]
    UnknownTokenType { type_id: TypeId },

    // ==================== Semantic Errors ====================

    #[error("{message}")]
    Semantic { message: String, span: Span },

    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex { span, .. } => Some(*span),
            Self::UnexpectedToken { span, .. } => Some(*span),
            Self::Syntax { span, .. } => Some(*span),
            Self::Semantic { span, .. } => Some(*span),
            Self::NoInputFiles
            | Self::Io { .. }
            | Self::UnknownTokenType { .. }
            | Self::Output(_) => None,
        }
    }

    /// Short category label used when reporting a failed file
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoInputFiles => "configuration error",
            Self::Io { .. } => "i/o error",
            Self::Lex { .. } => "lexical error",
            Self::UnexpectedToken { .. } | Self::Syntax { .. } => "syntax error",
            Self::UnknownTokenType { .. } => "internal error",
            Self::Semantic { .. } => "semantic error",
            Self::Output(_) => "output error",
        }
    }

    /// Errors that must stop the whole run instead of just one file
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NoInputFiles | Self::UnknownTokenType { .. } | Self::Output(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_message() {
        let err = Error::UnexpectedToken {
            expected: "'='".to_string(),
            got: "'x'".to_string(),
            span: Span::new(4, 5, 2, 3),
        };
        assert_eq!(err.to_string(), "'=' expected near 'x'");
        assert_eq!(err.span(), Some(Span::new(4, 5, 2, 3)));
        assert_eq!(err.kind(), "syntax error");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(Error::NoInputFiles.is_fatal());
        assert!(Error::UnknownTokenType { type_id: TypeId(999) }.is_fatal());
        assert!(Error::UnknownTokenType { type_id: TypeId(999) }.span().is_none());
    }
}
