//! Frontend module - Lexer, Parser, Semantic walking

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod token_types;
pub mod walker;
