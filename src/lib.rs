//! Lua 5.2 parser with an AST diagram printer
//!
//! Each source file goes through the same pipeline: the [`frontend`]
//! lexer and parser build a syntax tree, the [`printer`] renders it as a
//! branch diagram, and a semantic walker runs over the same tree. The
//! [`driver`] sequences these stages over a list of files.

pub mod driver;
pub mod frontend;
pub mod printer;
pub mod utils;

pub use driver::{Driver, DriverOptions, FileFailure, RunSummary};
pub use frontend::ast::AstNode;
pub use frontend::token_types::{LuaTypeNames, TypeId, TypeNames};
pub use printer::{render_ast, AstPrinter};
pub use utils::{Error, Result};
