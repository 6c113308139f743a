//! Shared utilities: source spans and the error type

mod error;
mod span;

pub use error::{Error, Result};
pub use span::Span;
