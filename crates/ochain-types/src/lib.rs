//! Shared types for the OChain checker.
//!
//! This crate defines the AST node types, source spans and diagnostic
//! types used by the lexer, parser and checker.

mod error;
mod span;
pub mod ast;

pub use error::{
    Diagnostic, Diagnostics, ErrorCategory, ErrorCode, InvalidErrorCode, Severity, MAX_ERRORS,
};
pub use span::{SourceFile, Span};
