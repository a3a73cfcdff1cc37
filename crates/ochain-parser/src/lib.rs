//! OChain parser: converts a token stream into an AST.
//!
//! Declarations, statements and access chains are each parsed in their own
//! module as `impl Parser` blocks over the shared cursor in [`parser`].

mod parse_decl;
mod parse_expr;
mod parse_stmt;
mod parse_type;
mod parser;

pub use parser::{ParseResult, Parser};
