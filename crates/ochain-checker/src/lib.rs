//! OChain checker: resolves optional-chain accesses as lvalues and checks
//! assignments through them.
//!
//! ```text
//! Source → Lexer → Parser → TypeChecker (declarations, then statements) → Diagnostics
//! ```
//!
//! [`check_source`] runs the whole pipeline; [`verify`] runs it against the
//! `expected-*` annotations of a fixture.

pub mod access;
pub mod assign;
pub mod chain;
pub mod checker;
pub mod error;
pub mod lvalue;
pub mod options;
pub mod symbols;
mod tracing_config;
pub mod ty;
pub mod verify;

use ochain_lexer::Lexer;
use ochain_parser::Parser;
use ochain_types::{Diagnostics, SourceFile};
use serde::Serialize;
use tracing::debug;

pub use chain::{ChainEvaluator, ChainResolution};
pub use checker::{ResolvedStatement, TypeChecker};
pub use error::{ResolveError, SpannedError};
pub use lvalue::{Lvalueness, ResolvedExpr};
pub use options::{CheckOptions, OptionsError};
pub use symbols::SymbolTable;
pub use tracing_config::init_tracing;
pub use ty::Type;
pub use verify::{parse_expectations, verify, Expectation, VerifyReport};

/// Everything one run of the pipeline produced.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub diagnostics: Diagnostics,
    /// Statements that resolved without errors, in source order.
    pub statements: Vec<ResolvedStatement>,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Lex, parse and check `source` with default options.
pub fn type_check(source: &str, name: &str) -> Diagnostics {
    check_source(source, name, &CheckOptions::default()).diagnostics
}

/// Lex, parse and check `source`.
///
/// Syntax errors do not stop checking: whatever parsed is still resolved, so
/// one run reports both kinds.
pub fn check_source(source: &str, name: &str, options: &CheckOptions) -> CheckResult {
    let sf = SourceFile::new(name, source);
    let mut diagnostics = Diagnostics::with_limit(options.max_errors);

    let lex = Lexer::new(&sf).lex();
    diagnostics.extend(lex.errors);

    let parsed = Parser::new(lex.tokens, &sf).parse();
    diagnostics.extend(parsed.errors);

    let statements = match parsed.program {
        Some(program) if !diagnostics.is_full() => {
            let mut checker = TypeChecker::new(&mut diagnostics, &sf, options);
            checker.check(&program);
            checker.finish()
        }
        _ => Vec::new(),
    };

    debug!(
        file = name,
        errors = diagnostics.total_errors,
        warnings = diagnostics.total_warnings,
        resolved = statements.len(),
        "checked"
    );
    CheckResult {
        diagnostics,
        statements,
    }
}
