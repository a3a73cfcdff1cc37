//! Type annotation parsing.

use ochain_lexer::token::TokenKind;
use ochain_types::ast::*;
use ochain_types::ErrorCode;

use crate::parser::{Parser, MAX_OPTIONAL_DEPTH};

impl<'src> Parser<'src> {
    /// Parse a type annotation.
    ///
    /// ```ebnf
    /// Type = Identifier { "?" } ;
    /// ```
    ///
    /// Each `?` wraps everything to its left, so `Int??` is
    /// `Optional(Optional(Int))`.
    pub(crate) fn parse_type_annotation(&mut self) -> Option<TypeAnnotation> {
        let name = self.expect_identifier()?;
        let mut ann = TypeAnnotation::new(TypeKind::Named(name.name), name.span);
        let mut depth = 0;
        while self.check_exact(&TokenKind::Question) {
            if depth == MAX_OPTIONAL_DEPTH {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("optional type nested deeper than {MAX_OPTIONAL_DEPTH} levels"),
                );
                return None;
            }
            depth += 1;
            let q = self.advance().span;
            let span = ann.span.merge(q);
            ann = TypeAnnotation::new(TypeKind::Optional(Box::new(ann)), span);
        }
        Some(ann)
    }
}
