//! Statement parsing.

use ochain_lexer::token::TokenKind;
use ochain_types::ast::*;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse a single statement.
    ///
    /// ```ebnf
    /// Stmt     = "_" "=" Expr | Expr [ AssignOp Expr ] ;
    /// AssignOp = "=" | "+=" | "-=" ;
    /// ```
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        if self.check_exact(&TokenKind::Underscore) && self.look_ahead(1) == &TokenKind::Eq {
            let start = self.advance().span; // eat `_`
            self.advance(); // eat `=`
            let value = self.parse_expression()?;
            let span = start.merge(value.span);
            return Some(Stmt::Discard(DiscardStmt { value, span }));
        }

        let target = self.parse_expression()?;
        let op = match self.peek_kind() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::AddAssign,
            TokenKind::MinusEq => AssignOp::SubAssign,
            _ => {
                let span = target.span;
                return Some(Stmt::Expr(ExprStmt { expr: target, span }));
            }
        };
        self.advance(); // eat the operator
        let value = self.parse_expression()?;
        let span = target.span.merge(value.span);
        Some(Stmt::Assign(AssignStmt {
            target,
            op,
            value,
            span,
        }))
    }
}
