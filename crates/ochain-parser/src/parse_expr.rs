//! Expression parsing.
//!
//! Precedence (lowest → highest):
//! 3. `+`, `-` (left-associative)
//! 2. prefix `++`, `--`
//! 1. postfix chains (`?`, `.name`, `.m()`, `[i]`) and postfix `++`, `--`
//!
//! Postfix `++`/`--` binds to the whole chain, so `a?.b++` increments the
//! location `a?.b` names, while `++a?.b` applies the operator to the value of
//! the chain.

use ochain_lexer::token::TokenKind;
use ochain_types::ast::*;
use ochain_types::{ErrorCode, Span};

use crate::parser::{Parser, MAX_EXPR_LENGTH};

impl<'src> Parser<'src> {
    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        if !self.enter_nesting() {
            return None;
        }
        let result = self.parse_additive();
        self.leave_nesting();
        result
    }

    /// `AddExpr = PrefixExpr { ("+" | "-") PrefixExpr }`
    fn parse_additive(&mut self) -> Option<Expr> {
        let mut left = self.parse_prefix()?;
        let mut operands = 1;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            if operands >= MAX_EXPR_LENGTH {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expression has more than {MAX_EXPR_LENGTH} operands"),
                );
                return None;
            }
            operands += 1;
            self.advance();
            let right = self.parse_prefix()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Some(left)
    }

    /// `PrefixExpr = ("++" | "--") PrefixExpr | "-" IntLit | PostfixExpr`
    fn parse_prefix(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let op = match self.peek_kind() {
            TokenKind::PlusPlus => IncDec::Inc,
            TokenKind::MinusMinus => IncDec::Dec,
            TokenKind::Minus => {
                if let TokenKind::IntLit(n) = *self.look_ahead(1) {
                    self.advance();
                    let lit = self.advance().span;
                    return Some(Expr::new(ExprKind::IntLit(-n), start.merge(lit)));
                }
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "unary '-' is only supported on integer literals",
                );
                return None;
            }
            _ => return self.parse_postfix(),
        };
        if !self.enter_nesting() {
            return None;
        }
        self.advance();
        let operand = self.parse_prefix();
        self.leave_nesting();
        let operand = operand?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::PrefixIncDec {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `PostfixExpr = Primary { "?" | "." Name [ "(" Args ")" ] | "[" Expr "]" } [ "++" | "--" ]`
    ///
    /// A `?` is folded into the link that follows it. A `?` with no following
    /// link (or followed by another `?`) becomes a bare
    /// [`LinkKind::OptionalUnwrap`] with no name.
    fn parse_postfix(&mut self) -> Option<Expr> {
        let root = self.parse_primary()?;
        let mut links: Vec<ChainLink> = Vec::new();
        let mut pending: Option<Span> = None;

        loop {
            if links.len() >= MAX_EXPR_LENGTH {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("chain has more than {MAX_EXPR_LENGTH} links"),
                );
                return None;
            }
            match self.peek_kind() {
                TokenKind::Question => {
                    let q = self.advance().span;
                    if let Some(prev) = pending.replace(q) {
                        links.push(ChainLink {
                            kind: LinkKind::OptionalUnwrap(None),
                            span: prev,
                        });
                    }
                }
                TokenKind::Dot => {
                    let dot = self.advance().span;
                    let start = pending.unwrap_or(dot);
                    let name = self.expect_member_name()?;
                    let link = if self.check_exact(&TokenKind::LParen) {
                        let args = self.parse_call_args()?;
                        LinkKind::Call {
                            method: name,
                            args,
                            optional: pending.is_some(),
                        }
                    } else if pending.is_some() {
                        LinkKind::OptionalUnwrap(Some(name))
                    } else {
                        LinkKind::Plain(name)
                    };
                    links.push(ChainLink {
                        kind: link,
                        span: start.merge(self.previous_span()),
                    });
                    pending = None;
                }
                TokenKind::LBracket => {
                    let open = self.advance().span;
                    let start = pending.unwrap_or(open);
                    let index = self.parse_expression()?;
                    self.expect(&TokenKind::RBracket)?;
                    links.push(ChainLink {
                        kind: LinkKind::Subscript {
                            index: Box::new(index),
                            optional: pending.is_some(),
                        },
                        span: start.merge(self.previous_span()),
                    });
                    pending = None;
                }
                _ => break,
            }
        }
        if let Some(q) = pending {
            links.push(ChainLink {
                kind: LinkKind::OptionalUnwrap(None),
                span: q,
            });
        }

        let mut expr = if links.is_empty() {
            root
        } else {
            let span = links
                .last()
                .map(|l| root.span.merge(l.span))
                .unwrap_or(root.span);
            Expr::new(
                ExprKind::Chain(Chain {
                    root: Box::new(root),
                    links,
                }),
                span,
            )
        };

        let op = match self.peek_kind() {
            TokenKind::PlusPlus => Some(IncDec::Inc),
            TokenKind::MinusMinus => Some(IncDec::Dec),
            _ => None,
        };
        if let Some(op) = op {
            let end = self.advance().span;
            let span = expr.span.merge(end);
            expr = Expr::new(
                ExprKind::PostfixIncDec {
                    op,
                    operand: Box::new(expr),
                },
                span,
            );
        }
        Some(expr)
    }

    /// Parse a primary expression.
    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        match self.peek_kind().clone() {
            TokenKind::IntLit(n) => {
                self.advance();
                Some(Expr::new(ExprKind::IntLit(n), start))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Some(Expr::new(ExprKind::StringLit(s), start))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::new(ExprKind::BoolLit(true), start))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::new(ExprKind::BoolLit(false), start))
            }
            TokenKind::Nil => {
                self.advance();
                Some(Expr::new(ExprKind::NilLit, start))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check_exact(&TokenKind::LParen) {
                    let ty = Ident::new(name, start);
                    let args = self.parse_call_args()?;
                    let span = start.merge(self.previous_span());
                    return Some(Expr::new(ExprKind::Construct { ty, args }, span));
                }
                Some(Expr::new(ExprKind::Identifier(name), start))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                let span = start.merge(self.previous_span());
                Some(Expr::new(ExprKind::Paren(Box::new(inner)), span))
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{other}'"),
                );
                None
            }
        }
    }

    /// `"(" [ [label ":"] Expr { "," [label ":"] Expr } ] ")"`
    ///
    /// Argument labels are accepted and dropped.
    fn parse_call_args(&mut self) -> Option<Vec<Expr>> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.check_exact(&TokenKind::RParen) && !self.at_end() {
            if matches!(self.peek_kind(), TokenKind::Identifier(_))
                && self.look_ahead(1) == &TokenKind::Colon
            {
                self.advance();
                self.advance();
            }
            args.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(args)
    }
}
