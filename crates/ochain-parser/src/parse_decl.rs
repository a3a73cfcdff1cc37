//! Declaration parsing: structs, members and `var`/`let` bindings.

use ochain_lexer::token::TokenKind;
use ochain_types::ast::*;
use ochain_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// `Item = StructDecl | VarDecl | Stmt`
    pub(crate) fn parse_item(&mut self) -> Option<Item> {
        match self.peek_kind() {
            TokenKind::Struct => self.parse_struct_decl().map(Item::Struct),
            TokenKind::Var | TokenKind::Let => self.parse_var_decl().map(Item::Var),
            _ => self.parse_statement().map(Item::Stmt),
        }
    }

    /// `struct Name { members }`
    fn parse_struct_decl(&mut self) -> Option<StructDecl> {
        let start = self.advance().span; // eat `struct`
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LBrace)?;
        self.skip_newlines();

        let mut members = Vec::new();
        while !self.check_exact(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            match self.parse_member() {
                Some(member) => {
                    members.push(member);
                    self.expect_terminator();
                }
                None => self.synchronize(),
            }
            self.skip_newlines();
        }
        if !self.eat(&TokenKind::RBrace) {
            self.error_at(
                ErrorCode::UNCLOSED_DELIMITER,
                format!("struct '{}' is missing its closing '}}'", name.name),
                start,
            );
            return None;
        }
        let span = start.merge(self.previous_span());
        Some(StructDecl {
            name,
            members,
            span,
        })
    }

    fn parse_member(&mut self) -> Option<MemberDecl> {
        match self.peek_kind() {
            TokenKind::Var | TokenKind::Let => self.parse_var_decl().map(MemberDecl::Field),
            TokenKind::Func | TokenKind::Mutating => self.parse_method().map(MemberDecl::Method),
            TokenKind::Subscript => self.parse_subscript().map(MemberDecl::Subscript),
            TokenKind::Init => self.parse_init().map(MemberDecl::Init),
            other => {
                let message = format!("expected a struct member, got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                None
            }
        }
    }

    /// `("var" | "let") name [":" Type] ["=" Expr]`
    pub(crate) fn parse_var_decl(&mut self) -> Option<VarDecl> {
        let keyword = self.advance();
        let mutability = if keyword.kind == TokenKind::Var {
            Mutability::Var
        } else {
            Mutability::Let
        };
        let name = self.expect_identifier()?;
        let type_ann = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        let init = if self.eat(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        if type_ann.is_none() && init.is_none() {
            self.error_at(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("'{}' needs a type annotation or an initial value", name.name),
                name.span,
            );
        }
        let span = keyword.span.merge(self.previous_span());
        Some(VarDecl {
            mutability,
            name,
            type_ann,
            init,
            span,
        })
    }

    /// `[mutating] func name(params) [-> Type] Body`
    fn parse_method(&mut self) -> Option<MethodDecl> {
        let start = self.current_span();
        let mutating = self.eat(&TokenKind::Mutating);
        self.expect(&TokenKind::Func)?;
        let name = self.expect_identifier()?;
        let params = self.parse_params()?;
        let ret = if self.eat(&TokenKind::Arrow) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        self.skip_body()?;
        Some(MethodDecl {
            name,
            mutating,
            params,
            ret,
            span,
        })
    }

    /// `subscript([label:] Type) -> Type { get [set] }`
    fn parse_subscript(&mut self) -> Option<SubscriptDecl> {
        let start = self.advance().span; // eat `subscript`
        self.expect(&TokenKind::LParen)?;
        if matches!(self.peek_kind(), TokenKind::Identifier(_))
            && self.look_ahead(1) == &TokenKind::Colon
        {
            self.advance();
            self.advance();
        }
        let index = self.parse_type_annotation()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Arrow)?;
        let ret = self.parse_type_annotation()?;

        self.expect(&TokenKind::LBrace)?;
        self.skip_newlines();
        self.expect(&TokenKind::Get)?;
        self.skip_newlines();
        let settable = self.eat(&TokenKind::Set);
        self.skip_newlines();
        self.expect(&TokenKind::RBrace)?;

        let span = start.merge(self.previous_span());
        Some(SubscriptDecl {
            index,
            ret,
            settable,
            span,
        })
    }

    /// `init(params) Body`
    fn parse_init(&mut self) -> Option<InitDecl> {
        let start = self.advance().span; // eat `init`
        let params = self.parse_params()?;
        let span = start.merge(self.previous_span());
        self.skip_body()?;
        Some(InitDecl { params, span })
    }

    /// `"(" [ name ":" Type { "," name ":" Type } ] ")"`
    fn parse_params(&mut self) -> Option<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check_exact(&TokenKind::RParen) && !self.at_end() {
            let name = self.expect_identifier()?;
            self.expect(&TokenKind::Colon)?;
            let type_ann = self.parse_type_annotation()?;
            let span = name.span.merge(type_ann.span);
            params.push(Param {
                name,
                type_ann,
                span,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(params)
    }

    /// Skip a `{ ... }` body with balanced braces. Bodies are not checked.
    fn skip_body(&mut self) -> Option<()> {
        let open = self.expect(&TokenKind::LBrace)?;
        let mut depth = 1u32;
        while depth > 0 {
            match self.advance().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Eof => {
                    self.error_at(ErrorCode::UNCLOSED_DELIMITER, "unclosed '{'", open.span);
                    return None;
                }
                _ => {}
            }
        }
        Some(())
    }
}
