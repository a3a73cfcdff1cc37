//! Core parser infrastructure: token cursor, error reporting, helpers.

use ochain_lexer::token::{Token, TokenKind};
use ochain_types::ast::{Ident, Item, Program};
use ochain_types::{Diagnostic, Diagnostics, ErrorCode, SourceFile, Span};
use tracing::debug;

/// Maximum expression nesting depth before the parser gives up on a statement.
/// Prefix `++`/`--` operators count as one level each.
pub(crate) const MAX_EXPR_DEPTH: u32 = 64;

/// Maximum number of links in one postfix chain, and of operands in one
/// `+`/`-` sequence.
pub(crate) const MAX_EXPR_LENGTH: usize = 256;

/// Maximum number of `?` suffixes on one type annotation.
pub(crate) const MAX_OPTIONAL_DEPTH: usize = 64;

/// The parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and resynchronises at the next line.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    source_file: &'src SourceFile,
    errors: Diagnostics,
    /// Current expression nesting depth.
    pub(crate) expr_depth: u32,
}

/// Result of parsing.
pub struct ParseResult {
    pub program: Option<Program>,
    pub errors: Diagnostics,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        let mut tokens = tokens;
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span).unwrap_or(Span::point(1, 1));
            tokens.push(Token::new(TokenKind::Eof, end));
        }
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: Diagnostics::empty(),
            expr_depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        // The constructor guarantees a trailing Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or(Span::point(1, 1))
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from the current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Newline Handling ──────────────────────────────────────────────────────

    /// Skip consecutive newline and `;` tokens.
    pub(crate) fn skip_newlines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Expect the end of a statement or declaration: newline, `;`, `}` or EOF.
    ///
    /// `}` is left in place for the enclosing block to consume.
    pub(crate) fn expect_terminator(&mut self) {
        match self.peek_kind() {
            TokenKind::Newline | TokenKind::Semicolon => self.skip_newlines(),
            TokenKind::Eof | TokenKind::RBrace => {}
            other => {
                let message = format!("expected end of statement, got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                self.synchronize();
            }
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits an error.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check_exact(expected) {
            Some(self.advance())
        } else {
            let message = format!("expected '{}', got '{}'", expected, self.peek_kind());
            self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
            None
        }
    }

    /// Expect an identifier token.
    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{other}'"),
                );
                None
            }
        }
    }

    /// Expect a member name after `.`.
    ///
    /// Contextual keywords (`get`, `set`, `init`) are valid member names.
    pub(crate) fn expect_member_name(&mut self) -> Option<Ident> {
        match self.peek_kind() {
            TokenKind::Get | TokenKind::Set | TokenKind::Init => {
                let name = self.peek_kind().to_string();
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => self.expect_identifier(),
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let error = Diagnostic::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(error);
    }

    /// Enter one level of expression nesting. Reports and returns `false`
    /// when that would exceed [`MAX_EXPR_DEPTH`]; the depth is left unchanged
    /// in that case.
    pub(crate) fn enter_nesting(&mut self) -> bool {
        if self.expr_depth >= MAX_EXPR_DEPTH {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expression nested deeper than {MAX_EXPR_DEPTH} levels"),
            );
            return false;
        }
        self.expr_depth += 1;
        true
    }

    pub(crate) fn leave_nesting(&mut self) {
        self.expr_depth = self.expr_depth.saturating_sub(1);
    }

    /// Returns `true` if we've hit the error cap and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_full()
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until the next line or a closing brace.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Newline | TokenKind::Semicolon => {
                    self.skip_newlines();
                    return;
                }
                TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`Program`].
    pub fn parse(mut self) -> ParseResult {
        let start = self.current_span();
        let mut items: Vec<Item> = Vec::new();
        self.skip_newlines();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if self.check_exact(&TokenKind::RBrace) {
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "unmatched '}'");
                self.advance();
                self.skip_newlines();
                continue;
            }
            match self.parse_item() {
                Some(item) => {
                    items.push(item);
                    self.expect_terminator();
                }
                None => self.synchronize(),
            }
            self.skip_newlines();
        }
        debug!(
            file = %self.source_file.name,
            items = items.len(),
            errors = self.errors.total_errors,
            "parsed"
        );
        let span = start.merge(self.previous_span());
        ParseResult {
            program: Some(Program { items, span }),
            errors: self.errors,
        }
    }
}
