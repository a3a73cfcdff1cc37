//! Core lexer: converts source text to a token stream.
//!
//! - Newlines are tokens (statements are newline-separated)
//! - `//` and `/* */` comments are skipped; block comments may span lines
//! - Error recovery: unknown characters are reported and skipped, and lexing
//!   stops once the error cap is reached

use ochain_types::{Diagnostic, Diagnostics, ErrorCode, SourceFile, Span};
use tracing::debug;

use crate::token::{Token, TokenKind};

/// The lexer.
pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    errors: Diagnostics,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: Diagnostics,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: Diagnostics::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        debug!(
            file = %self.source_file.name,
            tokens = tokens.len(),
            errors = self.errors.total_errors,
            "lexed"
        );
        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    /// Consume the rest of a multi-byte character whose first byte, `lead`,
    /// sat at `start`. The character counts as one column.
    fn finish_char(&mut self, start: usize, lead: u8) -> char {
        let ch = self.source_file.source[start..]
            .chars()
            .next()
            .unwrap_or(char::from(lead));
        self.pos = (start + ch.len_utf8()).min(self.source.len());
        ch
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn text_from(&self, start: usize) -> &'src str {
        std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("")
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = Diagnostic::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces, tabs and comments (NOT newlines, those are tokens).
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r'), _) => {
                    self.advance();
                }
                (Some(b'/'), Some(b'/')) => {
                    while self.peek().is_some_and(|ch| ch != b'\n') {
                        self.advance();
                    }
                }
                (Some(b'/'), Some(b'*')) => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();
        self.advance();
        loop {
            match (self.peek(), self.peek_at(1)) {
                (None, _) => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNCLOSED_DELIMITER,
                        "unterminated block comment",
                        span,
                    );
                    return;
                }
                (Some(b'*'), Some(b'/')) => {
                    self.advance();
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            if self.errors.is_full() {
                return Token::new(TokenKind::Eof, self.current_span());
            }

            let start = self.pos;
            let (start_line, start_col) = (self.line, self.col);
            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Eof, self.current_span());
            };

            let kind = match ch {
                b'\n' => TokenKind::Newline,
                b'"' => return self.scan_string(start_line, start_col),
                b'0'..=b'9' => return self.scan_int(start, start_line, start_col),
                b'a'..=b'z' | b'A'..=b'Z' => {
                    return self.scan_identifier(start, start_line, start_col)
                }
                b'_' => {
                    if self
                        .peek()
                        .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
                    {
                        return self.scan_identifier(start, start_line, start_col);
                    }
                    TokenKind::Underscore
                }
                b'+' => match self.peek() {
                    Some(b'+') => {
                        self.advance();
                        TokenKind::PlusPlus
                    }
                    Some(b'=') => {
                        self.advance();
                        TokenKind::PlusEq
                    }
                    _ => TokenKind::Plus,
                },
                b'-' => match self.peek() {
                    Some(b'-') => {
                        self.advance();
                        TokenKind::MinusMinus
                    }
                    Some(b'=') => {
                        self.advance();
                        TokenKind::MinusEq
                    }
                    Some(b'>') => {
                        self.advance();
                        TokenKind::Arrow
                    }
                    _ => TokenKind::Minus,
                },
                b'=' => TokenKind::Eq,
                b'?' => TokenKind::Question,
                b'.' => TokenKind::Dot,
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b'{' => TokenKind::LBrace,
                b'}' => TokenKind::RBrace,
                b'[' => TokenKind::LBracket,
                b']' => TokenKind::RBracket,
                b',' => TokenKind::Comma,
                b':' => TokenKind::Colon,
                b';' => TokenKind::Semicolon,
                _ => {
                    let unexpected = self.finish_char(start, ch);
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("unexpected character '{unexpected}'"),
                        span,
                    );
                    continue;
                }
            };
            return Token::new(kind, self.span_from(start_line, start_col));
        }
    }

    fn scan_int(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == b'_') {
            self.advance();
        }
        let span = self.span_from(start_line, start_col);
        let digits: String = self.text_from(start).chars().filter(|&c| c != '_').collect();
        let value = match digits.parse::<i64>() {
            Ok(v) => v,
            Err(_) => {
                self.emit_error(
                    ErrorCode::INVALID_LITERAL,
                    format!("integer literal '{digits}' overflows Int"),
                    span,
                );
                0
            }
        };
        Token::new(TokenKind::IntLit(value), span)
    }

    fn scan_identifier(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        let text = self.text_from(start);
        let kind = TokenKind::from_keyword(text)
            .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        Token::new(kind, self.span_from(start_line, start_col))
    }

    /// Scan a string literal after its opening `"`.
    fn scan_string(&mut self, start_line: u32, start_col: u32) -> Token {
        let mut buf = Vec::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNCLOSED_DELIMITER,
                        "unterminated string literal",
                        span,
                    );
                    break;
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    let (esc_line, esc_col) = (self.line, self.col);
                    self.advance();
                    let escaped = match self.advance() {
                        Some(b'"') => b'"',
                        Some(b'\\') => b'\\',
                        Some(b'n') => b'\n',
                        Some(b't') => b'\t',
                        Some(b'r') => b'\r',
                        Some(b'0') => b'\0',
                        other => {
                            let span = self.span_from(esc_line, esc_col);
                            let shown = other.map(|c| c as char).unwrap_or(' ');
                            self.emit_error(
                                ErrorCode::INVALID_LITERAL,
                                format!("invalid escape sequence '\\{shown}'"),
                                span,
                            );
                            continue;
                        }
                    };
                    buf.push(escaped);
                }
                Some(ch) => {
                    self.advance();
                    buf.push(ch);
                }
            }
        }
        let text = String::from_utf8_lossy(&buf).into_owned();
        Token::new(TokenKind::StringLit(text), self.span_from(start_line, start_col))
    }
}
