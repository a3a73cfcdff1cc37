//! Lexer tests.
//!
//! Covers: keywords, operators (including the `++`/`+=` and `?` forms used by
//! optional chains), literals, comments, newline handling, spans, error
//! recovery and determinism.

use ochain_lexer::{Lexer, TokenKind};
use ochain_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.och", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let sf = SourceFile::new("test.och", source);
    Lexer::new(&sf).lex().errors.error_codes()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_declaration_keywords() {
    let pairs = [
        ("struct", TokenKind::Struct),
        ("var", TokenKind::Var),
        ("let", TokenKind::Let),
        ("func", TokenKind::Func),
        ("mutating", TokenKind::Mutating),
        ("subscript", TokenKind::Subscript),
        ("init", TokenKind::Init),
        ("get", TokenKind::Get),
        ("set", TokenKind::Set),
    ];
    for (src, expected) in &pairs {
        assert_eq!(kinds(src), vec![expected.clone()], "keyword '{src}'");
    }
}

#[test]
fn test_literal_keywords() {
    assert_eq!(
        kinds("nil true false"),
        vec![TokenKind::Nil, TokenKind::True, TokenKind::False]
    );
}

#[test]
fn test_identifiers_with_digits_and_underscores() {
    assert_eq!(
        kinds("mutT imm_S _x UInt8"),
        vec![ident("mutT"), ident("imm_S"), ident("_x"), ident("UInt8")]
    );
}

#[test]
fn test_keyword_prefix_is_identifier() {
    assert_eq!(kinds("variable letter"), vec![ident("variable"), ident("letter")]);
}

#[test]
fn test_lone_underscore_is_discard() {
    assert_eq!(
        kinds("_ = x"),
        vec![TokenKind::Underscore, TokenKind::Eq, ident("x")]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_increment_and_compound_operators() {
    assert_eq!(
        kinds("+ ++ += - -- -= ->"),
        vec![
            TokenKind::Plus,
            TokenKind::PlusPlus,
            TokenKind::PlusEq,
            TokenKind::Minus,
            TokenKind::MinusMinus,
            TokenKind::MinusEq,
            TokenKind::Arrow,
        ]
    );
}

#[test]
fn test_optional_chain_tokens() {
    assert_eq!(
        kinds("mutT?.mutS?.x++"),
        vec![
            ident("mutT"),
            TokenKind::Question,
            TokenKind::Dot,
            ident("mutS"),
            TokenKind::Question,
            TokenKind::Dot,
            ident("x"),
            TokenKind::PlusPlus,
        ]
    );
}

#[test]
fn test_double_question_is_two_tokens() {
    assert_eq!(
        kinds("Int??"),
        vec![ident("Int"), TokenKind::Question, TokenKind::Question]
    );
}

#[test]
fn test_prefix_increment_before_chain() {
    assert_eq!(
        kinds("++a?.b"),
        vec![
            TokenKind::PlusPlus,
            ident("a"),
            TokenKind::Question,
            TokenKind::Dot,
            ident("b"),
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_int_literals() {
    assert_eq!(
        kinds("0 42 1_000"),
        vec![
            TokenKind::IntLit(0),
            TokenKind::IntLit(42),
            TokenKind::IntLit(1000)
        ]
    );
}

#[test]
fn test_int_overflow_reports_invalid_literal() {
    assert_eq!(
        error_codes("99999999999999999999"),
        vec![ErrorCode::INVALID_LITERAL]
    );
}

#[test]
fn test_string_literal_with_escapes() {
    assert_eq!(
        kinds(r#""a\"b\n""#),
        vec![TokenKind::StringLit("a\"b\n".to_string())]
    );
}

#[test]
fn test_unterminated_string() {
    assert_eq!(
        error_codes("\"abc\nx"),
        vec![ErrorCode::UNCLOSED_DELIMITER]
    );
}

#[test]
fn test_invalid_escape() {
    assert_eq!(error_codes(r#""\q""#), vec![ErrorCode::INVALID_LITERAL]);
}

// ─────────────────────────────────────────────────────────────────────
// Comments & newlines
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_line_comment_keeps_newline() {
    assert_eq!(
        kinds("x // expected-error{{E401}}\ny"),
        vec![ident("x"), TokenKind::Newline, ident("y")]
    );
}

#[test]
fn test_block_comment_spanning_lines() {
    assert_eq!(kinds("a /* one\ntwo */ b"), vec![ident("a"), ident("b")]);
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(error_codes("a /* never closed"), vec![ErrorCode::UNCLOSED_DELIMITER]);
}

#[test]
fn test_crlf_newlines() {
    assert_eq!(
        kinds("a\r\nb"),
        vec![ident("a"), TokenKind::Newline, ident("b")]
    );
}

#[test]
fn test_eof_always_last() {
    let sf = SourceFile::new("test.och", "");
    let tokens = Lexer::new(&sf).lex().tokens;
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_character_is_skipped() {
    assert_eq!(kinds("a @ b"), vec![ident("a"), ident("b")]);
    assert_eq!(error_codes("a @ b"), vec![ErrorCode::UNEXPECTED_TOKEN]);
}

#[test]
fn test_non_ascii_character_is_one_error() {
    let sf = SourceFile::new("test.och", "a é b\nc → d");
    let result = Lexer::new(&sf).lex();
    let messages: Vec<_> = result.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["unexpected character 'é'", "unexpected character '→'"]
    );
    let cols: Vec<_> = result.errors.iter().map(|e| e.span.start_col).collect();
    assert_eq!(cols, vec![3, 3]);
    let b = result
        .tokens
        .iter()
        .find(|t| t.kind == ident("b"))
        .expect("b token");
    assert_eq!(b.span.start_col, 5);
}

#[test]
fn test_error_cap_stops_lexing() {
    let source = "@".repeat(50);
    let sf = SourceFile::new("test.och", source);
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.errors.len(), ochain_types::MAX_ERRORS);
    assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}

// ─────────────────────────────────────────────────────────────────────
// Spans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_span_positions() {
    let sf = SourceFile::new("test.och", "var mutT: T?");
    let tokens = Lexer::new(&sf).lex().tokens;
    let spans: Vec<_> = tokens
        .iter()
        .map(|t| (t.span.start_col, t.span.end_col))
        .collect();
    // var, mutT, :, T, ?, Eof
    assert_eq!(&spans[..5], &[(1, 3), (5, 8), (9, 9), (11, 11), (12, 12)]);
}

#[test]
fn test_span_multiline() {
    let sf = SourceFile::new("test.och", "a\n  b");
    let tokens = Lexer::new(&sf).lex().tokens;
    let b = tokens
        .iter()
        .find(|t| t.kind == ident("b"))
        .expect("b token");
    assert_eq!((b.span.start_line, b.span.start_col), (2, 3));
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_lexer_determinism_100_iterations() {
    let source = "struct S {\n  var x: Int = 0\n  mutating func m() {}\n}\nmutT?.mutS?.x += 0\n";
    let first = kinds(source);
    for i in 0..100 {
        assert_eq!(first, kinds(source), "Determinism failure at iteration {i}");
    }
}
