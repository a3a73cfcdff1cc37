//! Token types for the OChain lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the fixture language and
//! [`Token`], which pairs a kind with a source [`Span`].

use ochain_types::Span;
use std::fmt;

/// Reserved words. These cannot be used as user-defined names.
pub const ALL_KEYWORDS: &[&str] = &[
    // Declarations
    "struct", "var", "let", "func", "mutating", "subscript", "init", "get", "set",
    // Literals
    "nil", "true", "false",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// Integer literal: `0`, `42`
    IntLit(i64),
    /// String literal: `"hello"`
    StringLit(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `nil`
    Nil,

    /// User-defined identifier: `mutT`, `Int`
    Identifier(String),

    // ── Keywords ─────────────────────────────────────────────

    /// `struct`
    Struct,
    /// `var`
    Var,
    /// `let`
    Let,
    /// `func`
    Func,
    /// `mutating`
    Mutating,
    /// `subscript`
    Subscript,
    /// `init`
    Init,
    /// `get`
    Get,
    /// `set`
    Set,

    // ── Operators ────────────────────────────────────────────

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `=`
    Eq,
    /// `?` (optional type suffix / optional chaining)
    Question,
    /// `->`
    Arrow,

    // ── Punctuation ──────────────────────────────────────────

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `_` (discard)
    Underscore,

    // ── Special ──────────────────────────────────────────────

    /// Newline (statement separator)
    Newline,
    /// End of file
    Eof,
}

impl TokenKind {
    /// Look up a reserved word. Returns `None` for user identifiers.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "struct" => TokenKind::Struct,
            "var" => TokenKind::Var,
            "let" => TokenKind::Let,
            "func" => TokenKind::Func,
            "mutating" => TokenKind::Mutating,
            "subscript" => TokenKind::Subscript,
            "init" => TokenKind::Init,
            "get" => TokenKind::Get,
            "set" => TokenKind::Set,
            "nil" => TokenKind::Nil,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => return None,
        })
    }

    /// Returns `true` if this token is a reserved word.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Struct
                | TokenKind::Var
                | TokenKind::Let
                | TokenKind::Func
                | TokenKind::Mutating
                | TokenKind::Subscript
                | TokenKind::Init
                | TokenKind::Get
                | TokenKind::Set
                | TokenKind::Nil
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Returns `true` for tokens that end a statement.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof | TokenKind::RBrace
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLit(n) => write!(f, "{n}"),
            TokenKind::StringLit(s) => write!(f, "\"{s}\""),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::Nil => write!(f, "nil"),
            TokenKind::Identifier(name) => write!(f, "{name}"),
            TokenKind::Struct => write!(f, "struct"),
            TokenKind::Var => write!(f, "var"),
            TokenKind::Let => write!(f, "let"),
            TokenKind::Func => write!(f, "func"),
            TokenKind::Mutating => write!(f, "mutating"),
            TokenKind::Subscript => write!(f, "subscript"),
            TokenKind::Init => write!(f, "init"),
            TokenKind::Get => write!(f, "get"),
            TokenKind::Set => write!(f, "set"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::PlusPlus => write!(f, "++"),
            TokenKind::MinusMinus => write!(f, "--"),
            TokenKind::PlusEq => write!(f, "+="),
            TokenKind::MinusEq => write!(f, "-="),
            TokenKind::Eq => write!(f, "="),
            TokenKind::Question => write!(f, "?"),
            TokenKind::Arrow => write!(f, "->"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Underscore => write!(f, "_"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}
