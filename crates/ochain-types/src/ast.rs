//! AST node types for the OChain fixture language.
//!
//! Every node carries a [`Span`] for diagnostics. Items keep source order.

use crate::Span;
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete source file: declarations and statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
    pub span: Span,
}

/// A top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Struct(StructDecl),
    Var(VarDecl),
    Stmt(Stmt),
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// `var` (mutable) or `let` (immutable after initialisation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutability {
    Var,
    Let,
}

impl Mutability {
    pub fn is_mutable(self) -> bool {
        self == Mutability::Var
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutability::Var => write!(f, "var"),
            Mutability::Let => write!(f, "let"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Declarations
// ══════════════════════════════════════════════════════════════════════════════

/// `struct Name { members }`
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: Ident,
    pub members: Vec<MemberDecl>,
    pub span: Span,
}

/// A member of a struct body.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberDecl {
    Field(VarDecl),
    Method(MethodDecl),
    Subscript(SubscriptDecl),
    Init(InitDecl),
}

/// `var name: Type = value`, used for globals and struct fields.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub mutability: Mutability,
    pub name: Ident,
    pub type_ann: Option<TypeAnnotation>,
    pub init: Option<Expr>,
    pub span: Span,
}

/// `[mutating] func name(params) [-> Type] { ... }`
///
/// Bodies are skipped by the parser; only the signature is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: Ident,
    pub mutating: bool,
    pub params: Vec<Param>,
    pub ret: Option<TypeAnnotation>,
    pub span: Span,
}

/// `subscript(index: Type) -> Type { get [set] }`
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptDecl {
    pub index: TypeAnnotation,
    pub ret: TypeAnnotation,
    pub settable: bool,
    pub span: Span,
}

/// `init(params) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct InitDecl {
    pub params: Vec<Param>,
    pub span: Span,
}

/// A named, typed parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub type_ann: TypeAnnotation,
    pub span: Span,
}

/// A syntactic type: a base name followed by zero or more `?`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// `Int`, `S`
    Named(String),
    /// `T?`
    Optional(Box<TypeAnnotation>),
}

impl TypeAnnotation {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A bare expression, evaluated for its effect.
    Expr(ExprStmt),
    /// `target = value`, `target += value`, `target -= value`
    Assign(AssignStmt),
    /// `_ = value`
    Discard(DiscardStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Discard(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Expr,
    pub op: AssignOp,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscardStmt {
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, if any.
    pub fn binary_op(self) -> Option<BinOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinOp::Add),
            AssignOp::SubAssign => Some(BinOp::Sub),
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignOp::Assign => write!(f, "="),
            AssignOp::AddAssign => write!(f, "+="),
            AssignOp::SubAssign => write!(f, "-="),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    IntLit(i64),
    StringLit(String),
    BoolLit(bool),
    NilLit,

    // ── Names ──
    Identifier(String),
    /// `T(args)` constructs a value of aggregate `T`.
    Construct { ty: Ident, args: Vec<Expr> },

    // ── Access chains ──
    /// `root.a?.b[i]?.m()`, see [`ChainLink`].
    Chain(Chain),

    // ── Operators ──
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// `++x`, `--x`
    PrefixIncDec { op: IncDec, operand: Box<Expr> },
    /// `x++`, `x--`
    PostfixIncDec { op: IncDec, operand: Box<Expr> },

    /// `( expr )`
    Paren(Box<Expr>),
}

/// A root expression followed by one or more access links.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub root: Box<Expr>,
    pub links: Vec<ChainLink>,
}

impl Chain {
    /// Returns `true` if any link unwraps an optional.
    pub fn has_optional_link(&self) -> bool {
        self.links.iter().any(|l| l.kind.is_optional())
    }

    /// Returns `true` if the last link is a method call.
    pub fn ends_in_call(&self) -> bool {
        matches!(self.links.last().map(|l| &l.kind), Some(LinkKind::Call { .. }))
    }
}

/// One step of an access chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLink {
    pub kind: LinkKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkKind {
    /// `.name`
    Plain(Ident),
    /// `?.name`, or a bare `?` (no name) that only unwraps.
    OptionalUnwrap(Option<Ident>),
    /// `[index]` or `?[index]`
    Subscript { index: Box<Expr>, optional: bool },
    /// `.method(args)` or `?.method(args)`
    Call {
        method: Ident,
        args: Vec<Expr>,
        optional: bool,
    },
}

impl LinkKind {
    /// Returns `true` if this link unwraps one optional layer first.
    pub fn is_optional(&self) -> bool {
        match self {
            LinkKind::Plain(_) => false,
            LinkKind::OptionalUnwrap(_) => true,
            LinkKind::Subscript { optional, .. } | LinkKind::Call { optional, .. } => *optional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
        }
    }
}

/// Increment or decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDec {
    Inc,
    Dec,
}

impl fmt::Display for IncDec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncDec::Inc => write!(f, "++"),
            IncDec::Dec => write!(f, "--"),
        }
    }
}
