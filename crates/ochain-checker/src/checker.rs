//! Program checker: walks a parsed program and resolves every statement.
//!
//! Entry point: [`TypeChecker::check`].
//!
//! Two passes:
//! 1. declarations (aggregates, their members, field defaults, globals)
//! 2. statements, each checked on its own against the finished table
//!
//! Error codes emitted here:
//! - E200–E202: unknown types, duplicate declarations, unknown names
//! - E300–E305: type, member, chaining and operator errors
//! - E400–E402: assignment and mutating-call errors
//! - E500: unused result (warning)

use std::collections::HashSet;

use ochain_types::ast::*;
use ochain_types::{Diagnostic, Diagnostics, ErrorCode, SourceFile, Span};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::access;
use crate::assign;
use crate::chain::{ChainEvaluator, ChainResolution};
use crate::error::{ResolveError, SpannedError};
use crate::lvalue::{Lvalueness, ResolvedExpr};
use crate::options::CheckOptions;
use crate::symbols::{Aggregate, Field, Global, Method, Subscript, SymbolTable};
use crate::ty::Type;

/// The outcome of a statement that checked without errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStatement {
    pub span: Span,
    pub resolved: ResolvedExpr,
}

// ══════════════════════════════════════════════════════════════════════════════
// TypeChecker
// ══════════════════════════════════════════════════════════════════════════════

/// Walks a parsed [`Program`], building the symbol table and checking every
/// statement against it.
pub struct TypeChecker<'a> {
    table: SymbolTable,
    options: &'a CheckOptions,
    errors: &'a mut Diagnostics,
    source: &'a SourceFile,
    statements: Vec<ResolvedStatement>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        errors: &'a mut Diagnostics,
        source: &'a SourceFile,
        options: &'a CheckOptions,
    ) -> Self {
        Self {
            table: SymbolTable::new(),
            options,
            errors,
            source,
            statements: Vec::new(),
        }
    }

    /// Check a complete program.
    #[instrument(level = "debug", skip_all, fields(file = %self.source.name))]
    pub fn check(&mut self, program: &Program) {
        self.declare(program);
        debug!(
            aggregates = self.table.aggregate_count(),
            globals = self.table.global_count(),
            "declarations registered"
        );
        for item in &program.items {
            if let Item::Stmt(stmt) = item {
                self.check_statement(stmt);
            }
        }
    }

    /// Consume the checker, returning the statements that checked cleanly.
    pub fn finish(self) -> Vec<ResolvedStatement> {
        self.statements
    }

    // ══════════════════════════════════════════════════════════════════════
    // Declaration pass
    // ══════════════════════════════════════════════════════════════════════

    fn declare(&mut self, program: &Program) {
        // 1. Aggregate names, so members can refer to any of them
        let mut accepted: Vec<&StructDecl> = Vec::new();
        for item in &program.items {
            if let Item::Struct(decl) = item {
                if self
                    .table
                    .define_aggregate(Aggregate::new(&decl.name.name, decl.span))
                {
                    accepted.push(decl);
                } else {
                    self.error(
                        ErrorCode::DUPLICATE_DECLARATION,
                        format!("invalid redeclaration of type '{}'", decl.name.name),
                        decl.name.span,
                    );
                }
            }
        }

        // 2. Member signatures
        for decl in &accepted {
            self.declare_members(decl);
        }

        // 3. Field defaults, now that every signature is known
        for decl in &accepted {
            self.check_field_defaults(decl);
        }

        // 4. Globals in source order
        for item in &program.items {
            if let Item::Var(var) = item {
                self.declare_global(var);
            }
        }
    }

    fn declare_members(&mut self, decl: &StructDecl) {
        let mut names: HashSet<&str> = HashSet::new();
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        let mut subscript: Option<Subscript> = None;
        let mut inits = Vec::new();

        for member in &decl.members {
            let name = match member {
                MemberDecl::Field(f) => Some(&f.name),
                MemberDecl::Method(m) => Some(&m.name),
                MemberDecl::Subscript(_) | MemberDecl::Init(_) => None,
            };
            if let Some(name) = name {
                if !names.insert(name.name.as_str()) {
                    self.error(
                        ErrorCode::DUPLICATE_DECLARATION,
                        format!("invalid redeclaration of '{}.{}'", decl.name.name, name.name),
                        name.span,
                    );
                    continue;
                }
            }
            match member {
                MemberDecl::Field(f) => {
                    let ty = match &f.type_ann {
                        Some(ann) => self.resolve_annotation(ann),
                        // Inferred from the default in step 3.
                        None => Type::Unknown,
                    };
                    fields.push(Field {
                        name: f.name.name.clone(),
                        ty,
                        mutable: f.mutability.is_mutable(),
                        span: f.span,
                    });
                }
                MemberDecl::Method(m) => {
                    let params = m
                        .params
                        .iter()
                        .map(|p| self.resolve_annotation(&p.type_ann))
                        .collect();
                    let ret = match &m.ret {
                        Some(ann) => self.resolve_annotation(ann),
                        None => Type::void(),
                    };
                    methods.push(Method {
                        name: m.name.name.clone(),
                        requires_mutable_receiver: m.mutating,
                        params,
                        ret,
                        span: m.span,
                    });
                }
                MemberDecl::Subscript(s) => {
                    if subscript.is_some() {
                        self.error(
                            ErrorCode::DUPLICATE_DECLARATION,
                            format!("'{}' already declares a subscript", decl.name.name),
                            s.span,
                        );
                        continue;
                    }
                    subscript = Some(Subscript {
                        index: self.resolve_annotation(&s.index),
                        ret: self.resolve_annotation(&s.ret),
                        settable: s.settable,
                    });
                }
                MemberDecl::Init(init) => {
                    let params = init
                        .params
                        .iter()
                        .map(|p| self.resolve_annotation(&p.type_ann))
                        .collect();
                    inits.push(params);
                }
            }
        }

        if let Some(aggregate) = self.table.aggregate_mut(&decl.name.name) {
            aggregate.fields = fields;
            aggregate.methods = methods;
            aggregate.subscript = subscript;
            aggregate.inits = inits;
        }
    }

    fn check_field_defaults(&mut self, decl: &StructDecl) {
        for member in &decl.members {
            let MemberDecl::Field(f) = member else {
                continue;
            };
            let Some(init) = &f.init else {
                continue;
            };
            let declared = self
                .table
                .aggregate(&decl.name.name)
                .and_then(|a| a.field(&f.name.name))
                .filter(|field| field.span == f.span)
                .map(|field| field.ty.clone());
            let Some(declared) = declared else {
                // A duplicate that was not registered.
                continue;
            };
            let annotated = f.type_ann.as_ref().map(|_| &declared);
            let ty = self.check_initializer(annotated, init);
            if f.type_ann.is_none() {
                if let Some(field) = self
                    .table
                    .aggregate_mut(&decl.name.name)
                    .and_then(|a| a.fields.iter_mut().find(|field| field.name == f.name.name))
                {
                    field.ty = ty;
                }
            }
        }
    }

    fn declare_global(&mut self, var: &VarDecl) {
        let declared = var.type_ann.as_ref().map(|ann| self.resolve_annotation(ann));
        let ty = match &var.init {
            Some(init) => self.check_initializer(declared.as_ref(), init),
            None => declared.unwrap_or(Type::Unknown),
        };
        let global = Global {
            name: var.name.name.clone(),
            ty,
            mutable: var.mutability.is_mutable(),
            span: var.span,
        };
        if !self.table.define_global(global) {
            self.error(
                ErrorCode::DUPLICATE_DECLARATION,
                format!("invalid redeclaration of '{}'", var.name.name),
                var.name.span,
            );
        }
    }

    /// Check an initial value against an optional declared type. Returns the
    /// binding's type: the declared one if present, else the value's.
    fn check_initializer(&mut self, declared: Option<&Type>, init: &Expr) -> Type {
        let mut exprs = ExprChecker::new(&self.table, self.options);
        let value = exprs.read(init, declared).ty;
        let errors = exprs.finish();
        let clean = errors.is_empty();
        self.report(errors);

        match declared {
            Some(declared) => {
                if clean && !declared.accepts(&value, self.options.optional_promotion) {
                    let err = ResolveError::TypeMismatch {
                        expected: declared.clone(),
                        found: value,
                    };
                    self.error(err.code(), err.to_string(), init.span);
                }
                declared.clone()
            }
            None => value,
        }
    }

    /// Convert an annotation, reporting names that are not types.
    fn resolve_annotation(&mut self, ann: &TypeAnnotation) -> Type {
        let ty = Type::from_annotation(ann);
        if let Some(name) = self.table.unknown_type_in(&ty) {
            let err = ResolveError::UnknownType {
                name: name.to_string(),
            };
            self.error(err.code(), err.to_string(), ann.span);
            return Type::Unknown;
        }
        ty
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statement pass
    // ══════════════════════════════════════════════════════════════════════

    #[instrument(level = "trace", skip_all, fields(line = stmt.span().start_line))]
    fn check_statement(&mut self, stmt: &Stmt) {
        let mut exprs = ExprChecker::new(&self.table, self.options);
        let resolved = exprs.check_stmt(stmt);
        let errors = exprs.finish();
        if !errors.is_empty() {
            debug!(errors = errors.len(), "statement rejected");
            self.report(errors);
            return;
        }

        if let Stmt::Expr(s) = stmt {
            if result_is_unused(&s.expr, &resolved.ty) {
                self.warning(
                    ErrorCode::UNUSED_RESULT,
                    format!("result of expression of type '{}' is unused", resolved.ty),
                    s.span,
                    "assign it to '_' to discard it explicitly",
                );
            }
        }
        self.statements.push(ResolvedStatement {
            span: stmt.span(),
            resolved,
        });
    }

    // ══════════════════════════════════════════════════════════════════════
    // Helpers
    // ══════════════════════════════════════════════════════════════════════

    fn report(&mut self, errors: Vec<SpannedError>) {
        for SpannedError { error, span } in errors {
            self.error(error.code(), error.to_string(), span);
        }
    }

    fn error(&mut self, code: ErrorCode, message: String, span: Span) {
        let source_line = self.source.line(span.start_line).unwrap_or("");
        self.errors.push_error(Diagnostic::new(
            &self.source.name,
            code,
            message,
            span,
            source_line,
        ));
    }

    fn warning(&mut self, code: ErrorCode, message: String, span: Span, suggestion: &str) {
        let source_line = self.source.line(span.start_line).unwrap_or("");
        self.errors.push_warning(
            Diagnostic::new(&self.source.name, code, message, span, source_line)
                .into_warning()
                .with_suggestion(suggestion),
        );
    }
}

/// An expression statement whose value is thrown away without saying so.
fn result_is_unused(expr: &Expr, ty: &Type) -> bool {
    if ty.is_unknown() || ty.innermost().is_void() {
        return false;
    }
    match &expr.kind {
        ExprKind::Chain(chain) => !chain.ends_in_call(),
        ExprKind::PrefixIncDec { .. } | ExprKind::PostfixIncDec { .. } => false,
        ExprKind::Paren(inner) => result_is_unused(inner, ty),
        _ => true,
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// ExprChecker
// ══════════════════════════════════════════════════════════════════════════════

/// Resolves expressions against a finished symbol table, collecting errors.
///
/// Holds only shared references to the table, so the chain evaluator can
/// call back into it for operands while it walks.
struct ExprChecker<'t> {
    table: &'t SymbolTable,
    options: &'t CheckOptions,
    errors: Vec<SpannedError>,
}

impl<'t> ExprChecker<'t> {
    fn new(table: &'t SymbolTable, options: &'t CheckOptions) -> Self {
        Self {
            table,
            options,
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Vec<SpannedError> {
        self.errors
    }

    fn fail(&mut self, error: ResolveError, span: Span) -> ResolvedExpr {
        self.errors.push(error.at(span));
        ResolvedExpr::unknown()
    }

    // ── Statements ────────────────────────────────────────────────────────

    fn check_stmt(&mut self, stmt: &Stmt) -> ResolvedExpr {
        match stmt {
            Stmt::Expr(s) => self.read(&s.expr, None),
            Stmt::Discard(s) => self.read(&s.value, None),
            Stmt::Assign(s) => self.assignment(s),
        }
    }

    fn assignment(&mut self, stmt: &AssignStmt) -> ResolvedExpr {
        let (target, _) = self.target(&stmt.target);
        let value = self.read(&stmt.value, Some(&target.ty)).ty;
        if let Err(err) =
            assign::check_assignment(&target, &value, stmt.op, self.options.optional_promotion)
        {
            let span = match err {
                ResolveError::TypeMismatch { .. } | ResolveError::UnwrappedOptionalRequired { .. } => {
                    stmt.value.span
                }
                _ => stmt.target.span,
            };
            self.errors.push(err.at(span));
        }
        target
    }

    // ── Targets ───────────────────────────────────────────────────────────

    /// Resolve an expression as something to write to: a chain gives its
    /// unwrapped shape plus the number of unwraps.
    fn target(&mut self, expr: &Expr) -> (ResolvedExpr, usize) {
        match &expr.kind {
            ExprKind::Chain(chain) => {
                let resolution = self.chain(chain);
                (resolution.target, resolution.optional_depth)
            }
            ExprKind::Paren(inner) => self.target(inner),
            _ => (self.read(expr, None), 0),
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Resolve an expression as a value, in a context expecting `expected`.
    fn read(&mut self, expr: &Expr, expected: Option<&Type>) -> ResolvedExpr {
        match &expr.kind {
            ExprKind::IntLit(_) => ResolvedExpr::rvalue(assign::integer_literal_type(
                expected,
                self.options.optional_promotion,
            )),
            ExprKind::StringLit(_) => ResolvedExpr::rvalue(Type::string()),
            ExprKind::BoolLit(_) => ResolvedExpr::rvalue(Type::bool()),
            ExprKind::NilLit => match assign::nil_type(expected) {
                Ok(ty) => ResolvedExpr::rvalue(ty),
                Err(err) => self.fail(err, expr.span),
            },
            ExprKind::Identifier(name) => self.identifier(name, expr.span),
            ExprKind::Construct { ty, args } => self.construct(ty, args),
            ExprKind::Chain(chain) => self.chain(chain).read(),
            ExprKind::Binary { left, op, right } => self.binary(left, *op, right, expr.span),
            ExprKind::PrefixIncDec { op, operand } => {
                let read = self.read(operand, None);
                match assign::check_prefix(*op, &read) {
                    Ok(ty) => ResolvedExpr::rvalue(ty),
                    Err(err) => self.fail(err, expr.span),
                }
            }
            ExprKind::PostfixIncDec { op, operand } => {
                let (target, depth) = self.target(operand);
                match assign::check_postfix(*op, &target) {
                    Ok(()) if target.ty.is_unknown() => ResolvedExpr::unknown(),
                    Ok(()) => ResolvedExpr::rvalue(target.ty.wrap_n(depth)),
                    Err(err) => self.fail(err, expr.span),
                }
            }
            ExprKind::Paren(inner) => self.read(inner, expected),
        }
    }

    fn identifier(&mut self, name: &str, span: Span) -> ResolvedExpr {
        match self.table.global(name) {
            Some(global) => {
                ResolvedExpr::new(global.ty.clone(), Lvalueness::location(global.mutable))
            }
            None => self.fail(
                ResolveError::UnknownIdentifier {
                    name: name.to_string(),
                },
                span,
            ),
        }
    }

    fn construct(&mut self, ty: &Ident, args: &[Expr]) -> ResolvedExpr {
        let table = self.table;
        let Some(aggregate) = table.aggregate(&ty.name) else {
            for arg in args {
                self.read(arg, None);
            }
            let err = if table.has_type(&ty.name) {
                ResolveError::NoInitializer {
                    ty: Type::base(&ty.name),
                }
            } else {
                ResolveError::UnknownType {
                    name: ty.name.clone(),
                }
            };
            return self.fail(err, ty.span);
        };

        let initializers = aggregate.initializers();
        let Some(params) = initializers.iter().find(|p| p.len() == args.len()) else {
            for arg in args {
                self.read(arg, None);
            }
            let expected = initializers.first().map_or(0, |p| p.len());
            let err = ResolveError::WrongArgCount {
                callee: format!("{}.init", ty.name),
                expected,
                found: args.len(),
            };
            return self.fail(err, ty.span);
        };
        let arg_types: Vec<Type> = args
            .iter()
            .zip(params.iter())
            .map(|(arg, param)| self.read(arg, Some(param)).ty)
            .collect();
        let callee = format!("{}.init", ty.name);
        if let Err(err) =
            access::check_arguments(&callee, params, &arg_types, self.options.optional_promotion)
        {
            return self.fail(err, ty.span);
        }
        ResolvedExpr::rvalue(Type::base(&ty.name))
    }

    fn chain(&mut self, chain: &Chain) -> ChainResolution {
        let root = self.read(&chain.root, None);
        let evaluator = ChainEvaluator::new(self.table, self.options);
        let mut resolution = evaluator.evaluate(root, &chain.links, &mut |expr, expected| {
            self.read(expr, expected).ty
        });
        self.errors.append(&mut resolution.errors);
        resolution
    }

    fn binary(&mut self, left: &Expr, op: BinOp, right: &Expr, span: Span) -> ResolvedExpr {
        // A literal takes its type from the other side.
        let (lhs, rhs) = if matches!(left.kind, ExprKind::IntLit(_)) {
            let rhs = self.read(right, None).ty;
            let lhs = self.read(left, Some(&rhs)).ty;
            (lhs, rhs)
        } else {
            let lhs = self.read(left, None).ty;
            let rhs = self.read(right, Some(&lhs)).ty;
            (lhs, rhs)
        };
        match assign::check_binary(op, &lhs, &rhs) {
            Ok(ty) => ResolvedExpr::rvalue(ty),
            Err(err) => self.fail(err, span),
        }
    }
}
