//! Optional-chain evaluation.
//!
//! Walks the links of a chain left to right, tracking the current resolved
//! access and the number of optional layers unwrapped so far (`depth`).
//! Reading the chain produces the final type re-wrapped `depth` times;
//! assigning through it targets the unwrapped shape.
//!
//! ```text
//! mutT?.mutS?.x      T?  →(unwrap, depth 1) T  →.mutS  S?
//!                        →(unwrap, depth 2) S  →.x     Int
//! read:   Int??          target: Int (mutable lvalue)
//! ```

use ochain_types::ast::{ChainLink, Expr, Ident, LinkKind};
use ochain_types::Span;
use tracing::trace;

use crate::access;
use crate::error::{ResolveError, SpannedError};
use crate::lvalue::ResolvedExpr;
use crate::options::CheckOptions;
use crate::symbols::SymbolTable;
use crate::ty::Type;

/// Types an operand expression (call argument or subscript index) against an
/// optional expected type, reporting its own errors.
pub type OperandTyper<'a> = dyn FnMut(&Expr, Option<&Type>) -> Type + 'a;

// ══════════════════════════════════════════════════════════════════════════════
// ChainResolution
// ══════════════════════════════════════════════════════════════════════════════

/// The result of evaluating a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainResolution {
    /// The unwrapped shape: what an assignment through the chain writes.
    pub target: ResolvedExpr,
    /// Optional layers unwrapped along the way.
    pub optional_depth: usize,
    pub errors: Vec<SpannedError>,
}

impl ChainResolution {
    /// The type of reading the chain: the target type wrapped once per
    /// unwrap. `Unknown` stays `Unknown`.
    pub fn read_type(&self) -> Type {
        if self.target.ty.is_unknown() {
            return Type::Unknown;
        }
        self.target.ty.clone().wrap_n(self.optional_depth)
    }

    /// The chain as a read: the read type, keeping the target's location.
    pub fn read(&self) -> ResolvedExpr {
        self.target.with_type(self.read_type())
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// ChainEvaluator
// ══════════════════════════════════════════════════════════════════════════════

/// Evaluates chains against a fixed symbol table and options.
#[derive(Debug, Clone, Copy)]
pub struct ChainEvaluator<'t> {
    table: &'t SymbolTable,
    options: &'t CheckOptions,
}

struct State {
    current: ResolvedExpr,
    depth: usize,
    errors: Vec<SpannedError>,
}

impl State {
    fn fail(&mut self, error: ResolveError, span: Span) {
        self.errors.push(error.at(span));
        self.current = self.current.with_type(Type::Unknown);
    }
}

impl<'t> ChainEvaluator<'t> {
    pub fn new(table: &'t SymbolTable, options: &'t CheckOptions) -> Self {
        Self { table, options }
    }

    /// Evaluate `links` starting from an already resolved `root`.
    pub fn evaluate(
        &self,
        root: ResolvedExpr,
        links: &[ChainLink],
        operands: &mut OperandTyper<'_>,
    ) -> ChainResolution {
        let mut state = State {
            current: root,
            depth: 0,
            errors: Vec::new(),
        };
        for link in links {
            self.step(&mut state, link, operands);
            trace!(
                ty = %state.current.ty,
                lvalue = state.current.is_lvalue,
                mutable = state.current.is_mutable,
                depth = state.depth,
                "chain link"
            );
        }
        ChainResolution {
            target: state.current,
            optional_depth: state.depth,
            errors: state.errors,
        }
    }

    fn step(&self, state: &mut State, link: &ChainLink, operands: &mut OperandTyper<'_>) {
        match &link.kind {
            LinkKind::Plain(name) => self.member(state, name),
            LinkKind::OptionalUnwrap(name) => {
                self.unwrap(state, link.span);
                if let Some(name) = name {
                    self.member(state, name);
                }
            }
            LinkKind::Subscript { index, optional } => {
                if *optional {
                    self.unwrap(state, link.span);
                }
                self.subscript(state, index, link.span, operands);
            }
            LinkKind::Call {
                method,
                args,
                optional,
            } => {
                if *optional {
                    self.unwrap(state, link.span);
                }
                self.call(state, method, args, operands);
            }
        }
    }

    /// Remove one optional layer. On a non-optional base the error is
    /// reported and the base is used as is.
    fn unwrap(&self, state: &mut State, span: Span) {
        match state.current.ty.unwrap_one() {
            Ok(inner) => {
                let lvalueness = state
                    .current
                    .lvalueness()
                    .through_unwrap(self.options.optional_lvalues);
                state.current = ResolvedExpr::new(inner, lvalueness);
                state.depth += 1;
            }
            Err(err) => state.errors.push(ResolveError::from(err).at(span)),
        }
    }

    fn member(&self, state: &mut State, name: &Ident) {
        match access::resolve_member(self.table, &state.current, &name.name) {
            Ok(resolved) => state.current = resolved,
            Err(err) => state.fail(err, name.span),
        }
    }

    fn subscript(&self, state: &mut State, index: &Expr, span: Span, operands: &mut OperandTyper<'_>) {
        let expected = match access::find_subscript(self.table, &state.current.ty) {
            Ok(sub) => sub.map(|s| s.index.clone()),
            Err(err) => {
                operands(index, None);
                state.fail(err, span);
                return;
            }
        };
        let index_ty = operands(index, expected.as_ref());
        match access::resolve_subscript(
            self.table,
            &state.current,
            &index_ty,
            self.options.optional_promotion,
        ) {
            Ok(resolved) => state.current = resolved,
            Err(err) => state.fail(err, index.span),
        }
    }

    fn call(&self, state: &mut State, method: &Ident, args: &[Expr], operands: &mut OperandTyper<'_>) {
        let params = match access::find_method(self.table, &state.current.ty, &method.name) {
            Ok(sig) => sig.map(|m| m.params.clone()).unwrap_or_default(),
            Err(err) => {
                for arg in args {
                    operands(arg, None);
                }
                state.fail(err, method.span);
                state.current = ResolvedExpr::unknown();
                return;
            }
        };
        let arg_types: Vec<Type> = args
            .iter()
            .enumerate()
            .map(|(i, arg)| operands(arg, params.get(i)))
            .collect();
        match access::resolve_method_call(
            self.table,
            &state.current,
            &method.name,
            &arg_types,
            self.options.optional_promotion,
        ) {
            Ok(resolved) => state.current = resolved,
            Err(err) => {
                state.fail(err, method.span);
                state.current = ResolvedExpr::unknown();
            }
        }
    }
}
