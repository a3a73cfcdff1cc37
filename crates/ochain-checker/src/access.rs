//! Member, method and subscript access on a resolved base.
//!
//! Each resolver takes the already-resolved base (type plus lvalue-ness) and
//! produces the resolved access. None of them unwrap optionals: a base with
//! an optional type is rejected here, and `?.` steps are handled by the
//! chain evaluator before these are called.

use crate::error::ResolveError;
use crate::lvalue::ResolvedExpr;
use crate::symbols::{Aggregate, Method, Subscript, SymbolTable};
use crate::ty::Type;

/// The aggregate a non-optional base names.
///
/// `Ok(None)` means the base type is `Unknown` and the access should
/// resolve to `Unknown` without reporting anything.
fn base_aggregate<'t>(
    table: &'t SymbolTable,
    base_ty: &Type,
    member: &str,
) -> Result<Option<&'t Aggregate>, ResolveError> {
    match base_ty {
        Type::Unknown => Ok(None),
        Type::Optional(_) => Err(ResolveError::UnwrappedOptionalRequired {
            ty: base_ty.clone(),
        }),
        Type::Base(_) => table
            .aggregate_of(base_ty)
            .map(Some)
            .ok_or_else(|| ResolveError::UnknownMember {
                ty: base_ty.clone(),
                name: member.to_string(),
            }),
    }
}

/// Resolve `base.name` for a stored field.
pub fn resolve_member(
    table: &SymbolTable,
    base: &ResolvedExpr,
    name: &str,
) -> Result<ResolvedExpr, ResolveError> {
    let Some(aggregate) = base_aggregate(table, &base.ty, name)? else {
        return Ok(base.with_type(Type::Unknown));
    };
    let field = aggregate
        .field(name)
        .ok_or_else(|| ResolveError::UnknownMember {
            ty: base.ty.clone(),
            name: name.to_string(),
        })?;
    Ok(ResolvedExpr::new(
        field.ty.clone(),
        base.lvalueness().narrow(field.mutable),
    ))
}

/// Look up a method by name. `Ok(None)` for an `Unknown` base.
pub fn find_method<'t>(
    table: &'t SymbolTable,
    base_ty: &Type,
    name: &str,
) -> Result<Option<&'t Method>, ResolveError> {
    let Some(aggregate) = base_aggregate(table, base_ty, name)? else {
        return Ok(None);
    };
    aggregate
        .method(name)
        .map(Some)
        .ok_or_else(|| ResolveError::UnknownMember {
            ty: base_ty.clone(),
            name: name.to_string(),
        })
}

/// Resolve `base.method(args)`. The result is always a value, never a
/// location.
///
/// `args` are the argument types, already typed against the method's
/// parameters.
pub fn resolve_method_call(
    table: &SymbolTable,
    base: &ResolvedExpr,
    method: &str,
    args: &[Type],
    promotion: bool,
) -> Result<ResolvedExpr, ResolveError> {
    let Some(sig) = find_method(table, &base.ty, method)? else {
        return Ok(ResolvedExpr::unknown());
    };
    if sig.requires_mutable_receiver && !base.lvalueness().is_mutable_lvalue() {
        return Err(ResolveError::MutatingOnImmutableReceiver {
            method: method.to_string(),
            ty: base.ty.clone(),
        });
    }
    check_arguments(&format!("{}.{}", base.ty, method), &sig.params, args, promotion)?;
    Ok(ResolvedExpr::rvalue(sig.ret.clone()))
}

/// Look up the subscript a base type declares. `Ok(None)` for an `Unknown`
/// base.
pub fn find_subscript<'t>(
    table: &'t SymbolTable,
    base_ty: &Type,
) -> Result<Option<&'t Subscript>, ResolveError> {
    let Some(aggregate) = base_aggregate(table, base_ty, "subscript")? else {
        return Ok(None);
    };
    aggregate
        .subscript
        .as_ref()
        .map(Some)
        .ok_or_else(|| ResolveError::NoSubscript {
            ty: base_ty.clone(),
        })
}

/// Resolve `base[index]`. A settable subscript behaves like a `var` field,
/// a get-only one like a `let` field.
pub fn resolve_subscript(
    table: &SymbolTable,
    base: &ResolvedExpr,
    index: &Type,
    promotion: bool,
) -> Result<ResolvedExpr, ResolveError> {
    let Some(sub) = find_subscript(table, &base.ty)? else {
        return Ok(base.with_type(Type::Unknown));
    };
    if !sub.index.accepts(index, promotion) {
        return Err(ResolveError::TypeMismatch {
            expected: sub.index.clone(),
            found: index.clone(),
        });
    }
    Ok(ResolvedExpr::new(
        sub.ret.clone(),
        base.lvalueness().narrow(sub.settable),
    ))
}

/// Check argument count and types against a parameter list.
pub(crate) fn check_arguments(
    callee: &str,
    params: &[Type],
    args: &[Type],
    promotion: bool,
) -> Result<(), ResolveError> {
    if params.len() != args.len() {
        return Err(ResolveError::WrongArgCount {
            callee: callee.to_string(),
            expected: params.len(),
            found: args.len(),
        });
    }
    for (param, arg) in params.iter().zip(args) {
        if !param.accepts(arg, promotion) {
            return Err(ResolveError::TypeMismatch {
                expected: param.clone(),
                found: arg.clone(),
            });
        }
    }
    Ok(())
}
