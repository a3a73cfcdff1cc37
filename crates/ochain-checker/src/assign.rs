//! Assignment, compound-assignment, increment and arithmetic checks.
//!
//! Rules are applied in a fixed order so the first failing one is the one
//! reported:
//!
//! 1. the target must be a location (`NotAssignable`)
//! 2. the location must be mutable (`CannotAssignImmutable`)
//! 3. `=` needs a value the target type accepts (`TypeMismatch`)
//! 4. `+=`/`-=` need the operator on the target type itself; optional
//!    targets are not lifted (`OperatorNotApplicable`)
//!
//! Mutability along the whole access path is already folded into the
//! target's [`ResolvedExpr`] by the chain evaluator.

use ochain_types::ast::{AssignOp, BinOp, IncDec};

use crate::error::ResolveError;
use crate::lvalue::ResolvedExpr;
use crate::ty::Type;

/// Rules 1 and 2.
fn check_location(target: &ResolvedExpr) -> Result<(), ResolveError> {
    if !target.is_lvalue {
        return Err(ResolveError::NotAssignable {
            ty: target.ty.clone(),
        });
    }
    if !target.is_mutable {
        return Err(ResolveError::CannotAssignImmutable {
            ty: target.ty.clone(),
        });
    }
    Ok(())
}

/// Does `op` exist for operands of type `ty`?
fn supports(op: BinOp, ty: &Type) -> bool {
    ty.is_numeric() || (op == BinOp::Add && ty.is_string())
}

/// Check `target op rhs` where `target` is the unwrapped assignment target.
///
/// An `Unknown` target already failed to resolve and is not checked again.
pub fn check_assignment(
    target: &ResolvedExpr,
    rhs: &Type,
    op: AssignOp,
    promotion: bool,
) -> Result<(), ResolveError> {
    if target.ty.is_unknown() {
        return Ok(());
    }
    check_location(target)?;
    match op.binary_op() {
        None => {
            if target.ty.accepts(rhs, promotion) {
                Ok(())
            } else {
                Err(ResolveError::TypeMismatch {
                    expected: target.ty.clone(),
                    found: rhs.clone(),
                })
            }
        }
        Some(bin) => check_compound(bin, &target.ty, rhs),
    }
}

/// Rule 4: the operator half of `+=` / `-=`.
fn check_compound(op: BinOp, target: &Type, rhs: &Type) -> Result<(), ResolveError> {
    if target.is_unknown() || rhs.is_unknown() {
        return Ok(());
    }
    if target.is_optional() || !supports(op, target) {
        return Err(ResolveError::OperatorNotApplicable {
            op: format!("{op}="),
            ty: target.clone(),
        });
    }
    if rhs.is_optional() {
        return Err(ResolveError::UnwrappedOptionalRequired { ty: rhs.clone() });
    }
    if rhs != target {
        return Err(ResolveError::TypeMismatch {
            expected: target.clone(),
            found: rhs.clone(),
        });
    }
    Ok(())
}

/// Check `left op right` as a read. Optional operands must be unwrapped
/// first. Returns the result type.
pub fn check_binary(op: BinOp, left: &Type, right: &Type) -> Result<Type, ResolveError> {
    if left.is_unknown() || right.is_unknown() {
        return Ok(Type::Unknown);
    }
    for operand in [left, right] {
        if operand.is_optional() {
            return Err(ResolveError::UnwrappedOptionalRequired {
                ty: operand.clone(),
            });
        }
    }
    if left != right {
        return Err(ResolveError::TypeMismatch {
            expected: left.clone(),
            found: right.clone(),
        });
    }
    if !supports(op, left) {
        return Err(ResolveError::OperatorNotApplicable {
            op: op.to_string(),
            ty: left.clone(),
        });
    }
    Ok(left.clone())
}

/// Check `++x` / `--x`. `operand` is the operand as read, so a chain with
/// any `?` has an optional type and is rejected before its location is
/// looked at.
pub fn check_prefix(op: IncDec, operand: &ResolvedExpr) -> Result<Type, ResolveError> {
    if operand.ty.is_unknown() {
        return Ok(Type::Unknown);
    }
    if operand.ty.is_optional() {
        return Err(ResolveError::OperatorNotApplicable {
            op: op.to_string(),
            ty: operand.ty.clone(),
        });
    }
    check_increment(op, operand)?;
    Ok(operand.ty.clone())
}

/// Check `x++` / `x--` against the unwrapped target, like `x += 1`.
pub fn check_postfix(op: IncDec, target: &ResolvedExpr) -> Result<(), ResolveError> {
    if target.ty.is_unknown() {
        return Ok(());
    }
    check_location(target)?;
    if target.ty.is_optional() || !target.ty.is_integer() {
        return Err(ResolveError::OperatorNotApplicable {
            op: op.to_string(),
            ty: target.ty.clone(),
        });
    }
    Ok(())
}

fn check_increment(op: IncDec, operand: &ResolvedExpr) -> Result<(), ResolveError> {
    check_location(operand)?;
    if !operand.ty.is_integer() {
        return Err(ResolveError::OperatorNotApplicable {
            op: op.to_string(),
            ty: operand.ty.clone(),
        });
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════════
// Literal Coercion
// ══════════════════════════════════════════════════════════════════════════════

/// The type an integer literal takes in a context expecting `expected`.
///
/// Numeric contexts are adopted; with `promotion`, so is the payload of a
/// numeric optional. Anything else gives `Int`.
pub fn integer_literal_type(expected: Option<&Type>, promotion: bool) -> Type {
    match expected {
        Some(ty) if ty.is_numeric() => ty.clone(),
        Some(ty) if promotion && ty.innermost().is_numeric() => ty.innermost().clone(),
        _ => Type::int(),
    }
}

/// The type `nil` takes in a context expecting `expected`.
pub fn nil_type(expected: Option<&Type>) -> Result<Type, ResolveError> {
    match expected {
        Some(ty) if ty.is_optional() || ty.is_unknown() => Ok(ty.clone()),
        _ => Err(ResolveError::NilWithoutContext),
    }
}
