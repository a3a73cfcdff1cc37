//! Lvalue-ness tracking along an access path.
//!
//! A location stays writable only while every step on the way to it is
//! writable: the result of [`Lvalueness::narrow`] is the AND of the parent's
//! mutability and the member's.

use serde::Serialize;

use crate::ty::Type;

/// Whether an expression denotes a location, and whether that location may
/// be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lvalueness {
    pub is_lvalue: bool,
    /// Only meaningful when `is_lvalue`.
    pub is_mutable: bool,
}

impl Lvalueness {
    /// A computed value with no location.
    pub const RVALUE: Lvalueness = Lvalueness {
        is_lvalue: false,
        is_mutable: false,
    };

    /// A location declared `var` (`mutable`) or `let`.
    pub fn location(mutable: bool) -> Self {
        Lvalueness {
            is_lvalue: true,
            is_mutable: mutable,
        }
    }

    /// Step from a parent location into a member with the given flag.
    pub fn narrow(self, member_mutable: bool) -> Self {
        if !self.is_lvalue {
            return Lvalueness::RVALUE;
        }
        Lvalueness::location(self.is_mutable && member_mutable)
    }

    /// Step through an optional unwrap. With optional lvalues disabled the
    /// unwrapped payload is a plain value.
    pub fn through_unwrap(self, optional_lvalues: bool) -> Self {
        if optional_lvalues {
            self
        } else {
            Lvalueness::RVALUE
        }
    }

    pub fn is_mutable_lvalue(self) -> bool {
        self.is_lvalue && self.is_mutable
    }
}

/// The outcome of resolving an expression: its type and lvalue-ness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedExpr {
    pub ty: Type,
    pub is_lvalue: bool,
    pub is_mutable: bool,
}

impl ResolvedExpr {
    pub fn new(ty: Type, lvalueness: Lvalueness) -> Self {
        Self {
            ty,
            is_lvalue: lvalueness.is_lvalue,
            is_mutable: lvalueness.is_lvalue && lvalueness.is_mutable,
        }
    }

    pub fn rvalue(ty: Type) -> Self {
        Self::new(ty, Lvalueness::RVALUE)
    }

    /// Recovery value for an expression that failed to resolve.
    pub fn unknown() -> Self {
        Self::rvalue(Type::Unknown)
    }

    pub fn lvalueness(&self) -> Lvalueness {
        Lvalueness {
            is_lvalue: self.is_lvalue,
            is_mutable: self.is_mutable,
        }
    }

    /// Same location, different type.
    pub fn with_type(&self, ty: Type) -> Self {
        Self::new(ty, self.lvalueness())
    }
}
