//! Resolution errors and their diagnostic codes.

use ochain_types::{ErrorCode, Span};
use thiserror::Error;

use crate::ty::{NotOptionalError, Type};

/// A local, non-fatal failure while resolving an access, call or assignment.
///
/// The resolver keeps going after any of these with a recovered type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("cannot use optional chaining on non-optional value of type '{ty}'")]
    NotOptionalChain { ty: Type },

    #[error("value of type '{ty}' has no member '{name}'")]
    UnknownMember { ty: Type, name: String },

    #[error("value of type '{ty}' has no subscripts")]
    NoSubscript { ty: Type },

    #[error("type '{ty}' has no initializers")]
    NoInitializer { ty: Type },

    #[error(
        "cannot use mutating member '{method}' on immutable value: receiver of type '{ty}' is not a mutable location"
    )]
    MutatingOnImmutableReceiver { method: String, ty: Type },

    #[error("cannot assign to a value of type '{ty}': it is not a location")]
    NotAssignable { ty: Type },

    #[error("cannot assign to immutable location of type '{ty}'")]
    CannotAssignImmutable { ty: Type },

    #[error("cannot convert value of type '{found}' to '{expected}'")]
    TypeMismatch { expected: Type, found: Type },

    #[error("'nil' requires an optional contextual type")]
    NilWithoutContext,

    #[error("operator '{op}' cannot be applied to an operand of type '{ty}'")]
    OperatorNotApplicable { op: String, ty: Type },

    #[error("value of optional type '{ty}' must be unwrapped before use")]
    UnwrappedOptionalRequired { ty: Type },

    #[error("'{callee}' expects {expected} argument(s), got {found}")]
    WrongArgCount {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot find '{name}' in scope")]
    UnknownIdentifier { name: String },

    #[error("cannot find type '{name}' in scope")]
    UnknownType { name: String },
}

impl ResolveError {
    /// The diagnostic code reported for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveError::NotOptionalChain { .. } => ErrorCode::NOT_OPTIONAL_CHAIN,
            ResolveError::UnknownMember { .. }
            | ResolveError::NoSubscript { .. }
            | ResolveError::NoInitializer { .. } => ErrorCode::UNKNOWN_MEMBER,
            ResolveError::MutatingOnImmutableReceiver { .. } => {
                ErrorCode::MUTATING_ON_IMMUTABLE_RECEIVER
            }
            ResolveError::NotAssignable { .. } => ErrorCode::NOT_ASSIGNABLE,
            ResolveError::CannotAssignImmutable { .. } => ErrorCode::CANNOT_ASSIGN_IMMUTABLE,
            ResolveError::TypeMismatch { .. } | ResolveError::NilWithoutContext => {
                ErrorCode::TYPE_MISMATCH
            }
            ResolveError::OperatorNotApplicable { .. } => ErrorCode::OPERATOR_NOT_APPLICABLE,
            ResolveError::UnwrappedOptionalRequired { .. } => {
                ErrorCode::UNWRAPPED_OPTIONAL_REQUIRED
            }
            ResolveError::WrongArgCount { .. } => ErrorCode::WRONG_ARG_COUNT,
            ResolveError::UnknownIdentifier { .. } => ErrorCode::UNKNOWN_IDENTIFIER,
            ResolveError::UnknownType { .. } => ErrorCode::UNKNOWN_TYPE,
        }
    }

    /// Attach the source range the error is reported at.
    pub fn at(self, span: Span) -> SpannedError {
        SpannedError { error: self, span }
    }
}

impl From<NotOptionalError> for ResolveError {
    fn from(err: NotOptionalError) -> Self {
        ResolveError::NotOptionalChain { ty: err.0 }
    }
}

/// A [`ResolveError`] with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedError {
    pub error: ResolveError,
    pub span: Span,
}
