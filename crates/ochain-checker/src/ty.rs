//! Semantic types for the optional-chain checker.
//!
//! [`Type`] is distinct from [`ochain_types::ast::TypeAnnotation`], which is
//! the syntactic form produced by the parser. Optionality nests: `Int??` is
//! `Optional(Optional(Int))` and is never collapsed to `Int?`.

use std::fmt;

use ochain_types::ast::{TypeAnnotation, TypeKind};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Built-in integer types. `++` and `--` apply only to these.
pub const INTEGER_TYPES: &[&str] = &[
    "Int", "Int8", "Int16", "Int32", "Int64", "UInt", "UInt8", "UInt16", "UInt32", "UInt64",
];

/// Built-in floating point types.
pub const FLOAT_TYPES: &[&str] = &["Double", "Float"];

/// Every built-in type name other than the numeric ones.
pub const OTHER_BUILTIN_TYPES: &[&str] = &["Bool", "String", "Void"];

/// Returns `true` if `name` is a built-in type.
pub fn is_builtin(name: &str) -> bool {
    INTEGER_TYPES.contains(&name) || FLOAT_TYPES.contains(&name) || OTHER_BUILTIN_TYPES.contains(&name)
}

// ══════════════════════════════════════════════════════════════════════════════
// Type
// ══════════════════════════════════════════════════════════════════════════════

/// A semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// A named type: a built-in (`Int`, `String`) or a declared aggregate.
    Base(String),
    /// `T?`
    Optional(Box<Type>),
    /// Type could not be determined (error recovery). Never reported.
    Unknown,
}

/// Returned by [`Type::unwrap_one`] when the type has no optional layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type '{0}' is not optional")]
pub struct NotOptionalError(pub Type);

impl Type {
    pub fn base(name: impl Into<String>) -> Self {
        Type::Base(name.into())
    }

    pub fn int() -> Self {
        Type::base("Int")
    }

    pub fn string() -> Self {
        Type::base("String")
    }

    pub fn bool() -> Self {
        Type::base("Bool")
    }

    pub fn void() -> Self {
        Type::base("Void")
    }

    /// Wrap in one optional layer, whatever the type already is.
    pub fn wrap(self) -> Self {
        Type::Optional(Box::new(self))
    }

    /// Wrap in `n` optional layers.
    pub fn wrap_n(self, n: usize) -> Self {
        (0..n).fold(self, |ty, _| ty.wrap())
    }

    /// Remove exactly one optional layer.
    ///
    /// `Unknown` unwraps to itself so recovery does not cascade.
    pub fn unwrap_one(&self) -> Result<Type, NotOptionalError> {
        match self {
            Type::Optional(inner) => Ok((**inner).clone()),
            Type::Unknown => Ok(Type::Unknown),
            Type::Base(_) => Err(NotOptionalError(self.clone())),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Optional(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// Number of optional layers around the innermost type.
    pub fn optional_depth(&self) -> usize {
        let mut depth = 0;
        let mut ty = self;
        while let Type::Optional(inner) = ty {
            depth += 1;
            ty = inner;
        }
        depth
    }

    /// The type with every optional layer removed.
    pub fn innermost(&self) -> &Type {
        let mut ty = self;
        while let Type::Optional(inner) = ty {
            ty = inner;
        }
        ty
    }

    /// The name of a `Base` type.
    pub fn base_name(&self) -> Option<&str> {
        match self {
            Type::Base(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.base_name().is_some_and(|n| INTEGER_TYPES.contains(&n))
    }

    pub fn is_numeric(&self) -> bool {
        self.base_name()
            .is_some_and(|n| INTEGER_TYPES.contains(&n) || FLOAT_TYPES.contains(&n))
    }

    pub fn is_string(&self) -> bool {
        self.base_name() == Some("String")
    }

    pub fn is_void(&self) -> bool {
        self.base_name() == Some("Void")
    }

    /// Can a value of type `value` be stored in a location of this type?
    ///
    /// Exact structural equality, except that `Unknown` is compatible with
    /// everything. With `promotion`, `X` is also accepted for `X?`, `X??`
    /// and so on.
    pub fn accepts(&self, value: &Type, promotion: bool) -> bool {
        if self.is_unknown() || value.is_unknown() || self == value {
            return true;
        }
        match self {
            Type::Optional(inner) if promotion => inner.accepts(value, promotion),
            _ => false,
        }
    }

    /// Convert a parsed annotation. Name validity is checked separately.
    pub fn from_annotation(ann: &TypeAnnotation) -> Self {
        let mut depth = 0;
        let mut kind = &ann.kind;
        loop {
            match kind {
                TypeKind::Named(name) => return Type::Base(name.clone()).wrap_n(depth),
                TypeKind::Optional(inner) => {
                    depth += 1;
                    kind = &inner.kind;
                }
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.innermost() {
            Type::Base(name) => write!(f, "{name}")?,
            _ => write!(f, "<unknown>")?,
        }
        for _ in 0..self.optional_depth() {
            f.write_str("?")?;
        }
        Ok(())
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
