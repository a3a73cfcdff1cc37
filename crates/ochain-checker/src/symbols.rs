//! Symbol table: declared aggregates and global bindings.
//!
//! Built once by the declaration pass and then only read. Resolution never
//! mutates it, so a `&SymbolTable` can be shared across threads.

use std::collections::HashMap;

use ochain_types::Span;

use crate::ty::{self, Type};

// ══════════════════════════════════════════════════════════════════════════════
// Aggregate Members
// ══════════════════════════════════════════════════════════════════════════════

/// A stored property. `var` fields are mutable, `let` fields are not.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
    pub span: Span,
}

/// A method signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    /// `mutating`: the receiver must be a mutable location.
    pub requires_mutable_receiver: bool,
    pub params: Vec<Type>,
    pub ret: Type,
    pub span: Span,
}

/// A subscript signature. `settable` plays the role of a field's `var`.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscript {
    pub index: Type,
    pub ret: Type,
    pub settable: bool,
}

/// A declared struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub name: String,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub subscript: Option<Subscript>,
    /// Parameter lists of the declared initializers.
    pub inits: Vec<Vec<Type>>,
    pub span: Span,
}

impl Aggregate {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
            subscript: None,
            inits: Vec::new(),
            span,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Initializer parameter lists. A struct without an explicit `init`
    /// gets an implicit one with no parameters.
    pub fn initializers(&self) -> Vec<&[Type]> {
        if self.inits.is_empty() {
            vec![&[] as &[Type]]
        } else {
            self.inits.iter().map(Vec::as_slice).collect()
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Globals
// ══════════════════════════════════════════════════════════════════════════════

/// A top-level `var` or `let`.
#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// SymbolTable
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct SymbolTable {
    aggregates: HashMap<String, Aggregate>,
    globals: HashMap<String, Global>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an aggregate. Returns `false` if the name is taken.
    pub fn define_aggregate(&mut self, aggregate: Aggregate) -> bool {
        if ty::is_builtin(&aggregate.name) || self.aggregates.contains_key(&aggregate.name) {
            return false;
        }
        self.aggregates.insert(aggregate.name.clone(), aggregate);
        true
    }

    pub fn aggregate(&self, name: &str) -> Option<&Aggregate> {
        self.aggregates.get(name)
    }

    pub(crate) fn aggregate_mut(&mut self, name: &str) -> Option<&mut Aggregate> {
        self.aggregates.get_mut(name)
    }

    /// The aggregate a type names, if it is a `Base` aggregate type.
    pub fn aggregate_of(&self, ty: &Type) -> Option<&Aggregate> {
        ty.base_name().and_then(|name| self.aggregate(name))
    }

    /// Register a global. Returns `false` if the name is taken.
    pub fn define_global(&mut self, global: Global) -> bool {
        if self.globals.contains_key(&global.name) {
            return false;
        }
        self.globals.insert(global.name.clone(), global);
        true
    }

    pub fn global(&self, name: &str) -> Option<&Global> {
        self.globals.get(name)
    }

    /// Returns `true` if `name` is a built-in or declared type.
    pub fn has_type(&self, name: &str) -> bool {
        ty::is_builtin(name) || self.aggregates.contains_key(name)
    }

    /// The first type name inside `ty` that is not known, if any.
    pub fn unknown_type_in<'t>(&self, ty: &'t Type) -> Option<&'t str> {
        ty.innermost()
            .base_name()
            .filter(|name| !self.has_type(name))
    }

    pub fn aggregate_count(&self) -> usize {
        self.aggregates.len()
    }

    pub fn global_count(&self) -> usize {
        self.globals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::point(1, 1)
    }

    #[test]
    fn duplicate_aggregate_rejected() {
        let mut table = SymbolTable::new();
        assert!(table.define_aggregate(Aggregate::new("S", span())));
        assert!(!table.define_aggregate(Aggregate::new("S", span())));
        assert!(!table.define_aggregate(Aggregate::new("Int", span())));
    }

    #[test]
    fn implicit_initializer() {
        let agg = Aggregate::new("S", span());
        assert_eq!(agg.initializers(), vec![&[] as &[Type]]);
    }

    #[test]
    fn type_lookup() {
        let mut table = SymbolTable::new();
        table.define_aggregate(Aggregate::new("S", span()));
        assert!(table.has_type("S"));
        assert!(table.has_type("UInt8"));
        assert!(!table.has_type("Q"));
        assert_eq!(table.unknown_type_in(&Type::base("Q").wrap()), Some("Q"));
        assert_eq!(table.unknown_type_in(&Type::base("S").wrap()), None);
        assert!(table.aggregate_of(&Type::base("S")).is_some());
        assert!(table.aggregate_of(&Type::base("S").wrap()).is_none());
    }

    #[test]
    fn globals_are_unique() {
        let mut table = SymbolTable::new();
        let g = Global {
            name: "t".into(),
            ty: Type::int(),
            mutable: true,
            span: span(),
        };
        assert!(table.define_global(g.clone()));
        assert!(!table.define_global(g));
        assert_eq!(table.global("t").map(|g| g.mutable), Some(true));
    }
}
