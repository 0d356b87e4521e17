//! Name resolution for declared type expressions.

use std::collections::BTreeMap;

use crate::expr::TypeExpr;
use crate::handle::{BuiltinType, TypeHandle};

/// A type variable declared in a scope, optionally bounded.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeVarDecl {
    pub name: String,
    pub bound: Option<TypeExpr>,
}

/// Names visible to the descriptor builder.
///
/// Markers (`Any`, `None`, `type`, ...) and generic heads (`List`, `Union`,
/// ...) are recognised by the builder itself; the scope only holds nominal
/// types and type variables.
#[derive(Clone, Debug)]
pub struct TypeScope {
    types: BTreeMap<String, TypeHandle>,
    vars: BTreeMap<String, TypeVarDecl>,
}

const BUILTIN_NAMES: &[(&str, BuiltinType)] = &[
    ("Int", BuiltinType::Int),
    ("Float", BuiltinType::Float),
    ("Bool", BuiltinType::Bool),
    ("String", BuiltinType::String),
    ("Object", BuiltinType::Object),
    ("Function", BuiltinType::Function),
    ("int", BuiltinType::Int),
    ("float", BuiltinType::Float),
    ("bool", BuiltinType::Bool),
    ("str", BuiltinType::String),
    ("object", BuiltinType::Object),
    ("list", BuiltinType::List),
    ("tuple", BuiltinType::Tuple),
    ("dict", BuiltinType::Dict),
];

impl TypeScope {
    /// A scope with no names at all.
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
            vars: BTreeMap::new(),
        }
    }

    /// A scope holding the built-in type names and their host aliases.
    pub fn with_builtins() -> Self {
        let mut scope = Self::empty();
        for (name, builtin) in BUILTIN_NAMES {
            scope.register(*name, TypeHandle::Builtin(*builtin));
        }
        scope
    }

    /// Make a type resolvable under `name`, replacing any previous binding.
    pub fn register(&mut self, name: impl Into<String>, ty: TypeHandle) {
        self.types.insert(name.into(), ty);
    }

    /// Register a sealed class under its own name.
    pub fn register_class(&mut self, class: TypeHandle) {
        let name = class.name().to_string();
        self.register(name, class);
    }

    pub fn declare_var(&mut self, name: impl Into<String>, bound: Option<TypeExpr>) {
        let name = name.into();
        self.vars.insert(name.clone(), TypeVarDecl { name, bound });
    }

    pub fn lookup_type(&self, name: &str) -> Option<&TypeHandle> {
        self.types.get(name)
    }

    pub fn type_var(&self, name: &str) -> Option<&TypeVarDecl> {
        self.vars.get(name)
    }
}

impl Default for TypeScope {
    fn default() -> Self {
        Self::with_builtins()
    }
}
