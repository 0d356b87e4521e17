//! Nominal type handles for the host value model.

use std::fmt;
use std::sync::Arc;

use crate::callable::Callable;
use crate::class::ClassDef;
use crate::error::CallError;
use crate::value::Value;

/// Types every host value can belong to without a user class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    NoneType,
    Bool,
    Int,
    Float,
    String,
    List,
    Tuple,
    Dict,
    /// The metatype: values of this type denote other types.
    Type,
    Function,
    /// Root of the hierarchy.
    Object,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; 11] = [
        BuiltinType::NoneType,
        BuiltinType::Bool,
        BuiltinType::Int,
        BuiltinType::Float,
        BuiltinType::String,
        BuiltinType::List,
        BuiltinType::Tuple,
        BuiltinType::Dict,
        BuiltinType::Type,
        BuiltinType::Function,
        BuiltinType::Object,
    ];

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::NoneType => "None",
            BuiltinType::Bool => "Bool",
            BuiltinType::Int => "Int",
            BuiltinType::Float => "Float",
            BuiltinType::String => "String",
            BuiltinType::List => "List",
            BuiltinType::Tuple => "Tuple",
            BuiltinType::Dict => "Dict",
            BuiltinType::Type => "Type",
            BuiltinType::Function => "Function",
            BuiltinType::Object => "Object",
        }
    }

    /// Direct supertype. `Bool` refines `Int`, as in the host language.
    pub fn base(self) -> Option<BuiltinType> {
        match self {
            BuiltinType::Object => None,
            BuiltinType::Bool => Some(BuiltinType::Int),
            _ => Some(BuiltinType::Object),
        }
    }
}

/// A nominal type: a built-in or a sealed user class.
///
/// Classes compare by identity, so two classes with the same name are distinct.
#[derive(Clone)]
pub enum TypeHandle {
    Builtin(BuiltinType),
    Class(Arc<ClassDef>),
}

impl TypeHandle {
    pub fn name(&self) -> &str {
        match self {
            TypeHandle::Builtin(builtin) => builtin.name(),
            TypeHandle::Class(class) => class.name(),
        }
    }

    /// Direct supertype, `None` only for `Object`.
    pub fn base(&self) -> Option<TypeHandle> {
        match self {
            TypeHandle::Builtin(builtin) => builtin.base().map(TypeHandle::Builtin),
            TypeHandle::Class(class) => Some(class.base()),
        }
    }

    /// Walk the inheritance chain looking for `other`.
    pub fn is_subtype_of(&self, other: &TypeHandle) -> bool {
        let mut current = Some(self.clone());
        while let Some(ty) = current {
            if ty == *other {
                return true;
            }
            current = ty.base();
        }
        false
    }

    pub fn as_class(&self) -> Option<&Arc<ClassDef>> {
        match self {
            TypeHandle::Class(class) => Some(class),
            TypeHandle::Builtin(_) => None,
        }
    }

    pub fn is_builtin(&self, builtin: BuiltinType) -> bool {
        matches!(self, TypeHandle::Builtin(b) if *b == builtin)
    }

    /// Member access on the type itself.
    ///
    /// Class methods are bound to this type, while instance and static methods
    /// come back as defined. Built-in types expose no methods.
    pub fn method(&self, name: &str) -> Option<Callable> {
        let class = self.as_class()?;
        Some(class.lookup(name)?.bind(self, None))
    }

    /// Construct an instance of a user class, running its initializer.
    ///
    /// Built-in types have no constructor in this model.
    pub fn instantiate(&self, args: &[Value]) -> Result<Value, CallError> {
        match self {
            TypeHandle::Class(class) => ClassDef::instantiate(class, args),
            TypeHandle::Builtin(_) => Err(crate::error::ContractMisuseError::NotInvokable {
                type_name: format!("Type[{}]", self.name()),
            }
            .into()),
        }
    }
}

impl From<BuiltinType> for TypeHandle {
    fn from(builtin: BuiltinType) -> Self {
        TypeHandle::Builtin(builtin)
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeHandle::Builtin(a), TypeHandle::Builtin(b)) => a == b,
            (TypeHandle::Class(a), TypeHandle::Class(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for TypeHandle {}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHandle::Builtin(builtin) => write!(f, "Builtin({})", builtin.name()),
            TypeHandle::Class(class) => write!(f, "Class({})", class.name()),
        }
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
