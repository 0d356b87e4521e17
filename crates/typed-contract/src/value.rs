//! Host value model.
//!
//! Values are dynamically typed; a declared type only constrains them once a
//! contract checks it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::callable::Callable;
use crate::class::ClassDef;
use crate::handle::{BuiltinType, TypeHandle};

/// A dynamically typed host value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The absence-of-value sentinel.
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Variable-length sequence.
    List(Vec<Value>),
    /// Fixed-arity ordered container.
    Tuple(Vec<Value>),
    /// Mapping in insertion order. Keys are arbitrary values.
    Dict(Vec<(Value, Value)>),
    /// A value that denotes a type.
    Type(TypeHandle),
    Object(Instance),
    Callable(Callable),
}

impl Value {
    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn dict(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Dict(entries.into_iter().collect())
    }

    /// The nominal type this value is a direct instance of.
    pub fn type_handle(&self) -> TypeHandle {
        let builtin = match self {
            Value::None => BuiltinType::NoneType,
            Value::Bool(_) => BuiltinType::Bool,
            Value::Int(_) => BuiltinType::Int,
            Value::Float(_) => BuiltinType::Float,
            Value::Str(_) => BuiltinType::String,
            Value::List(_) => BuiltinType::List,
            Value::Tuple(_) => BuiltinType::Tuple,
            Value::Dict(_) => BuiltinType::Dict,
            Value::Type(_) => BuiltinType::Type,
            Value::Callable(_) => BuiltinType::Function,
            Value::Object(instance) => return instance.class(),
        };
        TypeHandle::Builtin(builtin)
    }

    pub fn type_name(&self) -> String {
        self.type_handle().name().to_string()
    }

    /// Instance check against a nominal type, honouring inheritance.
    pub fn is_instance_of(&self, ty: &TypeHandle) -> bool {
        self.type_handle().is_subtype_of(ty)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_invokable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeHandle> {
        match self {
            Value::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<TypeHandle> for Value {
    fn from(ty: TypeHandle) -> Self {
        Value::Type(ty)
    }
}

impl From<Callable> for Value {
    fn from(callable: Callable) -> Self {
        Value::Callable(callable)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Object(instance)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Dict(
                map.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// An object of a sealed user class.
///
/// Clones share the same object; fields are interior-mutable so initializers
/// and methods can populate them through a shared receiver.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceData>,
}

struct InstanceData {
    class: Arc<ClassDef>,
    fields: RwLock<BTreeMap<String, Value>>,
}

impl Instance {
    pub(crate) fn new(class: Arc<ClassDef>) -> Self {
        Self {
            inner: Arc::new(InstanceData {
                class,
                fields: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    pub fn class(&self) -> TypeHandle {
        TypeHandle::Class(self.inner.class.clone())
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        let fields = self
            .inner
            .fields
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        fields.get(field).cloned()
    }

    pub fn set(&self, field: impl Into<String>, value: Value) {
        let mut fields = self
            .inner
            .fields
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        fields.insert(field.into(), value);
    }

    /// Member access: look the method up along the class chain and bind it.
    ///
    /// Instance methods come back with this object as the receiver, class
    /// methods with this object's class, and static methods unbound.
    pub fn method(&self, name: &str) -> Option<Callable> {
        let entry = self.inner.class.lookup(name)?;
        Some(entry.bind(&self.class(), Some(self)))
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self.inner.class.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassBuilder;
    use serde_json::json;

    #[test]
    fn builtin_values_report_their_type_names() {
        assert_eq!(Value::None.type_name(), "None");
        assert_eq!(Value::from(3).type_name(), "Int");
        assert_eq!(Value::from("a").type_name(), "String");
        assert_eq!(Value::tuple([]).type_name(), "Tuple");
        assert_eq!(Value::from(TypeHandle::from(BuiltinType::Int)).type_name(), "Type");
    }

    #[test]
    fn bool_values_are_int_instances() {
        assert!(Value::from(true).is_instance_of(&BuiltinType::Int.into()));
        assert!(!Value::from(1).is_instance_of(&BuiltinType::Bool.into()));
        assert!(!Value::from(1).is_instance_of(&BuiltinType::Float.into()));
    }

    #[test]
    fn accessors_only_unwrap_their_own_variant() {
        assert_eq!(Value::Float(1.5).as_float(), Some(1.5));
        assert_eq!(Value::Int(1).as_float(), None);
        let int_type = TypeHandle::from(BuiltinType::Int);
        assert_eq!(Value::from(int_type.clone()).as_type(), Some(&int_type));
        assert!(Value::from("Int").as_type().is_none());
    }

    #[test]
    fn json_conversion_maps_containers() {
        let value = Value::from(json!({"ids": [1, 2], "name": null, "ratio": 0.5}));
        let Value::Dict(entries) = value else {
            panic!("expected a dict");
        };
        assert_eq!(entries.len(), 3);
        assert!(entries.contains(&(
            Value::from("ids"),
            Value::list([Value::Int(1), Value::Int(2)])
        )));
        assert!(entries.contains(&(Value::from("name"), Value::None)));
        assert!(entries.contains(&(Value::from("ratio"), Value::Float(0.5))));
    }

    #[test]
    fn instances_share_fields_between_clones() {
        let class = ClassBuilder::new("Point").build().seal();
        let point = class.instantiate(&[]).unwrap();
        let instance = point.as_instance().unwrap().clone();
        instance.set("x", Value::Int(4));
        assert_eq!(point.as_instance().unwrap().get("x"), Some(Value::Int(4)));
        assert_eq!(point.type_name(), "Point");
    }
}
