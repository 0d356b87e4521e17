//! User class definitions.
//!
//! A class is assembled with a [`ClassBuilder`] into an unsealed [`ClassDef`],
//! which is where class-wide contracts are installed. Sealing turns the
//! definition into an immutable [`TypeHandle`] that instances point at.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::callable::{BoundMethod, Callable};
use crate::error::{CallError, ContractMisuseError};
use crate::handle::{BuiltinType, TypeHandle};
use crate::value::{Instance, Value};

/// Name of the method run by [`TypeHandle::instantiate`].
pub const INITIALIZER: &str = "__init__";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    /// Receives the instance as its first positional argument.
    Instance,
    /// Receives the class it was accessed through as its first positional
    /// argument, whether reached from an instance or from the type.
    Class,
    /// Called as-is, with no receiver.
    Static,
}

#[derive(Clone, Debug)]
pub struct MethodEntry {
    pub kind: MethodKind,
    pub callable: Callable,
}

impl MethodEntry {
    /// Member access through `class`, and through `instance` when present.
    ///
    /// Instance methods reached through the type itself stay unbound.
    pub(crate) fn bind(self, class: &TypeHandle, instance: Option<&Instance>) -> Callable {
        match (self.kind, instance) {
            (MethodKind::Instance, Some(this)) => {
                Callable::new(BoundMethod::new(Value::Object(this.clone()), self.callable))
            }
            (MethodKind::Class, _) => {
                Callable::new(BoundMethod::new(Value::Type(class.clone()), self.callable))
            }
            (MethodKind::Instance, None) | (MethodKind::Static, _) => self.callable,
        }
    }
}

/// Builder for [`ClassDef`].
pub struct ClassBuilder {
    name: String,
    base: Option<TypeHandle>,
    methods: BTreeMap<String, MethodEntry>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            methods: BTreeMap::new(),
        }
    }

    pub fn extends(mut self, base: TypeHandle) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an instance method under the callable's own name.
    ///
    /// The first positional parameter receives the instance and is hidden
    /// from the bound signature. A callable without one is accepted here but
    /// every call through an instance fails with
    /// [`ContractMisuseError::Arity`], since the receiver is one argument
    /// more than it takes.
    pub fn method(self, callable: Callable) -> Self {
        self.entry(MethodKind::Instance, callable)
    }

    /// Add a class method. Like [`method`](Self::method), but the first
    /// positional parameter receives the class instead of an instance.
    pub fn class_method(self, callable: Callable) -> Self {
        self.entry(MethodKind::Class, callable)
    }

    pub fn static_method(self, callable: Callable) -> Self {
        self.entry(MethodKind::Static, callable)
    }

    /// Add the initializer. Its first parameter receives the new instance.
    pub fn initializer(mut self, callable: Callable) -> Self {
        self.methods.insert(
            INITIALIZER.to_string(),
            MethodEntry {
                kind: MethodKind::Instance,
                callable,
            },
        );
        self
    }

    fn entry(mut self, kind: MethodKind, callable: Callable) -> Self {
        self.methods
            .insert(callable.name().to_string(), MethodEntry { kind, callable });
        self
    }

    pub fn build(self) -> ClassDef {
        ClassDef {
            name: self.name,
            base: self
                .base
                .unwrap_or(TypeHandle::Builtin(BuiltinType::Object)),
            methods: self.methods,
            contracts_applied: false,
        }
    }
}

/// An unsealed class definition.
#[derive(Debug)]
pub struct ClassDef {
    name: String,
    base: TypeHandle,
    methods: BTreeMap<String, MethodEntry>,
    contracts_applied: bool,
}

impl ClassDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> TypeHandle {
        self.base.clone()
    }

    /// Methods defined on this class itself, in name order.
    pub fn methods(&self) -> impl Iterator<Item = (&str, &MethodEntry)> {
        self.methods.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Resolve a method on this class or the nearest base defining it.
    pub fn lookup(&self, name: &str) -> Option<MethodEntry> {
        if let Some(entry) = self.methods.get(name) {
            return Some(entry.clone());
        }
        let mut current = self.base.as_class().cloned();
        while let Some(class) = current {
            if let Some(entry) = class.methods.get(name) {
                return Some(entry.clone());
            }
            current = class.base.as_class().cloned();
        }
        None
    }

    pub fn contracts_applied(&self) -> bool {
        self.contracts_applied
    }

    pub(crate) fn replace_method(&mut self, name: &str, callable: Callable) {
        if let Some(entry) = self.methods.get_mut(name) {
            entry.callable = callable;
        }
    }

    pub(crate) fn mark_contracts_applied(&mut self) {
        self.contracts_applied = true;
    }

    /// Freeze the definition into a type.
    pub fn seal(self) -> TypeHandle {
        TypeHandle::Class(Arc::new(self))
    }

    pub(crate) fn instantiate(class: &Arc<ClassDef>, args: &[Value]) -> Result<Value, CallError> {
        let instance = Instance::new(class.clone());
        match instance.method(INITIALIZER) {
            Some(init) => {
                init.call(args)?;
            }
            None if !args.is_empty() => {
                return Err(ContractMisuseError::Arity {
                    function: format!("{}.{INITIALIZER}", class.name),
                    expected: "0".to_string(),
                    given: args.len(),
                }
                .into());
            }
            None => {}
        }
        Ok(Value::Object(instance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Signature;
    use crate::error::ContractError;

    fn point() -> TypeHandle {
        ClassBuilder::new("Point")
            .initializer(Callable::native(
                INITIALIZER,
                Signature::new().untyped("self").untyped("x"),
                |args| {
                    if let Some(this) = args[0].as_instance() {
                        this.set("x", args[1].clone());
                    }
                    Ok(Value::None)
                },
            ))
            .method(Callable::native(
                "x",
                Signature::new().untyped("self"),
                |args| {
                    Ok(args[0]
                        .as_instance()
                        .and_then(|this| this.get("x"))
                        .unwrap_or(Value::None))
                },
            ))
            .static_method(Callable::native(
                "origin",
                Signature::new(),
                |_| Ok(Value::tuple([Value::Int(0), Value::Int(0)])),
            ))
            .class_method(Callable::native(
                "at",
                Signature::new().untyped("cls").untyped("x"),
                |args| match args[0].as_type() {
                    Some(class) => class.instantiate(&args[1..]),
                    None => Ok(Value::None),
                },
            ))
            .build()
            .seal()
    }

    #[test]
    fn instantiate_runs_the_initializer() {
        let p = point().instantiate(&[Value::Int(3)]).unwrap();
        let x = p.as_instance().unwrap().method("x").unwrap();
        assert_eq!(x.call(&[]).unwrap(), Value::Int(3));
    }

    #[test]
    fn static_methods_are_returned_unbound() {
        let p = point().instantiate(&[Value::Int(3)]).unwrap();
        let origin = p.as_instance().unwrap().method("origin").unwrap();
        assert_eq!(
            origin.call(&[]).unwrap(),
            Value::tuple([Value::Int(0), Value::Int(0)])
        );
    }

    #[test]
    fn class_methods_receive_the_class_from_type_and_instance() {
        let point = point();
        let at = point.method("at").unwrap();
        assert_eq!(at.signature().positional().count(), 1);

        let p = at.call(&[Value::Int(5)]).unwrap();
        assert_eq!(p.type_handle(), point);
        assert_eq!(p.as_instance().unwrap().get("x"), Some(Value::Int(5)));

        let via_instance = p.as_instance().unwrap().method("at").unwrap();
        let q = via_instance.call(&[Value::Int(6)]).unwrap();
        assert_eq!(q.type_handle(), point);
    }

    #[test]
    fn inherited_class_methods_bind_the_subclass() {
        let derived = ClassBuilder::new("Point3").extends(point()).build().seal();
        let made = derived.method("at").unwrap().call(&[Value::Int(1)]).unwrap();
        assert_eq!(made.type_handle(), derived);
    }

    #[test]
    fn type_level_access_leaves_instance_methods_unbound() {
        let point = point();
        let x = point.method("x").unwrap();
        let p = point.instantiate(&[Value::Int(9)]).unwrap();
        assert_eq!(x.call(&[p]).unwrap(), Value::Int(9));
        assert!(point.method("missing").is_none());
        assert!(TypeHandle::from(BuiltinType::Int).method("x").is_none());
    }

    #[test]
    fn instance_method_without_receiver_parameter_fails_on_call() {
        let class = ClassBuilder::new("Clock")
            .method(Callable::native("now", Signature::new(), |_| Ok(Value::Int(0))))
            .build()
            .seal();
        let clock = class.instantiate(&[]).unwrap();
        let now = clock.as_instance().unwrap().method("now").unwrap();

        let err = now.call(&[]).unwrap_err();
        assert!(matches!(
            err.as_contract(),
            Some(ContractError::Misuse(ContractMisuseError::Arity { function, given: 1, .. }))
                if function == "now"
        ));
    }

    #[test]
    fn methods_are_inherited_and_overridable() {
        let base = point();
        let derived = ClassBuilder::new("Point3")
            .extends(base)
            .static_method(Callable::native("origin", Signature::new(), |_| {
                Ok(Value::tuple([Value::Int(0), Value::Int(0), Value::Int(0)]))
            }))
            .build();

        assert!(derived.lookup("x").is_some());
        let origin = derived.lookup("origin").unwrap();
        assert_eq!(
            origin.callable.call(&[]).unwrap(),
            Value::tuple([Value::Int(0), Value::Int(0), Value::Int(0)])
        );
        assert!(derived.lookup("missing").is_none());

        let p = derived.seal().instantiate(&[Value::Int(1)]).unwrap();
        assert_eq!(p.as_instance().unwrap().get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn classes_without_initializer_take_no_arguments() {
        let empty = ClassBuilder::new("Empty").build().seal();
        assert!(empty.instantiate(&[]).is_ok());
        assert!(empty.instantiate(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn new_definitions_have_no_contracts() {
        let def = ClassBuilder::new("Plain").build();
        assert!(!def.contracts_applied());
        assert_eq!(def.base(), TypeHandle::Builtin(BuiltinType::Object));
    }
}
