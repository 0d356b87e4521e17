//! Invokable host values.
//!
//! Everything callable in the host model implements [`Invoke`] and is shared
//! through a [`Callable`] handle. A callable exposes its formal parameters and
//! their declared annotations, which is what contracts are built from.

use std::fmt;
use std::sync::Arc;

use crate::contract::CallContract;
use crate::error::{CallError, ContractMisuseError};
use crate::expr::TypeExpr;
use crate::value::Value;

/// How a formal parameter receives arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// Bound to exactly one positional argument.
    Positional,
    /// Collects every remaining positional argument.
    Variadic,
}

/// One formal parameter of a callable.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    /// Filled in by the callable itself when the argument is omitted.
    pub default: Option<Value>,
    /// Declared type, if any.
    pub annotation: Option<TypeExpr>,
}

impl Param {
    pub fn positional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Positional,
            default: None,
            annotation: None,
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.kind == ParamKind::Variadic
    }
}

/// Formal parameter list plus declared return type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
    returns: Option<TypeExpr>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an annotated positional parameter.
    pub fn param(mut self, name: impl Into<String>, annotation: impl Into<TypeExpr>) -> Self {
        let mut param = Param::positional(name);
        param.annotation = Some(annotation.into());
        self.params.push(param);
        self
    }

    /// Add a positional parameter without a declared type.
    pub fn untyped(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::positional(name));
        self
    }

    /// Add a positional parameter with a default value.
    pub fn defaulted(
        mut self,
        name: impl Into<String>,
        annotation: Option<TypeExpr>,
        default: Value,
    ) -> Self {
        let mut param = Param::positional(name);
        param.annotation = annotation;
        param.default = Some(default);
        self.params.push(param);
        self
    }

    /// Add a catch-all positional collector.
    pub fn variadic(mut self, name: impl Into<String>) -> Self {
        let mut param = Param::positional(name);
        param.kind = ParamKind::Variadic;
        self.params.push(param);
        self
    }

    pub fn returns(mut self, annotation: impl Into<TypeExpr>) -> Self {
        self.returns = Some(annotation.into());
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn return_annotation(&self) -> Option<&TypeExpr> {
        self.returns.as_ref()
    }

    /// Parameters bound one-to-one with positional arguments.
    pub fn positional(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| !p.is_variadic())
    }

    pub fn has_variadic(&self) -> bool {
        self.params.iter().any(Param::is_variadic)
    }

    /// Number of positional parameters lacking a default.
    pub fn required(&self) -> usize {
        self.positional().filter(|p| p.default.is_none()).count()
    }

    /// The call shape left after the first positional parameter is supplied.
    pub fn without_receiver(&self) -> Signature {
        let mut params = self.params.clone();
        if let Some(idx) = params.iter().position(|p| !p.is_variadic()) {
            params.remove(idx);
        }
        Signature {
            params,
            returns: self.returns.clone(),
        }
    }

    /// Reject argument counts the parameter list cannot bind.
    pub fn check_arity(&self, function: &str, given: usize) -> Result<(), ContractMisuseError> {
        check_arity(function, given, self.required(), self.positional().count(), self.has_variadic())
    }
}

/// Shared arity rule for callables and contracts.
pub(crate) fn check_arity(
    function: &str,
    given: usize,
    required: usize,
    declared: usize,
    variadic: bool,
) -> Result<(), ContractMisuseError> {
    if given >= required && (variadic || given <= declared) {
        return Ok(());
    }
    let expected = if variadic {
        format!("at least {required}")
    } else if required == declared {
        required.to_string()
    } else {
        format!("{required} to {declared}")
    };
    Err(ContractMisuseError::Arity {
        function: function.to_string(),
        expected,
        given,
    })
}

/// Anything the host can call.
pub trait Invoke: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Formal parameters as seen by a caller.
    fn signature(&self) -> &Signature;

    /// Call with positional arguments.
    fn call(&self, args: &[Value]) -> Result<Value, CallError>;

    /// The contract enforced around this callable, if any.
    fn contract(&self) -> Option<&Arc<CallContract>> {
        None
    }
}

/// Shared handle to an invokable value.
#[derive(Clone)]
pub struct Callable(Arc<dyn Invoke>);

impl Callable {
    pub fn new(invoke: impl Invoke + 'static) -> Self {
        Callable(Arc::new(invoke))
    }

    /// Build a callable from a Rust closure.
    pub fn native<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Callable::new(NativeFunction::new(name, signature, body))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn signature(&self) -> &Signature {
        self.0.signature()
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        self.0.call(args)
    }

    pub fn contract(&self) -> Option<&Arc<CallContract>> {
        self.0.contract()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({})", self.name())
    }
}

type NativeBody = dyn Fn(&[Value]) -> Result<Value, CallError> + Send + Sync;

/// A callable implemented by a Rust closure.
///
/// Omitted trailing arguments are filled from parameter defaults before the
/// closure runs, so the closure always sees one value per positional parameter
/// (plus any variadic extras).
pub struct NativeFunction {
    name: String,
    signature: Signature,
    body: Box<NativeBody>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature,
            body: Box::new(body),
        }
    }
}

impl Invoke for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        self.signature.check_arity(&self.name, args.len())?;

        let mut bound = args.to_vec();
        for param in self.signature.positional().skip(args.len()) {
            match &param.default {
                Some(default) => bound.push(default.clone()),
                None => break,
            }
        }
        (self.body)(&bound)
    }
}

/// A method with its receiver already supplied.
///
/// The remaining parameters keep their names and order; the receiver is
/// prepended on every call, so any contract on the method still sees the
/// full argument list.
pub struct BoundMethod {
    receiver: Value,
    method: Callable,
    signature: Signature,
}

impl BoundMethod {
    pub fn new(receiver: Value, method: Callable) -> Self {
        let signature = method.signature().without_receiver();
        Self {
            receiver,
            method,
            signature,
        }
    }

    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    pub fn method(&self) -> &Callable {
        &self.method
    }
}

impl Invoke for BoundMethod {
    fn name(&self) -> &str {
        self.method.name()
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(self.receiver.clone());
        full.extend_from_slice(args);
        self.method.call(&full)
    }

    fn contract(&self) -> Option<&Arc<CallContract>> {
        self.method.contract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContractError;

    fn greet() -> Callable {
        Callable::native(
            "greet",
            Signature::new()
                .param("name", "String")
                .defaulted("punct", None, Value::from("!")),
            |args| {
                let name = args[0].as_str().unwrap_or_default();
                let punct = args[1].as_str().unwrap_or_default();
                Ok(Value::from(format!("hello {name}{punct}")))
            },
        )
    }

    #[test]
    fn native_function_fills_trailing_defaults() {
        let f = greet();
        assert_eq!(f.call(&["ada".into()]).unwrap(), Value::from("hello ada!"));
        assert_eq!(
            f.call(&["ada".into(), "?".into()]).unwrap(),
            Value::from("hello ada?")
        );
    }

    #[test]
    fn native_function_rejects_bad_arity() {
        let err = greet().call(&[]).unwrap_err();
        assert!(matches!(
            err.as_contract(),
            Some(ContractError::Misuse(ContractMisuseError::Arity { given: 0, .. }))
        ));
        assert!(greet().call(&[1.into(), 2.into(), 3.into()]).is_err());
    }

    #[test]
    fn variadic_signature_accepts_extra_arguments() {
        let sig = Signature::new().untyped("first").variadic("rest");
        assert!(sig.check_arity("f", 5).is_ok());
        assert!(sig.check_arity("f", 0).is_err());
        assert_eq!(sig.positional().count(), 1);
    }

    #[test]
    fn arity_message_describes_range() {
        let err = Signature::new()
            .untyped("a")
            .defaulted("b", None, Value::None)
            .check_arity("f", 3)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "function 'f' takes 1 to 2 positional argument(s) but 3 were given"
        );
    }

    #[test]
    fn bound_method_prepends_receiver_and_hides_it_from_signature() {
        let method = Callable::native(
            "describe",
            Signature::new().untyped("self").param("suffix", "String"),
            |args| Ok(Value::list(args.to_vec())),
        );
        let bound_method = BoundMethod::new(Value::Int(7), method.clone());
        assert_eq!(bound_method.receiver(), &Value::Int(7));
        assert!(bound_method.method().ptr_eq(&method));
        let bound = Callable::new(bound_method);

        let names: Vec<_> = bound.signature().params().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["suffix"]);
        assert_eq!(
            bound.call(&["x".into()]).unwrap(),
            Value::list([Value::Int(7), Value::from("x")])
        );
    }

    #[test]
    fn callables_compare_by_identity() {
        let a = greet();
        let b = greet();
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
        assert_eq!(format!("{a:?}"), "Callable(greet)");
    }
}
