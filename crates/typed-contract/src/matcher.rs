//! Value/descriptor satisfaction.
//!
//! ## Dispatch order
//!
//! 1. `Any` → true
//! 2. `NoReturn` → misuse error
//! 3. `None` → value is `None`
//! 4. `Type[X]` → value denotes a type, then the configured [`TypeReferenceRule`]
//! 5. type variable → its bound, or true
//! 6. `type` → true
//! 7. `Union` → any member, in declared order
//! 8. `List` → list whose every element matches
//! 9. `Tuple` → tuple of equal arity matching position by position
//! 10. `Dict` → mapping whose every key and every value match
//! 11. `Callable` → value is invokable; the signature is enforced on call
//! 12. forward reference → true
//! 13. nominal → instance check, subclasses included
//!
//! Matching is pure and terminates on every finite value.

use tracing::trace;

use crate::config::TypeReferenceRule;
use crate::descriptor::Descriptor;
use crate::error::ContractMisuseError;
use crate::handle::{BuiltinType, TypeHandle};
use crate::value::Value;

/// Decides whether a value satisfies a descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Matcher {
    rule: TypeReferenceRule,
}

impl Matcher {
    pub fn new(rule: TypeReferenceRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> TypeReferenceRule {
        self.rule
    }

    pub fn matches(&self, value: &Value, descriptor: &Descriptor) -> Result<bool, ContractMisuseError> {
        let matched = self.decide(value, descriptor)?;
        trace!(
            descriptor = %descriptor,
            value_type = %value.type_name(),
            matched,
            "Matcher decision"
        );
        Ok(matched)
    }

    fn decide(&self, value: &Value, descriptor: &Descriptor) -> Result<bool, ContractMisuseError> {
        match descriptor {
            Descriptor::Any => Ok(true),
            Descriptor::NoReturn => Err(ContractMisuseError::NoReturnMatched),
            Descriptor::NoneType => Ok(value.is_none()),
            Descriptor::TypeReference(inner) => {
                let Value::Type(denoted) = value else {
                    return Ok(false);
                };
                match inner {
                    None => Ok(true),
                    Some(inner) => match self.rule {
                        TypeReferenceRule::Subtype => denotes(denoted, inner),
                        TypeReferenceRule::Legacy => self.matches(value, inner),
                    },
                }
            }
            Descriptor::BoundVariable { bound, .. } => match bound {
                Some(bound) => self.matches(value, bound),
                None => Ok(true),
            },
            Descriptor::Wildcard => Ok(true),
            Descriptor::Union(members) => {
                for member in members {
                    if self.matches(value, member)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Descriptor::List(element) => {
                let Value::List(items) = value else {
                    return Ok(false);
                };
                match element {
                    None => Ok(true),
                    Some(element) => self.all(items, element),
                }
            }
            Descriptor::Tuple(elements) => {
                let Value::Tuple(items) = value else {
                    return Ok(false);
                };
                if elements.is_empty() {
                    return Ok(true);
                }
                if items.len() != elements.len() {
                    return Ok(false);
                }
                for (item, element) in items.iter().zip(elements) {
                    if !self.matches(item, element)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Descriptor::Dict(entry) => {
                let Value::Dict(pairs) = value else {
                    return Ok(false);
                };
                let Some(entry) = entry else {
                    return Ok(true);
                };
                let (key, val) = &**entry;
                for (k, v) in pairs {
                    if !self.matches(k, key)? || !self.matches(v, val)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Descriptor::CallableSignature { .. } => Ok(value.is_invokable()),
            Descriptor::ForwardReference(_) => Ok(true),
            Descriptor::Nominal(ty) => Ok(value.is_instance_of(ty)),
        }
    }

    fn all(&self, items: &[Value], element: &Descriptor) -> Result<bool, ContractMisuseError> {
        for item in items {
            if !self.matches(item, element)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Whether the type `ty` itself satisfies `inner`, as a `Type[inner]` target.
fn denotes(ty: &TypeHandle, inner: &Descriptor) -> Result<bool, ContractMisuseError> {
    let builtin = |b: BuiltinType| ty.is_subtype_of(&TypeHandle::Builtin(b));
    Ok(match inner {
        Descriptor::Any | Descriptor::Wildcard | Descriptor::ForwardReference(_) => true,
        Descriptor::NoReturn => return Err(ContractMisuseError::NoReturnMatched),
        Descriptor::NoneType => ty.is_builtin(BuiltinType::NoneType),
        Descriptor::TypeReference(_) => ty.is_builtin(BuiltinType::Type),
        Descriptor::BoundVariable { bound, .. } => match bound {
            Some(bound) => denotes(ty, bound)?,
            None => true,
        },
        Descriptor::Union(members) => {
            for member in members {
                if denotes(ty, member)? {
                    return Ok(true);
                }
            }
            false
        }
        Descriptor::List(_) => builtin(BuiltinType::List),
        Descriptor::Tuple(_) => builtin(BuiltinType::Tuple),
        Descriptor::Dict(_) => builtin(BuiltinType::Dict),
        Descriptor::CallableSignature { .. } => builtin(BuiltinType::Function),
        Descriptor::Nominal(target) => ty.is_subtype_of(target),
    })
}

/// [`Matcher::matches`] under the default configuration.
pub fn matches(value: &Value, descriptor: &Descriptor) -> Result<bool, ContractMisuseError> {
    Matcher::default().matches(value, descriptor)
}
