//! Class-wide contract installation.

use std::sync::Arc;

use tracing::debug;

use crate::builder::DescriptorBuilder;
use crate::class::{ClassDef, INITIALIZER};
use crate::config::ContractConfig;
use crate::error::{ContractError, ContractMisuseError};
use crate::matcher::Matcher;
use crate::scope::TypeScope;
use crate::wrapper::ContractedCallable;

/// Wraps every exposed method of a class definition in a contract built from
/// that method's own annotations.
///
/// Exposed means the name does not start with `__`, plus the initializer.
/// A definition accepts contracts once; applying again is rejected.
pub struct ClassContractApplier<'a> {
    builder: DescriptorBuilder<'a>,
    matcher: Matcher,
    auto_wrap: bool,
}

impl<'a> ClassContractApplier<'a> {
    pub fn new(scope: &'a TypeScope) -> Self {
        Self::with_config(scope, &ContractConfig::default())
    }

    pub fn with_config(scope: &'a TypeScope, config: &ContractConfig) -> Self {
        Self {
            builder: DescriptorBuilder::new(scope),
            matcher: config.matcher(),
            auto_wrap: config.auto_wrap_returned_callables,
        }
    }

    pub fn is_exposed(name: &str) -> bool {
        !name.starts_with("__") || name == INITIALIZER
    }

    /// Install contracts on `class`, returning how many methods were wrapped.
    ///
    /// Every contract is built before any method is replaced, so a build
    /// failure leaves the definition untouched.
    pub fn apply(&self, class: &mut ClassDef) -> Result<usize, ContractError> {
        if class.contracts_applied() {
            return Err(ContractMisuseError::AlreadyContracted {
                class: class.name().to_string(),
            }
            .into());
        }

        let mut wrapped = Vec::new();
        for (name, entry) in class.methods() {
            if !Self::is_exposed(name) {
                continue;
            }
            let contract = self
                .builder
                .contract(entry.callable.signature())?
                .with_auto_wrap(self.auto_wrap);
            let callable =
                ContractedCallable::new(entry.callable.clone(), Arc::new(contract), self.matcher)
                    .into_callable();
            wrapped.push((name.to_string(), callable));
        }

        let count = wrapped.len();
        for (name, callable) in wrapped {
            class.replace_method(&name, callable);
        }
        class.mark_contracts_applied();
        debug!(class = class.name(), methods = count, "Applied contracts to class");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::{Callable, Signature};
    use crate::class::ClassBuilder;
    use crate::error::DescriptorBuildError;
    use crate::value::Value;

    fn echo(name: &str) -> Callable {
        Callable::native(
            name,
            Signature::new().untyped("self").param("v", "Int"),
            |args| Ok(args[1].clone()),
        )
    }

    #[test]
    fn exposed_names_exclude_dunders_except_initializer() {
        assert!(ClassContractApplier::is_exposed("save"));
        assert!(ClassContractApplier::is_exposed("_private"));
        assert!(ClassContractApplier::is_exposed("__init__"));
        assert!(!ClassContractApplier::is_exposed("__repr__"));
    }

    #[test]
    fn wraps_exposed_methods_only() {
        let scope = TypeScope::default();
        let mut def = ClassBuilder::new("Box")
            .method(echo("put"))
            .method(echo("__repr__"))
            .initializer(echo(INITIALIZER))
            .build();

        let count = ClassContractApplier::new(&scope).apply(&mut def).unwrap();
        assert_eq!(count, 2);
        assert!(def.lookup("put").unwrap().callable.contract().is_some());
        assert!(def.lookup(INITIALIZER).unwrap().callable.contract().is_some());
        assert!(def.lookup("__repr__").unwrap().callable.contract().is_none());
        assert!(def.contracts_applied());
    }

    #[test]
    fn second_application_is_rejected() {
        let scope = TypeScope::default();
        let applier = ClassContractApplier::new(&scope);
        let mut def = ClassBuilder::new("Box").method(echo("put")).build();

        applier.apply(&mut def).unwrap();
        let err = applier.apply(&mut def).unwrap_err();
        assert_eq!(
            err,
            ContractError::Misuse(ContractMisuseError::AlreadyContracted {
                class: "Box".into()
            })
        );
    }

    #[test]
    fn build_failure_leaves_definition_untouched() {
        let scope = TypeScope::default();
        let broken = Callable::native(
            "broken",
            Signature::new().untyped("self").param("v", "Nope"),
            |_| Ok(Value::None),
        );
        let mut def = ClassBuilder::new("Box")
            .method(echo("put"))
            .method(broken)
            .build();

        let err = ClassContractApplier::new(&scope).apply(&mut def).unwrap_err();
        assert_eq!(
            err,
            ContractError::Build(DescriptorBuildError::UnknownName("Nope".into()))
        );
        assert!(!def.contracts_applied());
        assert!(def.lookup("put").unwrap().callable.contract().is_none());
    }

    #[test]
    fn class_methods_are_contracted_after_class_binding() {
        let scope = TypeScope::default();
        let mut def = ClassBuilder::new("Box")
            .class_method(Callable::native(
                "sized",
                Signature::new().untyped("cls").param("n", "Int"),
                |args| Ok(args[1].clone()),
            ))
            .build();
        assert_eq!(ClassContractApplier::new(&scope).apply(&mut def).unwrap(), 1);

        let class = def.seal();
        let sized = class.method("sized").unwrap();
        assert_eq!(sized.call(&[Value::Int(3)]).unwrap(), Value::Int(3));
        let err = sized.call(&["three".into()]).unwrap_err();
        assert_eq!(
            err.as_contract(),
            Some(&ContractError::ArgumentType {
                function: "sized".into(),
                parameter: "n".into(),
                expected: "Int".into(),
                actual: "String".into(),
            })
        );

        let instance = class.instantiate(&[]).unwrap();
        let via_instance = instance.as_instance().unwrap().method("sized").unwrap();
        assert!(via_instance.call(&["three".into()]).is_err());
    }

    #[test]
    fn bound_methods_keep_the_contract_after_receiver_binding() {
        let scope = TypeScope::default();
        let mut def = ClassBuilder::new("Box").method(echo("put")).build();
        ClassContractApplier::new(&scope).apply(&mut def).unwrap();

        let instance = def.seal().instantiate(&[]).unwrap();
        let put = instance.as_instance().unwrap().method("put").unwrap();
        assert_eq!(put.call(&[Value::Int(4)]).unwrap(), Value::Int(4));
        assert!(put.call(&["four".into()]).is_err());
        assert_eq!(put.contract().map(|c| c.params()[1].name.as_str()), Some("v"));
    }
}
