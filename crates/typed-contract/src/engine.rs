//! Contract engine facade.
//!
//! Owns a [`ContractConfig`] and a [`TypeScope`] and ties the builder, the
//! matcher and the wrappers together under them.

use crate::applier::ClassContractApplier;
use crate::builder::DescriptorBuilder;
use crate::callable::{Callable, Signature};
use crate::class::ClassDef;
use crate::config::ContractConfig;
use crate::contract::CallContract;
use crate::descriptor::Descriptor;
use crate::error::{CallError, ContractError, ContractMisuseError, DescriptorBuildError};
use crate::expr::TypeExpr;
use crate::handle::TypeHandle;
use crate::scope::TypeScope;
use crate::value::Value;
use crate::wrapper::ContractedCallable;

pub struct ContractEngine {
    config: ContractConfig,
    scope: TypeScope,
}

impl ContractEngine {
    /// An engine resolving names against the built-in scope.
    pub fn new(config: ContractConfig) -> Self {
        Self::with_scope(config, TypeScope::default())
    }

    pub fn with_scope(config: ContractConfig, scope: TypeScope) -> Self {
        Self { config, scope }
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    pub fn scope(&self) -> &TypeScope {
        &self.scope
    }

    pub fn register_class(&mut self, class: TypeHandle) {
        self.scope.register_class(class);
    }

    pub fn declare_type_var(&mut self, name: impl Into<String>, bound: Option<TypeExpr>) {
        self.scope.declare_var(name, bound);
    }

    pub fn descriptor(&self, expr: &TypeExpr) -> Result<Descriptor, DescriptorBuildError> {
        DescriptorBuilder::new(&self.scope).build(expr)
    }

    pub fn parse_descriptor(&self, src: &str) -> Result<Descriptor, DescriptorBuildError> {
        DescriptorBuilder::new(&self.scope).parse(src)
    }

    /// Contract from a signature's own annotations, seeded from the config.
    pub fn contract_for(&self, signature: &Signature) -> Result<CallContract, DescriptorBuildError> {
        Ok(DescriptorBuilder::new(&self.scope)
            .contract(signature)?
            .with_auto_wrap(self.config.auto_wrap_returned_callables))
    }

    /// Wrap an invokable value using the annotations on its own signature.
    pub fn wrap(&self, target: &Value) -> Result<Callable, ContractError> {
        let Value::Callable(callable) = target else {
            return Err(ContractMisuseError::NotInvokable {
                type_name: target.type_name(),
            }
            .into());
        };
        let contract = self.contract_for(callable.signature())?;
        Ok(self.wrap_with(target, contract)?)
    }

    /// Wrap an invokable value under an explicit contract.
    pub fn wrap_with(
        &self,
        target: &Value,
        contract: CallContract,
    ) -> Result<Callable, ContractMisuseError> {
        Ok(ContractedCallable::wrap_with_matcher(target, contract, self.config.matcher())?
            .into_callable())
    }

    /// Define a contracted function from a Rust closure.
    pub fn function<F>(
        &self,
        name: impl Into<String>,
        signature: Signature,
        body: F,
    ) -> Result<Callable, ContractError>
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.wrap(&Value::Callable(Callable::native(name, signature, body)))
    }

    pub fn apply_to_class(&self, class: &mut ClassDef) -> Result<usize, ContractError> {
        ClassContractApplier::with_config(&self.scope, &self.config).apply(class)
    }

    pub fn matches(&self, value: &Value, descriptor: &Descriptor) -> Result<bool, ContractMisuseError> {
        self.config.matcher().matches(value, descriptor)
    }
}

impl Default for ContractEngine {
    fn default() -> Self {
        Self::new(ContractConfig::default())
    }
}
