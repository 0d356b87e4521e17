//! Contract-enforcing callable wrapper.
//!
//! ## Invocation
//!
//! 1. Reject argument counts the contract cannot bind.
//! 2. Check each argument against its parameter descriptor, in order; the
//!    first failure aborts the call before the target runs.
//! 3. Call the target with the original arguments. Target failures pass
//!    through untouched.
//! 4. If the contract returns a `Callable[...]` and the result is invokable,
//!    wrap the result in a freshly derived contract.
//! 5. Otherwise check the result against the return descriptor.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::callable::{Callable, Invoke, Signature};
use crate::contract::CallContract;
use crate::descriptor::Descriptor;
use crate::error::{CallError, ContractError, ContractMisuseError};
use crate::matcher::Matcher;
use crate::value::Value;

/// A callable enforcing a [`CallContract`] around a target.
///
/// Keeps the target's name and call shape, so it can stand wherever the
/// target could.
pub struct ContractedCallable {
    target: Callable,
    contract: Arc<CallContract>,
    matcher: Matcher,
}

impl ContractedCallable {
    /// Wrap an invokable value under the default matcher.
    pub fn wrap(target: &Value, contract: CallContract) -> Result<Self, ContractMisuseError> {
        Self::wrap_with_matcher(target, contract, Matcher::default())
    }

    pub fn wrap_with_matcher(
        target: &Value,
        contract: CallContract,
        matcher: Matcher,
    ) -> Result<Self, ContractMisuseError> {
        let Value::Callable(callable) = target else {
            return Err(ContractMisuseError::NotInvokable {
                type_name: target.type_name(),
            });
        };
        Ok(Self::new(callable.clone(), Arc::new(contract), matcher))
    }

    pub(crate) fn new(target: Callable, contract: Arc<CallContract>, matcher: Matcher) -> Self {
        debug!(
            function = target.name(),
            params = contract.params().len(),
            returns = %contract.returns(),
            "Wrapping callable with contract"
        );
        Self {
            target,
            contract,
            matcher,
        }
    }

    pub fn target(&self) -> &Callable {
        &self.target
    }

    pub fn call_contract(&self) -> &CallContract {
        &self.contract
    }

    pub fn into_callable(self) -> Callable {
        Callable::new(self)
    }

    pub fn into_value(self) -> Value {
        Value::Callable(self.into_callable())
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CallError> {
        let function = self.target.name();
        self.contract.check_arity(function, args.len())?;

        for (param, arg) in self.contract.params().iter().zip(args) {
            if !self.matcher.matches(arg, &param.descriptor)? {
                warn!(
                    function,
                    parameter = %param.name,
                    expected = %param.descriptor,
                    actual = %arg.type_name(),
                    "Argument rejected by contract"
                );
                return Err(ContractError::ArgumentType {
                    function: function.to_string(),
                    parameter: param.name.clone(),
                    expected: param.descriptor.to_string(),
                    actual: arg.type_name(),
                }
                .into());
            }
        }

        let result = self.target.call(args)?;

        if let Some(wrapped) = self.wrap_returned(&result) {
            return Ok(wrapped);
        }

        if !self.matcher.matches(&result, self.contract.returns())? {
            warn!(
                function,
                expected = %self.contract.returns(),
                actual = %result.type_name(),
                "Return value rejected by contract"
            );
            return Err(ContractError::ReturnType {
                function: function.to_string(),
                expected: self.contract.returns().to_string(),
            }
            .into());
        }
        Ok(result)
    }

    /// A fresh contracted wrapper for a callable returned under `Callable[...]`.
    fn wrap_returned(&self, result: &Value) -> Option<Value> {
        if !self.contract.auto_wrap_returned_callables() {
            return None;
        }
        if !matches!(self.contract.returns(), Descriptor::CallableSignature { .. }) {
            return None;
        }
        let Value::Callable(returned) = result else {
            return None;
        };
        let nested = self.contract.nested_for(returned.signature())?;
        debug!(
            function = self.target.name(),
            returned = returned.name(),
            params = nested.params().len(),
            "Deriving contract for returned callable"
        );
        Some(ContractedCallable::new(returned.clone(), Arc::new(nested), self.matcher).into_value())
    }
}

impl Invoke for ContractedCallable {
    fn name(&self) -> &str {
        self.target.name()
    }

    fn signature(&self) -> &Signature {
        self.target.signature()
    }

    fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        self.invoke(args)
    }

    fn contract(&self) -> Option<&Arc<CallContract>> {
        Some(&self.contract)
    }
}
