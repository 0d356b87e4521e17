//! Call contracts: descriptors bound to a callable's formal parameters.

use crate::callable::{check_arity, Signature};
use crate::descriptor::Descriptor;
use crate::error::ContractMisuseError;

/// Declared type of one positional parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamContract {
    pub name: String,
    pub descriptor: Descriptor,
    /// The target fills this parameter itself when the argument is omitted.
    pub has_default: bool,
}

impl ParamContract {
    pub fn new(name: impl Into<String>, descriptor: Descriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
            has_default: false,
        }
    }
}

/// Ordered parameter descriptors plus a return descriptor.
///
/// Parameters are checked by position. Arguments beyond the declared list are
/// accepted unchecked only when the target has a variadic collector.
#[derive(Clone, Debug, PartialEq)]
pub struct CallContract {
    params: Vec<ParamContract>,
    returns: Descriptor,
    variadic: bool,
    auto_wrap_returned_callables: bool,
}

impl CallContract {
    pub fn new(params: Vec<ParamContract>, returns: Descriptor) -> Self {
        Self {
            params,
            returns,
            variadic: false,
            auto_wrap_returned_callables: true,
        }
    }

    pub fn with_variadic(mut self, variadic: bool) -> Self {
        self.variadic = variadic;
        self
    }

    pub fn with_auto_wrap(mut self, enabled: bool) -> Self {
        self.auto_wrap_returned_callables = enabled;
        self
    }

    pub fn params(&self) -> &[ParamContract] {
        &self.params
    }

    pub fn returns(&self) -> &Descriptor {
        &self.returns
    }

    pub fn accepts_variadic(&self) -> bool {
        self.variadic
    }

    pub fn auto_wrap_returned_callables(&self) -> bool {
        self.auto_wrap_returned_callables
    }

    /// Parameters that must be supplied by the caller.
    pub fn required(&self) -> usize {
        self.params.iter().filter(|p| !p.has_default).count()
    }

    pub fn check_arity(&self, function: &str, given: usize) -> Result<(), ContractMisuseError> {
        check_arity(function, given, self.required(), self.params.len(), self.variadic)
    }

    /// Contract for a callable returned under a `Callable[[...], R]` declaration.
    ///
    /// The returned callable's own parameter names are bound by position to the
    /// declared parameter descriptors; names past the declared list get `Any`
    /// and declared entries past the callable's parameters are dropped. Returns
    /// `None` unless the return descriptor is a callable signature.
    pub fn nested_for(&self, signature: &Signature) -> Option<CallContract> {
        let Descriptor::CallableSignature { params, returns } = &self.returns else {
            return None;
        };
        let bound = signature
            .positional()
            .enumerate()
            .map(|(idx, param)| ParamContract {
                name: param.name.clone(),
                descriptor: params.get(idx).cloned().unwrap_or(Descriptor::Any),
                has_default: param.default.is_some(),
            })
            .collect();
        Some(CallContract {
            params: bound,
            returns: returns.as_ref().clone(),
            variadic: signature.has_variadic(),
            auto_wrap_returned_callables: self.auto_wrap_returned_callables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::BuiltinType;
    use crate::value::Value;

    fn int() -> Descriptor {
        BuiltinType::Int.into()
    }

    fn adder_factory() -> CallContract {
        CallContract::new(
            vec![ParamContract::new("x", int())],
            Descriptor::callable(vec![int()], int()),
        )
    }

    #[test]
    fn nested_contract_binds_returned_parameter_names() {
        let inner = Signature::new().untyped("y");
        let nested = adder_factory().nested_for(&inner).unwrap();

        assert_eq!(nested.params(), &[ParamContract::new("y", int())]);
        assert_eq!(nested.returns(), &int());
        assert!(nested.auto_wrap_returned_callables());
    }

    #[test]
    fn nested_contract_pads_with_any_and_drops_surplus() {
        let wider = Signature::new().untyped("a").untyped("b");
        let nested = adder_factory().nested_for(&wider).unwrap();
        assert_eq!(nested.params()[0].descriptor, int());
        assert_eq!(nested.params()[1].descriptor, Descriptor::Any);

        let narrower = Signature::new().variadic("rest");
        let nested = adder_factory().nested_for(&narrower).unwrap();
        assert!(nested.params().is_empty());
        assert!(nested.accepts_variadic());
    }

    #[test]
    fn nested_contract_requires_callable_return() {
        let plain = CallContract::new(vec![], int());
        assert!(plain.nested_for(&Signature::new()).is_none());
    }

    #[test]
    fn arity_counts_defaults_and_variadics() {
        let mut optional = ParamContract::new("b", int());
        optional.has_default = true;
        let contract = CallContract::new(vec![ParamContract::new("a", int()), optional], int());

        assert_eq!(contract.required(), 1);
        assert!(contract.check_arity("f", 1).is_ok());
        assert!(contract.check_arity("f", 2).is_ok());
        assert!(contract.check_arity("f", 0).is_err());
        assert!(contract.check_arity("f", 3).is_err());
        assert!(contract.with_variadic(true).check_arity("f", 9).is_ok());
    }

    #[test]
    fn defaulted_parameters_stay_defaulted_in_nested_contracts() {
        let inner = Signature::new().defaulted("y", None, Value::Int(1));
        let nested = adder_factory().nested_for(&inner).unwrap();
        assert!(nested.params()[0].has_default);
        assert_eq!(nested.required(), 0);
    }
}
