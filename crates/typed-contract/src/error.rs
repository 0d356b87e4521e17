use std::error::Error as StdError;

use thiserror::Error;

/// Errors from parsing a textual type expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeExprError {
    #[error("empty type expression")]
    Empty,

    #[error("unexpected end of type expression at offset {offset}, expected {expected}")]
    UnexpectedEnd { offset: usize, expected: &'static str },

    #[error("unexpected '{found}' at offset {offset}, expected {expected}")]
    Unexpected {
        found: char,
        offset: usize,
        expected: &'static str,
    },

    #[error("unterminated quoted name starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("type expression nested deeper than {limit} levels at offset {offset}")]
    TooDeep { offset: usize, limit: usize },
}

/// Errors from classifying a declared type expression into a descriptor.
///
/// Raised only while contracts are being constructed, never during matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorBuildError {
    #[error("malformed type expression: {0}")]
    Syntax(#[from] TypeExprError),

    #[error("unknown type name '{0}'")]
    UnknownName(String),

    #[error("'{0}' is not a generic type and cannot be subscripted")]
    NotGeneric(String),

    #[error("'{head}' takes {expected} type argument(s), found {found}")]
    Arity {
        head: String,
        expected: &'static str,
        found: usize,
    },

    #[error("Callable parameters must be a bracketed list or '...', found '{0}'")]
    CallableParams(String),

    #[error("type variable '{0}' is bounded by itself")]
    CyclicTypeVar(String),

    #[error("{what} is only allowed as the first argument of Callable (found in '{context}')")]
    Misplaced { what: &'static str, context: String },
}

/// Structural misuse of the contract machinery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractMisuseError {
    #[error("NoReturn is a declaration marker and cannot be used as a match target")]
    NoReturnMatched,

    #[error("cannot wrap a value of type '{type_name}': target is not invokable")]
    NotInvokable { type_name: String },

    #[error("function '{function}' takes {expected} positional argument(s) but {given} were given")]
    Arity {
        function: String,
        expected: String,
        given: usize,
    },

    #[error("class '{class}' already has contracts applied")]
    AlreadyContracted { class: String },
}

/// A contract violation or construction failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error(transparent)]
    Build(#[from] DescriptorBuildError),

    #[error("function '{function}' argument '{parameter}' must be type '{expected}', got '{actual}'")]
    ArgumentType {
        function: String,
        parameter: String,
        expected: String,
        actual: String,
    },

    #[error("function '{function}' must return type '{expected}'")]
    ReturnType { function: String, expected: String },

    #[error(transparent)]
    Misuse(#[from] ContractMisuseError),
}

/// Failure of an invocation through the host value model.
///
/// Contract failures and failures raised by the target are kept apart so a
/// caller can tell a violated declaration from a failing computation.
#[derive(Error, Debug)]
pub enum CallError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Raised by the invoked target itself; carried through untouched.
    #[error("{0}")]
    Raised(Box<dyn StdError + Send + Sync + 'static>),
}

impl CallError {
    /// Wrap an error produced by a target callable.
    pub fn raised<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        CallError::Raised(Box::new(error))
    }

    /// The contract error, if this failure came from a contract.
    pub fn as_contract(&self) -> Option<&ContractError> {
        match self {
            CallError::Contract(err) => Some(err),
            CallError::Raised(_) => None,
        }
    }

    /// Borrow the target's own error as its concrete type.
    pub fn downcast_raised<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self {
            CallError::Raised(err) => err.downcast_ref::<E>(),
            CallError::Contract(_) => None,
        }
    }
}

impl From<ContractMisuseError> for CallError {
    fn from(err: ContractMisuseError) -> Self {
        CallError::Contract(ContractError::Misuse(err))
    }
}

/// Errors from reading contract configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid contract configuration: {0}")]
    Toml(#[from] toml::de::Error),
}
