//! Typed Contract: runtime enforcement of declared call signatures.
//!
//! Declared types are left unchecked by the host value model until a callable is
//! wrapped in a contract. Wrapping recovers call-time safety: every argument is
//! matched against its declared descriptor before the target runs, and the
//! result is matched against the declared return descriptor afterwards.
//!
//! ## Pipeline
//!
//! 1. **Declaration**: a [`TypeExpr`] is supplied by the caller, built directly
//!    or parsed from text such as `Dict[String, List[Int]]`.
//! 2. **Classification**: the [`DescriptorBuilder`] turns each expression into
//!    exactly one [`Descriptor`] variant.
//! 3. **Contract**: descriptors are bound to the target's formal parameters in a
//!    [`CallContract`].
//! 4. **Enforcement**: a [`ContractedCallable`] runs the [`Matcher`] on the way
//!    in and on the way out, and derives a fresh contract for callables returned
//!    under a `Callable[...]` declaration.
//! 5. **Classes**: the [`ClassContractApplier`] wraps every exposed method of a
//!    class definition once, before the class is sealed.
//!
//! ## Invariants
//!
//! - Descriptors and contracts are immutable after construction and freely shared.
//! - Matching never invokes a callable; callable signatures are enforced lazily.
//! - Errors raised by a wrapped target propagate unchanged in [`CallError::Raised`].
//! - Class contracts are applied at most once; a second application is rejected.

pub mod applier;
pub mod builder;
pub mod callable;
pub mod class;
pub mod config;
pub mod contract;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod expr;
pub mod handle;
pub mod matcher;
pub mod scope;
pub mod value;
pub mod wrapper;

pub use applier::ClassContractApplier;
pub use builder::DescriptorBuilder;
pub use callable::{BoundMethod, Callable, Invoke, NativeFunction, Param, ParamKind, Signature};
pub use class::{ClassBuilder, ClassDef, MethodEntry, MethodKind, INITIALIZER};
pub use config::{ContractConfig, TypeReferenceRule};
pub use contract::{CallContract, ParamContract};
pub use descriptor::Descriptor;
pub use engine::ContractEngine;
pub use error::{
    CallError, ConfigError, ContractError, ContractMisuseError, DescriptorBuildError,
    TypeExprError,
};
pub use expr::TypeExpr;
pub use handle::{BuiltinType, TypeHandle};
pub use matcher::{matches, Matcher};
pub use scope::TypeScope;
pub use value::{Instance, Value};
pub use wrapper::ContractedCallable;
