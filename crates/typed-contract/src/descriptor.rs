//! Structural type descriptors.
//!
//! A [`Descriptor`] is the classified, immutable form of one declared type
//! constraint. Descriptors are plain values: they can be cloned into any
//! number of contracts and compared structurally.
//!
//! The `Display` impl is the descriptor namer used in every diagnostic. It
//! follows the matcher's dispatch order so that names stay predictable:
//! `Union[Int, String]`, `List[Int]`, `Dict[String: Int]`, `Callable[[Int], Int]`.

use std::fmt;

use crate::handle::{BuiltinType, TypeHandle};

/// One declared type constraint.
#[derive(Clone, Debug, PartialEq)]
pub enum Descriptor {
    /// Matches every value.
    Any,
    /// The absence-of-return marker. Legal as a declaration, never as a match target.
    NoReturn,
    /// Matches only the absence-of-value sentinel.
    NoneType,
    /// Matches if any member matches, tried in declared order.
    Union(Vec<Descriptor>),
    /// A sequence container, optionally constraining every element.
    List(Option<Box<Descriptor>>),
    /// A fixed-arity ordered container; empty means unconstrained.
    Tuple(Vec<Descriptor>),
    /// A mapping, optionally constraining every key and every value.
    Dict(Option<Box<(Descriptor, Descriptor)>>),
    /// A generic placeholder, delegating to its bound when it has one.
    BoundVariable {
        name: String,
        bound: Option<Box<Descriptor>>,
    },
    /// A value that denotes a type, optionally constrained.
    TypeReference(Option<Box<Descriptor>>),
    /// The unconstrained metatype marker.
    Wildcard,
    /// Any invokable value; the signature is enforced when it is called.
    CallableSignature {
        params: Vec<Descriptor>,
        returns: Box<Descriptor>,
    },
    /// An unresolved quoted name. Trusted, never checked.
    ForwardReference(String),
    /// Fallback: the value must be an instance of the type.
    Nominal(TypeHandle),
}

impl Descriptor {
    pub fn nominal(ty: impl Into<TypeHandle>) -> Self {
        Descriptor::Nominal(ty.into())
    }

    pub fn list_of(element: Descriptor) -> Self {
        Descriptor::List(Some(Box::new(element)))
    }

    pub fn dict_of(key: Descriptor, value: Descriptor) -> Self {
        Descriptor::Dict(Some(Box::new((key, value))))
    }

    pub fn callable(params: Vec<Descriptor>, returns: Descriptor) -> Self {
        Descriptor::CallableSignature {
            params,
            returns: Box::new(returns),
        }
    }

    pub fn is_callable_signature(&self) -> bool {
        matches!(self, Descriptor::CallableSignature { .. })
    }
}

impl From<BuiltinType> for Descriptor {
    fn from(builtin: BuiltinType) -> Self {
        Descriptor::Nominal(TypeHandle::Builtin(builtin))
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Descriptor]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Any => write!(f, "Any"),
            Descriptor::NoReturn => write!(f, "NoReturn"),
            Descriptor::NoneType => write!(f, "None"),
            Descriptor::TypeReference(None) => write!(f, "Type"),
            Descriptor::TypeReference(Some(inner)) => write!(f, "Type[{inner}]"),
            Descriptor::BoundVariable { name, bound: None } => write!(f, "{name}"),
            Descriptor::BoundVariable {
                name,
                bound: Some(bound),
            } => write!(f, "{name}: {bound}"),
            Descriptor::Wildcard => write!(f, "type"),
            Descriptor::Union(members) => {
                write!(f, "Union[")?;
                write_joined(f, members)?;
                write!(f, "]")
            }
            Descriptor::List(None) => write!(f, "List"),
            Descriptor::List(Some(element)) => write!(f, "List[{element}]"),
            Descriptor::Tuple(elements) if elements.is_empty() => write!(f, "Tuple"),
            Descriptor::Tuple(elements) => {
                write!(f, "Tuple[")?;
                write_joined(f, elements)?;
                write!(f, "]")
            }
            Descriptor::Dict(None) => write!(f, "Dict"),
            Descriptor::Dict(Some(entry)) => write!(f, "Dict[{}: {}]", entry.0, entry.1),
            Descriptor::CallableSignature { params, returns } => {
                write!(f, "Callable[[")?;
                write_joined(f, params)?;
                write!(f, "], {returns}]")
            }
            Descriptor::ForwardReference(name) => write!(f, "{name}"),
            Descriptor::Nominal(ty) => write!(f, "{}", ty.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> Descriptor {
        BuiltinType::Int.into()
    }

    fn string() -> Descriptor {
        BuiltinType::String.into()
    }

    #[test]
    fn names_follow_documented_forms() {
        assert_eq!(Descriptor::Union(vec![int(), string()]).to_string(), "Union[Int, String]");
        assert_eq!(Descriptor::list_of(int()).to_string(), "List[Int]");
        assert_eq!(Descriptor::dict_of(string(), int()).to_string(), "Dict[String: Int]");
        assert_eq!(
            Descriptor::callable(vec![int()], int()).to_string(),
            "Callable[[Int], Int]"
        );
    }

    #[test]
    fn unparameterised_containers_use_bare_names() {
        assert_eq!(Descriptor::List(None).to_string(), "List");
        assert_eq!(Descriptor::Tuple(vec![]).to_string(), "Tuple");
        assert_eq!(Descriptor::Dict(None).to_string(), "Dict");
        assert_eq!(Descriptor::TypeReference(None).to_string(), "Type");
    }

    #[test]
    fn markers_and_variables() {
        assert_eq!(Descriptor::Any.to_string(), "Any");
        assert_eq!(Descriptor::NoneType.to_string(), "None");
        assert_eq!(Descriptor::Wildcard.to_string(), "type");
        assert_eq!(Descriptor::ForwardReference("User".into()).to_string(), "User");
        assert_eq!(
            Descriptor::BoundVariable {
                name: "T".into(),
                bound: Some(Box::new(int())),
            }
            .to_string(),
            "T: Int"
        );
        assert_eq!(
            Descriptor::TypeReference(Some(Box::new(int()))).to_string(),
            "Type[Int]"
        );
    }

    #[test]
    fn structural_equality_ignores_construction_path() {
        let a = Descriptor::dict_of(string(), Descriptor::list_of(int()));
        let b = Descriptor::Dict(Some(Box::new((
            Descriptor::Nominal(TypeHandle::Builtin(BuiltinType::String)),
            Descriptor::List(Some(Box::new(int()))),
        ))));
        assert_eq!(a, b);
        assert_ne!(a, Descriptor::Dict(None));
    }
}
