//! Classification of declared type expressions into descriptors.
//!
//! Precedence, first match wins: `Any` → `NoReturn` → `None` → `Type[...]` →
//! type variable → `type` → `Union[...]` / `Optional[...]` → `List[...]` →
//! `Tuple[...]` → `Dict[...]` → `Callable[...]` → quoted forward reference →
//! nominal type from the scope.

use crate::callable::Signature;
use crate::contract::{CallContract, ParamContract};
use crate::descriptor::Descriptor;
use crate::error::DescriptorBuildError;
use crate::expr::TypeExpr;
use crate::handle::{BuiltinType, TypeHandle};
use crate::scope::TypeScope;

/// Pure classifier from [`TypeExpr`] to [`Descriptor`].
///
/// Building the same expression against the same scope always yields
/// structurally equal descriptors.
pub struct DescriptorBuilder<'a> {
    scope: &'a TypeScope,
}

impl<'a> DescriptorBuilder<'a> {
    pub fn new(scope: &'a TypeScope) -> Self {
        Self { scope }
    }

    pub fn build(&self, expr: &TypeExpr) -> Result<Descriptor, DescriptorBuildError> {
        let mut resolving = Vec::new();
        self.classify(expr, &mut resolving)
    }

    /// Parse and classify source text in one step.
    pub fn parse(&self, src: &str) -> Result<Descriptor, DescriptorBuildError> {
        self.build(&TypeExpr::parse(src)?)
    }

    /// Bind a signature's declared types to its positional parameters.
    ///
    /// Unannotated parameters and a missing return annotation become `Any`.
    /// Variadic collectors are left out of the parameter list.
    pub fn contract(&self, signature: &Signature) -> Result<CallContract, DescriptorBuildError> {
        let mut params = Vec::new();
        for param in signature.positional() {
            let descriptor = match &param.annotation {
                Some(expr) => self.build(expr)?,
                None => Descriptor::Any,
            };
            params.push(ParamContract {
                name: param.name.clone(),
                descriptor,
                has_default: param.default.is_some(),
            });
        }
        let returns = match signature.return_annotation() {
            Some(expr) => self.build(expr)?,
            None => Descriptor::Any,
        };
        Ok(CallContract::new(params, returns).with_variadic(signature.has_variadic()))
    }

    fn classify(
        &self,
        expr: &TypeExpr,
        resolving: &mut Vec<String>,
    ) -> Result<Descriptor, DescriptorBuildError> {
        match expr {
            TypeExpr::Source(src) => {
                let parsed = TypeExpr::parse(src)?;
                self.classify(&parsed, resolving)
            }
            TypeExpr::Name(name) => self.classify_name(name, resolving),
            TypeExpr::Generic { head, args } => self.classify_generic(head, args, resolving),
            TypeExpr::Var { name, bound } => {
                let bound = match bound {
                    Some(bound) => Some(Box::new(self.classify(bound, resolving)?)),
                    None => None,
                };
                Ok(Descriptor::BoundVariable {
                    name: name.clone(),
                    bound,
                })
            }
            TypeExpr::Handle(ty) => Ok(match ty {
                TypeHandle::Builtin(BuiltinType::NoneType) => Descriptor::NoneType,
                TypeHandle::Builtin(BuiltinType::Type) => Descriptor::Wildcard,
                _ => Descriptor::Nominal(ty.clone()),
            }),
            TypeExpr::Forward(name) => Ok(Descriptor::ForwardReference(name.clone())),
            TypeExpr::Params(_) => Err(DescriptorBuildError::Misplaced {
                what: "a parameter list",
                context: expr.to_string(),
            }),
            TypeExpr::Ellipsis => Err(DescriptorBuildError::Misplaced {
                what: "'...'",
                context: expr.to_string(),
            }),
        }
    }

    fn classify_name(
        &self,
        name: &str,
        resolving: &mut Vec<String>,
    ) -> Result<Descriptor, DescriptorBuildError> {
        match name {
            "Any" => return Ok(Descriptor::Any),
            "NoReturn" => return Ok(Descriptor::NoReturn),
            "None" | "NoneType" => return Ok(Descriptor::NoneType),
            "Type" => return Ok(Descriptor::TypeReference(None)),
            _ => {}
        }

        if let Some(var) = self.scope.type_var(name) {
            if resolving.iter().any(|r| r == name) {
                return Err(DescriptorBuildError::CyclicTypeVar(name.to_string()));
            }
            let bound = match &var.bound {
                Some(bound) => {
                    resolving.push(name.to_string());
                    let built = self.classify(bound, resolving);
                    resolving.pop();
                    Some(Box::new(built?))
                }
                None => None,
            };
            return Ok(Descriptor::BoundVariable {
                name: name.to_string(),
                bound,
            });
        }

        match name {
            "type" => Ok(Descriptor::Wildcard),
            "Union" => Err(DescriptorBuildError::Arity {
                head: name.to_string(),
                expected: "at least 1",
                found: 0,
            }),
            "Optional" => Err(DescriptorBuildError::Arity {
                head: name.to_string(),
                expected: "1",
                found: 0,
            }),
            "List" => Ok(Descriptor::List(None)),
            "Tuple" => Ok(Descriptor::Tuple(Vec::new())),
            "Dict" => Ok(Descriptor::Dict(None)),
            "Callable" => Ok(Descriptor::callable(Vec::new(), Descriptor::Any)),
            _ => match self.scope.lookup_type(name) {
                Some(ty) => Ok(Descriptor::Nominal(ty.clone())),
                None => Err(DescriptorBuildError::UnknownName(name.to_string())),
            },
        }
    }

    fn classify_generic(
        &self,
        head: &str,
        args: &[TypeExpr],
        resolving: &mut Vec<String>,
    ) -> Result<Descriptor, DescriptorBuildError> {
        let arity = |expected: &'static str| DescriptorBuildError::Arity {
            head: head.to_string(),
            expected,
            found: args.len(),
        };

        match head {
            "Type" => match args {
                [inner] => Ok(Descriptor::TypeReference(Some(Box::new(
                    self.classify(inner, resolving)?,
                )))),
                _ => Err(arity("1")),
            },
            "Union" => {
                if args.is_empty() {
                    return Err(arity("at least 1"));
                }
                let members = args
                    .iter()
                    .map(|arg| self.classify(arg, resolving))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(normalize_union(members))
            }
            "Optional" => match args {
                [inner] => Ok(normalize_union(vec![
                    self.classify(inner, resolving)?,
                    Descriptor::NoneType,
                ])),
                _ => Err(arity("1")),
            },
            "List" => match args {
                [element] => Ok(Descriptor::list_of(self.classify(element, resolving)?)),
                _ => Err(arity("1")),
            },
            "Tuple" => {
                if args.is_empty() {
                    return Err(arity("at least 1"));
                }
                let elements = args
                    .iter()
                    .map(|arg| self.classify(arg, resolving))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Descriptor::Tuple(elements))
            }
            "Dict" => match args {
                [key, value] => Ok(Descriptor::dict_of(
                    self.classify(key, resolving)?,
                    self.classify(value, resolving)?,
                )),
                _ => Err(arity("2")),
            },
            "Callable" => match args {
                [params, returns] => {
                    let params = match params {
                        TypeExpr::Params(list) => list
                            .iter()
                            .map(|p| self.classify(p, resolving))
                            .collect::<Result<Vec<_>, _>>()?,
                        TypeExpr::Ellipsis => Vec::new(),
                        other => {
                            return Err(DescriptorBuildError::CallableParams(other.to_string()))
                        }
                    };
                    let returns = self.classify(returns, resolving)?;
                    Ok(Descriptor::callable(params, returns))
                }
                _ => Err(arity("2")),
            },
            _ => {
                let known = matches!(head, "Any" | "NoReturn" | "None" | "NoneType" | "type")
                    || self.scope.type_var(head).is_some()
                    || self.scope.lookup_type(head).is_some();
                if known {
                    Err(DescriptorBuildError::NotGeneric(head.to_string()))
                } else {
                    Err(DescriptorBuildError::UnknownName(head.to_string()))
                }
            }
        }
    }
}

/// Flatten nested unions, drop repeated members and collapse singletons.
fn normalize_union(members: Vec<Descriptor>) -> Descriptor {
    let mut flat: Vec<Descriptor> = Vec::new();
    for member in members {
        let parts = match member {
            Descriptor::Union(inner) => inner,
            other => vec![other],
        };
        for part in parts {
            if !flat.contains(&part) {
                flat.push(part);
            }
        }
    }
    if flat.len() == 1 {
        flat.remove(0)
    } else {
        Descriptor::Union(flat)
    }
}
