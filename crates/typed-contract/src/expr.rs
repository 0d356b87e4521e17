//! Declared type expressions.
//!
//! A [`TypeExpr`] is the caller-supplied schema a descriptor is classified
//! from. It can be assembled directly, carry a handle to a known type, or be
//! parsed from source-level syntax:
//!
//! ```text
//! union   := postfix ('|' postfix)*
//! postfix := atom ('[' union (',' union)* ']')?
//! atom    := IDENT | '"' name '"' | '\'' name '\'' | '...' | '[' (union (',' union)*)? ']'
//! ```

use std::fmt;

use crate::error::TypeExprError;
use crate::handle::{BuiltinType, TypeHandle};

/// A declared type expression, prior to classification.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeExpr {
    /// A bare name: `Any`, `Int`, `User`, `T`.
    Name(String),
    /// A subscripted generic: `List[Int]`, `Dict[String, Int]`.
    Generic { head: String, args: Vec<TypeExpr> },
    /// A bracketed parameter list, as in `Callable[[Int, Int], Int]`.
    Params(Vec<TypeExpr>),
    /// `...`
    Ellipsis,
    /// A quoted name that is never resolved.
    Forward(String),
    /// A type variable declared inline.
    Var {
        name: String,
        bound: Option<Box<TypeExpr>>,
    },
    /// A direct handle to a type.
    Handle(TypeHandle),
    /// Source text, parsed when the expression is classified.
    Source(String),
}

impl TypeExpr {
    pub fn name(name: impl Into<String>) -> Self {
        TypeExpr::Name(name.into())
    }

    pub fn generic(head: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Generic {
            head: head.into(),
            args,
        }
    }

    pub fn forward(name: impl Into<String>) -> Self {
        TypeExpr::Forward(name.into())
    }

    pub fn var(name: impl Into<String>, bound: Option<TypeExpr>) -> Self {
        TypeExpr::Var {
            name: name.into(),
            bound: bound.map(Box::new),
        }
    }

    /// `Callable[[params...], returns]`
    pub fn callable(params: Vec<TypeExpr>, returns: TypeExpr) -> Self {
        TypeExpr::generic("Callable", vec![TypeExpr::Params(params), returns])
    }

    /// Parse source syntax. Nesting is capped at [`MAX_DEPTH`] brackets.
    pub fn parse(src: &str) -> Result<TypeExpr, TypeExprError> {
        let mut parser = Parser {
            src,
            pos: 0,
            depth: 0,
        };
        parser.skip_ws();
        if parser.peek().is_none() {
            return Err(TypeExprError::Empty);
        }
        let expr = parser.union()?;
        parser.skip_ws();
        match parser.peek() {
            None => Ok(expr),
            Some(found) => Err(TypeExprError::Unexpected {
                found,
                offset: parser.pos,
                expected: "end of expression",
            }),
        }
    }
}

impl From<&str> for TypeExpr {
    fn from(src: &str) -> Self {
        TypeExpr::Source(src.to_string())
    }
}

impl From<String> for TypeExpr {
    fn from(src: String) -> Self {
        TypeExpr::Source(src)
    }
}

impl From<TypeHandle> for TypeExpr {
    fn from(ty: TypeHandle) -> Self {
        TypeExpr::Handle(ty)
    }
}

impl From<BuiltinType> for TypeExpr {
    fn from(builtin: BuiltinType) -> Self {
        TypeExpr::Handle(TypeHandle::Builtin(builtin))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Name(name) => f.write_str(name),
            TypeExpr::Generic { head, args } => {
                write!(f, "{head}[")?;
                write_list(f, args)?;
                write!(f, "]")
            }
            TypeExpr::Params(params) => {
                write!(f, "[")?;
                write_list(f, params)?;
                write!(f, "]")
            }
            TypeExpr::Ellipsis => f.write_str("..."),
            TypeExpr::Forward(name) => write!(f, "\"{name}\""),
            TypeExpr::Var { name, .. } => f.write_str(name),
            TypeExpr::Handle(ty) => f.write_str(ty.name()),
            TypeExpr::Source(src) => f.write_str(src),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeExpr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Deepest bracket nesting accepted by [`TypeExpr::parse`].
pub const MAX_DEPTH: usize = 128;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn union(&mut self) -> Result<TypeExpr, TypeExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(TypeExprError::TooDeep {
                offset: self.pos,
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let result = self.members();
        self.depth -= 1;
        result
    }

    fn members(&mut self) -> Result<TypeExpr, TypeExprError> {
        let mut members = vec![self.postfix()?];
        loop {
            self.skip_ws();
            if !self.eat('|') {
                break;
            }
            members.push(self.postfix()?);
        }
        if members.len() == 1 {
            Ok(members.remove(0))
        } else {
            Ok(TypeExpr::generic("Union", members))
        }
    }

    fn postfix(&mut self) -> Result<TypeExpr, TypeExprError> {
        let atom = self.atom()?;
        self.skip_ws();
        match atom {
            TypeExpr::Name(head) if self.eat('[') => {
                let args = self.list(false)?;
                Ok(TypeExpr::Generic { head, args })
            }
            other => Ok(other),
        }
    }

    fn atom(&mut self) -> Result<TypeExpr, TypeExprError> {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            None => Err(TypeExprError::UnexpectedEnd {
                offset: start,
                expected: "a type",
            }),
            Some('[') => {
                self.bump();
                Ok(TypeExpr::Params(self.list(true)?))
            }
            Some('.') => {
                for _ in 0..3 {
                    match self.bump() {
                        Some('.') => {}
                        Some(found) => {
                            return Err(TypeExprError::Unexpected {
                                found,
                                offset: self.pos - found.len_utf8(),
                                expected: "'...'",
                            })
                        }
                        None => {
                            return Err(TypeExprError::UnexpectedEnd {
                                offset: self.pos,
                                expected: "'...'",
                            })
                        }
                    }
                }
                Ok(TypeExpr::Ellipsis)
            }
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let body_start = self.pos;
                loop {
                    match self.bump() {
                        Some(c) if c == quote => break,
                        Some(_) => {}
                        None => return Err(TypeExprError::UnterminatedString { offset: start }),
                    }
                }
                let body = &self.src[body_start..self.pos - quote.len_utf8()];
                Ok(TypeExpr::Forward(body.trim().to_string()))
            }
            Some(c) if c.is_alphabetic() || c == '_' => {
                while self
                    .peek()
                    .is_some_and(|c| c.is_alphanumeric() || c == '_')
                {
                    self.bump();
                }
                Ok(TypeExpr::Name(self.src[start..self.pos].to_string()))
            }
            Some(found) => Err(TypeExprError::Unexpected {
                found,
                offset: start,
                expected: "a type",
            }),
        }
    }

    /// Comma-separated items up to the closing bracket, which is consumed.
    fn list(&mut self, allow_empty: bool) -> Result<Vec<TypeExpr>, TypeExprError> {
        let mut items = Vec::new();
        self.skip_ws();
        if allow_empty && self.eat(']') {
            return Ok(items);
        }
        loop {
            items.push(self.union()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                return Ok(items);
            }
            return Err(match self.peek() {
                Some(found) => TypeExprError::Unexpected {
                    found,
                    offset: self.pos,
                    expected: "',' or ']'",
                },
                None => TypeExprError::UnexpectedEnd {
                    offset: self.pos,
                    expected: "',' or ']'",
                },
            });
        }
    }
}
