//! IR Type Model
//!
//! Fragments arrive already typed; the builder only needs enough of a type
//! model to bind placeholders, pick the iteration protocol and decide how a
//! resource is disposed.

use std::fmt;

/// Type of a symbol, label or sub-expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// No value
    Void,
    /// Boolean
    Bool,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    /// String
    Str,
    /// Root reference type; every reference value is an `Any`
    Any,
    /// Named reference type (also used for exception kinds)
    Object(String),
    /// Named value type
    Record(String),
    /// List of elements
    List(Box<Type>),
    /// Half-open integer range
    Range,
    /// Iterator produced by a collection's "get iterator" capability
    Iterator {
        /// Element type yielded by `current`
        elem: Box<Type>,
        /// Whether the iterator must be disposed after use
        disposable: bool,
    },
}

impl Type {
    /// Named reference type
    pub fn object(name: impl Into<String>) -> Self {
        Type::Object(name.into())
    }

    /// Named value type
    pub fn record(name: impl Into<String>) -> Self {
        Type::Record(name.into())
    }

    /// List of `elem`
    pub fn list(elem: Type) -> Self {
        Type::List(Box::new(elem))
    }

    /// Reference-like types may hold null and are disposed behind a null check.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Str | Type::Any | Type::Object(_) | Type::List(_) | Type::Iterator { .. }
        )
    }

    /// Is this the `Void` type?
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Iterator type produced by this collection, if it is iterable
    pub fn iterator_type(&self) -> Option<Type> {
        match self {
            Type::List(elem) => Some(Type::Iterator {
                elem: elem.clone(),
                disposable: true,
            }),
            Type::Range => Some(Type::Iterator {
                elem: Box::new(Type::Int),
                disposable: false,
            }),
            _ => None,
        }
    }

    /// Element type of an iterator type
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Iterator { elem, .. } => Some(elem),
            _ => None,
        }
    }

    /// Whether this iterator type must be disposed
    pub fn is_disposable(&self) -> bool {
        matches!(self, Type::Iterator { disposable: true, .. })
    }

    /// Whether a value of type `other` may be stored where `self` is expected.
    ///
    /// Types are nominal; the only widening is any reference type into `Any`.
    pub fn accepts(&self, other: &Type) -> bool {
        self == other || (matches!(self, Type::Any) && other.is_reference())
    }

    /// Whether an explicit conversion from `self` to `target` exists: any
    /// accepted store, `int` and `long` in either direction, and a checked
    /// cast from `Any` to a named reference type.
    pub fn converts_to(&self, target: &Type) -> bool {
        target.accepts(self)
            || matches!(
                (self, target),
                (Type::Int, Type::Long) | (Type::Long, Type::Int) | (Type::Any, Type::Object(_))
            )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Long => write!(f, "long"),
            Type::Str => write!(f, "str"),
            Type::Any => write!(f, "any"),
            Type::Object(name) => write!(f, "{}", name),
            Type::Record(name) => write!(f, "{}", name),
            Type::List(elem) => write!(f, "list<{}>", elem),
            Type::Range => write!(f, "range"),
            Type::Iterator { elem, disposable } => {
                if *disposable {
                    write!(f, "iter<{}>+dispose", elem)
                } else {
                    write!(f, "iter<{}>", elem)
                }
            }
        }
    }
}
