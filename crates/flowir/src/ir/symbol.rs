//! Symbols and Labels
//!
//! Symbols are typed variable handles; labels are jump targets. Both compare
//! by identity: the id is allocated once by the owning builder and two
//! handles with the same name are still different symbols.

use super::types::Type;
use std::fmt;

/// Symbol identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// A named or anonymous typed variable handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    /// Unique identifier (identity)
    pub id: SymbolId,
    /// Optional name; anonymous symbols never take part in name conflicts
    pub name: Option<String>,
    /// Declared type
    pub ty: Type,
}

impl Symbol {
    /// Create a named symbol
    pub fn named(id: SymbolId, name: impl Into<String>, ty: Type) -> Self {
        Self {
            id,
            name: Some(name.into()),
            ty,
        }
    }

    /// Create an anonymous symbol
    pub fn anonymous(id: SymbolId, ty: Type) -> Self {
        Self { id, name: None, ty }
    }

    /// Does this symbol answer to `name`?
    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}{}", name, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Label identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

impl LabelId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A jump target: a loop start/end, a do-while body entry, the return point,
/// or a user-declared label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelTarget {
    /// Unique identifier
    pub id: LabelId,
    /// Name for user labels; system labels are anonymous
    pub name: Option<String>,
    /// Type of the value a jump may carry to this label
    pub ty: Type,
}

impl LabelTarget {
    /// Anonymous system label
    pub fn system(id: LabelId) -> Self {
        Self {
            id,
            name: None,
            ty: Type::Void,
        }
    }

    /// Named user label
    pub fn user(id: LabelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            ty: Type::Void,
        }
    }

    /// Label whose jumps carry a value of `ty`
    pub fn typed(id: LabelId, ty: Type) -> Self {
        Self { id, name: None, ty }
    }
}

impl fmt::Display for LabelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}", self.id, name),
            None => write!(f, "{}", self.id),
        }
    }
}
