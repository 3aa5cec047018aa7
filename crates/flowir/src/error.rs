//! Builder errors
//!
//! Every failure is a programming error in the calling code. Structural,
//! contextual and binding errors are raised by the offending call; deferred
//! and completeness errors are raised by assembly.

use crate::ir::Type;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

/// When and why an error is detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Detected immediately at the offending call
    Structural,
    /// Detected immediately by walking the lookup chain
    Contextual,
    /// Detected at assembly because forward references are legal
    Deferred,
    /// A construct missing all required alternatives, detected when finalized
    Completeness,
    /// Fragment binding and type agreement
    Binding,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Name '{name}' conflicts with a visible symbol")]
    NameConflict { name: String },

    #[error("Label '{name}' is already defined")]
    DuplicateLabel { name: String },

    #[error("Switch already has a default branch")]
    DuplicateDefault,

    #[error("Catch variable '{name}' collides with a visible symbol")]
    DuplicateVariable { name: String },

    #[error("Try already has a finally block")]
    DuplicateFinally,

    #[error("Conditional already has an alternative branch")]
    AlreadyHasAlternative,

    #[error("Scope {id} does not belong to this builder")]
    UnknownScope { id: u32 },

    #[error("Invalid {statement} statement (not in loop)")]
    NoEnclosingLoop { statement: &'static str },

    #[error("Invalid rethrow statement (not in catch)")]
    NoEnclosingCatch,

    #[error("Undefined label: {name}")]
    UnknownLabel { name: String },

    #[error("Switch has neither cases nor a default")]
    EmptyBranch,

    #[error("Try has neither a catch nor a finally")]
    EmptyTry,

    #[error("Placeholder '{name}' does not match a visible symbol")]
    UnboundPlaceholder { name: String },

    #[error("Placeholder '{name}' expects {expected}, visible symbol has {found}")]
    PlaceholderTypeMismatch {
        name: String,
        expected: Type,
        found: Type,
    },

    #[error("Fragment captures external symbol '{name}' but captures are disabled")]
    UnauthorizedCapture { name: String },

    #[error("Type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: Type, found: Type },

    #[error("Type {ty} is not iterable")]
    NotIterable { ty: Type },

    #[error("Return type mismatch: expected {expected}, got {found}")]
    ReturnTypeMismatch { expected: Type, found: Type },
}

impl BuildError {
    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            BuildError::NameConflict { .. }
            | BuildError::DuplicateLabel { .. }
            | BuildError::DuplicateDefault
            | BuildError::DuplicateVariable { .. }
            | BuildError::DuplicateFinally
            | BuildError::AlreadyHasAlternative
            | BuildError::UnknownScope { .. } => ErrorCategory::Structural,
            BuildError::NoEnclosingLoop { .. } | BuildError::NoEnclosingCatch => {
                ErrorCategory::Contextual
            }
            BuildError::UnknownLabel { .. } => ErrorCategory::Deferred,
            BuildError::EmptyBranch | BuildError::EmptyTry => ErrorCategory::Completeness,
            BuildError::UnboundPlaceholder { .. }
            | BuildError::PlaceholderTypeMismatch { .. }
            | BuildError::UnauthorizedCapture { .. }
            | BuildError::TypeMismatch { .. }
            | BuildError::NotIterable { .. }
            | BuildError::ReturnTypeMismatch { .. } => ErrorCategory::Binding,
        }
    }
}
