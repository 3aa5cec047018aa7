//! Interpreter errors

use crate::value::Value;
use flowir::LabelId;
use thiserror::Error;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// An IR exception in flight. Host functions return this to raise.
    #[error("Exception raised: {0}")]
    Thrown(Value),

    #[error("Uncaught exception: {0}")]
    Uncaught(Value),

    #[error("Rethrow with no exception being handled")]
    NoActiveException,

    #[error("Read of unassigned symbol {0}")]
    UnboundSymbol(String),

    #[error("Unbound placeholder '{0}' reached the interpreter")]
    UnboundPlaceholder(String),

    #[error("Unknown host function: {0}")]
    UnknownFunction(String),

    #[error("Expected {expected} arguments, got {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("Type error: {0}")]
    TypeError(String),

    /// Handlers only run with a caught exception bound, so they cannot be
    /// entered by a jump.
    #[error("Jump to {0} enters a catch handler")]
    JumpIntoHandler(LabelId),

    #[error("Jump to {0} escaped the procedure")]
    EscapedJump(LabelId),

    #[error("Step limit of {0} exceeded")]
    StepLimit(u64),
}
