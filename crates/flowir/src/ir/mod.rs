//! Intermediate Representation (IR)
//!
//! The IR is a structured expression tree: control flow is expressed with
//! nested blocks, conditionals, loops, branches and protected regions, and
//! jumps only ever target labels.
//!
//! # Structure
//!
//! - `Artifact` - Assembled procedure: parameters, return type, rooted body
//! - `Node` - A control-flow node
//! - `Expr` - Scalar sub-expressions embedded in nodes
//! - `Symbol` / `LabelTarget` - Variables and jump targets, compared by identity
//! - `Type` - The already-typed fragment type model

pub mod expr;
pub mod node;
pub mod pretty;
pub mod symbol;
pub mod types;

pub use expr::{BinaryOp, Constant, Expr, Intrinsic, Placeholder, UnaryOp};
pub use node::{Artifact, CatchHandler, Node, SwitchCase};
pub use pretty::PrettyPrint;
pub use symbol::{LabelId, LabelTarget, Symbol, SymbolId};
pub use types::Type;
