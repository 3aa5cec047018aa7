//! Flowir: a fluent builder for structured control-flow IR
//!
//! This crate builds the body of a procedure as a tree of structured
//! control flow, validating it incrementally, and assembles it into a single
//! rooted [`Artifact`] for an execution backend:
//! - **IR**: types, symbols, labels, expressions and nodes (`ir` module)
//! - **Rewriting**: binding caller fragments into the builder's symbol space (`rewrite` module)
//! - **Builder**: scopes, constructs and assembly (`builder` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use flowir::{Block, Expr, FlowBuilder, Type};
//!
//! let x = || Expr::param("x", Type::Int);
//! let mut flow = FlowBuilder::new(&[], Type::Int)?;
//! flow.body()
//!     .declare("x", Type::Int)?
//!     .assign("x", Type::Int, Expr::int(0))?
//!     .loop_while(x().lt(Expr::int(3)))?
//!     .assign("x", Type::Int, x().add(Expr::int(1)))?
//!     .end()
//!     .return_value(Type::Int, x())?;
//! let artifact = flow.assemble()?;
//! ```

#![warn(rust_2018_idioms)]

pub mod builder;
pub mod config;
pub mod error;
pub mod ir;
pub mod rewrite;

pub use builder::{
    Block, Body, Branch, CaseBody, CaseBuilder, FlowBuilder, Handle, LoopBody, ResourceBody,
    ScopeId, SwitchBuilder, TryScope,
};
pub use config::{BuilderOptions, ConfigError};
pub use error::{BuildError, BuildResult, ErrorCategory};
pub use ir::{
    Artifact, BinaryOp, CatchHandler, Constant, Expr, Intrinsic, LabelId, LabelTarget, Node,
    Placeholder, PrettyPrint, Symbol, SymbolId, SwitchCase, Type, UnaryOp,
};
pub use rewrite::{Fragment, Rewriter, SymbolScope};
