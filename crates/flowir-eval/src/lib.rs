//! Reference interpreter for flowir artifacts
//!
//! Executes an assembled [`flowir::Artifact`] directly on its tree. It is the
//! execution backend the builder's end-to-end tests run against:
//! - **Values**: runtime values, objects and iterator cursors (`value` module)
//! - **Host**: named functions reachable from `Expr::Call` (`host` module)
//! - **Interpreter**: node execution with labels, loops and exception regions

#![warn(rust_2018_idioms)]

pub mod error;
pub mod host;
pub mod interpreter;
pub mod value;

pub use error::{EvalError, EvalResult};
pub use host::HostFunctions;
pub use interpreter::{Flow, Interpreter, DEFAULT_STEP_LIMIT};
pub use value::{Cursor, Object, Value};
