//! Host functions reachable through `Expr::Call`

use crate::error::{EvalError, EvalResult};
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::fmt;

type HostFn = Box<dyn Fn(&[Value]) -> EvalResult<Value>>;

/// Registry of host functions, keyed by name
#[derive(Default)]
pub struct HostFunctions {
    functions: FxHashMap<String, HostFn>,
}

impl HostFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` under `name`, replacing any previous entry
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> EvalResult<Value> + 'static,
    {
        self.functions.insert(name.into(), Box::new(function));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn call(&self, name: &str, args: &[Value]) -> EvalResult<Value> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        function(args)
    }
}

impl fmt::Debug for HostFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("HostFunctions").field("functions", &names).finish()
    }
}
