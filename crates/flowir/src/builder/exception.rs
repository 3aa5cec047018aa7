//! Exception regions (try / catch / finally)

use super::{Block, Construct, FlowBuilder, Handle, ScopeId, Stmt};
use crate::error::{BuildError, BuildResult};
use crate::ir::{Symbol, Type};
use tracing::trace;

#[derive(Debug, Clone)]
pub(crate) struct CatchRegion {
    pub(crate) kind: Type,
    pub(crate) binding: Option<Symbol>,
    pub(crate) body: ScopeId,
}

#[derive(Debug, Clone)]
pub(crate) struct TryRegion {
    pub(crate) body: ScopeId,
    pub(crate) catches: Vec<CatchRegion>,
    pub(crate) finally: Option<ScopeId>,
}

impl FlowBuilder {
    pub(crate) fn begin_try(&mut self, scope: ScopeId) -> (usize, ScopeId) {
        let body = self.new_scope(Some(scope), None, false);
        let index = self.tries.len();
        self.tries.push(TryRegion {
            body,
            catches: Vec::new(),
            finally: None,
        });
        self.push(scope, Stmt::Construct(Construct::Try(index)));
        (index, body)
    }

    pub(crate) fn add_catch(
        &mut self,
        index: usize,
        outer: ScopeId,
        kind: Type,
        var_name: Option<&str>,
    ) -> BuildResult<ScopeId> {
        if !kind.is_reference() {
            return Err(BuildError::TypeMismatch {
                expected: Type::Any,
                found: kind,
            });
        }
        if let Some(name) = var_name {
            if self.lookup(outer, name).is_some() {
                return Err(BuildError::DuplicateVariable {
                    name: name.to_string(),
                });
            }
        }
        let body = self.new_scope(Some(outer), None, true);
        let binding = match var_name {
            Some(name) => Some(self.bind(body, name, kind.clone(), true)?),
            None => None,
        };
        trace!(scope = outer.0, kind = %kind, "opened catch");
        self.tries[index].catches.push(CatchRegion {
            kind,
            binding,
            body,
        });
        Ok(body)
    }

    pub(crate) fn add_finally(&mut self, index: usize, outer: ScopeId) -> BuildResult<ScopeId> {
        if self.tries[index].finally.is_some() {
            return Err(BuildError::DuplicateFinally);
        }
        let body = self.new_scope(Some(outer), None, false);
        self.tries[index].finally = Some(body);
        Ok(body)
    }

    pub(crate) fn check_try(&self, index: usize) -> BuildResult<()> {
        let region = &self.tries[index];
        if region.catches.is_empty() && region.finally.is_none() {
            return Err(BuildError::EmptyTry);
        }
        Ok(())
    }
}

/// Handle onto an exception region
///
/// Starts on the protected body; `catch` and `finally` move it onto the
/// newly opened handler.
pub struct TryScope<P> {
    parent: P,
    index: usize,
    scope: ScopeId,
}

impl<P: Block> TryScope<P> {
    pub(crate) fn new(parent: P, index: usize, scope: ScopeId) -> Self {
        Self {
            parent,
            index,
            scope,
        }
    }

    /// Open a handler for `kind`, optionally binding the exception to
    /// `var_name` inside the handler
    pub fn catch(mut self, kind: Type, var_name: Option<&str>) -> BuildResult<Self> {
        let outer = self.parent.scope_id();
        let index = self.index;
        self.scope = self.flow().add_catch(index, outer, kind, var_name)?;
        Ok(self)
    }

    /// Open the cleanup body. At most one per region.
    pub fn finally(mut self) -> BuildResult<Self> {
        let outer = self.parent.scope_id();
        let index = self.index;
        self.scope = self.flow().add_finally(index, outer)?;
        Ok(self)
    }

    /// Close the region. Fails with `EmptyTry` when it has neither a catch
    /// nor a finally.
    pub fn end(self) -> BuildResult<P> {
        self.parent.flow_ref().check_try(self.index)?;
        Ok(self.parent)
    }
}

impl<P: Block> Handle for TryScope<P> {
    fn flow(&mut self) -> &mut FlowBuilder {
        self.parent.flow()
    }

    fn flow_ref(&self) -> &FlowBuilder {
        self.parent.flow_ref()
    }
}

impl<P: Block> Block for TryScope<P> {
    fn scope_id(&self) -> ScopeId {
        self.scope
    }
}
