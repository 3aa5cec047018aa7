//! Scope operations
//!
//! [`Block`] is implemented by every handle that points at a statement
//! scope. Each operation consumes the handle and returns it (for chaining) or
//! a child handle that owns it.

use super::{
    expect_type, Branch, FlowBuilder, LoopBody, ResourceBody, ScopeId, Stmt, SwitchBuilder,
    TryScope,
};
use crate::error::{BuildError, BuildResult};
use crate::ir::{LabelTarget, Node, Symbol, Type};
use crate::rewrite::Fragment;
use tracing::trace;

/// Access to the builder behind a handle
pub trait Handle {
    fn flow(&mut self) -> &mut FlowBuilder;

    fn flow_ref(&self) -> &FlowBuilder;
}

/// A statement scope: ordered statements plus locally declared symbols
pub trait Block: Handle + Sized {
    /// Scope this handle appends to
    fn scope_id(&self) -> ScopeId;

    /// Resolve a visible symbol by name
    fn symbol(&self, name: &str) -> Option<Symbol> {
        self.flow_ref().lookup(self.scope_id(), name).cloned()
    }

    /// Declare a new local. Fails with `NameConflict` if `name` is visible.
    fn declare(mut self, name: &str, ty: Type) -> BuildResult<Self> {
        let scope = self.scope_id();
        self.flow().bind(scope, name, ty, false)?;
        Ok(self)
    }

    /// Assign a fragment to `name`, declaring it first if it is not visible
    fn assign(mut self, name: &str, ty: Type, value: impl Into<Fragment>) -> BuildResult<Self> {
        let scope = self.scope_id();
        self.flow().assign(scope, name, ty, value.into())?;
        Ok(self)
    }

    /// Evaluate a fragment for its effects
    fn act(mut self, fragment: impl Into<Fragment>) -> BuildResult<Self> {
        let scope = self.scope_id();
        let flow = self.flow();
        let expr = flow.rewrite(scope, fragment.into())?;
        flow.push(scope, Stmt::Node(Node::Eval(expr)));
        Ok(self)
    }

    /// Open a conditional; returns its true branch
    fn if_test(mut self, test: impl Into<Fragment>) -> BuildResult<Branch<Self>> {
        let scope = self.scope_id();
        let (construct, then_scope) = self.flow().begin_if(scope, test.into())?;
        Ok(Branch::new(self, construct, then_scope))
    }

    /// Open a pre-test loop; returns its body
    fn loop_while(mut self, condition: impl Into<Fragment>) -> BuildResult<LoopBody<Self>> {
        let scope = self.scope_id();
        let body = self.flow().begin_loop(scope, condition.into(), true)?;
        Ok(LoopBody::new(self, body))
    }

    /// Open a post-test loop; returns its body
    fn loop_do_while(mut self, condition: impl Into<Fragment>) -> BuildResult<LoopBody<Self>> {
        let scope = self.scope_id();
        let body = self.flow().begin_loop(scope, condition.into(), false)?;
        Ok(LoopBody::new(self, body))
    }

    /// Iterate `collection`, binding each element to `var_name`; returns the
    /// loop body positioned after the binding
    fn for_each(
        mut self,
        var_name: &str,
        var_type: Type,
        collection: impl Into<Fragment>,
    ) -> BuildResult<LoopBody<Self>> {
        let scope = self.scope_id();
        let body = self
            .flow()
            .begin_for_each(scope, var_name, var_type, collection.into())?;
        Ok(LoopBody::new(self, body))
    }

    /// Open a multi-way branch on `value`
    fn switch_on(mut self, value: impl Into<Fragment>) -> BuildResult<SwitchBuilder<Self>> {
        let scope = self.scope_id();
        let index = self.flow().begin_switch(scope, value.into())?;
        Ok(SwitchBuilder::new(self, index))
    }

    /// Open an exception region; returns its protected body
    fn try_block(mut self) -> TryScope<Self> {
        let scope = self.scope_id();
        let (index, body) = self.flow().begin_try(scope);
        TryScope::new(self, index, body)
    }

    /// Bind `var_name` to a resource and open a body that disposes it on
    /// every exit
    fn using_resource(
        mut self,
        var_name: &str,
        ty: Type,
        producer: impl Into<Fragment>,
    ) -> BuildResult<ResourceBody<Self>> {
        let scope = self.scope_id();
        let body = self
            .flow()
            .begin_using(scope, var_name, ty, producer.into())?;
        Ok(ResourceBody::new(self, body))
    }

    /// Leave the innermost enclosing loop
    fn break_loop(mut self) -> BuildResult<Self> {
        let scope = self.scope_id();
        self.flow().jump_loop(scope, LoopJump::Break)?;
        Ok(self)
    }

    /// Start the next iteration of the innermost enclosing loop
    fn continue_loop(mut self) -> BuildResult<Self> {
        let scope = self.scope_id();
        self.flow().jump_loop(scope, LoopJump::Continue)?;
        Ok(self)
    }

    /// Return `value`. `ty` must be the builder's return type.
    fn return_value(mut self, ty: Type, value: impl Into<Fragment>) -> BuildResult<Self> {
        let scope = self.scope_id();
        self.flow().append_return(scope, ty, Some(value.into()))?;
        Ok(self)
    }

    /// Return without a value
    fn return_void(mut self) -> BuildResult<Self> {
        let scope = self.scope_id();
        self.flow().append_return(scope, Type::Void, None)?;
        Ok(self)
    }

    /// Jump to a user label. The label may be inserted later; it is looked
    /// up at assembly.
    fn goto_label(mut self, name: &str) -> Self {
        let scope = self.scope_id();
        trace!(scope = scope.0, label = name, "deferred goto");
        self.flow().push(scope, Stmt::Goto(name.to_string()));
        self
    }

    /// Mark a user label at this point
    fn insert_label(mut self, name: &str) -> BuildResult<Self> {
        let scope = self.scope_id();
        self.flow().insert_label(scope, name)?;
        Ok(self)
    }

    /// Raise a reference value as an exception
    fn throw_value(mut self, value: impl Into<Fragment>) -> BuildResult<Self> {
        let scope = self.scope_id();
        self.flow().throw_value(scope, value.into())?;
        Ok(self)
    }

    /// Re-raise the exception being handled. Only legal inside a catch body.
    fn rethrow(mut self) -> BuildResult<Self> {
        let scope = self.scope_id();
        let flow = self.flow();
        if !flow.rethrow_allowed(scope) {
            return Err(BuildError::NoEnclosingCatch);
        }
        flow.push(scope, Stmt::Node(Node::Rethrow));
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopJump {
    Break,
    Continue,
}

impl FlowBuilder {
    pub(crate) fn assign(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: Type,
        fragment: Fragment,
    ) -> BuildResult<()> {
        // Rewrite first so the fragment can never bind the symbol it creates
        let value = self.rewrite(scope, fragment)?;
        expect_type(&ty, &value)?;
        let target = match self.lookup(scope, name).cloned() {
            Some(existing) if existing.ty != ty => {
                return Err(BuildError::TypeMismatch {
                    expected: existing.ty,
                    found: ty,
                });
            }
            Some(existing) => existing,
            None => self.bind(scope, name, ty, false)?,
        };
        self.push(scope, Stmt::Node(Node::Assign { target, value }));
        Ok(())
    }

    pub(crate) fn jump_loop(&mut self, scope: ScopeId, jump: LoopJump) -> BuildResult<()> {
        let target = match (self.enclosing_loop(scope), jump) {
            (Some(data), LoopJump::Break) => data.end.clone(),
            (Some(data), LoopJump::Continue) => data.start.clone(),
            (None, LoopJump::Break) => {
                return Err(BuildError::NoEnclosingLoop { statement: "break" })
            }
            (None, LoopJump::Continue) => {
                return Err(BuildError::NoEnclosingLoop {
                    statement: "continue",
                })
            }
        };
        self.push(scope, Stmt::Node(Node::goto(&target)));
        Ok(())
    }

    pub(crate) fn append_return(
        &mut self,
        scope: ScopeId,
        ty: Type,
        value: Option<Fragment>,
    ) -> BuildResult<()> {
        let expected = self.return_label.ty.clone();
        if ty != expected {
            return Err(BuildError::ReturnTypeMismatch {
                expected,
                found: ty,
            });
        }
        let value = match value {
            Some(fragment) => {
                let value = self.rewrite(scope, fragment)?;
                let found = value.ty();
                let null_ok = value.is_null() && expected.is_reference();
                if found != expected && !null_ok {
                    return Err(BuildError::ReturnTypeMismatch { expected, found });
                }
                Some(value)
            }
            None if !expected.is_void() => {
                return Err(BuildError::ReturnTypeMismatch {
                    expected,
                    found: Type::Void,
                });
            }
            None => None,
        };
        let target = self.return_label.clone();
        self.push(scope, Stmt::Node(Node::Goto { target, value }));
        Ok(())
    }

    pub(crate) fn insert_label(&mut self, scope: ScopeId, name: &str) -> BuildResult<()> {
        if self.labels.contains_key(name) {
            return Err(BuildError::DuplicateLabel {
                name: name.to_string(),
            });
        }
        let id = self.fresh_label().id;
        let target = LabelTarget::user(id, name);
        self.labels.insert(name.to_string(), target.clone());
        self.push(scope, Stmt::Node(Node::label(&target)));
        trace!(scope = scope.0, label = %target, "inserted label");
        Ok(())
    }

    pub(crate) fn throw_value(&mut self, scope: ScopeId, fragment: Fragment) -> BuildResult<()> {
        let value = self.rewrite(scope, fragment)?;
        let found = value.ty();
        if !found.is_reference() {
            return Err(BuildError::TypeMismatch {
                expected: Type::Any,
                found,
            });
        }
        self.push(scope, Stmt::Node(Node::Throw(value)));
        Ok(())
    }
}

/// Handle onto the top-level scope of a [`FlowBuilder`]
pub struct Body<'b> {
    flow: &'b mut FlowBuilder,
    scope: ScopeId,
}

impl<'b> Body<'b> {
    pub(crate) fn new(flow: &'b mut FlowBuilder, scope: ScopeId) -> Self {
        Self { flow, scope }
    }

    /// Give the builder back, e.g. to assemble it
    pub fn end(self) -> &'b mut FlowBuilder {
        self.flow
    }
}

impl Handle for Body<'_> {
    fn flow(&mut self) -> &mut FlowBuilder {
        &mut *self.flow
    }

    fn flow_ref(&self) -> &FlowBuilder {
        &*self.flow
    }
}

impl Block for Body<'_> {
    fn scope_id(&self) -> ScopeId {
        self.scope
    }
}
