//! Conditionals (if / else if / else)

use super::{expect_type, Block, Construct, FlowBuilder, Handle, ScopeId, Stmt};
use crate::error::{BuildError, BuildResult};
use crate::ir::{Expr, Type};
use crate::rewrite::Fragment;

/// False branch of a conditional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Alternative {
    None,
    Else(ScopeId),
    /// Index of the chained conditional
    ElseIf(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct Conditional {
    pub(crate) test: Expr,
    pub(crate) then_scope: ScopeId,
    pub(crate) alternative: Alternative,
}

impl FlowBuilder {
    pub(crate) fn begin_if(
        &mut self,
        scope: ScopeId,
        test: Fragment,
    ) -> BuildResult<(usize, ScopeId)> {
        let (index, then_scope) = self.new_conditional(scope, test)?;
        self.push(scope, Stmt::Construct(Construct::Conditional(index)));
        Ok((index, then_scope))
    }

    /// Allocate a conditional whose branches look up through `outer`
    fn new_conditional(&mut self, outer: ScopeId, test: Fragment) -> BuildResult<(usize, ScopeId)> {
        let test = self.rewrite(outer, test)?;
        expect_type(&Type::Bool, &test)?;
        let then_scope = self.new_scope(Some(outer), None, false);
        let index = self.conditionals.len();
        self.conditionals.push(Conditional {
            test,
            then_scope,
            alternative: Alternative::None,
        });
        Ok((index, then_scope))
    }

    fn check_no_alternative(&self, index: usize) -> BuildResult<()> {
        match self.conditionals[index].alternative {
            Alternative::None => Ok(()),
            _ => Err(BuildError::AlreadyHasAlternative),
        }
    }

    pub(crate) fn add_else(&mut self, index: usize, outer: ScopeId) -> BuildResult<ScopeId> {
        self.check_no_alternative(index)?;
        let scope = self.new_scope(Some(outer), None, false);
        self.conditionals[index].alternative = Alternative::Else(scope);
        Ok(scope)
    }

    pub(crate) fn add_else_if(
        &mut self,
        index: usize,
        outer: ScopeId,
        test: Fragment,
    ) -> BuildResult<(usize, ScopeId)> {
        self.check_no_alternative(index)?;
        let (chained, then_scope) = self.new_conditional(outer, test)?;
        self.conditionals[index].alternative = Alternative::ElseIf(chained);
        Ok((chained, then_scope))
    }
}

/// Handle onto one branch of a conditional chain
///
/// `else_if` moves the handle onto the chained conditional; `end` always
/// returns the scope the chain started in.
pub struct Branch<P> {
    parent: P,
    conditional: usize,
    scope: ScopeId,
}

impl<P: Block> Branch<P> {
    pub(crate) fn new(parent: P, conditional: usize, scope: ScopeId) -> Self {
        Self {
            parent,
            conditional,
            scope,
        }
    }

    /// Open the final false branch
    pub fn else_(mut self) -> BuildResult<Self> {
        let outer = self.parent.scope_id();
        let conditional = self.conditional;
        self.scope = self.flow().add_else(conditional, outer)?;
        Ok(self)
    }

    /// Chain another test as the false branch; returns its true branch
    pub fn else_if(mut self, test: impl Into<Fragment>) -> BuildResult<Self> {
        let outer = self.parent.scope_id();
        let conditional = self.conditional;
        let (chained, scope) = self.flow().add_else_if(conditional, outer, test.into())?;
        self.conditional = chained;
        self.scope = scope;
        Ok(self)
    }

    pub fn end(self) -> P {
        self.parent
    }
}

impl<P: Block> Handle for Branch<P> {
    fn flow(&mut self) -> &mut FlowBuilder {
        self.parent.flow()
    }

    fn flow_ref(&self) -> &FlowBuilder {
        self.parent.flow_ref()
    }
}

impl<P: Block> Block for Branch<P> {
    fn scope_id(&self) -> ScopeId {
        self.scope
    }
}
