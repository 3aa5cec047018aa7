//! Multi-way branches (switch / case / default)

use super::{expect_type, Block, Construct, FlowBuilder, Handle, ScopeId, Stmt};
use crate::error::{BuildError, BuildResult};
use crate::ir::{Expr, LabelTarget};
use crate::rewrite::Fragment;

#[derive(Debug, Clone)]
pub(crate) struct CaseGroup {
    /// Match values (never empty)
    pub(crate) values: Vec<Expr>,
    /// Body, allocated when the group is begun
    pub(crate) body: Option<ScopeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct Switch {
    pub(crate) value: Expr,
    pub(crate) groups: Vec<CaseGroup>,
    pub(crate) default: Option<ScopeId>,
    /// Marks the default body; empty groups jump here
    pub(crate) fall: Option<LabelTarget>,
}

impl FlowBuilder {
    pub(crate) fn begin_switch(&mut self, scope: ScopeId, value: Fragment) -> BuildResult<usize> {
        let value = self.rewrite(scope, value)?;
        let index = self.switches.len();
        self.switches.push(Switch {
            value,
            groups: Vec::new(),
            default: None,
            fall: None,
        });
        self.push(scope, Stmt::Construct(Construct::Switch(index)));
        Ok(index)
    }

    fn case_value(&self, index: usize, outer: ScopeId, value: Fragment) -> BuildResult<Expr> {
        let value = self.rewrite(outer, value)?;
        expect_type(&self.switches[index].value.ty(), &value)?;
        Ok(value)
    }

    pub(crate) fn add_case(
        &mut self,
        index: usize,
        outer: ScopeId,
        value: Fragment,
    ) -> BuildResult<usize> {
        let value = self.case_value(index, outer, value)?;
        let groups = &mut self.switches[index].groups;
        groups.push(CaseGroup {
            values: vec![value],
            body: None,
        });
        Ok(groups.len() - 1)
    }

    pub(crate) fn add_case_value(
        &mut self,
        index: usize,
        group: usize,
        outer: ScopeId,
        value: Fragment,
    ) -> BuildResult<()> {
        let value = self.case_value(index, outer, value)?;
        self.switches[index].groups[group].values.push(value);
        Ok(())
    }

    pub(crate) fn begin_case(&mut self, index: usize, group: usize, outer: ScopeId) -> ScopeId {
        if let Some(body) = self.switches[index].groups[group].body {
            return body;
        }
        let body = self.new_scope(Some(outer), None, false);
        self.switches[index].groups[group].body = Some(body);
        body
    }

    pub(crate) fn begin_default(&mut self, index: usize, outer: ScopeId) -> BuildResult<ScopeId> {
        if self.switches[index].default.is_some() {
            return Err(BuildError::DuplicateDefault);
        }
        let body = self.new_scope(Some(outer), None, false);
        let fall = self.fresh_label();
        let switch = &mut self.switches[index];
        switch.default = Some(body);
        switch.fall = Some(fall);
        Ok(body)
    }
}

/// Handle onto a multi-way branch
pub struct SwitchBuilder<P> {
    parent: P,
    index: usize,
}

impl<P: Block> SwitchBuilder<P> {
    pub(crate) fn new(parent: P, index: usize) -> Self {
        Self { parent, index }
    }

    /// Start a new case group matching `value`
    pub fn case(mut self, value: impl Into<Fragment>) -> BuildResult<CaseBuilder<P>> {
        let outer = self.parent.scope_id();
        let index = self.index;
        let group = self.flow().add_case(index, outer, value.into())?;
        Ok(CaseBuilder {
            switch: self,
            group,
        })
    }

    /// Open the default body. At most one per switch.
    pub fn default(mut self) -> BuildResult<CaseBody<P>> {
        let outer = self.parent.scope_id();
        let index = self.index;
        let scope = self.flow().begin_default(index, outer)?;
        Ok(CaseBody {
            switch: self,
            scope,
        })
    }

    pub fn end(self) -> P {
        self.parent
    }
}

impl<P: Block> Handle for SwitchBuilder<P> {
    fn flow(&mut self) -> &mut FlowBuilder {
        self.parent.flow()
    }

    fn flow_ref(&self) -> &FlowBuilder {
        self.parent.flow_ref()
    }
}

/// A case group whose match values are still being collected
pub struct CaseBuilder<P> {
    switch: SwitchBuilder<P>,
    group: usize,
}

impl<P: Block> CaseBuilder<P> {
    /// Add another match value to this group
    pub fn case(mut self, value: impl Into<Fragment>) -> BuildResult<Self> {
        let outer = self.switch.parent.scope_id();
        let (index, group) = (self.switch.index, self.group);
        self.switch
            .flow()
            .add_case_value(index, group, outer, value.into())?;
        Ok(self)
    }

    /// Open this group's body
    pub fn begin(mut self) -> CaseBody<P> {
        let outer = self.switch.parent.scope_id();
        let (index, group) = (self.switch.index, self.group);
        let scope = self.switch.flow().begin_case(index, group, outer);
        CaseBody {
            switch: self.switch,
            scope,
        }
    }

    /// Leave the group with an empty body; it falls through to the default
    pub fn end(self) -> SwitchBuilder<P> {
        self.switch
    }
}

/// Body of a case group or of the default
pub struct CaseBody<P> {
    switch: SwitchBuilder<P>,
    scope: ScopeId,
}

impl<P: Block> CaseBody<P> {
    pub fn end(self) -> SwitchBuilder<P> {
        self.switch
    }
}

impl<P: Block> Handle for CaseBody<P> {
    fn flow(&mut self) -> &mut FlowBuilder {
        self.switch.flow()
    }

    fn flow_ref(&self) -> &FlowBuilder {
        self.switch.flow_ref()
    }
}

impl<P: Block> Block for CaseBody<P> {
    fn scope_id(&self) -> ScopeId {
        self.scope
    }
}
