//! Loops and iteration
//!
//! Both loop shapes share one representation. A post-test loop differs only
//! in its body starting with an entry label that the enclosing scope jumps
//! to right before the loop, so the first condition test is skipped.
//!
//! Iteration is built on top of a pre-test loop driven by an anonymous
//! iterator symbol.

use super::{expect_type, Block, Construct, FlowBuilder, Handle, ScopeId, Stmt};
use crate::error::{BuildError, BuildResult};
use crate::ir::{Expr, Intrinsic, LabelTarget, Node, Symbol, Type};
use crate::rewrite::Fragment;
use tracing::trace;

#[derive(Debug, Clone)]
pub(crate) struct LoopData {
    pub(crate) condition: Expr,
    pub(crate) check_at_start: bool,
    /// Continue target
    pub(crate) start: LabelTarget,
    /// Break target
    pub(crate) end: LabelTarget,
    /// First statement of a post-test body
    pub(crate) entry: LabelTarget,
    pub(crate) body: ScopeId,
}

#[derive(Debug, Clone)]
pub(crate) struct Iteration {
    pub(crate) iterator: Symbol,
    pub(crate) collection: Expr,
    /// Index of the driving loop
    pub(crate) driver: usize,
}

impl FlowBuilder {
    pub(crate) fn begin_loop(
        &mut self,
        scope: ScopeId,
        condition: Fragment,
        check_at_start: bool,
    ) -> BuildResult<ScopeId> {
        let condition = self.rewrite(scope, condition)?;
        expect_type(&Type::Bool, &condition)?;
        let (index, body) = self.new_loop(scope, condition, check_at_start);
        if !check_at_start {
            let entry = self.loops[index].entry.clone();
            self.push(scope, Stmt::Node(Node::goto(&entry)));
        }
        self.push(scope, Stmt::Construct(Construct::Loop(index)));
        Ok(body)
    }

    fn new_loop(&mut self, outer: ScopeId, condition: Expr, check_at_start: bool) -> (usize, ScopeId) {
        let index = self.loops.len();
        let body = self.new_scope(Some(outer), Some(index), false);
        let start = self.fresh_label();
        let end = self.fresh_label();
        let entry = self.fresh_label();
        if !check_at_start {
            self.push(body, Stmt::Node(Node::label(&entry)));
        }
        trace!(
            scope = outer.0,
            break_label = %end,
            continue_label = %start,
            check_at_start,
            "opened loop"
        );
        self.loops.push(LoopData {
            condition,
            check_at_start,
            start,
            end,
            entry,
            body,
        });
        (index, body)
    }

    pub(crate) fn begin_for_each(
        &mut self,
        scope: ScopeId,
        var_name: &str,
        var_type: Type,
        collection: Fragment,
    ) -> BuildResult<ScopeId> {
        let collection = self.rewrite(scope, collection)?;
        let collection_type = collection.ty();
        let iterator_type = collection_type
            .iterator_type()
            .ok_or_else(|| BuildError::NotIterable {
                ty: collection_type.clone(),
            })?;
        let element_type = match iterator_type.element_type() {
            Some(elem) => elem.clone(),
            None => return Err(BuildError::NotIterable { ty: collection_type }),
        };
        if !element_type.converts_to(&var_type) {
            return Err(BuildError::TypeMismatch {
                expected: var_type,
                found: element_type,
            });
        }
        if self.lookup(scope, var_name).is_some() {
            return Err(BuildError::NameConflict {
                name: var_name.to_string(),
            });
        }

        let iterator = self.fresh_symbol(None, iterator_type);
        let condition = Expr::intrinsic(Intrinsic::MoveNext, vec![Expr::var(&iterator)]);
        let (driver, body) = self.new_loop(scope, condition, true);

        let variable = self.bind(body, var_name, var_type.clone(), false)?;
        let mut current = Expr::intrinsic(Intrinsic::Current, vec![Expr::var(&iterator)]);
        if var_type != element_type {
            current = current.convert(var_type);
        }
        self.push(
            body,
            Stmt::Node(Node::Assign {
                target: variable,
                value: current,
            }),
        );

        let index = self.iterations.len();
        self.iterations.push(Iteration {
            iterator,
            collection,
            driver,
        });
        self.push(scope, Stmt::Construct(Construct::Iteration(index)));
        Ok(body)
    }
}

/// Handle onto a loop body
pub struct LoopBody<P> {
    parent: P,
    scope: ScopeId,
}

impl<P: Block> LoopBody<P> {
    pub(crate) fn new(parent: P, scope: ScopeId) -> Self {
        Self { parent, scope }
    }

    pub fn end(self) -> P {
        self.parent
    }
}

impl<P: Block> Handle for LoopBody<P> {
    fn flow(&mut self) -> &mut FlowBuilder {
        self.parent.flow()
    }

    fn flow_ref(&self) -> &FlowBuilder {
        self.parent.flow_ref()
    }
}

impl<P: Block> Block for LoopBody<P> {
    fn scope_id(&self) -> ScopeId {
        self.scope
    }
}
