//! Resource regions (using)
//!
//! A resource is bound once from its producer and disposed on every exit
//! from the body. The same cleanup wrapper disposes the iterator of a
//! disposable iteration.

use super::{expect_type, Block, Construct, FlowBuilder, Handle, ScopeId, Stmt};
use crate::error::{BuildError, BuildResult};
use crate::ir::{Expr, Intrinsic, Node, Symbol, Type};
use crate::rewrite::Fragment;

#[derive(Debug, Clone)]
pub(crate) struct ResourceRegion {
    pub(crate) resource: Symbol,
    pub(crate) producer: Expr,
    pub(crate) body: ScopeId,
}

impl FlowBuilder {
    pub(crate) fn begin_using(
        &mut self,
        scope: ScopeId,
        var_name: &str,
        ty: Type,
        producer: Fragment,
    ) -> BuildResult<ScopeId> {
        let producer = self.rewrite(scope, producer)?;
        expect_type(&ty, &producer)?;
        if self.lookup(scope, var_name).is_some() {
            return Err(BuildError::NameConflict {
                name: var_name.to_string(),
            });
        }
        let body = self.new_scope(Some(scope), None, false);
        let resource = self.bind(body, var_name, ty, true)?;
        let index = self.resources.len();
        self.resources.push(ResourceRegion {
            resource,
            producer,
            body,
        });
        self.push(scope, Stmt::Construct(Construct::Resource(index)));
        Ok(body)
    }
}

/// Dispose `resource`, behind a null check when it is reference-like
pub(crate) fn dispose(resource: &Symbol) -> Node {
    let call = Node::Eval(Expr::intrinsic(Intrinsic::Dispose, vec![Expr::var(resource)]));
    if resource.ty.is_reference() {
        let present = Expr::var(resource).not_equals(Expr::null(resource.ty.clone()));
        Node::if_else(present, call, Node::Nop)
    } else {
        call
    }
}

/// Bind `resource` from `producer`, then run `body` with a cleanup that
/// disposes it on every exit
pub(crate) fn cleanup_region(resource: &Symbol, producer: Expr, body: Node) -> Node {
    Node::Block {
        locals: vec![resource.clone()],
        body: vec![
            Node::Assign {
                target: resource.clone(),
                value: producer,
            },
            Node::Try {
                body: Box::new(body),
                handlers: Vec::new(),
                finally: Some(Box::new(dispose(resource))),
            },
        ],
    }
}

/// Handle onto a resource region's body
pub struct ResourceBody<P> {
    parent: P,
    scope: ScopeId,
}

impl<P: Block> ResourceBody<P> {
    pub(crate) fn new(parent: P, scope: ScopeId) -> Self {
        Self { parent, scope }
    }

    pub fn end(self) -> P {
        self.parent
    }
}

impl<P: Block> Handle for ResourceBody<P> {
    fn flow(&mut self) -> &mut FlowBuilder {
        self.parent.flow()
    }

    fn flow_ref(&self) -> &FlowBuilder {
        self.parent.flow_ref()
    }
}

impl<P: Block> Block for ResourceBody<P> {
    fn scope_id(&self) -> ScopeId {
        self.scope
    }
}
