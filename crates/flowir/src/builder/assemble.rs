//! Assembly
//!
//! A pure fold from the builder's current state into IR. Deferred gotos are
//! resolved against the label registry here, and completeness of switches
//! and exception regions is checked here. Nothing is mutated, so assembling
//! an unchanged builder twice yields equal trees.

use super::conditional::{Alternative, Conditional};
use super::resource::cleanup_region;
use super::{Construct, FlowBuilder, ScopeId, Stmt};
use crate::error::{BuildError, BuildResult};
use crate::ir::{
    Artifact, CatchHandler, Constant, Expr, Intrinsic, Node, Symbol, SwitchCase,
};
use tracing::debug;

impl FlowBuilder {
    /// Assemble the whole procedure
    pub fn assemble(&self) -> BuildResult<Artifact> {
        debug!(
            name = %self.options.name,
            scopes = self.scopes.len(),
            labels = self.labels.len(),
            "assembling"
        );
        let top = self.fold_scope(Self::TOP)?;
        let ret = Node::Label {
            target: self.return_label.clone(),
            default: Constant::zero(&self.return_label.ty),
        };
        let artifact = Artifact {
            name: self.options.name.clone(),
            params: self.params.clone(),
            return_type: self.return_label.ty.clone(),
            return_label: self.return_label.clone(),
            body: Node::Block {
                locals: Vec::new(),
                body: vec![top, ret],
            },
        };
        debug!(
            name = %artifact.name,
            nodes = artifact.body.count(&|_| true),
            "assembled"
        );
        Ok(artifact)
    }

    /// Assemble a single scope
    pub fn assemble_scope(&self, scope: ScopeId) -> BuildResult<Node> {
        if !self.has_scope(scope) {
            return Err(BuildError::UnknownScope { id: scope.as_u32() });
        }
        self.fold_scope(scope)
    }

    fn fold_scope(&self, scope: ScopeId) -> BuildResult<Node> {
        self.fold_scope_with(scope, None)
    }

    /// Fold `scope`, optionally placing `prefix` before its statements
    fn fold_scope_with(&self, scope: ScopeId, prefix: Option<Node>) -> BuildResult<Node> {
        let data = self.scope(scope);
        let mut body = Vec::with_capacity(data.stmts.len() + 1);
        body.extend(prefix);
        for stmt in &data.stmts {
            body.push(self.fold_stmt(stmt)?);
        }
        Ok(collapse(data.locals.clone(), body))
    }

    fn fold_stmt(&self, stmt: &Stmt) -> BuildResult<Node> {
        match stmt {
            Stmt::Node(node) => Ok(node.clone()),
            Stmt::Goto(name) => {
                let target = self
                    .labels
                    .get(name)
                    .ok_or_else(|| BuildError::UnknownLabel { name: name.clone() })?;
                Ok(Node::goto(target))
            }
            Stmt::Construct(construct) => self.fold_construct(*construct),
        }
    }

    fn fold_construct(&self, construct: Construct) -> BuildResult<Node> {
        match construct {
            Construct::Conditional(index) => self.fold_conditional(&self.conditionals[index]),
            Construct::Loop(index) => self.fold_loop(index),
            Construct::Iteration(index) => self.fold_iteration(index),
            Construct::Switch(index) => self.fold_switch(index),
            Construct::Try(index) => self.fold_try(index),
            Construct::Resource(index) => {
                let region = &self.resources[index];
                let body = self.fold_scope(region.body)?;
                Ok(cleanup_region(&region.resource, region.producer.clone(), body))
            }
        }
    }

    fn fold_conditional(&self, conditional: &Conditional) -> BuildResult<Node> {
        let then_branch = self.fold_scope(conditional.then_scope)?;
        let else_branch = match conditional.alternative {
            Alternative::None => Node::Nop,
            Alternative::Else(scope) => self.fold_scope(scope)?,
            Alternative::ElseIf(chained) => self.fold_conditional(&self.conditionals[chained])?,
        };
        Ok(Node::if_else(
            conditional.test.clone(),
            then_branch,
            else_branch,
        ))
    }

    fn fold_loop(&self, index: usize) -> BuildResult<Node> {
        let data = &self.loops[index];
        let body = self.fold_scope(data.body)?;
        debug!(
            break_label = %data.end,
            continue_label = %data.start,
            check_at_start = data.check_at_start,
            "folding loop"
        );
        Ok(Node::Loop {
            body: Box::new(Node::if_else(
                data.condition.clone(),
                body,
                Node::goto(&data.end),
            )),
            break_label: data.end.clone(),
            continue_label: data.start.clone(),
        })
    }

    fn fold_iteration(&self, index: usize) -> BuildResult<Node> {
        let iteration = &self.iterations[index];
        let driver = self.fold_loop(iteration.driver)?;
        let producer = Expr::intrinsic(Intrinsic::GetIterator, vec![iteration.collection.clone()]);
        let iterator = &iteration.iterator;
        if iterator.ty.is_disposable() {
            return Ok(cleanup_region(iterator, producer, driver));
        }
        Ok(Node::Block {
            locals: vec![iterator.clone()],
            body: vec![
                Node::Assign {
                    target: iterator.clone(),
                    value: producer,
                },
                driver,
            ],
        })
    }

    fn fold_switch(&self, index: usize) -> BuildResult<Node> {
        let switch = &self.switches[index];
        if switch.groups.is_empty() {
            // A lone default needs no branch at all
            return match switch.default {
                Some(default) => self.fold_scope(default),
                None => Err(BuildError::EmptyBranch),
            };
        }

        let mut cases = Vec::with_capacity(switch.groups.len());
        let mut falls_through = false;
        for group in &switch.groups {
            let body = match group.body {
                Some(scope) if !self.scope(scope).is_empty() => self.fold_scope(scope)?,
                _ => match &switch.fall {
                    Some(fall) => {
                        falls_through = true;
                        Node::goto(fall)
                    }
                    None => Node::Nop,
                },
            };
            cases.push(SwitchCase {
                values: group.values.clone(),
                body,
            });
        }

        let default = match (switch.default, &switch.fall) {
            (Some(scope), Some(fall)) if falls_through => {
                Some(self.fold_scope_with(scope, Some(Node::label(fall)))?)
            }
            (Some(scope), _) => Some(self.fold_scope(scope)?),
            (None, _) => None,
        };
        Ok(Node::Switch {
            value: switch.value.clone(),
            cases,
            default: default.map(Box::new),
        })
    }

    fn fold_try(&self, index: usize) -> BuildResult<Node> {
        self.check_try(index)?;
        let region = &self.tries[index];
        let body = self.fold_scope(region.body)?;
        let handlers = region
            .catches
            .iter()
            .map(|catch| {
                Ok(CatchHandler {
                    kind: catch.kind.clone(),
                    binding: catch.binding.clone(),
                    body: self.fold_scope(catch.body)?,
                })
            })
            .collect::<BuildResult<Vec<_>>>()?;
        let finally = match region.finally {
            Some(scope) => Some(Box::new(self.fold_scope(scope)?)),
            None => None,
        };
        Ok(Node::Try {
            body: Box::new(body),
            handlers,
            finally,
        })
    }
}

/// Fold statements and owned symbols into one node
fn collapse(locals: Vec<Symbol>, mut body: Vec<Node>) -> Node {
    if locals.is_empty() {
        match body.len() {
            0 => return Node::Nop,
            1 => return body.remove(0),
            _ => {}
        }
    }
    Node::Block { locals, body }
}
