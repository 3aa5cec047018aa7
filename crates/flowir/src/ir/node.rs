//! Control-Flow IR Nodes
//!
//! The assembled tree is a single tagged union. Children are owned and
//! boxed; jumps refer to labels by value, so there are no back-pointers.

use super::expr::{Constant, Expr};
use super::symbol::{LabelId, LabelTarget, Symbol};
use super::types::Type;

/// One arm of a multi-way branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchCase {
    /// Values that select this arm (never empty)
    pub values: Vec<Expr>,
    /// Arm body
    pub body: Node,
}

/// One handler of an exception region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchHandler {
    /// Exception kind this handler accepts
    pub kind: Type,
    /// Symbol bound to the caught exception, if any
    pub binding: Option<Symbol>,
    /// Handler body
    pub body: Node,
}

/// Assembled IR node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Does nothing
    Nop,
    /// Evaluate an expression for its effects
    Eval(Expr),
    /// Store a value into a symbol
    Assign { target: Symbol, value: Expr },
    /// Sequence with locally owned symbols
    Block { locals: Vec<Symbol>, body: Vec<Node> },
    /// Two-way conditional (the false branch is `Nop` when absent)
    If {
        test: Expr,
        then_branch: Box<Node>,
        else_branch: Box<Node>,
    },
    /// Unbounded loop. A jump to `break_label` leaves it; a jump to
    /// `continue_label` starts the next iteration.
    Loop {
        body: Box<Node>,
        break_label: LabelTarget,
        continue_label: LabelTarget,
    },
    /// Label marker; when reached by fall-through it yields `default`
    Label {
        target: LabelTarget,
        default: Option<Constant>,
    },
    /// Unconditional jump, optionally carrying a value to the label
    Goto {
        target: LabelTarget,
        value: Option<Expr>,
    },
    /// Multi-way branch without implicit fall-through
    Switch {
        value: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Box<Node>>,
    },
    /// Protected region with handlers and an optional cleanup
    Try {
        body: Box<Node>,
        handlers: Vec<CatchHandler>,
        finally: Option<Box<Node>>,
    },
    /// Raise an exception value
    Throw(Expr),
    /// Re-raise the exception being handled
    Rethrow,
}

impl Node {
    /// Build an `If` node
    pub fn if_else(test: Expr, then_branch: Node, else_branch: Node) -> Self {
        Node::If {
            test,
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    /// Jump without a value
    pub fn goto(target: &LabelTarget) -> Self {
        Node::Goto {
            target: target.clone(),
            value: None,
        }
    }

    /// Label marker without a fall-through value
    pub fn label(target: &LabelTarget) -> Self {
        Node::Label {
            target: target.clone(),
            default: None,
        }
    }

    /// Is this a no-op?
    pub fn is_nop(&self) -> bool {
        matches!(self, Node::Nop)
    }

    /// Direct child nodes, in execution order
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Nop
            | Node::Eval(_)
            | Node::Assign { .. }
            | Node::Label { .. }
            | Node::Goto { .. }
            | Node::Throw(_)
            | Node::Rethrow => vec![],
            Node::Block { body, .. } => body.iter().collect(),
            Node::If {
                then_branch,
                else_branch,
                ..
            } => vec![&**then_branch, &**else_branch],
            Node::Loop { body, .. } => vec![&**body],
            Node::Switch { cases, default, .. } => {
                let mut out: Vec<&Node> = cases.iter().map(|c| &c.body).collect();
                if let Some(d) = default {
                    out.push(d);
                }
                out
            }
            Node::Try {
                body,
                handlers,
                finally,
            } => {
                let mut out: Vec<&Node> = vec![&**body];
                out.extend(handlers.iter().map(|h| &h.body));
                if let Some(f) = finally {
                    out.push(f);
                }
                out
            }
        }
    }

    /// Does this subtree contain the marker of `label`?
    pub fn defines_label(&self, label: LabelId) -> bool {
        match self {
            Node::Label { target, .. } => target.id == label,
            other => other.children().iter().any(|c| c.defines_label(label)),
        }
    }

    /// Count nodes in this subtree matching `pred`
    pub fn count(&self, pred: &dyn Fn(&Node) -> bool) -> usize {
        let own = usize::from(pred(self));
        own + self.children().iter().map(|c| c.count(pred)).sum::<usize>()
    }
}

/// The assembled procedure body handed to a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Procedure name (from the builder options)
    pub name: String,
    /// Parameters, in declaration order
    pub params: Vec<Symbol>,
    /// Fixed return type
    pub return_type: Type,
    /// Label every return jumps to
    pub return_label: LabelTarget,
    /// Rooted body, ending with the return label marker
    pub body: Node,
}

impl Artifact {
    /// Number of parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}
