//! Tree-walking interpreter for assembled artifacts
//!
//! Every node executes to a [`Flow`]: normal completion with a value, a jump
//! to a label, or a raised exception. Jumps propagate outwards until a node
//! owns the target: loops own their break and continue labels, and any node
//! whose subtree contains a label marker re-enters itself in *seek* mode,
//! descending straight to the marker without running anything before it.

use crate::error::{EvalError, EvalResult};
use crate::host::HostFunctions;
use crate::value::{Cursor, Value};
use flowir::{
    Artifact, BinaryOp, CatchHandler, Constant, Expr, Intrinsic, LabelId, Node, SwitchCase,
    SymbolId, Type, UnaryOp,
};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};

/// Default bound on executed nodes per run
pub const DEFAULT_STEP_LIMIT: u64 = 1_000_000;

/// How a node finished
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal(Value),
    Jump(LabelId, Option<Value>),
    Throw(Value),
}

/// A pending jump target being descended into
#[derive(Debug, Clone)]
struct Seek {
    label: LabelId,
    value: Option<Value>,
}

macro_rules! value_or_raise {
    ($interp:expr, $expr:expr) => {
        match $interp.eval($expr) {
            Ok(value) => value,
            Err(EvalError::Thrown(value)) => return Ok(Flow::Throw(value)),
            Err(err) => return Err(err),
        }
    };
}

/// Reference interpreter
#[derive(Debug)]
pub struct Interpreter {
    env: FxHashMap<SymbolId, Value>,
    host: HostFunctions,
    /// Exceptions being handled, innermost last
    handling: Vec<Value>,
    /// One entry per dispose, in order
    dispose_log: Vec<String>,
    steps: u64,
    step_limit: u64,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_host(HostFunctions::new())
    }

    pub fn with_host(host: HostFunctions) -> Self {
        Self {
            env: FxHashMap::default(),
            host,
            handling: Vec::new(),
            dispose_log: Vec::new(),
            steps: 0,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn host_mut(&mut self) -> &mut HostFunctions {
        &mut self.host
    }

    /// Names of values disposed by the latest run, in dispose order
    pub fn dispose_log(&self) -> &[String] {
        &self.dispose_log
    }

    /// Execute `artifact` with `args` bound to its parameters
    pub fn run(&mut self, artifact: &Artifact, args: &[Value]) -> EvalResult<Value> {
        if args.len() != artifact.param_count() {
            return Err(EvalError::ArityMismatch {
                expected: artifact.param_count(),
                found: args.len(),
            });
        }
        self.env.clear();
        self.handling.clear();
        self.dispose_log.clear();
        self.steps = 0;
        for (param, arg) in artifact.params.iter().zip(args) {
            self.env.insert(param.id, arg.clone());
        }
        debug!(name = %artifact.name, args = args.len(), "running artifact");

        let result = match self.exec(&artifact.body)? {
            Flow::Normal(value) => Ok(value),
            Flow::Jump(label, value) if label == artifact.return_label.id => {
                Ok(value.unwrap_or(Value::Void))
            }
            Flow::Jump(label, _) => Err(EvalError::EscapedJump(label)),
            Flow::Throw(value) => Err(EvalError::Uncaught(value)),
        };
        debug!(name = %artifact.name, steps = self.steps, ok = result.is_ok(), "finished");
        result
    }

    /// Execute a single node
    pub fn exec(&mut self, node: &Node) -> EvalResult<Flow> {
        self.exec_at(node, None)
    }

    fn tick(&mut self) -> EvalResult<()> {
        self.steps += 1;
        if self.steps > self.step_limit {
            return Err(EvalError::StepLimit(self.step_limit));
        }
        Ok(())
    }

    fn exec_at(&mut self, node: &Node, seek: Option<Seek>) -> EvalResult<Flow> {
        self.tick()?;
        match node {
            Node::Nop => Ok(Flow::Normal(Value::Void)),
            Node::Eval(expr) => Ok(Flow::Normal(value_or_raise!(self, expr))),
            Node::Assign { target, value } => {
                let value = value_or_raise!(self, value);
                self.env.insert(target.id, value);
                Ok(Flow::Normal(Value::Void))
            }
            Node::Block { locals, body } => {
                for local in locals {
                    if !self.env.contains_key(&local.id) {
                        let zero = Constant::zero(&local.ty).map_or(Value::Void, |c| Value::from(&c));
                        self.env.insert(local.id, zero);
                    }
                }
                self.exec_sequence(body, seek)
            }
            Node::If {
                test,
                then_branch,
                else_branch,
            } => match seek {
                Some(seek) if then_branch.defines_label(seek.label) => {
                    self.exec_at(then_branch, Some(seek))
                }
                Some(seek) => self.exec_at(else_branch, Some(seek)),
                None => match value_or_raise!(self, test) {
                    Value::Bool(true) => self.exec(then_branch),
                    Value::Bool(false) => self.exec(else_branch),
                    other => Err(type_error("bool test", &other)),
                },
            },
            Node::Loop {
                body,
                break_label,
                continue_label,
            } => {
                let mut seek = seek;
                loop {
                    match self.exec_at(body, seek.take())? {
                        Flow::Normal(_) => {}
                        Flow::Jump(label, _) if label == break_label.id => {
                            return Ok(Flow::Normal(Value::Void))
                        }
                        Flow::Jump(label, _) if label == continue_label.id => {}
                        Flow::Jump(label, value) if body.defines_label(label) => {
                            seek = Some(Seek { label, value });
                        }
                        other => return Ok(other),
                    }
                }
            }
            Node::Label { target, default } => {
                let value = match seek {
                    Some(seek) if seek.label == target.id => seek.value,
                    _ => None,
                };
                Ok(Flow::Normal(value.unwrap_or_else(|| {
                    default.as_ref().map_or(Value::Void, Value::from)
                })))
            }
            Node::Goto { target, value } => {
                let value = match value {
                    Some(expr) => Some(value_or_raise!(self, expr)),
                    None => None,
                };
                Ok(Flow::Jump(target.id, value))
            }
            Node::Switch {
                value,
                cases,
                default,
            } => self.exec_switch(value, cases, default.as_deref(), seek),
            Node::Try {
                body,
                handlers,
                finally,
            } => self.exec_try(body, handlers, finally.as_deref(), seek),
            Node::Throw(expr) => {
                let value = value_or_raise!(self, expr);
                trace!(exception = %value, "throw");
                Ok(Flow::Throw(value))
            }
            Node::Rethrow => match self.handling.last() {
                Some(value) => Ok(Flow::Throw(value.clone())),
                None => Err(EvalError::NoActiveException),
            },
        }
    }

    fn exec_sequence(&mut self, body: &[Node], seek: Option<Seek>) -> EvalResult<Flow> {
        let mut seek = seek;
        let mut index = match &seek {
            Some(target) => position_of(body, target.label).unwrap_or(body.len()),
            None => 0,
        };
        let mut last = Value::Void;
        while index < body.len() {
            match self.exec_at(&body[index], seek.take())? {
                Flow::Normal(value) => {
                    last = value;
                    index += 1;
                }
                Flow::Jump(label, value) => match position_of(body, label) {
                    Some(target) => {
                        index = target;
                        seek = Some(Seek { label, value });
                    }
                    None => return Ok(Flow::Jump(label, value)),
                },
                Flow::Throw(value) => return Ok(Flow::Throw(value)),
            }
        }
        Ok(Flow::Normal(last))
    }

    fn exec_switch(
        &mut self,
        value: &Expr,
        cases: &[SwitchCase],
        default: Option<&Node>,
        seek: Option<Seek>,
    ) -> EvalResult<Flow> {
        let arms: Vec<&Node> = cases.iter().map(|c| &c.body).chain(default).collect();
        let mut seek = seek;
        let mut arm = match &seek {
            Some(target) => arms.iter().position(|a| a.defines_label(target.label)),
            None => {
                let discriminant = value_or_raise!(self, value);
                let mut selected = None;
                'cases: for (index, case) in cases.iter().enumerate() {
                    for candidate in &case.values {
                        if value_or_raise!(self, candidate) == discriminant {
                            selected = Some(index);
                            break 'cases;
                        }
                    }
                }
                selected.or_else(|| default.map(|_| cases.len()))
            }
        };
        while let Some(index) = arm {
            match self.exec_at(arms[index], seek.take())? {
                Flow::Jump(label, value) => {
                    match arms.iter().position(|a| a.defines_label(label)) {
                        Some(target) => {
                            arm = Some(target);
                            seek = Some(Seek { label, value });
                        }
                        None => return Ok(Flow::Jump(label, value)),
                    }
                }
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal(Value::Void))
    }

    fn exec_try(
        &mut self,
        body: &Node,
        handlers: &[CatchHandler],
        finally: Option<&Node>,
        seek: Option<Seek>,
    ) -> EvalResult<Flow> {
        let mut seek = seek;
        loop {
            let mut flow = match seek.take() {
                None => self.exec(body)?,
                Some(target) if body.defines_label(target.label) => {
                    self.exec_at(body, Some(target))?
                }
                // Entering the cleanup directly runs it as ordinary code
                Some(target) => match finally {
                    Some(finally) if finally.defines_label(target.label) => {
                        return self.exec_at(finally, Some(target))
                    }
                    _ => return Err(EvalError::JumpIntoHandler(target.label)),
                },
            };
            if let Flow::Throw(exception) = &flow {
                if let Some(handler) = handlers.iter().find(|h| exception.is_instance_of(&h.kind)) {
                    trace!(exception = %exception, kind = %handler.kind, "caught");
                    if let Some(binding) = &handler.binding {
                        self.env.insert(binding.id, exception.clone());
                    }
                    self.handling.push(exception.clone());
                    let handled = self.exec(&handler.body);
                    self.handling.pop();
                    flow = handled?;
                }
            }
            // A jump between the arms of this region stays inside it
            if let Flow::Jump(label, value) = &flow {
                let inside = body.defines_label(*label)
                    || finally.map_or(false, |f| f.defines_label(*label))
                    || handlers.iter().any(|h| h.body.defines_label(*label));
                if inside {
                    seek = Some(Seek {
                        label: *label,
                        value: value.clone(),
                    });
                    continue;
                }
            }
            if let Some(finally) = finally {
                match self.exec(finally)? {
                    Flow::Normal(_) => {}
                    // A jump or throw out of the cleanup replaces the pending flow
                    overriding => return Ok(overriding),
                }
            }
            return Ok(flow);
        }
    }

    /// Evaluate an expression. A raised IR exception is reported as
    /// `EvalError::Thrown`.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Const(constant) => Ok(Value::from(constant)),
            Expr::Param(placeholder) => {
                Err(EvalError::UnboundPlaceholder(placeholder.name.clone()))
            }
            Expr::Var(symbol) => self
                .env
                .get(&symbol.id)
                .cloned()
                .ok_or_else(|| EvalError::UnboundSymbol(symbol.to_string())),
            Expr::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                match (op, operand) {
                    (UnaryOp::Neg, Value::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
                    (UnaryOp::Neg, Value::Long(i)) => Ok(Value::Long(i.wrapping_neg())),
                    (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (op, other) => Err(type_error(&format!("operand of {}", op), &other)),
                }
            }
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expr::Convert { operand, ty } => {
                let value = self.eval(operand)?;
                convert(value, ty)
            }
            Expr::Intrinsic { op, args } => {
                let args = self.eval_all(args)?;
                self.intrinsic(*op, &args)
            }
            Expr::Call { function, args, .. } => {
                let args = self.eval_all(args)?;
                self.host.call(function, &args)
            }
            Expr::New { ty, args } => {
                let fields = self.eval_all(args)?;
                match ty {
                    Type::Object(class) => Ok(Value::object(class.clone(), fields)),
                    other => Err(EvalError::TypeError(format!("cannot instantiate {}", other))),
                }
            }
            Expr::List { items, .. } => Ok(Value::list(self.eval_all(items)?)),
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> EvalResult<Vec<Value>> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> EvalResult<Value> {
        let lhs = self.eval(left)?;
        // Logical operators short-circuit
        match (op, &lhs) {
            (BinaryOp::And, Value::Bool(false)) => return Ok(Value::Bool(false)),
            (BinaryOp::Or, Value::Bool(true)) => return Ok(Value::Bool(true)),
            _ => {}
        }
        let rhs = self.eval(right)?;
        match op {
            BinaryOp::Equal => Ok(Value::Bool(lhs == rhs)),
            BinaryOp::NotEqual => Ok(Value::Bool(lhs != rhs)),
            BinaryOp::And | BinaryOp::Or => match rhs {
                Value::Bool(b) => Ok(Value::Bool(b)),
                other => Err(type_error("bool operand", &other)),
            },
            _ => match (lhs, rhs) {
                (Value::Int(a), Value::Int(b)) => int_op(op, a as i64, b as i64)
                    .map(|v| narrow(op, v)),
                (Value::Long(a), Value::Long(b)) => int_op(op, a, b),
                (Value::Str(a), Value::Str(b)) => match op {
                    BinaryOp::Add => Ok(Value::str(&format!("{}{}", a, b))),
                    BinaryOp::Less => Ok(Value::Bool(a < b)),
                    BinaryOp::LessEqual => Ok(Value::Bool(a <= b)),
                    BinaryOp::Greater => Ok(Value::Bool(a > b)),
                    BinaryOp::GreaterEqual => Ok(Value::Bool(a >= b)),
                    _ => Err(EvalError::TypeError(format!("unsupported string operator {}", op))),
                },
                (lhs, rhs) => Err(EvalError::TypeError(format!(
                    "cannot apply {} to {} and {}",
                    op,
                    lhs.kind_name(),
                    rhs.kind_name()
                ))),
            },
        }
    }

    fn intrinsic(&mut self, op: Intrinsic, args: &[Value]) -> EvalResult<Value> {
        match (op, args) {
            (Intrinsic::GetIterator, [Value::List(items)]) => Ok(Value::Iterator(Rc::new(
                RefCell::new(Cursor::new(items.to_vec(), true)),
            ))),
            (Intrinsic::GetIterator, [Value::Range(start, end)]) => {
                let items = (*start..*end).map(Value::Int).collect();
                Ok(Value::Iterator(Rc::new(RefCell::new(Cursor::new(items, false)))))
            }
            (Intrinsic::MoveNext, [Value::Iterator(cursor)]) => {
                Ok(Value::Bool(cursor.borrow_mut().move_next()))
            }
            (Intrinsic::Current, [Value::Iterator(cursor)]) => cursor
                .borrow()
                .current()
                .cloned()
                .ok_or_else(|| EvalError::TypeError("iterator has no current element".into())),
            (Intrinsic::Dispose, [Value::Null]) => Ok(Value::Void),
            (Intrinsic::Dispose, [value]) => {
                let name = match value {
                    Value::Iterator(cursor) => {
                        cursor.borrow_mut().dispose();
                        "iterator".to_string()
                    }
                    Value::Object(object) => object.class.clone(),
                    other => other.kind_name().to_string(),
                };
                trace!(resource = %name, "dispose");
                self.dispose_log.push(name);
                Ok(Value::Void)
            }
            (Intrinsic::MakeRange, [Value::Int(start), Value::Int(end)]) => {
                Ok(Value::Range(*start, *end))
            }
            (op, args) => Err(EvalError::TypeError(format!(
                "invalid arguments to {}: {}",
                op,
                args.iter().map(Value::kind_name).collect::<Vec<_>>().join(", ")
            ))),
        }
    }
}

/// Index of the first node whose subtree marks `label`
fn position_of(body: &[Node], label: LabelId) -> Option<usize> {
    body.iter().position(|node| node.defines_label(label))
}

fn type_error(expected: &str, found: &Value) -> EvalError {
    EvalError::TypeError(format!("expected {}, found {}", expected, found.kind_name()))
}

fn arithmetic_error() -> EvalError {
    EvalError::Thrown(Value::object("ArithmeticError", vec![]))
}

/// Integer arithmetic and comparison on widened operands
fn int_op(op: BinaryOp, a: i64, b: i64) -> EvalResult<Value> {
    Ok(match op {
        BinaryOp::Add => Value::Long(a.wrapping_add(b)),
        BinaryOp::Sub => Value::Long(a.wrapping_sub(b)),
        BinaryOp::Mul => Value::Long(a.wrapping_mul(b)),
        BinaryOp::Div if b == 0 => return Err(arithmetic_error()),
        BinaryOp::Div => Value::Long(a.wrapping_div(b)),
        BinaryOp::Mod if b == 0 => return Err(arithmetic_error()),
        BinaryOp::Mod => Value::Long(a.wrapping_rem(b)),
        BinaryOp::Less => Value::Bool(a < b),
        BinaryOp::LessEqual => Value::Bool(a <= b),
        BinaryOp::Greater => Value::Bool(a > b),
        BinaryOp::GreaterEqual => Value::Bool(a >= b),
        other => return Err(EvalError::TypeError(format!("{} is not an integer operator", other))),
    })
}

/// Bring an arithmetic result computed on widened `int` operands back to `int`
fn narrow(op: BinaryOp, value: Value) -> Value {
    match (op.is_arithmetic(), value) {
        (true, Value::Long(v)) => Value::Int(v as i32),
        (_, other) => other,
    }
}

fn convert(value: Value, ty: &Type) -> EvalResult<Value> {
    match (value, ty) {
        (Value::Int(i), Type::Long) => Ok(Value::Long(i as i64)),
        (Value::Long(i), Type::Int) => Ok(Value::Int(i as i32)),
        (value @ Value::Int(_), Type::Int)
        | (value @ Value::Long(_), Type::Long)
        | (value @ Value::Bool(_), Type::Bool)
        | (value @ Value::Str(_), Type::Str)
        | (value @ Value::Null, _) => Ok(value),
        (value, Type::Any) if !matches!(value, Value::Int(_) | Value::Long(_) | Value::Bool(_)) => {
            Ok(value)
        }
        (value @ Value::Object(_), Type::Object(name)) if value.class() == Some(name.as_str()) => {
            Ok(value)
        }
        (value, ty) => Err(EvalError::TypeError(format!(
            "cannot convert {} to {}",
            value.kind_name(),
            ty
        ))),
    }
}
