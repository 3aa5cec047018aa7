//! Scalar Sub-expressions
//!
//! `Expr` is the representation of the opaque, already-typed fragments that
//! callers hand to the builder, and of the scalar parts embedded in IR nodes.
//! A fragment may refer to placeholders (`Expr::Param`) that the rewriter
//! binds to real symbols; once bound, an expression only contains
//! `Expr::Var` references.

use super::symbol::Symbol;
use super::types::Type;
use std::fmt;

/// Constant values
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Bool(bool),
    Int(i32),
    Long(i64),
    Str(String),
    /// Null reference of the given type
    Null(Type),
}

impl Constant {
    /// Type of this constant
    pub fn ty(&self) -> Type {
        match self {
            Constant::Bool(_) => Type::Bool,
            Constant::Int(_) => Type::Int,
            Constant::Long(_) => Type::Long,
            Constant::Str(_) => Type::Str,
            Constant::Null(ty) => ty.clone(),
        }
    }

    /// Zero value of `ty`, used as the fall-through value of typed labels.
    /// `Void` has none.
    pub fn zero(ty: &Type) -> Option<Constant> {
        match ty {
            Type::Void => None,
            Type::Bool => Some(Constant::Bool(false)),
            Type::Int => Some(Constant::Int(0)),
            Type::Long => Some(Constant::Long(0)),
            other => Some(Constant::Null(other.clone())),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Int(i) => write!(f, "{}", i),
            Constant::Long(i) => write!(f, "{}L", i),
            Constant::Str(s) => write!(f, "{:?}", s),
            Constant::Null(_) => write!(f, "null"),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Check if this is an arithmetic operator
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    /// Check if this is a comparison operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }

    /// Check if this is a logical operator
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", s)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

/// Built-in capabilities the builder relies on when desugaring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    /// `collection.get_iterator()`
    GetIterator,
    /// `iterator.move_next()`
    MoveNext,
    /// `iterator.current`
    Current,
    /// `resource.dispose()`
    Dispose,
    /// `range(start, end)`
    MakeRange,
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intrinsic::GetIterator => "get_iterator",
            Intrinsic::MoveNext => "move_next",
            Intrinsic::Current => "current",
            Intrinsic::Dispose => "dispose",
            Intrinsic::MakeRange => "range",
        };
        write!(f, "{}", s)
    }
}

/// A named, typed hole in a fragment, bound by the rewriter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    pub name: String,
    pub ty: Type,
}

impl Placeholder {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Scalar sub-expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Constant value
    Const(Constant),
    /// Unbound placeholder (only valid before rewriting)
    Param(Placeholder),
    /// Reference to a bound symbol
    Var(Symbol),
    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Explicit conversion (narrowing or cast)
    Convert { operand: Box<Expr>, ty: Type },
    /// Built-in capability
    Intrinsic { op: Intrinsic, args: Vec<Expr> },
    /// Call to a host function resolved by the backend
    Call {
        function: String,
        args: Vec<Expr>,
        ty: Type,
    },
    /// Construct a reference value of a named type
    New { ty: Type, args: Vec<Expr> },
    /// List literal
    List { elem: Type, items: Vec<Expr> },
}

impl Expr {
    pub fn int(value: i32) -> Self {
        Expr::Const(Constant::Int(value))
    }

    pub fn long(value: i64) -> Self {
        Expr::Const(Constant::Long(value))
    }

    pub fn bool(value: bool) -> Self {
        Expr::Const(Constant::Bool(value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Expr::Const(Constant::Str(value.into()))
    }

    pub fn null(ty: Type) -> Self {
        Expr::Const(Constant::Null(ty))
    }

    /// Placeholder reference
    pub fn param(name: impl Into<String>, ty: Type) -> Self {
        Expr::Param(Placeholder::new(name, ty))
    }

    /// Bound symbol reference
    pub fn var(symbol: &Symbol) -> Self {
        Expr::Var(symbol.clone())
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn add(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Add, self, rhs)
    }

    pub fn sub(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Sub, self, rhs)
    }

    pub fn mul(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }

    pub fn div(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Div, self, rhs)
    }

    pub fn rem(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Mod, self, rhs)
    }

    pub fn equals(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Equal, self, rhs)
    }

    pub fn not_equals(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::NotEqual, self, rhs)
    }

    pub fn lt(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Less, self, rhs)
    }

    pub fn le(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::LessEqual, self, rhs)
    }

    pub fn gt(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Greater, self, rhs)
    }

    pub fn ge(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::GreaterEqual, self, rhs)
    }

    pub fn and(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::And, self, rhs)
    }

    pub fn or(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Or, self, rhs)
    }

    pub fn not(self) -> Self {
        Expr::unary(UnaryOp::Not, self)
    }

    pub fn convert(self, ty: Type) -> Self {
        Expr::Convert {
            operand: Box::new(self),
            ty,
        }
    }

    pub fn intrinsic(op: Intrinsic, args: Vec<Expr>) -> Self {
        Expr::Intrinsic { op, args }
    }

    pub fn call(function: impl Into<String>, args: Vec<Expr>, ty: Type) -> Self {
        Expr::Call {
            function: function.into(),
            args,
            ty,
        }
    }

    pub fn new_object(ty: Type, args: Vec<Expr>) -> Self {
        Expr::New { ty, args }
    }

    pub fn list(elem: Type, items: Vec<Expr>) -> Self {
        Expr::List { elem, items }
    }

    pub fn range(start: Expr, end: Expr) -> Self {
        Expr::intrinsic(Intrinsic::MakeRange, vec![start, end])
    }

    /// Static type of this expression
    pub fn ty(&self) -> Type {
        match self {
            Expr::Const(c) => c.ty(),
            Expr::Param(p) => p.ty.clone(),
            Expr::Var(s) => s.ty.clone(),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg => operand.ty(),
                UnaryOp::Not => Type::Bool,
            },
            Expr::Binary { op, left, .. } => {
                if op.is_arithmetic() {
                    left.ty()
                } else {
                    Type::Bool
                }
            }
            Expr::Convert { ty, .. } => ty.clone(),
            Expr::Intrinsic { op, args } => match op {
                Intrinsic::GetIterator => args
                    .first()
                    .and_then(|c| c.ty().iterator_type())
                    .unwrap_or(Type::Void),
                Intrinsic::MoveNext => Type::Bool,
                Intrinsic::Current => args
                    .first()
                    .and_then(|it| it.ty().element_type().cloned())
                    .unwrap_or(Type::Void),
                Intrinsic::Dispose => Type::Void,
                Intrinsic::MakeRange => Type::Range,
            },
            Expr::Call { ty, .. } => ty.clone(),
            Expr::New { ty, .. } => ty.clone(),
            Expr::List { elem, .. } => Type::list(elem.clone()),
        }
    }

    /// Direct sub-expressions, in evaluation order
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Const(_) | Expr::Param(_) | Expr::Var(_) => vec![],
            Expr::Unary { operand, .. } | Expr::Convert { operand, .. } => vec![operand],
            Expr::Binary { left, right, .. } => vec![left, right],
            Expr::Intrinsic { args, .. }
            | Expr::Call { args, .. }
            | Expr::New { args, .. } => args.iter().collect(),
            Expr::List { items, .. } => items.iter().collect(),
        }
    }

    /// Is this a null constant?
    pub fn is_null(&self) -> bool {
        matches!(self, Expr::Const(Constant::Null(_)))
    }
}

impl From<Constant> for Expr {
    fn from(value: Constant) -> Self {
        Expr::Const(value)
    }
}

impl From<&Symbol> for Expr {
    fn from(value: &Symbol) -> Self {
        Expr::var(value)
    }
}

fn join(args: &[Expr]) -> String {
    args.iter()
        .map(|a| format!("{}", a))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(c) => write!(f, "{}", c),
            Expr::Param(p) => write!(f, "?{}", p.name),
            Expr::Var(s) => write!(f, "{}", s),
            Expr::Unary { op, operand } => write!(f, "{}{}", op, operand),
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Convert { operand, ty } => write!(f, "({} as {})", operand, ty),
            Expr::Intrinsic { op, args } => write!(f, "{}({})", op, join(args)),
            Expr::Call { function, args, .. } => write!(f, "call {}({})", function, join(args)),
            Expr::New { ty, args } => write!(f, "new {}({})", ty, join(args)),
            Expr::List { items, .. } => write!(f, "[{}]", join(items)),
        }
    }
}
