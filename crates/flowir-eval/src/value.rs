//! Runtime values

use flowir::{Constant, Type};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Instance of a named reference type
#[derive(Debug)]
pub struct Object {
    /// Type name
    pub class: String,
    /// Constructor arguments, in order
    pub fields: Vec<Value>,
}

/// Iteration state behind an iterator value
#[derive(Debug)]
pub struct Cursor {
    items: Vec<Value>,
    /// Index of the current element; None before the first `move_next`
    position: Option<usize>,
    disposable: bool,
    disposed: bool,
}

impl Cursor {
    pub fn new(items: Vec<Value>, disposable: bool) -> Self {
        Self {
            items,
            position: None,
            disposable,
            disposed: false,
        }
    }

    /// Advance; false once the items are exhausted
    pub fn move_next(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next.min(self.items.len()));
        next < self.items.len()
    }

    pub fn current(&self) -> Option<&Value> {
        self.position.and_then(|p| self.items.get(p))
    }

    pub fn is_disposable(&self) -> bool {
        self.disposable
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
    }
}

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    Void,
    Bool(bool),
    Int(i32),
    Long(i64),
    Str(Rc<str>),
    Null,
    Object(Rc<Object>),
    List(Rc<Vec<Value>>),
    /// Half-open integer range
    Range(i32, i32),
    Iterator(Rc<RefCell<Cursor>>),
}

impl Value {
    pub fn str(value: &str) -> Self {
        Value::Str(Rc::from(value))
    }

    /// New instance of `class`
    pub fn object(class: impl Into<String>, fields: Vec<Value>) -> Self {
        Value::Object(Rc::new(Object {
            class: class.into(),
            fields,
        }))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Class name of an object value
    pub fn class(&self) -> Option<&str> {
        match self {
            Value::Object(object) => Some(&object.class),
            _ => None,
        }
    }

    /// Does a handler for `kind` accept this value?
    ///
    /// Kinds match exactly; `Any` accepts every non-null reference value.
    pub fn is_instance_of(&self, kind: &Type) -> bool {
        match (self, kind) {
            (Value::Null, _) => false,
            (Value::Object(_) | Value::Str(_) | Value::List(_) | Value::Iterator(_), Type::Any) => {
                true
            }
            (Value::Object(object), Type::Object(name)) => object.class == *name,
            (Value::Str(_), Type::Str) => true,
            _ => false,
        }
    }

    /// Name of this value's kind, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Str(_) => "str",
            Value::Null => "null",
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Range(..) => "range",
            Value::Iterator(_) => "iterator",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Range(a0, a1), Value::Range(b0, b1)) => a0 == b0 && a1 == b1,
            (Value::List(a), Value::List(b)) => a == b,
            // Reference identity
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Iterator(a), Value::Iterator(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&Constant> for Value {
    fn from(constant: &Constant) -> Self {
        match constant {
            Constant::Bool(b) => Value::Bool(*b),
            Constant::Int(i) => Value::Int(*i),
            Constant::Long(i) => Value::Long(*i),
            Constant::Str(s) => Value::str(s),
            Constant::Null(_) => Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(i) => write!(f, "{}L", i),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Null => write!(f, "null"),
            Value::Object(object) => write!(f, "{} instance", object.class),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Range(start, end) => write!(f, "{}..{}", start, end),
            Value::Iterator(_) => write!(f, "<iterator>"),
        }
    }
}
