use std::{collections::BTreeMap, fmt, rc::Rc};

use crate::{runtime::closure::Closure, syntax::FunctionLiteral};

/// Runtime value produced by the interpreter.
///
/// Payloads are immutable. The only mutable state reachable from a value is
/// a closure's captured environment (see [`Closure::rebind`]); binding cells
/// themselves live in the interpreter's
/// [`BindingStore`](crate::runtime::environment::BindingStore), so values
/// never point back at the environment that holds them and `Rc` sharing
/// cannot form cycles.
#[derive(Debug, Clone)]
pub enum Value {
    /// 32-bit signed integer.
    Int(i32),
    /// 32-bit floating point number.
    Float(f32),
    /// Boolean value.
    Bool(bool),
    /// Unresolved reference to a binding by name.
    Id(Rc<str>),
    /// UTF-8 string value.
    String(Rc<str>),
    /// Function literal together with the environment it closes over.
    Closure(Rc<Closure>),
    /// Function literal evaluated against the caller's environment.
    Function(Rc<FunctionLiteral>),
    /// Record of named fields.
    PlainObject(Rc<BTreeMap<String, Value>>),
    /// Absence of value.
    Void,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => l == r,
            (Value::Float(l), Value::Float(r)) => l == r,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Id(l), Value::Id(r)) => l == r,
            (Value::String(l), Value::String(r)) => l == r,
            (Value::Closure(l), Value::Closure(r)) => Rc::ptr_eq(l, r),
            (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
            (Value::PlainObject(l), Value::PlainObject(r)) => l == r,
            (Value::Void, Value::Void) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Id(name) => write!(f, "{}", name),
            Value::String(v) => write!(f, "\"{}\"", v),
            Value::Closure(_) => write!(f, "<closure>"),
            Value::Function(_) => write!(f, "<function>"),
            Value::PlainObject(fields) => {
                let items: Vec<String> = fields
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value))
                    .collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Value::Void => write!(f, "void"),
        }
    }
}

impl Value {
    /// Returns the runtime type label used in diagnostics and by `IsType`.
    ///
    /// These labels are user-visible and are expected to remain stable.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Bool(_) => "Bool",
            Value::Id(_) => "Id",
            Value::String(_) => "String",
            Value::Closure(_) => "Closure",
            Value::Function(_) => "Function",
            Value::PlainObject(_) => "PlainObject",
            Value::Void => "Void",
        }
    }

    /// Converts a value to the text `Print` writes.
    ///
    /// Unlike [`std::fmt::Display`], strings are returned without quotes.
    pub fn to_string_value(&self) -> String {
        match self {
            Value::String(v) => v.to_string(),
            other => other.to_string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}
