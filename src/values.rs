//! Runtime values and their types, as seen by constructors and the evaluator.

use crate::function::Function;
use crate::operation::NodeHandle;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the conventional pipe parameter carrying the upstream table.
pub const TABLE_PARAMETER: &str = "table";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Any,
    String,
    Int,
    Float,
    Bool,
    Duration,
    Array(Box<Type>),
    Object,
    /// An in-progress operation node.
    Table,
    Function(Box<FunctionSignature>),
}

impl Type {
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// Whether a value of type `other` may be passed where `self` is expected.
    pub fn accepts(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Any, _) | (_, Type::Any) => true,
            (Type::Array(a), Type::Array(b)) => a.accepts(b),
            (Type::Function(_), Type::Function(_)) => true,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::String => f.write_str("string"),
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::Bool => f.write_str("bool"),
            Type::Duration => f.write_str("duration"),
            Type::Array(elem) => write!(f, "[{}]", elem),
            Type::Object => f.write_str("object"),
            Type::Table => f.write_str("table"),
            Type::Function(sig) => write!(f, "{}", sig),
        }
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Declared parameters and return type of a builtin function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSignature {
    pub params: BTreeMap<String, Type>,
    pub required: Vec<String>,
    /// Parameter bound to the left-hand side of `|>`.
    pub pipe_argument: Option<String>,
    pub return_type: Type,
}

impl FunctionSignature {
    pub fn new(return_type: Type) -> Self {
        Self {
            params: BTreeMap::new(),
            required: Vec::new(),
            pipe_argument: None,
            return_type,
        }
    }

    pub fn param(mut self, name: &str, ty: Type) -> Self {
        self.params.insert(name.to_string(), ty);
        self
    }

    pub fn required_param(mut self, name: &str, ty: Type) -> Self {
        self.params.insert(name.to_string(), ty);
        if !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
        self
    }

    pub fn pipe(mut self, name: &str) -> Self {
        self.pipe_argument = Some(name.to_string());
        self
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, (name, ty)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if self.pipe_argument.as_deref() == Some(name.as_str()) {
                f.write_str("<-")?;
            }
            let optional = if self.required.contains(name) { "" } else { "?" };
            write!(f, "{}{}: {}", name, optional, ty)?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

/// Signature for operators that take the upstream table through the pipe.
///
/// The returned value is a fresh copy; callers are free to extend it.
pub fn default_signature() -> FunctionSignature {
    FunctionSignature::new(Type::Table)
        .required_param(TABLE_PARAMETER, Type::Table)
        .pipe(TABLE_PARAMETER)
}

/// Signed duration in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Duration(i64);

impl Duration {
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn nanos(self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Table(NodeHandle),
    Function(Function),
}

impl Value {
    pub fn type_of(&self) -> Type {
        match self {
            Value::String(_) => Type::String,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Bool(_) => Type::Bool,
            Value::Duration(_) => Type::Duration,
            Value::Array(items) => Type::array(items.first().map_or(Type::Any, Value::type_of)),
            Value::Object(_) => Type::Object,
            Value::Table(_) => Type::Table,
            Value::Function(f) => Type::Function(Box::new(f.signature().clone())),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<NodeHandle> {
        match self {
            Value::Table(h) => Some(*h),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_acceptance() {
        assert!(Type::Any.accepts(&Type::Table));
        assert!(Type::array(Type::String).accepts(&Type::array(Type::Any)));
        assert!(!Type::array(Type::String).accepts(&Type::array(Type::Int)));
        assert!(!Type::Table.accepts(&Type::String));
    }

    #[test]
    fn signature_display() {
        let sig = default_signature().param("column", Type::String);
        assert_eq!(sig.to_string(), "(column?: string, <-table: table) -> table");
    }
}
