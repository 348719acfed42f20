//! Values produced while evaluating filter expressions.

use std::borrow::Cow;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Node,
    Nodes,
    Primitive,
    Logical,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Integer,
    Float,
    String,
    Boolean,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive<'a> {
    Integer(i64),
    Float(f64),
    String(Cow<'a, str>),
    Boolean(bool),
    Null,
}

impl Primitive<'_> {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Integer(_) => PrimitiveKind::Integer,
            Primitive::Float(_) => PrimitiveKind::Float,
            Primitive::String(_) => PrimitiveKind::String,
            Primitive::Boolean(_) => PrimitiveKind::Boolean,
            Primitive::Null => PrimitiveKind::Null,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Primitive::Integer(value) => Some(*value as f64),
            Primitive::Float(value) => Some(*value),
            _ => None,
        }
    }
}

/// The result of evaluating an expression. `'a` is the lifetime of the
/// document being queried.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionValue<'a> {
    /// A single document node, produced by a singular query.
    Node(&'a Value),
    Nodes(Vec<&'a Value>),
    Primitive(Primitive<'a>),
    Logical(bool),
    /// No value at all, distinct from JSON `null`.
    Nothing,
}

impl<'a> ExpressionValue<'a> {
    pub const TRUE: Self = ExpressionValue::Logical(true);
    pub const FALSE: Self = ExpressionValue::Logical(false);

    pub fn value_type(&self) -> ValueType {
        match self {
            ExpressionValue::Node(_) => ValueType::Node,
            ExpressionValue::Nodes(_) => ValueType::Nodes,
            ExpressionValue::Primitive(_) => ValueType::Primitive,
            ExpressionValue::Logical(_) => ValueType::Logical,
            ExpressionValue::Nothing => ValueType::Nothing,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            ExpressionValue::Primitive(primitive) => Some(primitive.kind()),
            _ => None,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, ExpressionValue::Nothing)
    }

    /// Boolean-context conversion: logical and boolean values are used as is,
    /// a node list is true when it is non-empty, everything else is false.
    pub fn to_bool(&self) -> bool {
        match self {
            ExpressionValue::Logical(value)
            | ExpressionValue::Primitive(Primitive::Boolean(value)) => *value,
            ExpressionValue::Nodes(nodes) => !nodes.is_empty(),
            _ => false,
        }
    }

    /// Converts a document node into the value it stands for in comparisons.
    ///
    /// Numbers become integers when they fit in 64 bits and floats otherwise;
    /// objects, arrays and `true` are logical true.
    pub fn from_json(node: &'a Value) -> Self {
        match node {
            Value::Number(number) => match number.as_i64() {
                Some(value) => ExpressionValue::Primitive(Primitive::Integer(value)),
                None => {
                    ExpressionValue::Primitive(Primitive::Float(number.as_f64().unwrap_or(f64::NAN)))
                }
            },
            Value::String(text) => ExpressionValue::Primitive(Primitive::String(Cow::Borrowed(text))),
            Value::Object(_) | Value::Array(_) | Value::Bool(true) => ExpressionValue::TRUE,
            Value::Bool(false) => ExpressionValue::FALSE,
            Value::Null => ExpressionValue::Primitive(Primitive::Null),
        }
    }

    /// The document node this value refers to, if it is exactly one node.
    pub fn as_node(&self) -> Option<&'a Value> {
        match self {
            ExpressionValue::Node(node) => Some(*node),
            ExpressionValue::Nodes(nodes) if nodes.len() == 1 => Some(nodes[0]),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExpressionValue::Primitive(Primitive::String(text)) => Some(text),
            ExpressionValue::Node(Value::String(text)) => Some(text),
            _ => None,
        }
    }
}

impl From<bool> for ExpressionValue<'_> {
    fn from(value: bool) -> Self {
        ExpressionValue::Logical(value)
    }
}
