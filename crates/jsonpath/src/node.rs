//! Tree operations over JSON document nodes.
//!
//! Traversals keep an explicit stack so deeply nested documents cannot
//! exhaust the call stack.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

pub fn kind(node: &Value) -> NodeKind {
    match node {
        Value::Object(_) => NodeKind::Object,
        Value::Array(_) => NodeKind::Array,
        Value::String(_) => NodeKind::String,
        Value::Number(_) => NodeKind::Number,
        Value::Bool(_) => NodeKind::Boolean,
        Value::Null => NodeKind::Null,
    }
}

/// The direct children of a node: member values in declaration order for an
/// object, elements in index order for an array, nothing for a scalar.
pub enum Children<'a> {
    Object(serde_json::map::Values<'a>),
    Array(std::slice::Iter<'a, Value>),
    Empty,
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        match self {
            Children::Object(values) => values.next(),
            Children::Array(elements) => elements.next(),
            Children::Empty => None,
        }
    }
}

pub fn children(node: &Value) -> Children<'_> {
    match node {
        Value::Object(members) => Children::Object(members.values()),
        Value::Array(elements) => Children::Array(elements.iter()),
        _ => Children::Empty,
    }
}

/// Pre-order traversal of every node below a start node (the start node
/// itself is excluded): each node is yielded before its own children.
pub struct Descendants<'a> {
    stack: Vec<Children<'a>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) => {
                    self.stack.push(children(node));
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

pub fn descendants(node: &Value) -> Descendants<'_> {
    Descendants {
        stack: vec![children(node)],
    }
}

pub fn descendants_and_self(node: &Value) -> impl Iterator<Item = &Value> {
    std::iter::once(node).chain(descendants(node))
}

/// Structural equality where numbers compare by numeric value, so `1` and
/// `1.0` are equal.
pub fn deep_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => objects_equal(a, b),
        _ => left == right,
    }
}

fn objects_equal(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).is_some_and(|other| deep_equal(value, other)))
}
