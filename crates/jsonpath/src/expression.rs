//! Filter expression evaluation.
//!
//! Comparisons follow the typed value model in [`crate::value`]: a comparison
//! that is undefined for its operand types yields
//! [`ExpressionValue::Nothing`], which is false in a filter.

use std::borrow::Cow;

use serde_json::Value;

use crate::ast::{BinaryOperator, Expression, Literal, QueryExpression, QueryRoot};
use crate::engine::{self, QueryContext};
use crate::error::JsonPathError;
use crate::functions::{FunctionContext, FunctionType};
use crate::node;
use crate::value::{ExpressionValue, Primitive};

/// The context for evaluating a filter expression against one candidate node.
#[derive(Clone, Copy)]
pub struct ExpressionEvaluationContext<'a, 'c> {
    pub query: QueryContext<'a, 'c>,
    /// The node `@` refers to.
    pub current: &'a Value,
}

impl<'a, 'c> ExpressionEvaluationContext<'a, 'c> {
    pub fn new(query: QueryContext<'a, 'c>, current: &'a Value) -> Self {
        Self { query, current }
    }
}

/// Evaluates `expression` and converts the result to a boolean.
pub fn evaluate_logical(
    expression: &Expression,
    e_ctx: &ExpressionEvaluationContext<'_, '_>,
) -> Result<bool, JsonPathError> {
    Ok(evaluate(expression, e_ctx)?.to_bool())
}

pub fn evaluate<'a>(
    expression: &Expression,
    e_ctx: &ExpressionEvaluationContext<'a, '_>,
) -> Result<ExpressionValue<'a>, JsonPathError> {
    match expression {
        Expression::Literal(literal) => Ok(literal_value(literal)),
        Expression::SingularQuery(query) => evaluate_query(query, true, e_ctx),
        Expression::FilterQuery(query) => evaluate_query(query, false, e_ctx),
        Expression::FunctionCall { name, args } => evaluate_function(name, args, e_ctx),
        Expression::Binary {
            op: BinaryOperator::And,
            left,
            right,
        } => Ok((evaluate_logical(left, e_ctx)? && evaluate_logical(right, e_ctx)?).into()),
        Expression::Binary {
            op: BinaryOperator::Or,
            left,
            right,
        } => Ok((evaluate_logical(left, e_ctx)? || evaluate_logical(right, e_ctx)?).into()),
        Expression::Binary { op, left, right } => {
            let left = evaluate(left, e_ctx)?;
            let right = evaluate(right, e_ctx)?;
            Ok(compare(*op, &left, &right).map_or(ExpressionValue::Nothing, ExpressionValue::Logical))
        }
        Expression::Not(inner) => {
            let value = evaluate(inner, e_ctx)?;
            if value.is_nothing() {
                Ok(value)
            } else {
                Ok((!value.to_bool()).into())
            }
        }
        Expression::Parenthesized(inner) => evaluate(inner, e_ctx),
    }
}

fn literal_value(literal: &Literal) -> ExpressionValue<'static> {
    let primitive = match literal {
        Literal::Integer(value) => Primitive::Integer(*value),
        Literal::Float(value) => Primitive::Float(*value),
        Literal::String(text) => Primitive::String(Cow::Owned(text.clone())),
        Literal::Boolean(value) => Primitive::Boolean(*value),
        Literal::Null => Primitive::Null,
    };
    ExpressionValue::Primitive(primitive)
}

/// Runs an embedded query. A singular query that found exactly one node
/// yields that node; every other result is a node list.
fn evaluate_query<'a>(
    query: &QueryExpression,
    singular: bool,
    e_ctx: &ExpressionEvaluationContext<'a, '_>,
) -> Result<ExpressionValue<'a>, JsonPathError> {
    let start = match query.root {
        QueryRoot::Root => e_ctx.query.root,
        QueryRoot::Current => e_ctx.current,
    };
    let mut nodes = engine::proc_segments(start, &query.segments, &e_ctx.query)?;
    if singular && nodes.len() == 1 {
        if let Some(node) = nodes.pop() {
            return Ok(ExpressionValue::Node(node));
        }
    }
    Ok(ExpressionValue::Nodes(nodes))
}

/// Calls a registered function. An unknown function yields no value; missing
/// arguments arrive as [`ExpressionValue::Nothing`].
fn evaluate_function<'a>(
    name: &str,
    args: &[Expression],
    e_ctx: &ExpressionEvaluationContext<'a, '_>,
) -> Result<ExpressionValue<'a>, JsonPathError> {
    let Some(function) = e_ctx.query.functions.get(name) else {
        log::debug!("Unknown function '{name}'");
        return Ok(ExpressionValue::Nothing);
    };
    let parameters = function.parameters();
    let mut prepared = Vec::with_capacity(parameters.len());
    for (i, parameter) in parameters.iter().enumerate() {
        let value = match args.get(i) {
            Some(arg) => convert_argument(evaluate(arg, e_ctx)?, *parameter),
            None => ExpressionValue::Nothing,
        };
        prepared.push(value);
        e_ctx.query.check_cancelled()?;
    }
    let f_ctx = FunctionContext {
        cancellation: e_ctx.query.cancellation,
    };
    Ok(function.execute(&prepared, &f_ctx))
}

/// Converts an evaluated argument to the declared parameter type, or to
/// [`ExpressionValue::Nothing`] when no conversion exists.
fn convert_argument(value: ExpressionValue<'_>, parameter: FunctionType) -> ExpressionValue<'_> {
    match parameter {
        FunctionType::Logical => match value {
            ExpressionValue::Logical(_) | ExpressionValue::Primitive(Primitive::Boolean(_)) => {
                value.to_bool().into()
            }
            ExpressionValue::Nodes(nodes) => (!nodes.is_empty()).into(),
            ExpressionValue::Node(_) => ExpressionValue::TRUE,
            _ => ExpressionValue::Nothing,
        },
        FunctionType::Value => match value {
            ExpressionValue::Node(_) | ExpressionValue::Primitive(_) => value,
            ExpressionValue::Nodes(mut nodes) if nodes.len() == 1 => {
                nodes.pop().map_or(ExpressionValue::Nothing, ExpressionValue::Node)
            }
            _ => ExpressionValue::Nothing,
        },
        FunctionType::Nodes => match value {
            ExpressionValue::Nodes(_) => value,
            ExpressionValue::Node(node) => ExpressionValue::Nodes(vec![node]),
            _ => ExpressionValue::Nothing,
        },
    }
}

/// Applies a comparison operator. `None` means the comparison is undefined.
fn compare(op: BinaryOperator, left: &ExpressionValue<'_>, right: &ExpressionValue<'_>) -> Option<bool> {
    match op {
        BinaryOperator::Equal => equals(left, right),
        BinaryOperator::NotEqual => equals(left, right).map(|equal| !equal),
        BinaryOperator::Less => less_than(left, right),
        BinaryOperator::Greater => less_than(right, left),
        BinaryOperator::LessEqual => Some(equals(left, right)? || less_than(left, right)?),
        BinaryOperator::GreaterEqual => Some(equals(left, right)? || less_than(right, left)?),
        BinaryOperator::And => Some(left.to_bool() && right.to_bool()),
        BinaryOperator::Or => Some(left.to_bool() || right.to_bool()),
    }
}

fn equals(left: &ExpressionValue<'_>, right: &ExpressionValue<'_>) -> Option<bool> {
    match (left, right) {
        (ExpressionValue::Node(a), ExpressionValue::Node(b)) => Some(node::deep_equal(a, b)),
        (ExpressionValue::Node(n), other) | (other, ExpressionValue::Node(n)) => {
            if matches!(n, Value::Object(_) | Value::Array(_)) {
                return None;
            }
            equals_scalar(&ExpressionValue::from_json(n), other)
        }
        _ => equals_scalar(left, right),
    }
}

fn equals_scalar(left: &ExpressionValue<'_>, right: &ExpressionValue<'_>) -> Option<bool> {
    use ExpressionValue::{Logical, Primitive as P};
    match (left, right) {
        (P(a), P(b)) => equals_primitive(a, b),
        (Logical(a), Logical(b))
        | (Logical(a), P(Primitive::Boolean(b)))
        | (P(Primitive::Boolean(b)), Logical(a)) => Some(a == b),
        (Logical(_), P(Primitive::Null)) | (P(Primitive::Null), Logical(_)) => Some(false),
        _ => None,
    }
}

fn equals_primitive(left: &Primitive<'_>, right: &Primitive<'_>) -> Option<bool> {
    match (left, right) {
        (Primitive::Integer(a), Primitive::Integer(b)) => Some(a == b),
        (Primitive::String(a), Primitive::String(b)) => Some(a == b),
        (Primitive::Boolean(a), Primitive::Boolean(b)) => Some(a == b),
        (Primitive::Null, Primitive::Null) => Some(true),
        (Primitive::Null, _) | (_, Primitive::Null) => Some(false),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => Some(a == b),
            _ => None,
        },
    }
}

/// Ordering is defined between numbers and between strings only.
fn less_than(left: &ExpressionValue<'_>, right: &ExpressionValue<'_>) -> Option<bool> {
    let left = comparable(left);
    let right = comparable(right);
    let (ExpressionValue::Primitive(a), ExpressionValue::Primitive(b)) = (left.as_ref(), right.as_ref())
    else {
        return None;
    };
    match (a, b) {
        (Primitive::Integer(a), Primitive::Integer(b)) => Some(a < b),
        (Primitive::String(a), Primitive::String(b)) => Some(a < b),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => Some(a < b),
            _ => None,
        },
    }
}

fn comparable<'v, 'a>(value: &'v ExpressionValue<'a>) -> Cow<'v, ExpressionValue<'a>> {
    match value {
        ExpressionValue::Node(node) => Cow::Owned(ExpressionValue::from_json(node)),
        other => Cow::Borrowed(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::functions::FunctionRegistry;
    use crate::parser::parse_query;
    use crate::ast::{Segment, Selector};
    use serde_json::json;

    fn filter_expression(query: &str) -> Expression {
        let parsed = parse_query(query).unwrap_or_else(|e| panic!("{query}: {e}"));
        match parsed.segments.into_iter().next() {
            Some(Segment::Bracketed(selectors)) => match selectors.into_iter().next() {
                Some(Selector::Filter(expression)) => expression,
                other => panic!("expected filter selector, got {other:?}"),
            },
            other => panic!("expected bracketed segment, got {other:?}"),
        }
    }

    fn eval<'a>(filter: &str, root: &'a Value, current: &'a Value) -> ExpressionValue<'a> {
        let functions = FunctionRegistry::default();
        let token = CancellationToken::new();
        let ctx = ExpressionEvaluationContext::new(QueryContext::new(root, &functions, &token), current);
        let expression = filter_expression(&format!("$[?{filter}]"));
        evaluate(&expression, &ctx).unwrap_or_else(|e| panic!("{e}"))
    }

    fn check<'a>(filter: &str, current: &'a Value) -> ExpressionValue<'a> {
        eval(filter, current, current)
    }

    #[test]
    fn test_number_equality_across_kinds() {
        let current = json!({"i": 12, "f": 12.0, "neg": -12.3});
        assert_eq!(check("@.i == 12.0", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.f == 12", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.neg == -0.123e2", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.i == @.f", &current), ExpressionValue::TRUE);
    }

    #[test]
    fn test_null_only_equals_null() {
        let current = json!({"n": null, "f": false, "z": 0, "s": ""});
        assert_eq!(check("@.n == null", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.f == null", &current), ExpressionValue::FALSE);
        assert_eq!(check("@.z == null", &current), ExpressionValue::FALSE);
        assert_eq!(check("null == @.s", &current), ExpressionValue::FALSE);
    }

    #[test]
    fn test_mismatched_types_are_undefined() {
        let current = json!({"s": "1", "o": {}, "t": true});
        assert_eq!(check("@.s == 1", &current), ExpressionValue::Nothing);
        assert_eq!(check("@.o == true", &current), ExpressionValue::Nothing);
        assert_eq!(check("@.t == 1", &current), ExpressionValue::Nothing);
        assert_eq!(check("@.s != 1", &current), ExpressionValue::Nothing);
    }

    #[test]
    fn test_missing_member_is_undefined() {
        let current = json!({});
        assert_eq!(check("@.missing == 1", &current), ExpressionValue::Nothing);
        assert_eq!(check("@.missing != 1", &current), ExpressionValue::Nothing);
    }

    #[test]
    fn test_structural_node_equality() {
        let current = json!({"a": {"x": [1, 2]}, "b": {"x": [1.0, 2]}, "c": {"x": [2, 1]}});
        assert_eq!(check("@.a == @.b", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.a == @.c", &current), ExpressionValue::FALSE);
    }

    #[test]
    fn test_ordering() {
        let current = json!({"n": 42, "s": "b", "t": true});
        assert_eq!(check("@.n < 44", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.n > 41.5", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.n <= 42", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.n >= 43", &current), ExpressionValue::FALSE);
        assert_eq!(check("@.s < 'c'", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.s >= 'a'", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.s < 1", &current), ExpressionValue::Nothing);
        assert_eq!(check("@.t < true", &current), ExpressionValue::Nothing);
        assert_eq!(check("@.t <= true", &current), ExpressionValue::Nothing);
        assert_eq!(check("@.t >= false", &current), ExpressionValue::Nothing);
    }

    #[test]
    fn test_logical_result_compared_to_boolean() {
        let current = json!({"key": 44});
        assert_eq!(check("(@.key < 44) == false", &current), ExpressionValue::TRUE);
        assert_eq!(check("(@.key < 44) == true", &current), ExpressionValue::FALSE);
    }

    #[test]
    fn test_not_keeps_nothing() {
        let current = json!({"s": "x"});
        assert_eq!(check("!(@.s == 1)", &current), ExpressionValue::Nothing);
        assert_eq!(check("!@.missing", &current), ExpressionValue::TRUE);
        assert_eq!(check("!@.s", &current), ExpressionValue::FALSE);
    }

    #[test]
    fn test_and_or() {
        let current = json!({"a": 1, "b": 2});
        assert_eq!(check("@.a == 1 && @.b == 2", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.a == 2 || @.b == 2", &current), ExpressionValue::TRUE);
        assert_eq!(check("@.a == 2 && @.b == 2", &current), ExpressionValue::FALSE);
        assert_eq!(check("@.x || @.y", &current), ExpressionValue::FALSE);
    }

    #[test]
    fn test_absolute_query_in_filter() {
        let root = json!({"limit": 3});
        let current = json!(2);
        assert_eq!(eval("@ < $.limit", &root, &current), ExpressionValue::TRUE);
    }

    #[test]
    fn test_singular_query_result_is_node() {
        let root = json!(null);
        let current = json!({"a": [1, 2]});
        let functions = FunctionRegistry::default();
        let token = CancellationToken::new();
        let e_ctx = ExpressionEvaluationContext::new(QueryContext::new(&root, &functions, &token), &current);
        let query = QueryExpression {
            root: QueryRoot::Current,
            segments: parse_query("$.a[0]").map(|q| q.segments).unwrap_or_default(),
        };
        assert_eq!(
            evaluate_query(&query, true, &e_ctx),
            Ok(ExpressionValue::Node(&current["a"][0]))
        );
        assert_eq!(
            evaluate_query(&query, false, &e_ctx),
            Ok(ExpressionValue::Nodes(vec![&current["a"][0]]))
        );
    }

    #[test]
    fn test_function_calls() {
        let current = json!({"s": "abcd", "a": [1, 2, 3], "n": 5});
        assert_eq!(check("length(@.s) == 4", &current), ExpressionValue::TRUE);
        assert_eq!(check("count(@.a[*]) == 3", &current), ExpressionValue::TRUE);
        assert_eq!(check("length(@.n) == 1", &current), ExpressionValue::Nothing);
        assert_eq!(check("length(@.missing) == 0", &current), ExpressionValue::Nothing);
        assert_eq!(check("match(@.s, 'a.*')", &current), ExpressionValue::TRUE);
        assert_eq!(check("search(@.s, 'bc')", &current), ExpressionValue::TRUE);
        assert_eq!(check("value(@.a[0]) == 1", &current), ExpressionValue::TRUE);
    }

    #[test]
    fn test_unknown_function_is_nothing() {
        let current = json!({});
        assert_eq!(check("nope(@) == 1", &current), ExpressionValue::Nothing);
    }

    #[test]
    fn test_argument_conversion() {
        let doc = json!([1, 2]);
        assert_eq!(
            convert_argument(ExpressionValue::Nodes(vec![&doc[0]]), FunctionType::Value),
            ExpressionValue::Node(&doc[0])
        );
        assert_eq!(
            convert_argument(ExpressionValue::Nodes(vec![&doc[0], &doc[1]]), FunctionType::Value),
            ExpressionValue::Nothing
        );
        assert_eq!(
            convert_argument(ExpressionValue::Nodes(vec![]), FunctionType::Logical),
            ExpressionValue::FALSE
        );
        assert_eq!(
            convert_argument(ExpressionValue::Node(&doc[0]), FunctionType::Nodes),
            ExpressionValue::Nodes(vec![&doc[0]])
        );
        assert_eq!(
            convert_argument(ExpressionValue::Node(&doc[0]), FunctionType::Logical),
            ExpressionValue::TRUE
        );
        assert_eq!(
            convert_argument(ExpressionValue::Primitive(Primitive::Integer(1)), FunctionType::Nodes),
            ExpressionValue::Nothing
        );
        assert_eq!(
            convert_argument(ExpressionValue::Logical(true), FunctionType::Value),
            ExpressionValue::Nothing
        );
    }

    #[test]
    fn test_cancellation_propagates_from_nested_query() {
        let root = json!({"a": [1, 2, 3]});
        let functions = FunctionRegistry::default();
        let token = CancellationToken::new();
        token.cancel();
        let e_ctx = ExpressionEvaluationContext::new(QueryContext::new(&root, &functions, &token), &root);
        let expression = filter_expression("$[?count($.a[*]) > 0]");
        assert_eq!(evaluate(&expression, &e_ctx), Err(JsonPathError::Cancelled));
    }
}
