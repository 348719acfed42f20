use serde_json::Value;

use super::{FunctionContext, FunctionDefinition, FunctionType};
use crate::value::{ExpressionValue, Primitive};

/// `length(value)`: the number of characters in a string, elements in an
/// array or members in an object. Any other value has no length.
pub struct LengthFunction;

impl FunctionDefinition for LengthFunction {
    fn name(&self) -> &str {
        "length"
    }

    fn result_type(&self) -> FunctionType {
        FunctionType::Value
    }

    fn parameters(&self) -> &[FunctionType] {
        &[FunctionType::Value]
    }

    fn execute<'a>(
        &self,
        args: &[ExpressionValue<'a>],
        _ctx: &FunctionContext<'_>,
    ) -> ExpressionValue<'a> {
        let length = match args.first() {
            Some(ExpressionValue::Node(Value::String(text))) => text.chars().count(),
            Some(ExpressionValue::Node(Value::Array(elements))) => elements.len(),
            Some(ExpressionValue::Node(Value::Object(members))) => members.len(),
            Some(ExpressionValue::Primitive(Primitive::String(text))) => text.chars().count(),
            _ => return ExpressionValue::Nothing,
        };
        ExpressionValue::Primitive(Primitive::Integer(length as i64))
    }
}
