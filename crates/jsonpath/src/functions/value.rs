use super::{FunctionContext, FunctionDefinition, FunctionType};
use crate::value::ExpressionValue;

/// `value(nodes)`: the single node of a one-node list; no value otherwise.
pub struct ValueFunction;

impl FunctionDefinition for ValueFunction {
    fn name(&self) -> &str {
        "value"
    }

    fn result_type(&self) -> FunctionType {
        FunctionType::Value
    }

    fn parameters(&self) -> &[FunctionType] {
        &[FunctionType::Nodes]
    }

    fn execute<'a>(
        &self,
        args: &[ExpressionValue<'a>],
        _ctx: &FunctionContext<'_>,
    ) -> ExpressionValue<'a> {
        match args.first() {
            Some(ExpressionValue::Nodes(nodes)) if nodes.len() == 1 => ExpressionValue::Node(nodes[0]),
            _ => ExpressionValue::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use serde_json::json;

    #[test]
    fn test_value_unwraps_single_node() {
        let token = CancellationToken::new();
        let ctx = FunctionContext { cancellation: &token };
        let doc = json!(["a", "b"]);
        assert_eq!(
            ValueFunction.execute(&[ExpressionValue::Nodes(vec![&doc[0]])], &ctx),
            ExpressionValue::Node(&doc[0])
        );
        assert_eq!(
            ValueFunction.execute(&[ExpressionValue::Nodes(vec![&doc[0], &doc[1]])], &ctx),
            ExpressionValue::Nothing
        );
        assert_eq!(
            ValueFunction.execute(&[ExpressionValue::Nodes(vec![])], &ctx),
            ExpressionValue::Nothing
        );
    }
}
