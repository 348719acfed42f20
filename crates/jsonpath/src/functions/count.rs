use super::{FunctionContext, FunctionDefinition, FunctionType};
use crate::value::{ExpressionValue, Primitive};

/// `count(nodes)`: the number of nodes in a node list.
pub struct CountFunction;

impl FunctionDefinition for CountFunction {
    fn name(&self) -> &str {
        "count"
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
            Some(ExpressionValue::Nodes(nodes)) => {
                ExpressionValue::Primitive(Primitive::Integer(nodes.len() as i64))
            }
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
    fn test_count() {
        let token = CancellationToken::new();
        let ctx = FunctionContext { cancellation: &token };
        let doc = json!([1, 2]);
        let nodes = ExpressionValue::Nodes(doc.as_array().into_iter().flatten().collect());
        assert_eq!(
            CountFunction.execute(&[nodes], &ctx),
            ExpressionValue::Primitive(Primitive::Integer(2))
        );
        assert_eq!(
            CountFunction.execute(&[ExpressionValue::Nodes(vec![])], &ctx),
            ExpressionValue::Primitive(Primitive::Integer(0))
        );
        assert_eq!(
            CountFunction.execute(&[ExpressionValue::Nothing], &ctx),
            ExpressionValue::Nothing
        );
    }
}
