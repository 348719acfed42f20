//! The segment executor: applies query segments to a JSON document.
//!
//! The working result is always an ordered node list, starting with the
//! start node. Each segment expands every node of the current list through
//! its selectors and concatenates the matches in encounter order.

use itertools::Either;
use serde_json::Value;

use crate::ast::{DescendantSelection, Expression, Segment, Selector, Slice};
use crate::cancel::CancellationToken;
use crate::error::JsonPathError;
use crate::expression::{self, ExpressionEvaluationContext};
use crate::functions::FunctionRegistry;
use crate::node;

/// State shared by every selector application during one evaluation.
/// `'a` is the lifetime of the document, `'c` that of the evaluation services.
#[derive(Clone, Copy)]
pub struct QueryContext<'a, 'c> {
    pub root: &'a Value,
    pub functions: &'c FunctionRegistry,
    pub cancellation: &'c CancellationToken,
}

impl<'a, 'c> QueryContext<'a, 'c> {
    pub fn new(
        root: &'a Value,
        functions: &'c FunctionRegistry,
        cancellation: &'c CancellationToken,
    ) -> Self {
        Self {
            root,
            functions,
            cancellation,
        }
    }

    pub fn check_cancelled(&self) -> Result<(), JsonPathError> {
        if self.cancellation.is_cancelled() {
            log::debug!("Query evaluation cancelled");
            return Err(JsonPathError::Cancelled);
        }
        Ok(())
    }
}

/// Applies `segments` left to right starting from `start`.
///
/// Once an intermediate result is empty the remaining segments are skipped.
pub fn proc_segments<'a>(
    start: &'a Value,
    segments: &[Segment],
    ctx: &QueryContext<'a, '_>,
) -> Result<Vec<&'a Value>, JsonPathError> {
    let mut result = vec![start];
    for segment in segments {
        log::trace!("Applying segment {segment} to {} node(s)", result.len());
        let mut next = Vec::new();
        match segment {
            Segment::Child(selector) => {
                for &element in &result {
                    select(element, selector, ctx, false, &mut next)?;
                }
            }
            Segment::Bracketed(selectors)
            | Segment::Descendant(DescendantSelection::Bracketed(selectors)) => {
                let descendant = matches!(segment, Segment::Descendant(_));
                for &element in &result {
                    for selector in selectors {
                        select(element, selector, ctx, descendant, &mut next)?;
                    }
                }
            }
            Segment::Descendant(DescendantSelection::Selector(selector)) => {
                for &element in &result {
                    select(element, selector, ctx, true, &mut next)?;
                }
            }
        }
        result = next;
        if result.is_empty() {
            break;
        }
    }
    Ok(result)
}

/// Applies one selector to `element`, appending matches to `out`. In
/// descendant mode the selector is applied at every depth below `element`.
fn select<'a>(
    element: &'a Value,
    selector: &Selector,
    ctx: &QueryContext<'a, '_>,
    descendant: bool,
    out: &mut Vec<&'a Value>,
) -> Result<(), JsonPathError> {
    ctx.check_cancelled()?;
    match selector {
        Selector::Name(name) | Selector::MemberNameShorthand(name) => {
            select_member(element, name, descendant, out)
        }
        Selector::Wildcard => {
            if descendant {
                out.extend(node::descendants(element));
            } else {
                out.extend(node::children(element));
            }
        }
        Selector::Index(index) => select_index(element, *index, descendant, out),
        Selector::Slice(slice) => select_slice(element, slice, ctx, descendant, out)?,
        Selector::Filter(expression) => select_filter(element, expression, ctx, descendant, out)?,
    }
    Ok(())
}

fn select_member<'a>(element: &'a Value, name: &str, descendant: bool, out: &mut Vec<&'a Value>) {
    let member = |node: &'a Value| node.as_object().and_then(|members| members.get(name));
    out.extend(member(element));
    if descendant {
        out.extend(node::descendants(element).filter_map(member));
    }
}

fn select_index<'a>(element: &'a Value, index: i64, descendant: bool, out: &mut Vec<&'a Value>) {
    let arrays = if descendant {
        Either::Left(node::descendants_and_self(element))
    } else {
        Either::Right(std::iter::once(element))
    };
    for array in arrays.filter_map(Value::as_array) {
        out.extend(element_at(array, index));
    }
}

/// A negative index counts back from the end of the array.
fn element_at(array: &[Value], index: i64) -> Option<&Value> {
    let len = array.len() as i64;
    let normalized = if index < 0 { len + index } else { index };
    if (0..len).contains(&normalized) {
        array.get(normalized as usize)
    } else {
        None
    }
}

fn select_slice<'a>(
    element: &'a Value,
    slice: &Slice,
    ctx: &QueryContext<'a, '_>,
    descendant: bool,
    out: &mut Vec<&'a Value>,
) -> Result<(), JsonPathError> {
    let step = slice.step.unwrap_or(1);
    if step == 0 {
        return Ok(());
    }
    let arrays = if descendant {
        Either::Left(node::descendants_and_self(element))
    } else {
        Either::Right(std::iter::once(element))
    };
    for array in arrays.filter_map(Value::as_array) {
        ctx.check_cancelled()?;
        let (lower, upper) = slice_bounds(slice.start, slice.end, step, array.len() as i64);
        if step > 0 {
            let mut i = lower;
            while i < upper {
                out.push(&array[i as usize]);
                let Some(next) = i.checked_add(step) else { break };
                i = next;
            }
        } else {
            let mut i = upper;
            while i > lower {
                out.push(&array[i as usize]);
                let Some(next) = i.checked_add(step) else { break };
                i = next;
            }
        }
    }
    Ok(())
}

/// Normalizes slice bounds into `(lower, upper)`: `[0, len]` for a positive
/// step, `[-1, len - 1]` for a negative one. Bounds of any magnitude clamp.
fn slice_bounds(start: Option<i64>, end: Option<i64>, step: i64, len: i64) -> (i64, i64) {
    let normalize = |bound: i64| if bound >= 0 { bound } else { bound.saturating_add(len) };
    if step > 0 {
        let start = normalize(start.unwrap_or(0));
        let end = normalize(end.unwrap_or(len));
        (start.clamp(0, len), end.clamp(0, len))
    } else {
        let start = normalize(start.unwrap_or(len - 1));
        let end = normalize(end.unwrap_or(-len - 1));
        (end.clamp(-1, len - 1), start.clamp(-1, len - 1))
    }
}

/// Keeps the candidates for which `expression` is true. Candidates are the
/// children of `element`, or in descendant mode every node below it.
fn select_filter<'a>(
    element: &'a Value,
    expression: &Expression,
    ctx: &QueryContext<'a, '_>,
    descendant: bool,
    out: &mut Vec<&'a Value>,
) -> Result<(), JsonPathError> {
    let candidates = if descendant {
        Either::Left(node::descendants(element))
    } else {
        Either::Right(node::children(element))
    };
    for candidate in candidates {
        let e_ctx = ExpressionEvaluationContext::new(*ctx, candidate);
        if expression::evaluate_logical(expression, &e_ctx)? {
            out.push(candidate);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_query;
    use serde_json::json;

    fn run<'a>(query: &str, doc: &'a Value) -> Vec<&'a Value> {
        let functions = FunctionRegistry::default();
        let token = CancellationToken::new();
        let ctx = QueryContext::new(doc, &functions, &token);
        let query = parse_query(query).unwrap_or_else(|e| panic!("{query}: {e}"));
        proc_segments(doc, &query.segments, &ctx).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_slice_bounds() {
        assert_eq!(slice_bounds(None, None, 1, 5), (0, 5));
        assert_eq!(slice_bounds(None, None, -1, 5), (-1, 4));
        assert_eq!(slice_bounds(Some(-2), None, 1, 5), (3, 5));
        assert_eq!(slice_bounds(Some(2), Some(-113667776004), -1, 5), (-1, 2));
        assert_eq!(slice_bounds(Some(i64::MIN), Some(i64::MAX), 1, 5), (0, 5));
        assert_eq!(slice_bounds(None, None, -1, 0), (-1, -1));
    }

    #[test]
    fn test_element_at() {
        let array = [json!(1), json!(2), json!(3)];
        assert_eq!(element_at(&array, -1), Some(&json!(3)));
        assert_eq!(element_at(&array, 3), None);
        assert_eq!(element_at(&array, -4), None);
        assert_eq!(element_at(&array, i64::MIN), None);
    }

    #[test]
    fn test_reverse_slice_with_huge_negative_end() {
        let doc = json!(["first", "second", "third", "forth", "fifth"]);
        assert_eq!(
            run("$[2:-113667776004:-1]", &doc),
            vec![&json!("third"), &json!("second"), &json!("first")]
        );
    }

    #[test]
    fn test_large_step_does_not_overflow() {
        let doc = json!([0, 1, 2]);
        assert_eq!(run("$[1::9223372036854775807]", &doc), vec![&json!(1)]);
        assert_eq!(run("$[1::-9223372036854775808]", &doc), vec![&json!(1)]);
    }

    #[test]
    fn test_zero_step_selects_nothing() {
        let doc = json!([0, 1, 2]);
        assert!(run("$[::0]", &doc).is_empty());
    }

    #[test]
    fn test_empty_intermediate_result_short_circuits() {
        let doc = json!({"a": 1});
        assert!(run("$.missing[0].x..y", &doc).is_empty());
    }

    #[test]
    fn test_descendant_name_order() {
        let doc = json!({"a": {"a": 1, "b": {"a": 2}}, "c": [{"a": 3}]});
        assert_eq!(
            run("$..a", &doc),
            vec![&json!({"a": 1, "b": {"a": 2}}), &json!(1), &json!(2), &json!(3)]
        );
    }

    #[test]
    fn test_descendant_index_includes_start_array() {
        let doc = json!([[1, 2], [3]]);
        assert_eq!(run("$..[0]", &doc), vec![&json!([1, 2]), &json!(1), &json!(3)]);
    }

    #[test]
    fn test_descendant_slice_per_array() {
        let doc = json!([[1, 2], [3, 4]]);
        assert_eq!(
            run("$..[:1]", &doc),
            vec![&json!([1, 2]), &json!(1), &json!(3)]
        );
    }

    #[test]
    fn test_descendant_filter_excludes_start_node() {
        let doc = json!({"k": 1, "o": {"k": 2}});
        assert_eq!(run("$..[?@.k]", &doc), vec![&json!({"k": 2})]);
    }

    #[test]
    fn test_cancelled_evaluation() {
        let doc = json!([1, 2, 3]);
        let functions = FunctionRegistry::default();
        let token = CancellationToken::new();
        token.cancel();
        let ctx = QueryContext::new(&doc, &functions, &token);
        let query = parse_query("$[*]").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            proc_segments(&doc, &query.segments, &ctx),
            Err(JsonPathError::Cancelled)
        );
    }
}
