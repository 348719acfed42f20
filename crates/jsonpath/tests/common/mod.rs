#![allow(dead_code)]

pub mod fixtures;

use serde_json::{Value, json};
use sift_jsonpath::{CancellationToken, JsonPathError, JsonPathServices};

/// Evaluates `query` against `document` with the built-in functions.
pub fn execute(document: &Value, query: &str) -> Result<Value, JsonPathError> {
    let _ = env_logger::builder().is_test(true).try_init();
    let query = JsonPathServices::new().parse(query)?;
    query.execute(document, &CancellationToken::new())
}

/// Asserts the exact, ordered result of a query.
pub fn assert_query(document: Value, query: &str, expected: Value) {
    match execute(&document, query) {
        Ok(result) => assert_eq!(result, expected, "Unexpected result for '{query}'."),
        Err(e) => panic!("Query '{query}' failed: {e}"),
    }
}

pub fn assert_query_is_empty(document: Value, query: &str) {
    assert_query(document, query, json!([]));
}

/// Asserts the result of a query ignoring the order of the selected nodes.
pub fn assert_query_as_set(document: Value, query: &str, expected: Value) {
    let result = match execute(&document, query) {
        Ok(result) => result,
        Err(e) => panic!("Query '{query}' failed: {e}"),
    };
    let actual = result.as_array().cloned().unwrap_or_default();
    let mut remaining = expected.as_array().cloned().unwrap_or_default();
    assert_eq!(
        actual.len(),
        remaining.len(),
        "Expected {expected} but was {result} for '{query}'."
    );
    for value in &actual {
        match remaining.iter().position(|candidate| candidate == value) {
            Some(index) => {
                remaining.remove(index);
            }
            None => panic!("Unexpected {value} in {result} for '{query}'."),
        }
    }
}

/// Asserts that the query text is rejected by the parser.
pub fn assert_invalid(query: &str) {
    let _ = env_logger::builder().is_test(true).try_init();
    match JsonPathServices::new().parse(query) {
        Err(JsonPathError::Parse { errors, .. }) => assert!(!errors.is_empty()),
        other => panic!("Expected '{query}' to be rejected, got {other:?}"),
    }
}
