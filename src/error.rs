// src/error.rs
use sift_jsonpath::JsonPathError;
use thiserror::Error;

/// Everything that can stop a `sift` run.
#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Query failed: {0}")]
    Query(#[from] JsonPathError),

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid JSON on line {line}: {source}")]
    JsonLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Usage error: {0}")]
    Usage(String),
}
