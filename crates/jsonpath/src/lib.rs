//! An RFC 9535 JSONPath compiler and evaluator over `serde_json` documents.
//!
//! Query text is parsed once into a [`JsonPathQuery`], which can then be
//! evaluated against any number of documents, from any number of threads.
//! Evaluation never fails on document shape: a member or index that does not
//! exist simply selects nothing. The only evaluation error is cancellation.

pub mod ast;
pub mod cancel;
pub mod engine;
pub mod error;
pub mod expression;
pub mod functions;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod reader;
pub mod services;
pub mod token;
pub mod value;

// --- Public API ---
pub use ast::{Expression, Query, Segment, Selector};
pub use cancel::CancellationToken;
pub use error::{JsonPathError, ParseErrors};
pub use functions::{FunctionContext, FunctionDefinition, FunctionRegistry, FunctionType};
pub use parser::{parse_query, parse_query_utf8};
pub use services::{JsonPathQuery, JsonPathServices, JsonPathServicesBuilder};
pub use value::{ExpressionValue, Primitive};
