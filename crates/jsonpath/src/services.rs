//! Compiling query text and evaluating compiled queries.
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::ast::Query;
use crate::cancel::CancellationToken;
use crate::engine::{self, QueryContext};
use crate::error::{JsonPathError, ParseErrors};
use crate::functions::{FunctionDefinition, FunctionRegistry};
use crate::parser;

/// Compiles queries against a fixed set of functions.
///
/// ```
/// use serde_json::json;
/// use sift_jsonpath::{CancellationToken, JsonPathServices};
///
/// let services = JsonPathServices::new();
/// let query = services.parse("$.store.book[?@.price < 10].title").unwrap();
/// let doc = json!({"store": {"book": [
///     {"title": "Sayings", "price": 8.95},
///     {"title": "Sword", "price": 12.99}
/// ]}});
/// let result = query.execute(&doc, &CancellationToken::new()).unwrap();
/// assert_eq!(result, json!(["Sayings"]));
/// ```
#[derive(Debug, Clone)]
pub struct JsonPathServices {
    functions: Arc<FunctionRegistry>,
}

impl Default for JsonPathServices {
    fn default() -> Self {
        JsonPathServicesBuilder::default().build()
    }
}

impl JsonPathServices {
    /// Creates services with the built-in functions.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn builder() -> JsonPathServicesBuilder {
        JsonPathServicesBuilder::default()
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Parses query text. A rejected query carries every diagnostic the
    /// parser recorded.
    pub fn parse(&self, text: &str) -> Result<JsonPathQuery, JsonPathError> {
        self.compile(text, parser::parse_query(text))
    }

    /// Parses a query given as UTF-8 bytes.
    pub fn parse_utf8(&self, bytes: &[u8]) -> Result<JsonPathQuery, JsonPathError> {
        self.compile(&String::from_utf8_lossy(bytes), parser::parse_query_utf8(bytes))
    }

    /// Like [`parse`](Self::parse), discarding the diagnostics.
    pub fn try_parse(&self, text: &str) -> Option<JsonPathQuery> {
        self.parse(text).ok()
    }

    pub fn try_parse_utf8(&self, bytes: &[u8]) -> Option<JsonPathQuery> {
        self.parse_utf8(bytes).ok()
    }

    /// Wraps an already built syntax tree.
    pub fn from_syntax(&self, syntax: Query) -> JsonPathQuery {
        JsonPathQuery {
            syntax,
            functions: Arc::clone(&self.functions),
        }
    }

    fn compile(
        &self,
        text: &str,
        parsed: Result<Query, ParseErrors>,
    ) -> Result<JsonPathQuery, JsonPathError> {
        match parsed {
            Ok(syntax) => {
                log::debug!("Parsed '{text}' into {} segment(s)", syntax.segments.len());
                Ok(self.from_syntax(syntax))
            }
            Err(errors) => {
                log::debug!("Rejected '{text}' with {} error(s)", errors.len());
                Err(JsonPathError::parse(text, errors))
            }
        }
    }
}

/// Configures the functions available to queries.
pub struct JsonPathServicesBuilder {
    functions: FunctionRegistry,
}

impl Default for JsonPathServicesBuilder {
    fn default() -> Self {
        Self {
            functions: FunctionRegistry::default(),
        }
    }
}

impl JsonPathServicesBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers a function, replacing a registered function of the same name.
    pub fn with_function(mut self, function: Arc<dyn FunctionDefinition>) -> Self {
        self.functions.register(function);
        self
    }

    /// Removes every function registered so far, built-ins included.
    pub fn without_builtins(mut self) -> Self {
        self.functions = FunctionRegistry::new();
        self
    }

    pub fn build(self) -> JsonPathServices {
        JsonPathServices {
            functions: Arc::new(self.functions),
        }
    }
}

/// A compiled query. Evaluation never mutates it, so one query can be shared
/// between threads and evaluated against many documents.
#[derive(Debug, Clone)]
pub struct JsonPathQuery {
    syntax: Query,
    functions: Arc<FunctionRegistry>,
}

impl JsonPathQuery {
    pub fn syntax(&self) -> &Query {
        &self.syntax
    }

    /// The selected nodes, in document order per segment.
    pub fn select<'a>(
        &self,
        document: &'a Value,
        cancellation: &CancellationToken,
    ) -> Result<Vec<&'a Value>, JsonPathError> {
        let ctx = QueryContext::new(document, &self.functions, cancellation);
        engine::proc_segments(document, &self.syntax.segments, &ctx)
    }

    /// The selected nodes copied into a JSON array.
    pub fn execute(
        &self,
        document: &Value,
        cancellation: &CancellationToken,
    ) -> Result<Value, JsonPathError> {
        let nodes = self.select(document, cancellation)?;
        Ok(Value::Array(nodes.into_iter().cloned().collect()))
    }
}

impl fmt::Display for JsonPathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.syntax, f)
    }
}
