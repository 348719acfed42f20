//! Function extensions callable from filter expressions, and the registry
//! that resolves them by name.
mod count;
mod length;
mod regex;
mod value;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::cancel::CancellationToken;
use crate::value::ExpressionValue;

pub use self::count::CountFunction;
pub use self::length::LengthFunction;
pub use self::regex::{MatchFunction, SearchFunction};
pub use self::value::ValueFunction;

/// The declared type of a function parameter or result. Arguments are
/// converted to the declared parameter type before the function runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionType {
    Logical,
    Value,
    Nodes,
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionType::Logical => write!(f, "LogicalType"),
            FunctionType::Value => write!(f, "ValueType"),
            FunctionType::Nodes => write!(f, "NodesType"),
        }
    }
}

/// State available to a function while it runs.
pub struct FunctionContext<'c> {
    pub cancellation: &'c CancellationToken,
}

/// A function that filter expressions can call.
///
/// Functions never fail: an argument that could not be converted to the
/// declared parameter type arrives as [`ExpressionValue::Nothing`] and should
/// be treated as absent.
pub trait FunctionDefinition: Send + Sync {
    fn name(&self) -> &str;

    fn result_type(&self) -> FunctionType;

    fn parameters(&self) -> &[FunctionType];

    fn execute<'a>(
        &self,
        args: &[ExpressionValue<'a>],
        ctx: &FunctionContext<'_>,
    ) -> ExpressionValue<'a>;
}

/// Functions by name. Built once and shared read-only between evaluations.
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn FunctionDefinition>>,
}

impl FunctionRegistry {
    /// Creates a new, empty function registry.
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Registers a function, replacing any function with the same name.
    pub fn register(&mut self, function: Arc<dyn FunctionDefinition>) {
        self.functions.insert(function.name().to_string(), function);
    }

    /// Finds a function by its exact, case-sensitive name.
    pub fn get(&self, name: &str) -> Option<&dyn FunctionDefinition> {
        self.functions.get(name).map(|function| function.as_ref())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// All registered functions, ordered by name.
    pub fn definitions(&self) -> Vec<&dyn FunctionDefinition> {
        let mut definitions: Vec<_> = self.functions.values().map(|f| f.as_ref()).collect();
        definitions.sort_by(|a, b| a.name().cmp(b.name()));
        definitions
    }
}

impl Default for FunctionRegistry {
    /// Creates a new registry populated with all built-in functions.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LengthFunction));
        registry.register(Arc::new(CountFunction));
        registry.register(Arc::new(ValueFunction));
        registry.register(Arc::new(MatchFunction::default()));
        registry.register(Arc::new(SearchFunction::default()));
        registry
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.definitions().iter().map(|d| d.name()))
            .finish()
    }
}
