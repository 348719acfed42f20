use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonPathError {
    #[error("Parse error in '{query}': {errors}")]
    Parse { query: String, errors: ParseErrors },

    #[error("Query evaluation was cancelled")]
    Cancelled,
}

impl JsonPathError {
    pub fn parse(query: impl Into<String>, errors: ParseErrors) -> Self {
        Self::Parse {
            query: query.into(),
            errors,
        }
    }
}

/// The diagnostics accumulated while parsing a rejected query, in the order
/// they were recorded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseErrors(pub Vec<String>);

impl ParseErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", itertools::join(&self.0, "\n"))
    }
}

impl std::error::Error for ParseErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_lists_every_message() {
        let errors = ParseErrors(vec!["first".into(), "second".into()]);
        let error = JsonPathError::parse("$[", errors);
        assert_eq!(error.to_string(), "Parse error in '$[': first\nsecond");
    }
}
