//! JSON-lines evaluation: every line is an independent document.
use rayon::prelude::*;
use serde_json::Value;
use sift_jsonpath::{CancellationToken, JsonPathQuery};

use crate::error::SiftError;

/// Sizes rayon's global pool. Must run before the first parallel batch;
/// 0 keeps rayon's default of one thread per core.
pub fn configure_thread_pool(num_threads: usize) {
    if num_threads == 0 {
        return;
    }
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        log::warn!("Failed to configure thread pool: {}. Using default.", e);
    } else {
        log::debug!("Configured thread pool with {} threads", num_threads);
    }
}

/// Evaluates `query` against every non-blank line in parallel. Results keep
/// the input order; the first malformed line fails the whole batch.
pub fn evaluate_lines(
    query: &JsonPathQuery,
    lines: &[String],
    cancellation: &CancellationToken,
) -> Result<Vec<Value>, SiftError> {
    log::debug!("Evaluating '{query}' against {} line(s)", lines.len());
    lines
        .par_iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| -> Result<Value, SiftError> {
            let document: Value =
                serde_json::from_str(line).map_err(|source| SiftError::JsonLine {
                    line: index + 1,
                    source,
                })?;
            Ok(query.execute(&document, cancellation)?)
        })
        .collect()
}
