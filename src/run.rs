//! Executes one `sift` invocation.
use std::io::{BufRead, Read, Write};

use serde::Serialize;
use serde_json::Value;
use sift_jsonpath::{CancellationToken, JsonPathError, JsonPathServices};

use crate::batch;
use crate::config::{CliConfig, Mode};
use crate::error::SiftError;

/// The `--check` output.
#[derive(Debug, Serialize, PartialEq)]
pub struct CheckReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Runs the configured mode, reading documents from `input` and writing
/// results to `output`. Returns whether the run succeeded; only `--check`
/// of an invalid query yields `false` without an error.
pub fn run<R: BufRead, W: Write>(
    config: &CliConfig,
    services: &JsonPathServices,
    mut input: R,
    output: &mut W,
) -> Result<bool, SiftError> {
    let cancellation = CancellationToken::new();
    match config.mode() {
        Mode::Functions => {
            list_functions(services, output)?;
            Ok(true)
        }
        Mode::Check => {
            let report = check(services, config.query()?);
            serde_json::to_writer(&mut *output, &report)?;
            writeln!(output)?;
            Ok(report.valid)
        }
        Mode::Canonical => {
            let query = services.parse(config.query()?)?;
            writeln!(output, "{query}")?;
            Ok(true)
        }
        Mode::Document => {
            let query = services.parse(config.query()?)?;
            let mut text = String::new();
            input.read_to_string(&mut text)?;
            let document: Value = serde_json::from_str(&text)?;
            let result = query.execute(&document, &cancellation)?;
            write_value(&result, config.pretty, output)?;
            Ok(true)
        }
        Mode::Lines => {
            let query = services.parse(config.query()?)?;
            let lines = input.lines().collect::<Result<Vec<_>, _>>()?;
            for result in batch::evaluate_lines(&query, &lines, &cancellation)? {
                write_value(&result, config.pretty, output)?;
            }
            Ok(true)
        }
    }
}

pub fn check(services: &JsonPathServices, text: &str) -> CheckReport {
    match services.parse(text) {
        Ok(_) => CheckReport {
            valid: true,
            errors: Vec::new(),
        },
        Err(JsonPathError::Parse { errors, .. }) => CheckReport {
            valid: false,
            errors: errors.messages().to_vec(),
        },
        Err(e) => CheckReport {
            valid: false,
            errors: vec![e.to_string()],
        },
    }
}

fn list_functions<W: Write>(services: &JsonPathServices, output: &mut W) -> Result<(), SiftError> {
    for function in services.functions().definitions() {
        let parameters = itertools::join(function.parameters(), ", ");
        writeln!(
            output,
            "{}({}) -> {}",
            function.name(),
            parameters,
            function.result_type()
        )?;
    }
    Ok(())
}

fn write_value<W: Write>(value: &Value, pretty: bool, output: &mut W) -> Result<(), SiftError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *output, value)?;
    } else {
        serde_json::to_writer(&mut *output, value)?;
    }
    writeln!(output)?;
    Ok(())
}
