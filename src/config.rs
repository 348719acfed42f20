//! Command-line configuration.
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::error::SiftError;

/// What a run does, derived from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// List the registered functions.
    Functions,
    /// Validate the query and report diagnostics as JSON.
    Check,
    /// Print the canonical form of the query.
    Canonical,
    /// Evaluate the query against one JSON document.
    Document,
    /// Evaluate the query against every line of a JSON-lines input.
    Lines,
}

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "sift", version, about = "Evaluate RFC 9535 JSONPath queries against JSON")]
pub struct CliConfig {
    /// The JSONPath query, e.g. `$.store.book[?@.price < 10].title`
    #[arg(required_unless_present = "functions")]
    pub query: Option<String>,

    /// Input file; standard input when omitted
    pub file: Option<PathBuf>,

    /// Treat the input as JSON lines and evaluate every line independently
    #[arg(short, long)]
    pub lines: bool,

    /// Pretty-print results
    #[arg(short, long)]
    pub pretty: bool,

    /// Only validate the query and print a JSON report
    #[arg(long, conflicts_with_all = ["lines", "canonical", "pretty"])]
    pub check: bool,

    /// Print the canonical form of the query instead of evaluating it
    #[arg(long, conflicts_with = "lines")]
    pub canonical: bool,

    /// List the available filter functions
    #[arg(long)]
    pub functions: bool,

    /// Worker threads for --lines (0 = one per core)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub threads: usize,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliConfig {
    pub fn mode(&self) -> Mode {
        if self.functions {
            Mode::Functions
        } else if self.check {
            Mode::Check
        } else if self.canonical {
            Mode::Canonical
        } else if self.lines {
            Mode::Lines
        } else {
            Mode::Document
        }
    }

    /// The query text. Only `--functions` runs without one.
    pub fn query(&self) -> Result<&str, SiftError> {
        self.query
            .as_deref()
            .ok_or_else(|| SiftError::Usage("a query is required".to_string()))
    }

    /// `RUST_LOG` still overrides this when set.
    pub fn log_filter(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }

    /// Opens the input file, or standard input when no file was given.
    pub fn open_input(&self) -> Result<Box<dyn BufRead>, SiftError> {
        match &self.file {
            Some(path) => {
                log::debug!("Reading input from {}", path.display());
                Ok(Box::new(BufReader::new(File::open(path)?)))
            }
            None => Ok(Box::new(BufReader::new(io::stdin()))),
        }
    }
}
