//! `sift`: evaluate RFC 9535 JSONPath queries from the command line.
//!
//! The query engine lives in the `sift-jsonpath` crate; this crate adds the
//! command-line configuration, JSON-lines batch evaluation and output.
pub mod batch;
pub mod config;
pub mod error;
pub mod run;

pub use config::{CliConfig, Mode};
pub use error::SiftError;
pub use run::{CheckReport, check, run};
