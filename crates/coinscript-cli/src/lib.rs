//! Coinscript command line tool.
//!
//! Parses transactions and scripts given as hex, evaluates their inputs against
//! previous transactions from a cache file and prints the results as JSON.

mod cli;
mod commands;
mod error;

pub use self::cli::run;
pub use self::error::{Error, Result};
