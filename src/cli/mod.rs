//! CLI module
//!
//! Command-line interface following the Singer tap conventions.
//!
//! # Modes
//!
//! - default - sync the selected streams, writing Singer messages to stdout
//! - `--discover` - print the catalog
//! - `--test[=all|schema]` - connection test
//! - `--about` - print tap metadata

mod commands;
mod runner;

pub use commands::{AboutFormat, Cli, Mode, TestMode};
pub use runner::{Runner, CAPABILITIES};
