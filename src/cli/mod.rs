//! CLI module
//!
//! Command-line interface for generating Dart models.
//!
//! # Modes
//!
//! - default - generate classes from `--from` or pasted JSON
//! - `--restore` - print the JSON recorded in a Dart file
//! - `--rebuild` - regenerate a Dart file from its own comments

mod commands;
mod runner;

pub use commands::{Cli, ConfigSource, CMD};
pub use runner::Runner;
