//! Literate CLI library.
//!
//! Configuration loading, the interactive story shell, one-shot commands and
//! output formatting for the `literate` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
