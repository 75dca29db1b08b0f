//! CLI command definitions and argument parsing.

use crate::config::{Config, OutputFormat};
use clap::{Parser, Subcommand};
use literate_llm::ProviderKind;
use std::path::PathBuf;

/// Literate - Track the characters, places and things in a story as you write it.
#[derive(Debug, Parser)]
#[command(name = "literate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LITERATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// LLM backend (ollama or openai)
    #[arg(long, global = true)]
    pub provider: Option<ProviderKind>,

    /// Model identifier
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Quiet period before extraction (ms)
    #[arg(long, global = true)]
    pub debounce_ms: Option<u64>,

    /// Per-request timeout (seconds)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (names only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Type a story line by line and watch objects appear
    Shell,

    /// Extract objects from a file once and print them
    Extract(ExtractArgs),

    /// Check that the LLM backend is reachable
    Check,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Text file to read
    pub file: PathBuf,
}

impl Cli {
    /// Apply command-line overrides on top of file configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(kind) = self.provider {
            config.provider.kind = kind;
        }
        if let Some(model) = &self.model {
            config.provider.model = Some(model.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.provider.endpoint = Some(endpoint.clone());
        }
        if let Some(debounce_ms) = self.debounce_ms {
            config.scheduler.debounce_ms = debounce_ms;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.extractor.timeout_secs = timeout_secs;
        }
        if let Some(format) = self.format {
            config.settings.format = format.into();
        }
        if self.no_color {
            config.settings.color = false;
        }
    }
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}
