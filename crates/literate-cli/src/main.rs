//! Literate CLI - extract the people, places and things of a story as it is written.

use clap::Parser;
use literate_cli::commands;
use literate_cli::{logging, repl, Cli, Command, Config, Formatter};
use tracing::debug;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when a check found the backend unreachable.
async fn run() -> literate_cli::Result<bool> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load config file, then apply flag overrides
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    logging::init(config.settings.log_file.as_deref())?;
    debug!(?config, "Configuration loaded");

    let formatter = Formatter::new(config.settings.format, config.settings.color);

    match cli.command {
        None | Some(Command::Shell) => {
            repl::run_shell(&config, &formatter).await?;
            Ok(true)
        }
        Some(Command::Extract(args)) => {
            commands::execute_extract(args, &config, &formatter).await?;
            Ok(true)
        }
        Some(Command::Check) => commands::execute_check(&config, &formatter).await,
    }
}
