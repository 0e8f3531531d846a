//! Logging initialization and configuration.
//!
//! This module handles setting up the tracing subscriber and color control
//! based on CLI flags and environment variables.

use anyhow::Result;
use colored::control as color_control;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Cli, Commands, OutputFormat};

/// Log level implied by the CLI flags.
///
/// The server logs requests at `info`, so it defaults to `INFO`; inspection
/// commands default to `WARN`, and to `ERROR` when printing JSON.
#[must_use]
pub fn log_level(cli: &Cli) -> Level {
    if cli.verbose {
        return Level::DEBUG;
    }
    if cli.quiet {
        return Level::ERROR;
    }
    match cli.command.as_ref().and_then(Commands::output_format) {
        None => Level::INFO,
        Some(OutputFormat::Json) => Level::ERROR,
        Some(OutputFormat::Text) => Level::WARN,
    }
}

/// Initialize the logging subsystem based on CLI flags.
///
/// Logs always go to stderr so stdout stays clean for command output.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli))
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let env_no_color = std::env::var_os("NO_COLOR").is_some();
    let machine_output =
        cli.command.as_ref().and_then(Commands::output_format) == Some(OutputFormat::Json);
    if cli.no_color || env_no_color || machine_output {
        color_control::set_override(false);
    }
    Ok(())
}
