//! wiki - markdown personal wiki with cross-linked headings
//!
//! Library half of the `wiki` binary: argument parsing, command dispatch and
//! the HTTP routing layer. The binary only calls [`run`].

use anyhow::{Context, Result};
use clap::Parser;
use wiki_core::Config;

mod cli;
mod commands;
pub mod http;
mod utils;

use crate::utils::initialize_logging;
use cli::{Cli, Commands};

/// Execute the wiki CLI with the currently configured environment.
///
/// # Errors
///
/// Returns an error if logging or configuration cannot be initialized, or if
/// the selected command fails.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;

    let config = resolve_config(&cli)?;
    execute_command(cli.command, &config).await
}

async fn execute_command(command: Option<Commands>, config: &Config) -> Result<()> {
    match command {
        None | Some(Commands::Serve { .. }) => commands::serve(config).await?,
        Some(Commands::Headers { format }) => commands::list_headers(config, format).await?,
        Some(Commands::Lookup { heading, format }) => {
            commands::lookup_heading(config, &heading, format).await?;
        },
    }
    Ok(())
}

/// Load the config file and apply command-line overrides on top.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(dir) = &cli.content_dir {
        config.content.root.clone_from(dir);
    }

    if let Some(Commands::Serve {
        host,
        port,
        allow_stale,
    }) = &cli.command
    {
        if let Some(host) = host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
        if *allow_stale {
            config.index.allow_stale_reads = true;
        }
    }

    Ok(config)
}
