//! # CLI Structure and Argument Parsing
//!
//! The `wiki` binary serves the wiki over HTTP by default and offers a couple
//! of read-only subcommands for inspecting the header index from a shell.
//!
//! ```bash
//! # Serve ./content on 127.0.0.1:7400
//! wiki
//! wiki serve --port 8080 --content-dir ~/notes
//!
//! # Inspect the header index
//! wiki headers
//! wiki headers --format json | jq 'keys'
//! wiki lookup "Getting Started"
//! ```
//!
//! Global options (`--config`, `--content-dir`, `--verbose`, `--quiet`) apply
//! to every command. Flags win over environment variables, which win over the
//! config file.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI structure for the `wiki` command
#[derive(Parser, Clone, Debug)]
#[command(name = "wiki")]
#[command(version)]
#[command(about = "wiki - markdown personal wiki with cross-linked headings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Config file to load instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding `<dir>/<name>.md` documents
    #[arg(long, global = true, value_name = "DIR")]
    pub content_dir: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Serve the wiki over HTTP (default)
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// TCP port
        #[arg(short = 'p', long)]
        port: Option<u16>,

        /// Serve views from a stale index instead of rebuilding it first
        #[arg(long)]
        allow_stale: bool,
    },

    /// Print every indexed heading and where it occurs
    Headers {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print every section titled exactly HEADING
    Lookup {
        /// Heading text (case-sensitive)
        heading: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Output formats for the inspection commands
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

impl Commands {
    /// Format requested by the command, if it prints anything to stdout.
    #[must_use]
    pub const fn output_format(&self) -> Option<OutputFormat> {
        match self {
            Self::Serve { .. } => None,
            Self::Headers { format } | Self::Lookup { format, .. } => Some(*format),
        }
    }
}
