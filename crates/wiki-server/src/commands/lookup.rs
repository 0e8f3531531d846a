//! Resolve one heading to the sections carrying it

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use wiki_core::Config;
use wiki_core::wiki::ResolvedHeader;

use crate::cli::OutputFormat;
use crate::commands::open_wiki;

#[derive(Debug, Serialize)]
struct SectionOutput<'a> {
    document: String,
    start: usize,
    end: usize,
    text: &'a str,
}

impl<'a> From<&'a ResolvedHeader> for SectionOutput<'a> {
    fn from(header: &'a ResolvedHeader) -> Self {
        Self {
            document: header.reference.document.to_string(),
            start: header.reference.start,
            end: header.reference.end,
            text: &header.text,
        }
    }
}

/// Execute the lookup command
pub async fn execute(config: &Config, heading: &str, format: OutputFormat) -> Result<()> {
    let wiki = open_wiki(config).await?;
    let resolved = wiki.lookup_headers(heading, false).await?.unwrap_or_default();

    match format {
        OutputFormat::Json => {
            let out: Vec<SectionOutput<'_>> = resolved.iter().map(SectionOutput::from).collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        },
        OutputFormat::Text => {
            if resolved.is_empty() {
                println!("No section is titled '{heading}'");
                return Ok(());
            }
            for header in &resolved {
                println!(
                    "{} {}",
                    "From".dimmed(),
                    header.reference.document.to_string().cyan().bold()
                );
                println!("{}\n", header.text.trim_end());
            }
        },
    }
    Ok(())
}
