//! Print the header index

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use wiki_core::{Config, HeaderIndex, HeaderRef};

use crate::cli::OutputFormat;
use crate::commands::open_wiki;

#[derive(Debug, Serialize)]
struct HeadingEntry<'a> {
    heading: &'a str,
    references: &'a [HeaderRef],
}

/// Execute the headers command
pub async fn execute(config: &Config, format: OutputFormat) -> Result<()> {
    let wiki = open_wiki(config).await?;
    let index = wiki.index().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries(&index))?);
        },
        OutputFormat::Text => print_text(&index),
    }
    Ok(())
}

fn entries(index: &HeaderIndex) -> Vec<HeadingEntry<'_>> {
    index
        .iter()
        .map(|(heading, references)| HeadingEntry {
            heading,
            references,
        })
        .collect()
}

fn print_text(index: &HeaderIndex) {
    if index.is_empty() {
        println!("No headings indexed");
        return;
    }

    for (heading, references) in index.iter() {
        let label = if heading.is_empty() {
            "(empty)".dimmed().to_string()
        } else {
            heading.bold().to_string()
        };
        println!("{label}");
        for reference in references {
            println!(
                "  {} {}",
                reference.document.to_string().cyan(),
                format!("{}..{}", reference.start, reference.end).dimmed()
            );
        }
    }

    println!(
        "\n{} headings, {} references",
        index.len(),
        index.reference_count()
    );
}
