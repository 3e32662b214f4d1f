//! Command-line interface wiring for clinical-keywords.

use std::io::Read;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod analyze;
pub mod clean;
pub mod extract;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Medication and disease mention statistics for clinical notes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Analyze(args) => analyze::run(args, settings),
            Commands::Extract(args) => extract::run(args, settings),
            Commands::Clean(args) => clean::run(args),
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Count medications and diseases across a CSV corpus and report them.
    Analyze(analyze::Args),
    /// Show the medications and diseases found in a single note.
    Extract(extract::Args),
    /// Lowercase and collapse whitespace in text.
    Clean(clean::Args),
}

pub(crate) fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading stdin")?;
    Ok(buf)
}
