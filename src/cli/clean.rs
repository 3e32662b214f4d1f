//! CLI entry-point for text cleanup.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{cli::read_stdin, nlp::normalize::normalize_text};

/// Args for the `clean` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Texts to clean, one output line each; stdin lines when omitted.
    pub texts: Vec<String>,
}

#[instrument]
pub fn run(args: Args) -> Result<()> {
    if args.texts.is_empty() {
        for line in read_stdin()?.lines() {
            println!("{}", normalize_text(line));
        }
    } else {
        for text in &args.texts {
            println!("{}", normalize_text(text));
        }
    }
    Ok(())
}
