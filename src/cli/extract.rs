//! CLI entry-point for single-note extraction.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    cli::read_stdin,
    config::{NerBackend, Settings},
    nlp::{filter::ExclusionSet, ner, NoteExtractor},
};

/// Args for the `extract` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Note text; read from stdin when omitted.
    #[arg(long)]
    pub text: Option<String>,
    /// Keep lab analytes and other known false positives.
    #[arg(long)]
    pub no_exclusions: bool,
    /// Lowercase and collapse whitespace before extraction.
    #[arg(long)]
    pub normalize: bool,
    /// NER backend override.
    #[arg(long, value_enum)]
    pub backend: Option<NerBackend>,
}

#[instrument(skip(settings))]
pub fn run(args: Args, mut settings: Settings) -> Result<()> {
    if let Some(backend) = args.backend {
        settings.ner_backend = backend;
    }
    let text = match args.text {
        Some(text) => text,
        None => read_stdin()?,
    };

    let exclusions = if args.no_exclusions {
        ExclusionSet::empty()
    } else {
        ExclusionSet::load(settings.exclusions_path.as_deref())?
    };
    let model = ner::load_model(&settings)?;
    let extractor = NoteExtractor::new(model, exclusions).normalize_first(args.normalize);
    let split = extractor.extract_note(&text)?;

    println!("Medications found: {:?}", split.primary_texts());
    println!("Diseases found: {:?}", split.secondary_texts());
    Ok(())
}
