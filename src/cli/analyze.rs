//! CLI entry-point for the corpus run.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::{MissingFieldPolicy, NerBackend, Settings},
    stats::{
        self,
        chart::{ChartSink, VegaLiteSink},
    },
};

/// Args for the `analyze` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// CSV file or directory of CSV files.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Column holding the note text.
    #[arg(long)]
    pub text_column: Option<String>,
    /// Rows per category in the report.
    #[arg(long)]
    pub top: Option<usize>,
    /// Bars per chart.
    #[arg(long)]
    pub chart_top: Option<usize>,
    /// Where `results.txt` and chart specs go.
    #[arg(long)]
    pub outputs_dir: Option<PathBuf>,
    /// Lowercase and collapse whitespace before extraction.
    #[arg(long)]
    pub normalize: bool,
    /// Skip writing chart specs.
    #[arg(long)]
    pub no_charts: bool,
    /// Handling of rows without the text column.
    #[arg(long, value_enum)]
    pub on_missing: Option<MissingFieldPolicy>,
    /// NER backend override.
    #[arg(long, value_enum)]
    pub backend: Option<NerBackend>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(input) = &self.input {
            settings.input_path = input.clone();
        }
        if let Some(column) = &self.text_column {
            settings.text_column = column.clone();
        }
        if let Some(top) = self.top {
            settings.top_n = top;
        }
        if let Some(chart_top) = self.chart_top {
            settings.chart_top_n = chart_top;
        }
        if let Some(dir) = &self.outputs_dir {
            settings.outputs_dir = dir.clone();
        }
        if let Some(policy) = self.on_missing {
            settings.missing_field_policy = policy;
        }
        if let Some(backend) = self.backend {
            settings.ner_backend = backend;
        }
    }
}

#[instrument(skip(settings))]
pub fn run(args: Args, mut settings: Settings) -> Result<()> {
    args.apply(&mut settings);

    let mut sink = VegaLiteSink::new(&settings.outputs_dir);
    let charts: Option<&mut dyn ChartSink> = if args.no_charts {
        None
    } else {
        Some(&mut sink)
    };
    let analysis = stats::analyze(&settings, args.normalize, charts)?;
    print!("{}", analysis.report);

    for path in sink.written() {
        info!(path = %path.display(), "chart ready for rendering");
    }
    Ok(())
}
