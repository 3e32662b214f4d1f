//! Runtime configuration utilities for clinical-keywords.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::anyhow;
use clap::ValueEnum;
use serde::Deserialize;

/// Which NER capability backs the extractor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NerBackend {
    /// Offline gazetteer recognizer.
    Dictionary,
    /// HTTP NER service wrapping a pretrained model.
    Remote,
}

/// What to do with a dataset row lacking the text column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MissingFieldPolicy {
    /// Log the row, count it and continue.
    Skip,
    /// Stop the run with an error.
    Abort,
}

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root folder for input datasets.
    pub data_dir: PathBuf,
    /// Root folder for the report and chart specs.
    pub outputs_dir: PathBuf,
    /// CSV file or directory of CSV files holding clinical notes.
    pub input_path: PathBuf,
    /// Column containing the free-text note.
    pub text_column: String,
    pub ner_backend: NerBackend,
    /// Base URL of the remote NER service.
    pub ner_endpoint: String,
    /// Model name requested from the remote NER service.
    pub ner_model: String,
    pub ner_timeout: Duration,
    /// Extra `term,label` rows for the dictionary recognizer.
    pub gazetteer_path: Option<PathBuf>,
    /// Replacement false-positive list, one term per line.
    pub exclusions_path: Option<PathBuf>,
    /// Rows per category in the text report.
    pub top_n: usize,
    /// Bars per chart.
    pub chart_top_n: usize,
    /// Log progress every this many notes.
    pub progress_every: usize,
    pub missing_field_policy: MissingFieldPolicy,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));
        let outputs_dir = lookup("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./outputs"));
        let input_path = lookup("INPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("mtsamples.csv"));
        let text_column = lookup("TEXT_COLUMN").unwrap_or_else(|| "transcription".to_string());
        let ner_backend = match lookup("NER_BACKEND") {
            Some(raw) => parse_choice::<NerBackend>("NER_BACKEND", &raw)?,
            None => NerBackend::Dictionary,
        };
        let ner_endpoint =
            lookup("NER_ENDPOINT").unwrap_or_else(|| "http://127.0.0.1:8000".to_string());
        let ner_model = lookup("NER_MODEL").unwrap_or_else(|| "en_ner_bc5cdr_md".to_string());
        let ner_timeout = Duration::from_secs(parse_or("NER_TIMEOUT_SECS", &lookup, 30));
        let gazetteer_path = lookup("GAZETTEER_PATH").map(PathBuf::from);
        let exclusions_path = lookup("EXCLUSIONS_PATH").map(PathBuf::from);
        let top_n = parse_or("TOP_N", &lookup, 20);
        let chart_top_n = parse_or("CHART_TOP_N", &lookup, 10);
        let progress_every = parse_or("PROGRESS_EVERY", &lookup, 100);
        let missing_field_policy = match lookup("MISSING_FIELD_POLICY") {
            Some(raw) => parse_choice::<MissingFieldPolicy>("MISSING_FIELD_POLICY", &raw)?,
            None => MissingFieldPolicy::Skip,
        };

        Ok(Self {
            data_dir,
            outputs_dir,
            input_path,
            text_column,
            ner_backend,
            ner_endpoint,
            ner_model,
            ner_timeout,
            gazetteer_path,
            exclusions_path,
            top_n,
            chart_top_n,
            progress_every,
            missing_field_policy,
        })
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

fn parse_or<F, T>(key: &str, lookup: &F, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_choice<T: ValueEnum>(key: &str, raw: &str) -> anyhow::Result<T> {
    T::from_str(raw.trim(), true).map_err(|err| anyhow!("invalid {key}={raw}: {err}"))
}
