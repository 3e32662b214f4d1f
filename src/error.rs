//! Typed failures raised by the extraction pipeline.

use thiserror::Error;

/// Errors surfaced by corpus reading, NER and the aggregation run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The NER capability could not be initialised. Fatal for the run.
    #[error("NER model `{model}` unavailable: {reason}")]
    ModelUnavailable { model: String, reason: String },
    /// A dataset row has no value for the configured text column.
    #[error("row {row} in {source_name} is missing field `{field}`")]
    MissingField {
        source_name: String,
        row: usize,
        field: String,
    },
    /// A loaded NER backend failed while processing a document.
    #[error("NER extraction failed: {0}")]
    Extraction(String),
    #[error("reading corpus: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn model_unavailable(model: impl Into<String>, reason: impl ToString) -> Self {
        Self::ModelUnavailable {
            model: model.into(),
            reason: reason.to_string(),
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
