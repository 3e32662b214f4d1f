//! Natural language processing layer: cleanup, NER and label filtering.

pub mod filter;
pub mod ner;
pub mod normalize;

use std::sync::Arc;

use tracing::debug;

use crate::error::PipelineResult;
use filter::{ExclusionSet, Partitioned};
use ner::Ner;

/// Per-note extraction: optional cleanup, NER, then medication/disease split.
pub struct NoteExtractor {
    ner: Arc<dyn Ner>,
    exclusions: ExclusionSet,
    normalize: bool,
}

impl NoteExtractor {
    pub fn new(ner: Arc<dyn Ner>, exclusions: ExclusionSet) -> Self {
        Self {
            ner,
            exclusions,
            normalize: false,
        }
    }

    /// Run the text normalizer on every note before extraction.
    pub fn normalize_first(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }

    pub fn model_name(&self) -> &str {
        self.ner.name()
    }

    pub fn extract_note(&self, text: &str) -> PipelineResult<Partitioned> {
        let entities = if self.normalize {
            self.ner.extract(&normalize::normalize_text(text))?
        } else {
            self.ner.extract(text)?
        };
        for entity in &entities {
            debug!(text = %entity.text, label = %entity.label, "entity");
        }
        Ok(filter::split_medications_and_diseases(
            entities,
            &self.exclusions,
        ))
    }
}
