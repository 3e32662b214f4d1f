//! Aggregation and reporting layer.

pub mod chart;
pub mod frequency;
pub mod report;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::{
    config::{MissingFieldPolicy, Settings},
    data::corpus::{self, Document},
    error::{PipelineError, PipelineResult},
    nlp::{filter::ExclusionSet, filter::Partitioned, ner, NoteExtractor},
};
use chart::ChartSink;
use frequency::FrequencyTable;

/// Accumulated counts for a corpus run.
#[derive(Debug, Clone, Default)]
pub struct CorpusStats {
    pub medications: FrequencyTable,
    pub diseases: FrequencyTable,
    pub notes_processed: usize,
    pub rows_skipped: usize,
}

impl CorpusStats {
    /// Fold one note's filtered entities into the running tables.
    pub fn fold(&mut self, split: Partitioned) {
        self.medications
            .extend(split.primary.iter().map(|e| e.text.as_str()));
        self.diseases
            .extend(split.secondary.iter().map(|e| e.text.as_str()));
        self.notes_processed += 1;
    }

    /// Combine a partial run over another slice of the corpus.
    pub fn merge(&mut self, other: CorpusStats) {
        self.medications.merge(other.medications);
        self.diseases.merge(other.diseases);
        self.notes_processed += other.notes_processed;
        self.rows_skipped += other.rows_skipped;
    }
}

/// Extract, filter and count every note, one at a time.
pub fn aggregate<I>(
    extractor: &NoteExtractor,
    documents: I,
    policy: MissingFieldPolicy,
    progress_every: usize,
) -> PipelineResult<CorpusStats>
where
    I: IntoIterator<Item = PipelineResult<Document>>,
{
    let mut stats = CorpusStats::default();
    for document in documents {
        let document = match document {
            Ok(document) => document,
            Err(err @ PipelineError::MissingField { .. })
                if policy == MissingFieldPolicy::Skip =>
            {
                warn!(%err, "skipping row");
                stats.rows_skipped += 1;
                continue;
            }
            Err(err) => return Err(err),
        };
        let split = extractor.extract_note(&document.raw_text)?;
        stats.fold(split);
        if progress_every > 0 && stats.notes_processed % progress_every == 0 {
            info!(notes = stats.notes_processed, last = %document.id, "processed notes");
        }
    }
    info!(
        notes = stats.notes_processed,
        skipped = stats.rows_skipped,
        medications = stats.medications.total(),
        diseases = stats.diseases.total(),
        "finished corpus"
    );
    Ok(stats)
}

/// Result of a full analysis run.
#[derive(Debug)]
pub struct Analysis {
    pub stats: CorpusStats,
    pub report: String,
}

/// Load the model, read the configured corpus, write `results.txt` and hand
/// chart data to `charts` when given.
#[instrument(skip(settings, charts))]
pub fn analyze(
    settings: &Settings,
    normalize: bool,
    charts: Option<&mut dyn ChartSink>,
) -> Result<Analysis> {
    let model = ner::load_model(settings)?;
    let exclusions = ExclusionSet::load(settings.exclusions_path.as_deref())?;
    let extractor = NoteExtractor::new(model, exclusions).normalize_first(normalize);
    info!(model = extractor.model_name(), "NER model ready");

    let inputs = corpus::discover_inputs(&settings.input_path)?;
    if inputs.is_empty() {
        warn!(input = %settings.input_path.display(), "no csv inputs found");
    }
    let stats = aggregate(
        &extractor,
        corpus::documents(&inputs, &settings.text_column),
        settings.missing_field_policy,
        settings.progress_every,
    )
    .with_context(|| format!("analysing {}", settings.input_path.display()))?;

    std::fs::create_dir_all(&settings.outputs_dir).with_context(|| {
        format!("creating outputs dir {}", settings.outputs_dir.display())
    })?;
    let report = report::render_report(&stats, settings.top_n);
    report::write_report(&settings.join_output("results.txt"), &report)?;

    if let Some(sink) = charts {
        publish_charts(&stats, settings.chart_top_n, sink)?;
    }
    Ok(Analysis { stats, report })
}

/// Side-by-side top-N bars plus the medication/disease pie.
pub fn publish_charts(stats: &CorpusStats, top_n: usize, sink: &mut dyn ChartSink) -> Result<()> {
    let bars = [
        chart::top_bar_chart(
            &format!("Top {top_n} Most Common Medications"),
            "skyblue",
            &stats.medications,
            top_n,
        ),
        chart::top_bar_chart(
            &format!("Top {top_n} Most Common Diseases"),
            "lightcoral",
            &stats.diseases,
            top_n,
        ),
    ];
    sink.render("clinical_keywords_visualization", &bars)?;
    sink.render(
        "medications_vs_diseases_pie",
        &[chart::distribution_pie(
            stats.medications.total(),
            stats.diseases.total(),
        )],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::nlp::ner::{Entity, Label, Ner};

    /// Labels every whitespace token as a chemical.
    struct TokenNer;

    impl Ner for TokenNer {
        fn name(&self) -> &str {
            "tokens"
        }

        fn extract(&self, text: &str) -> PipelineResult<Vec<Entity>> {
            Ok(text
                .split_whitespace()
                .map(|t| Entity::new(t, Label::Chemical))
                .collect())
        }
    }

    fn doc(id: &str, text: &str) -> PipelineResult<Document> {
        Ok(Document {
            id: id.to_string(),
            raw_text: text.to_string(),
        })
    }

    fn missing(row: usize) -> PipelineResult<Document> {
        Err(PipelineError::MissingField {
            source_name: "notes".into(),
            row,
            field: "transcription".into(),
        })
    }

    fn extractor() -> NoteExtractor {
        NoteExtractor::new(Arc::new(TokenNer), ExclusionSet::empty())
    }

    #[test]
    fn folds_documents_token_wise() {
        let stats = aggregate(
            &extractor(),
            vec![doc("1", "Aspirin Aspirin"), doc("2", "Metformin")],
            MissingFieldPolicy::Skip,
            100,
        )
        .unwrap();
        assert_eq!(stats.medications.count("Aspirin"), 2);
        assert_eq!(stats.medications.count("Metformin"), 1);
        assert_eq!(stats.medications.distinct(), 2);
        assert_eq!(stats.notes_processed, 2);
    }

    #[test]
    fn skip_policy_counts_missing_rows() {
        let stats = aggregate(
            &extractor(),
            vec![doc("1", "Aspirin"), missing(2), doc("3", "Aspirin")],
            MissingFieldPolicy::Skip,
            1,
        )
        .unwrap();
        assert_eq!(stats.rows_skipped, 1);
        assert_eq!(stats.notes_processed, 2);
        assert_eq!(stats.medications.count("Aspirin"), 2);
    }

    #[test]
    fn abort_policy_stops_on_missing_rows() {
        let err = aggregate(
            &extractor(),
            vec![doc("1", "Aspirin"), missing(2)],
            MissingFieldPolicy::Abort,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::MissingField { row: 2, .. }));
    }

    #[test]
    fn extraction_failures_are_terminal() {
        struct FailingNer;
        impl Ner for FailingNer {
            fn name(&self) -> &str {
                "failing"
            }
            fn extract(&self, _text: &str) -> PipelineResult<Vec<Entity>> {
                Err(PipelineError::Extraction("503".into()))
            }
        }
        let extractor = NoteExtractor::new(Arc::new(FailingNer), ExclusionSet::empty());
        let err = aggregate(&extractor, vec![doc("1", "x")], MissingFieldPolicy::Skip, 0)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Extraction(_)));
    }

    #[test]
    fn merged_partials_match_a_sequential_run() {
        let docs = ["Aspirin Insulin", "Insulin", "Aspirin Heparin"];
        let sequential = aggregate(
            &extractor(),
            docs.iter().map(|d| doc("x", d)),
            MissingFieldPolicy::Skip,
            0,
        )
        .unwrap();

        let mut left = aggregate(
            &extractor(),
            docs[..1].iter().map(|d| doc("x", d)),
            MissingFieldPolicy::Skip,
            0,
        )
        .unwrap();
        let right = aggregate(
            &extractor(),
            docs[1..].iter().map(|d| doc("x", d)),
            MissingFieldPolicy::Skip,
            0,
        )
        .unwrap();
        left.merge(right);
        assert_eq!(left.medications, sequential.medications);
        assert_eq!(left.notes_processed, 3);
    }
}
