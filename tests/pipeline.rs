use std::sync::Arc;

use clinical_keywords::{
    config::MissingFieldPolicy,
    data::corpus::Document,
    nlp::{
        filter::{split_medications_and_diseases, ExclusionSet},
        ner::{Entity, Label, Ner},
        NoteExtractor,
    },
    stats::{aggregate, frequency::FrequencyTable, report},
    PipelineResult,
};

/// Deterministic stand-in for the model: every token is a chemical.
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

fn corpus(notes: &[&str]) -> Vec<PipelineResult<Document>> {
    notes
        .iter()
        .enumerate()
        .map(|(idx, text)| {
            Ok(Document {
                id: format!("notes:{}", idx + 1),
                raw_text: text.to_string(),
            })
        })
        .collect()
}

#[test]
fn glucose_is_not_a_medication() {
    let entities = vec![
        Entity::new("Aspirin", Label::Chemical),
        Entity::new("glucose", Label::Chemical),
        Entity::new("Jaundice", Label::Disease),
    ];
    let split = split_medications_and_diseases(entities, &ExclusionSet::from_terms(["glucose"]));
    assert_eq!(split.primary_texts(), vec!["Aspirin"]);
    assert_eq!(split.secondary_texts(), vec!["Jaundice"]);
}

#[test]
fn equal_counts_rank_by_first_sighting() {
    let mut table = FrequencyTable::new();
    table.extend(["Aspirin"; 5]);
    table.extend(["Metformin"; 5]);
    table.extend(["Atorvastatin"; 3]);
    assert_eq!(table.top_n(2), vec![("Aspirin", 5), ("Metformin", 5)]);
}

#[test]
fn two_note_corpus_counts_tokens() {
    let extractor = NoteExtractor::new(Arc::new(TokenNer), ExclusionSet::empty());
    let stats = aggregate(
        &extractor,
        corpus(&["Aspirin Aspirin", "Metformin"]),
        MissingFieldPolicy::Skip,
        100,
    )
    .unwrap();
    assert_eq!(
        stats.medications.iter().collect::<Vec<_>>(),
        vec![("Aspirin", 2), ("Metformin", 1)]
    );
    assert!(stats.diseases.is_empty());
}

#[test]
fn top_one_report_line() {
    let extractor = NoteExtractor::new(Arc::new(TokenNer), ExclusionSet::empty());
    let stats = aggregate(
        &extractor,
        corpus(&["Aspirin Aspirin", "Metformin"]),
        MissingFieldPolicy::Skip,
        100,
    )
    .unwrap();
    let rows = report::format_rows(&stats.medications.top_n(1));
    assert_eq!(rows, vec!["Aspirin → 2 times"]);

    let rendered = report::render_report(&stats, 1);
    assert!(rendered.lines().any(|line| line == "Aspirin → 2 times"));
    assert!(rendered.contains("Total medications found: 3"));
    assert!(rendered.contains("Unique medications: 2"));
}
