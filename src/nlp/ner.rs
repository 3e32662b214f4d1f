//! Named-entity recognition adapters. The dictionary recognizer works offline;
//! the remote one forwards notes to a pretrained model served over HTTP.

use std::{collections::HashMap, fmt, path::Path, sync::Arc, time::Duration};

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::{NerBackend, Settings},
    error::{PipelineError, PipelineResult},
    nlp::normalize::normalize_text,
};

/// Entity category as assigned by the recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Label {
    Chemical,
    Disease,
    /// Any other tag, kept verbatim.
    Other(String),
}

impl From<&str> for Label {
    fn from(raw: &str) -> Self {
        let tag = raw.trim();
        if tag.eq_ignore_ascii_case("CHEMICAL") {
            Label::Chemical
        } else if tag.eq_ignore_ascii_case("DISEASE") {
            Label::Disease
        } else {
            Label::Other(tag.to_string())
        }
    }
}

impl From<String> for Label {
    fn from(raw: String) -> Self {
        Label::from(raw.as_str())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Chemical => f.write_str("CHEMICAL"),
            Label::Disease => f.write_str("DISEASE"),
            Label::Other(tag) => f.write_str(tag),
        }
    }
}

/// Recognized span: surface text plus label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: Label,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Trait for NER implementations.
///
/// Entities come back in text order with labels exactly as the model
/// assigned them.
pub trait Ner: Send + Sync {
    fn name(&self) -> &str;
    fn extract(&self, text: &str) -> PipelineResult<Vec<Entity>>;
}

static CHEMICAL_TERMS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "aspirin",
        "atorvastatin",
        "metformin",
        "naproxen",
        "lisinopril",
        "insulin",
        "heparin",
        "warfarin",
        "ibuprofen",
        "acetaminophen",
        "tylenol",
        "morphine",
        "lidocaine",
        "marcaine",
        "propofol",
        "fentanyl",
        "versed",
        "epinephrine",
        "prednisone",
        "lasix",
        "furosemide",
        "coumadin",
        "plavix",
        "albuterol",
        "amoxicillin",
        "ancef",
        "vicodin",
        "nitroglycerin",
        "simvastatin",
        "metoprolol",
        "hydrochlorothiazide",
        "levothyroxine",
        "omeprazole",
        "glucose",
        "creatinine",
        "potassium",
        "calcium",
        "sodium",
        "oxygen",
        "alcohol",
        "co2",
        "cc",
        "p.o",
        "smoke",
    ]
});

static DISEASE_TERMS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "hypertension",
        "diabetes",
        "diabetes mellitus",
        "chest pain",
        "pain",
        "jaundice",
        "pneumonia",
        "asthma",
        "copd",
        "coronary artery disease",
        "atrial fibrillation",
        "congestive heart failure",
        "myocardial infarction",
        "hyperlipidemia",
        "stroke",
        "cancer",
        "depression",
        "anxiety",
        "nausea",
        "vomiting",
        "fever",
        "headache",
        "infection",
        "edema",
        "bleeding",
        "tenderness",
        "shortness of breath",
        "obesity",
        "anemia",
        "sepsis",
    ]
});

/// Gazetteer-backed recognizer.
///
/// Matching is case-insensitive on whole words; at each position the longest
/// term wins and matches never overlap.
pub struct DictionaryNer {
    pattern: Option<Regex>,
    labels: HashMap<String, Label>,
}

#[derive(Debug, Deserialize)]
struct GazetteerRow {
    term: String,
    label: String,
}

impl DictionaryNer {
    /// Build a recognizer from `(term, label)` pairs. Later pairs override
    /// earlier ones for the same term.
    pub fn new<I, S>(terms: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = (S, Label)>,
        S: AsRef<str>,
    {
        let mut labels = HashMap::new();
        for (term, label) in terms {
            let key = normalize_text(term.as_ref());
            if key.is_empty() {
                continue;
            }
            labels.insert(key, label);
        }

        let mut keys: Vec<&String> = labels.keys().collect();
        keys.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        let pattern = if keys.is_empty() {
            None
        } else {
            let alternation = keys
                .iter()
                .map(|term| term_pattern(term))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!("(?i)(?:{alternation})"))?)
        };
        Ok(Self { pattern, labels })
    }

    /// Recognizer over the built-in chemical and disease lists.
    pub fn builtin() -> Result<Self, regex::Error> {
        Self::new(builtin_terms())
    }

    /// Built-in lists extended by a `term,label` CSV gazetteer.
    pub fn with_gazetteer(path: &Path) -> PipelineResult<Self> {
        let unavailable = |reason: String| PipelineError::model_unavailable("dictionary", reason);
        let mut reader = csv::Reader::from_path(path)
            .map_err(|err| unavailable(format!("opening {}: {err}", path.display())))?;
        let mut terms = builtin_terms();
        for result in reader.deserialize() {
            let row: GazetteerRow =
                result.map_err(|err| unavailable(format!("parsing {}: {err}", path.display())))?;
            terms.push((row.term, Label::from(row.label)));
        }
        info!(path = %path.display(), terms = terms.len(), "loaded gazetteer");
        Self::new(terms).map_err(|err| unavailable(err.to_string()))
    }

    pub fn term_count(&self) -> usize {
        self.labels.len()
    }
}

fn builtin_terms() -> Vec<(String, Label)> {
    CHEMICAL_TERMS
        .iter()
        .map(|t| (t.to_string(), Label::Chemical))
        .chain(DISEASE_TERMS.iter().map(|t| (t.to_string(), Label::Disease)))
        .collect()
}

fn term_pattern(term: &str) -> String {
    let escaped = regex::escape(term).replace(' ', r"\s+");
    let lead = if term.starts_with(|c: char| c.is_alphanumeric()) {
        r"\b"
    } else {
        ""
    };
    let trail = if term.ends_with(|c: char| c.is_alphanumeric()) {
        r"\b"
    } else {
        ""
    };
    format!("{lead}{escaped}{trail}")
}

impl Ner for DictionaryNer {
    fn name(&self) -> &str {
        "dictionary"
    }

    fn extract(&self, text: &str) -> PipelineResult<Vec<Entity>> {
        let Some(pattern) = &self.pattern else {
            return Ok(Vec::new());
        };
        let entities = pattern
            .find_iter(text)
            .filter_map(|m| {
                self.labels
                    .get(&normalize_text(m.as_str()))
                    .map(|label| Entity::new(m.as_str(), label.clone()))
            })
            .collect();
        Ok(entities)
    }
}

#[derive(Debug, Serialize)]
struct EntsRequest<'a> {
    text: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EntsResponse {
    entities: Vec<Entity>,
}

/// Client for an HTTP NER service exposing `GET /health` and `POST /ents`.
pub struct RemoteNer {
    client: Client,
    endpoint: String,
    model: String,
}

impl RemoteNer {
    /// Build the client and confirm the service answers its health check.
    pub fn connect(endpoint: &str, model: &str, timeout: Duration) -> PipelineResult<Self> {
        let client = Client::builder()
            .user_agent("clinical-keywords/0.1")
            .timeout(timeout)
            .build()
            .map_err(|err| PipelineError::model_unavailable(model, err))?;
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let health_url = format!("{endpoint}/health");
        let resp = client
            .get(&health_url)
            .send()
            .map_err(|err| PipelineError::model_unavailable(model, err))?;
        if !resp.status().is_success() {
            return Err(PipelineError::model_unavailable(
                model,
                format!("{health_url} returned {}", resp.status()),
            ));
        }
        info!(%endpoint, %model, "remote NER service ready");
        Ok(Self {
            client,
            endpoint,
            model: model.to_string(),
        })
    }
}

impl Ner for RemoteNer {
    fn name(&self) -> &str {
        &self.model
    }

    fn extract(&self, text: &str) -> PipelineResult<Vec<Entity>> {
        let url = format!("{}/ents", self.endpoint);
        let payload: EntsResponse = self
            .client
            .post(url)
            .json(&EntsRequest {
                text,
                model: &self.model,
            })
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json())
            .map_err(|err| PipelineError::Extraction(err.to_string()))?;
        debug!(entities = payload.entities.len(), "remote NER response");
        Ok(payload.entities)
    }
}

/// Initialise the configured NER backend once for the whole run.
pub fn load_model(settings: &Settings) -> PipelineResult<Arc<dyn Ner>> {
    let model: Arc<dyn Ner> = match settings.ner_backend {
        NerBackend::Dictionary => {
            let ner = match &settings.gazetteer_path {
                Some(path) => DictionaryNer::with_gazetteer(path)?,
                None => DictionaryNer::builtin()
                    .map_err(|err| PipelineError::model_unavailable("dictionary", err))?,
            };
            info!(terms = ner.term_count(), "dictionary NER loaded");
            Arc::new(ner)
        }
        NerBackend::Remote => Arc::new(RemoteNer::connect(
            &settings.ner_endpoint,
            &settings.ner_model,
            settings.ner_timeout,
        )?),
    };
    Ok(model)
}
