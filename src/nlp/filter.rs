//! Label-based partitioning of extracted entities and the false-positive list.

use std::{collections::HashSet, path::Path};

use anyhow::{Context, Result};

use crate::nlp::ner::{Entity, Label};

const DEFAULT_FALSE_POSITIVES: &[&str] = &[
    "creatinine",
    "glucose",
    "potassium",
    "calcium",
    "co2",
    "cc",
    "smoke",
    "p.o",
    "alcohol",
    "oxygen",
];

/// Lowercased terms that the recognizer labels correctly but that are not
/// of interest (lab analytes, dosing abbreviations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    terms: HashSet<String>,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::from_terms(DEFAULT_FALSE_POSITIVES.iter().copied())
    }
}

impl ExclusionSet {
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    pub fn empty() -> Self {
        Self {
            terms: HashSet::new(),
        }
    }

    /// Read one term per line; blank lines and `#` comments are ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading exclusions {}", path.display()))?;
        Ok(Self::from_terms(
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        ))
    }

    /// Configured list when a path is given, the built-in one otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.terms.contains(&text.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Entities kept for the two labels of interest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitioned {
    pub primary: Vec<Entity>,
    pub secondary: Vec<Entity>,
}

impl Partitioned {
    pub fn primary_texts(&self) -> Vec<&str> {
        self.primary.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn secondary_texts(&self) -> Vec<&str> {
        self.secondary.iter().map(|e| e.text.as_str()).collect()
    }
}

/// Split `entities` into the `primary` and `secondary` label buckets.
///
/// Only the primary bucket is checked against `exclusions`. Entities with
/// any other label are dropped. When both labels are equal an entity goes to
/// the primary bucket only.
pub fn partition_entities<I>(
    entities: I,
    primary: &Label,
    secondary: &Label,
    exclusions: &ExclusionSet,
) -> Partitioned
where
    I: IntoIterator<Item = Entity>,
{
    let mut out = Partitioned::default();
    for entity in entities {
        if &entity.label == primary {
            if !exclusions.contains(&entity.text) {
                out.primary.push(entity);
            }
        } else if &entity.label == secondary {
            out.secondary.push(entity);
        }
    }
    out
}

/// Medications (CHEMICAL minus exclusions) and diseases (DISEASE).
pub fn split_medications_and_diseases<I>(entities: I, exclusions: &ExclusionSet) -> Partitioned
where
    I: IntoIterator<Item = Entity>,
{
    partition_entities(entities, &Label::Chemical, &Label::Disease, exclusions)
}
