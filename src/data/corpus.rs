//! Clinical note ingestion from CSV datasets.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use tracing::info;
use walkdir::WalkDir;

use crate::error::{PipelineError, PipelineResult};

/// One clinical note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// `<source>:<row>` with 1-based data rows.
    pub id: String,
    pub raw_text: String,
}

/// Resolve the input to CSV files: the file itself, or every `*.csv` under a
/// directory in path order.
pub fn discover_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("input {} does not exist", path.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            files.push(entry.into_path());
        }
    }
    info!(root = %path.display(), files = files.len(), "discovered csv inputs");
    Ok(files)
}

/// Streams notes out of one CSV source, one row at a time.
pub struct CsvNotes<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    source_name: String,
    field: String,
    column: Option<usize>,
    row: usize,
}

impl CsvNotes<File> {
    pub fn open(path: &Path, field: &str) -> PipelineResult<Self> {
        let source_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("input")
            .to_string();
        Self::from_reader(File::open(path)?, source_name, field)
    }
}

impl<R: Read> CsvNotes<R> {
    pub fn from_reader(rdr: R, source_name: impl Into<String>, field: &str) -> PipelineResult<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
        let column = reader.headers()?.iter().position(|h| h.trim() == field);
        Ok(Self {
            records: reader.into_records(),
            source_name: source_name.into(),
            field: field.to_string(),
            column,
            row: 0,
        })
    }
}

impl<R: Read> Iterator for CsvNotes<R> {
    type Item = PipelineResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err.into())),
        };
        self.row += 1;
        let text = self.column.and_then(|idx| record.get(idx));
        Some(match text {
            Some(text) => Ok(Document {
                id: format!("{}:{}", self.source_name, self.row),
                raw_text: text.to_string(),
            }),
            None => Err(PipelineError::MissingField {
                source_name: self.source_name.clone(),
                row: self.row,
                field: self.field.clone(),
            }),
        })
    }
}

/// Notes from every input file in order. A file that cannot be opened
/// yields a single error in its place.
pub fn documents<'a>(
    inputs: &'a [PathBuf],
    field: &'a str,
) -> impl Iterator<Item = PipelineResult<Document>> + 'a {
    inputs.iter().flat_map(move |path| {
        let notes: Box<dyn Iterator<Item = PipelineResult<Document>>> =
            match CsvNotes::open(path, field) {
                Ok(notes) => Box::new(notes),
                Err(err) => Box::new(std::iter::once(Err(err))),
            };
        notes
    })
}
