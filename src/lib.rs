//! Medication and disease mention statistics over clinical notes.
//!
//! Notes are read from CSV, passed through a named-entity recognizer, split
//! into medications and diseases, counted across the corpus and reported as
//! top-N tables plus chart specs.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod nlp;
pub mod stats;

pub use error::{PipelineError, PipelineResult};
