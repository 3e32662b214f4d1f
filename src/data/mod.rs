//! Data ingestion layer.

pub mod corpus;
