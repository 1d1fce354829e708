//! Error taxonomy for the revq domain layer.
//!
//! Surfaces flatten these to display strings; none of them are retried and
//! none of them touch previously committed assignment-log entries.

use thiserror::Error;

/// Errors produced by ingestion, export, and configuration loading.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A column the schema hard-requires is absent from the header row.
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    /// The ticket table could not be parsed at all. Reported to the user;
    /// nothing downstream runs for that ingest.
    #[error("could not parse ticket table: {0}")]
    Parse(String),

    /// The assignment export could not be serialized.
    #[error("could not write assignment csv: {0}")]
    Write(String),

    /// The configuration file is unreadable or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}
