use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{path} has none of the expected {kind} columns ({expected})")]
    MissingColumn {
        path: PathBuf,
        kind: &'static str,
        expected: String,
    },

    #[error("{path}, line {line}: {reason}")]
    InvalidRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Invalid series data: {0}")]
    Core(#[from] core_types::CoreError),
}
