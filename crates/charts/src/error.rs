use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Benchmark '{0}' is not a column of the yearly table")]
    UnknownBenchmark(String),

    #[error("Failed to write chart to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
