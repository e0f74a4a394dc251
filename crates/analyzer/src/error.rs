use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Unknown ranking metric '{0}'")]
    UnknownMetric(String),

    #[error("Ranking weight refers to benchmark '{0}', which is not part of the beat summary")]
    UnknownBenchmark(String),

    #[error("Invalid weight for '{0}': {1}")]
    InvalidWeight(String, f64),
}
