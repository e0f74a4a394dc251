use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The API request to {url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Core(#[from] core_types::CoreError),

    #[error("Failed to save downloaded series: {0}")]
    Storage(#[from] storage::StorageError),
}
