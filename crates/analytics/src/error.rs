use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
