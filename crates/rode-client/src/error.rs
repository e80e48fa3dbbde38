//! Error types for rode-client

use thiserror::Error;

/// Errors that can occur while talking to Rode
#[derive(Error, Debug)]
pub enum RodeError {
    /// Request could not be sent or the response could not be read
    #[error("HTTP error: {0}")]
    Http(String),

    /// Rode answered with a non-success status
    #[error("Rode returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON shape
    #[error("Failed to decode Rode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configured host cannot be turned into a base URL
    #[error("Invalid Rode host: {0:?}")]
    InvalidHost(String),
}

impl From<reqwest::Error> for RodeError {
    fn from(err: reqwest::Error) -> Self {
        RodeError::Http(err.to_string())
    }
}
