/// Query-time failure classes for a single certificate search
use reqwest::StatusCode;
use thiserror::Error;

use crate::retry::Retryable;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connect, timeout or body read failure.
    #[error("error making request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("non-OK HTTP status: {0}")]
    Status(StatusCode),

    /// The service answered with nothing; treated as "no data".
    #[error("no data found for query: {query}")]
    EmptyBody { query: String },

    /// Body was not a JSON array. The raw body is kept for diagnosis.
    #[error("error parsing JSON: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}
