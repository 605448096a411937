use std::time::Duration;

use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum YfError {
    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A response body was not valid JSON for the expected shape.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The persistent response cache could not be opened or queried.
    #[error("Cache store error: {0}")]
    Cache(#[from] rusqlite::Error),

    /// A blocking cache task panicked or was cancelled.
    #[error("Cache task failed: {0}")]
    CacheTask(#[from] tokio::task::JoinError),

    /// The server returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The data received from the API was in an unexpected format or was missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// The cookie/crumb handshake with Yahoo failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A request did not finish within its deadline. The deadline starts once the
    /// rate limiter admits the request.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The client or session was configured with invalid values.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
