use thiserror::Error;

/// Errors raised by the console API client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("API base URL must use https for non-localhost hosts; got '{scheme}://'")]
    InsecureScheme { scheme: String },

    #[error("API key is not a valid header value")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}
