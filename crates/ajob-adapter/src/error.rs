use thiserror::Error;

/// Construction and bootstrap errors of the transports.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("metadata server {path}: {reason}")]
    Metadata { path: String, reason: String },
}
