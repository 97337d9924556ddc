//! Manifest source abstraction.
//!
//! The core reads manifests through [`ManifestFetcher`] and never references a concrete transport.
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("manifest not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchError {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchError::NotFound(_) => "not_found",
            FetchError::Forbidden(_) => "forbidden",
            FetchError::Upstream { .. } => "upstream",
            FetchError::Transport(_) => "transport",
        }
    }
}

/// Content-addressed read of a file at a revision.
///
/// The same `(owner, repo, path, revision)` is expected to yield the same content
/// for the lifetime of one event. Errors are not retried by the core.
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    async fn fetch(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        revision: &str,
    ) -> Result<String, FetchError>;
}
