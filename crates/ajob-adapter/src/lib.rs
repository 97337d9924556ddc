//! Concrete transports behind the core capability traits.
//!
//! - `github`: [`ajob_core::source::ManifestFetcher`] over the repository contents REST API;
//! - `cloudrun`: [`ajob_core::store::JobStore`] over the namespaced v1 jobs API;
//! - `metadata`: instance metadata server (project, region, access token).
mod error;
pub use error::AdapterError;

pub mod token;
pub use token::{StaticToken, TokenError, TokenSource};

#[cfg(feature = "github")]
pub mod github;

#[cfg(feature = "cloudrun")]
pub mod cloudrun;

#[cfg(feature = "metadata")]
pub mod metadata;

/// Shorten a response body before it lands in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 512;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
