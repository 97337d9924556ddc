//! Bearer token sources for the job platform API.
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("access token unavailable: {0}")]
pub struct TokenError(pub String);

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<String, TokenError>;
}

/// Fixed token, e.g. from configuration or a local `gcloud auth print-access-token`.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String, TokenError> {
        if self.0.is_empty() {
            return Err(TokenError("static token is empty".into()));
        }
        Ok(self.0.clone())
    }
}
