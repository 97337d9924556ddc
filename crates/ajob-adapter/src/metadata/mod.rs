//! Instance metadata server: project id, region and the default service account token.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use tokio::{sync::Mutex, time::Instant};
use tracing::debug;

use crate::{AdapterError, TokenError, TokenSource, truncate_body};

pub const DEFAULT_ENDPOINT: &str = "http://metadata.google.internal";

const PROJECT_ID_PATH: &str = "/computeMetadata/v1/project/project-id";
const REGION_PATH: &str = "/computeMetadata/v1/instance/region";
const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens closer than this to expiry are refreshed.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct MetadataClient {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Seconds until expiry.
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
}

impl MetadataClient {
    pub fn new() -> Result<Self, AdapterError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    async fn read(&self, path: &str) -> Result<String, AdapterError> {
        let err = |reason: String| AdapterError::Metadata {
            path: path.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(format!("{}{}", self.endpoint, path))
            .header("Metadata-Flavor", HeaderValue::from_static("Google"))
            .send()
            .await
            .map_err(|e| err(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| err(e.to_string()))?;
        if !status.is_success() {
            return Err(err(format!("status {}: {}", status.as_u16(), truncate_body(&body))));
        }
        Ok(body.trim().to_string())
    }

    pub async fn project_id(&self) -> Result<String, AdapterError> {
        self.read(PROJECT_ID_PATH).await
    }

    pub async fn region(&self) -> Result<String, AdapterError> {
        Ok(parse_region(&self.read(REGION_PATH).await?).to_string())
    }

    pub async fn access_token(&self) -> Result<AccessToken, AdapterError> {
        let body = self.read(TOKEN_PATH).await?;
        serde_json::from_str(&body).map_err(|e| AdapterError::Metadata {
            path: TOKEN_PATH.to_string(),
            reason: e.to_string(),
        })
    }
}

/// `projects/123/regions/us-central1` → `us-central1`; other values are returned as is.
pub fn parse_region(raw: &str) -> &str {
    let raw = raw.trim();
    if raw.contains("/regions/") {
        raw.rsplit('/').next().unwrap_or(raw)
    } else {
        raw
    }
}

/// Default service account token, cached until shortly before expiry.
pub struct MetadataTokenSource {
    client: MetadataClient,
    cached: Mutex<Option<(String, Instant)>>,
}

impl MetadataTokenSource {
    pub fn new(client: MetadataClient) -> Self {
        Self {
            client,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TokenSource for MetadataTokenSource {
    async fn token(&self) -> Result<String, TokenError> {
        let mut cached = self.cached.lock().await;
        if let Some((token, refresh_at)) = cached.as_ref() {
            if Instant::now() < *refresh_at {
                return Ok(token.clone());
            }
        }

        let fresh = self
            .client
            .access_token()
            .await
            .map_err(|e| TokenError(e.to_string()))?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(EXPIRY_MARGIN);
        debug!(expires_in = fresh.expires_in, "access token refreshed");

        *cached = Some((fresh.access_token.clone(), Instant::now() + lifetime));
        Ok(fresh.access_token)
    }
}
