//! Repository contents over the GitHub REST API.
use std::time::Duration;

use ajob_core::source::{FetchError, ManifestFetcher};
use async_trait::async_trait;
use reqwest::{StatusCode, Url, header};
use tracing::{debug, instrument};

use crate::{AdapterError, truncate_body};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";
const API_VERSION: &str = "2022-11-28";

#[derive(Clone)]
pub struct GithubConfig {
    /// API root, `https://api.github.com` or a GitHub Enterprise `/api/v3` root.
    pub api_url: String,
    /// Token with read access to repository contents.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: String::new(),
            timeout: Duration::from_secs(1),
        }
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Reads raw file content at a revision.
pub struct GithubContents {
    client: reqwest::Client,
    api_url: Url,
    token: String,
}

impl GithubContents {
    pub fn new(cfg: GithubConfig) -> Result<Self, AdapterError> {
        let api_url = Url::parse(&cfg.api_url).map_err(|e| AdapterError::InvalidUrl {
            url: cfg.api_url.clone(),
            reason: e.to_string(),
        })?;
        if api_url.cannot_be_a_base() {
            return Err(AdapterError::InvalidUrl {
                url: cfg.api_url,
                reason: "not a base url".into(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .user_agent(concat!("ajob/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url,
            token: cfg.token,
        })
    }

    /// `{api}/repos/{owner}/{repo}/contents/{path}?ref={revision}`
    pub fn contents_url(&self, owner: &str, repo: &str, path: &str, revision: &str) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", owner, repo, "contents"])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url.query_pairs_mut().append_pair("ref", revision);
        url
    }
}

#[async_trait]
impl ManifestFetcher for GithubContents {
    #[instrument(level = "debug", skip(self), err)]
    async fn fetch(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        revision: &str,
    ) -> Result<String, FetchError> {
        let url = self.contents_url(owner, repo, path, revision);

        let mut req = self
            .client
            .get(url)
            .header(header::ACCEPT, RAW_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION);
        if !self.token.is_empty() {
            req = req.bearer_auth(&self.token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        match status {
            s if s.is_success() => {
                debug!(bytes = body.len(), "content downloaded");
                Ok(body)
            }
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(format!("{owner}/{repo}/{path}@{revision}"))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(FetchError::Forbidden(truncate_body(&body)))
            }
            s => Err(FetchError::Upstream {
                status: s.as_u16(),
                message: truncate_body(&body),
            }),
        }
    }
}
