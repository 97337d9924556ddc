//! Job resources over the namespaced v1 jobs API.
//!
//! `https://{region}-run.googleapis.com/apis/run.googleapis.com/v1/namespaces/{project}/jobs[/{name}[:run]]`
use std::{sync::Arc, time::Duration};

use ajob_core::store::{JobStore, JobStoreError};
use ajob_model::{ExecutionHandle, ExecutionSpec, JobIdentity, ObjectMeta};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, trace};

use crate::{AdapterError, TokenSource, truncate_body};

pub const API_VERSION: &str = "run.googleapis.com/v1";
pub const KIND_JOB: &str = "Job";

#[derive(Debug, Clone)]
pub struct CloudRunConfig {
    /// Fixed endpoint; when unset the regional endpoint of each job is used.
    pub endpoint: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for CloudRunConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct CloudRunJobs {
    client: reqwest::Client,
    endpoint: Option<String>,
    tokens: Arc<dyn TokenSource>,
}

/// Subset of an execution resource returned by `:run`.
#[derive(Debug, Deserialize)]
struct ExecutionResource {
    #[serde(default)]
    metadata: ObjectMeta,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl CloudRunJobs {
    pub fn new(cfg: CloudRunConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            client,
            endpoint: cfg
                .endpoint
                .map(|e| e.trim_end_matches('/').to_string())
                .filter(|e| !e.is_empty()),
            tokens,
        })
    }

    fn base(&self, id: &JobIdentity) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}-run.googleapis.com", id.region),
        }
    }

    pub fn jobs_url(&self, id: &JobIdentity) -> String {
        format!(
            "{}/apis/run.googleapis.com/v1/namespaces/{}/jobs",
            self.base(id),
            id.project
        )
    }

    pub fn job_url(&self, id: &JobIdentity) -> String {
        format!("{}/{}", self.jobs_url(id), id.name)
    }

    pub fn run_url(&self, id: &JobIdentity) -> String {
        format!("{}:run", self.job_url(id))
    }

    async fn call(
        &self,
        method: Method,
        url: String,
        id: &JobIdentity,
        body: Option<serde_json::Value>,
    ) -> Result<String, JobStoreError> {
        let token = self
            .tokens
            .token()
            .await
            .map_err(|e| JobStoreError::Credentials(e.to_string()))?;

        trace!(%method, %url, "job platform request");
        let mut req = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| JobStoreError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| JobStoreError::Transport(e.to_string()))?;
        if status.is_success() {
            return Ok(text);
        }
        Err(status_error(status, &text, id))
    }

    async fn call_json<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        id: &JobIdentity,
        body: Option<serde_json::Value>,
    ) -> Result<T, JobStoreError> {
        let text = self.call(method, url, id, body).await?;
        serde_json::from_str(&text).map_err(|e| JobStoreError::Decode(e.to_string()))
    }
}

/// Request body for create/replace.
///
/// Fills the resource header when the manifest omitted it and drops any status.
pub fn submission_body(
    id: &JobIdentity,
    spec: &ExecutionSpec,
) -> Result<serde_json::Value, JobStoreError> {
    let mut spec = spec.clone();
    if spec.api_version.is_empty() {
        spec.api_version = API_VERSION.to_string();
    }
    if spec.kind.is_empty() {
        spec.kind = KIND_JOB.to_string();
    }
    spec.metadata.name = id.name.clone();
    spec.metadata.namespace.get_or_insert_with(|| id.project.clone());
    spec.status = None;

    serde_json::to_value(&spec).map_err(|e| JobStoreError::Decode(e.to_string()))
}

fn status_error(status: StatusCode, body: &str, id: &JobIdentity) -> JobStoreError {
    match status {
        StatusCode::NOT_FOUND => JobStoreError::NotFound(id.to_string()),
        StatusCode::CONFLICT => JobStoreError::AlreadyExists(id.to_string()),
        s => JobStoreError::Api {
            status: s.as_u16(),
            message: error_message(body),
        },
    }
}

/// Extract `error.message` from a Google API error body, falling back to the raw body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) if !env.error.message.is_empty() => env.error.message,
        _ => truncate_body(body),
    }
}

#[async_trait]
impl JobStore for CloudRunJobs {
    #[instrument(level = "trace", skip(self, id), fields(job = %id))]
    async fn get(&self, id: &JobIdentity) -> Result<ExecutionSpec, JobStoreError> {
        self.call_json(Method::GET, self.job_url(id), id, None).await
    }

    #[instrument(level = "debug", skip(self, id, spec), fields(job = %id))]
    async fn create(
        &self,
        id: &JobIdentity,
        spec: &ExecutionSpec,
    ) -> Result<ExecutionSpec, JobStoreError> {
        let body = submission_body(id, spec)?;
        let created: ExecutionSpec = self
            .call_json(Method::POST, self.jobs_url(id), id, Some(body))
            .await?;
        debug!(generation = ?created.metadata.generation, "job created");
        Ok(created)
    }

    #[instrument(level = "debug", skip(self, id, spec), fields(job = %id))]
    async fn update(
        &self,
        id: &JobIdentity,
        spec: &ExecutionSpec,
    ) -> Result<ExecutionSpec, JobStoreError> {
        let body = submission_body(id, spec)?;
        let replaced: ExecutionSpec = self
            .call_json(Method::PUT, self.job_url(id), id, Some(body))
            .await?;
        debug!(generation = ?replaced.metadata.generation, "job replaced");
        Ok(replaced)
    }

    #[instrument(level = "debug", skip(self, id), fields(job = %id))]
    async fn run(&self, id: &JobIdentity) -> Result<ExecutionHandle, JobStoreError> {
        let execution: ExecutionResource = self
            .call_json(Method::POST, self.run_url(id), id, Some(serde_json::json!({})))
            .await?;
        if execution.metadata.name.is_empty() {
            return Err(JobStoreError::Decode("execution has no name".into()));
        }
        Ok(ExecutionHandle {
            job: id.clone(),
            execution: execution.metadata.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticToken;

    fn jobs(endpoint: Option<&str>) -> CloudRunJobs {
        CloudRunJobs::new(
            CloudRunConfig {
                endpoint: endpoint.map(String::from),
                ..Default::default()
            },
            Arc::new(StaticToken::new("t")),
        )
        .unwrap()
    }

    fn id() -> JobIdentity {
        JobIdentity::new("proj1", "us-central1", "actions-runner-job")
    }

    #[test]
    fn regional_endpoint_is_derived_from_identity() {
        let c = jobs(None);
        assert_eq!(
            c.job_url(&id()),
            "https://us-central1-run.googleapis.com/apis/run.googleapis.com/v1/namespaces/proj1/jobs/actions-runner-job"
        );
        assert_eq!(
            c.run_url(&id()),
            "https://us-central1-run.googleapis.com/apis/run.googleapis.com/v1/namespaces/proj1/jobs/actions-runner-job:run"
        );
    }

    #[test]
    fn fixed_endpoint_overrides_region() {
        let c = jobs(Some("http://127.0.0.1:9000/"));
        assert_eq!(
            c.jobs_url(&id()),
            "http://127.0.0.1:9000/apis/run.googleapis.com/v1/namespaces/proj1/jobs"
        );
    }

    #[test]
    fn submission_body_fills_header_and_drops_status() {
        let mut spec = ExecutionSpec::default();
        spec.metadata.name = "actions-runner-job".into();
        spec.status = Some(Default::default());

        let body = submission_body(&id(), &spec).unwrap();
        assert_eq!(body["apiVersion"], API_VERSION);
        assert_eq!(body["kind"], KIND_JOB);
        assert_eq!(body["metadata"]["namespace"], "proj1");
        assert!(body.get("status").is_none());
    }

    #[test]
    fn submission_body_keeps_explicit_header() {
        let mut spec = ExecutionSpec {
            api_version: "run.googleapis.com/v1".into(),
            kind: "Job".into(),
            ..Default::default()
        };
        spec.metadata.namespace = Some("123456".into());

        let body = submission_body(&id(), &spec).unwrap();
        assert_eq!(body["metadata"]["namespace"], "123456");
        assert_eq!(body["metadata"]["name"], "actions-runner-job");
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "", &id()),
            JobStoreError::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::CONFLICT, "", &id()),
            JobStoreError::AlreadyExists(_)
        ));
        match status_error(
            StatusCode::FORBIDDEN,
            r#"{"error":{"code":403,"message":"Permission denied","status":"PERMISSION_DENIED"}}"#,
            &id(),
        ) {
            JobStoreError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Permission denied");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn error_message_falls_back_to_body() {
        assert_eq!(error_message("upstream connect error"), "upstream connect error");
    }
}
