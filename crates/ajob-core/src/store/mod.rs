//! Remote job resource abstraction.
//!
//! Readiness is observed by polling [`JobStore::get`]; the platform has no event stream.
use ajob_model::{ExecutionHandle, ExecutionSpec, JobIdentity};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("job not found: {0}")]
    NotFound(String),

    #[error("job already exists: {0}")]
    AlreadyExists(String),

    #[error("api returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("credentials unavailable: {0}")]
    Credentials(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl JobStoreError {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            JobStoreError::NotFound(_) => "not_found",
            JobStoreError::AlreadyExists(_) => "already_exists",
            JobStoreError::Api { .. } => "api",
            JobStoreError::Credentials(_) => "credentials",
            JobStoreError::Transport(_) => "transport",
            JobStoreError::Decode(_) => "decode",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, JobStoreError::NotFound(_))
    }
}

/// Job platform operations used by the dispatcher.
///
/// `create` against an existing name must fail with [`JobStoreError::AlreadyExists`]
/// and `update` against a missing name with [`JobStoreError::NotFound`].
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Read the job, including its status.
    async fn get(&self, id: &JobIdentity) -> Result<ExecutionSpec, JobStoreError>;

    async fn create(
        &self,
        id: &JobIdentity,
        spec: &ExecutionSpec,
    ) -> Result<ExecutionSpec, JobStoreError>;

    /// Replace the job definition.
    async fn update(
        &self,
        id: &JobIdentity,
        spec: &ExecutionSpec,
    ) -> Result<ExecutionSpec, JobStoreError>;

    /// Start a new execution of the job.
    async fn run(&self, id: &JobIdentity) -> Result<ExecutionHandle, JobStoreError>;
}
