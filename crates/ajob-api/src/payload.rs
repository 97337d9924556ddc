//! Wire shape of the `workflow_job` webhook, reduced to the fields the dispatcher reads.
use serde::Deserialize;

pub const EVENT_HEADER: &str = "x-github-event";
pub const DELIVERY_HEADER: &str = "x-github-delivery";

pub const EVENT_PING: &str = "ping";
pub const EVENT_WORKFLOW_JOB: &str = "workflow_job";

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowJobPayload {
    pub action: String,
    pub workflow_job: WorkflowJob,
    pub repository: RepositoryPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowJob {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub run_id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub workflow_name: Option<String>,
    pub head_sha: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
}
