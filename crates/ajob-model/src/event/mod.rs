//! Inbound workflow-job notification, reduced to the fields the dispatcher reads.
use std::{fmt, str::FromStr};

use crate::{
    ACTION_QUEUED, JobLabels,
    error::{ModelError, ModelResult},
};

/// Workflow job action verb.
///
/// Only [`Action::Queued`] is acted upon; every other verb is carried as-is for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Queued,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Queued => ACTION_QUEUED,
            Action::Other(s) => s.as_str(),
        }
    }
}

impl FromStr for Action {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim() {
            "" => Err(ModelError::UnknownAction(s.to_string())),
            ACTION_QUEUED => Ok(Action::Queued),
            other => Ok(Action::Other(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository the workflow job belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// `owner/name`.
    pub full_name: String,
    pub private: bool,
    pub fork: bool,
}

impl Repository {
    /// Split `full_name` into `(owner, name)`.
    ///
    /// Both halves must be non-empty and the name must not contain another `/`.
    pub fn owner_and_name(&self) -> ModelResult<(&str, &str)> {
        match self.full_name.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok((owner, name))
            }
            _ => Err(ModelError::InvalidRepository(self.full_name.clone())),
        }
    }
}

/// Identifiers of the queued job, carried for logging and correlation only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobMetadata {
    pub id: Option<u64>,
    pub run_id: Option<u64>,
    pub name: Option<String>,
    pub workflow_name: Option<String>,
}

/// A single `workflow_job` notification.
///
/// Built once per request by the transport layer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub action: Action,
    pub repository: Repository,
    /// Commit the manifest is read from.
    pub head_sha: String,
    pub labels: JobLabels,
    pub job: JobMetadata,
}
