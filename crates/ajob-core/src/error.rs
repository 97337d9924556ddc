use std::{fmt, time::Duration};

use ajob_model::JobIdentity;
use thiserror::Error;

use crate::{gate::Rejection, source::FetchError, store::JobStoreError};

/// Step of the dispatch transaction an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Probe,
    Create,
    Update,
    AwaitReady,
    Run,
}

impl Stage {
    /// Return label value for logs and metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Probe => "probe",
            Stage::Create => "create",
            Stage::Update => "update",
            Stage::AwaitReady => "await_ready",
            Stage::Run => "run",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("event rejected: {0}")]
    Rejected(Rejection),

    #[error("invalid label configuration: {0}")]
    Validation(String),

    #[error("failed to fetch manifest {path} from {repo}@{revision}: {source}")]
    Fetch {
        repo: String,
        path: String,
        revision: String,
        #[source]
        source: FetchError,
    },

    #[error("malformed job manifest: {0}")]
    Parse(String),

    #[error("{stage} failed for job {identity}: {source}")]
    Remote {
        stage: Stage,
        identity: JobIdentity,
        #[source]
        source: JobStoreError,
    },

    #[error("job {identity} not ready after {attempts} polls in {waited:?}")]
    ReadinessTimeout {
        identity: JobIdentity,
        attempts: u32,
        waited: Duration,
    },

    #[error("canceled during {stage}")]
    Canceled { stage: Stage },
}

impl CoreError {
    /// Stage the error is attributed to, if it happened past the gate.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            CoreError::Rejected(_) | CoreError::Validation(_) | CoreError::Parse(_) => None,
            CoreError::Fetch { .. } => Some(Stage::Fetch),
            CoreError::Remote { stage, .. } => Some(*stage),
            CoreError::ReadinessTimeout { .. } => Some(Stage::AwaitReady),
            CoreError::Canceled { stage } => Some(*stage),
        }
    }

    /// Return error category label for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CoreError::Rejected(_) => "rejected",
            CoreError::Validation(_) => "validation",
            CoreError::Fetch { .. } => "fetch",
            CoreError::Parse(_) => "parse",
            CoreError::Remote { .. } => "remote",
            CoreError::ReadinessTimeout { .. } => "readiness_timeout",
            CoreError::Canceled { .. } => "canceled",
        }
    }

    /// `true` for outcomes that mean "nothing to do" rather than a failure.
    pub fn is_non_actionable(&self) -> bool {
        matches!(self, CoreError::Rejected(_) | CoreError::Validation(_))
    }
}
