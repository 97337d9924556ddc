use std::fmt;

/// Composite key addressing one remote job resource.
///
/// Derived fresh for every dispatch; never cached across events.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobIdentity {
    pub project: String,
    pub region: String,
    pub name: String,
}

impl JobIdentity {
    pub fn new(
        project: impl Into<String>,
        region: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            region: region.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.project, self.region, self.name)
    }
}

/// Handle of an execution started for a job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionHandle {
    pub job: JobIdentity,
    /// Execution name assigned by the platform.
    pub execution: String,
}

impl fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/executions/{}", self.job, self.execution)
    }
}
