//! Declarative job resource as understood by the job platform.
//!
//! The layout follows the namespaced v1 job schema:
//! `Job.spec.template.spec.template.spec.containers`.
mod container;
pub use container::Container;

mod identity;
pub use identity::{ExecutionHandle, JobIdentity};

mod job;
pub use job::{ExecutionSpec, ExecutionTemplate, JobSpec, ObjectMeta, RunSpec, TaskSpec, TaskTemplate};

mod status;
pub use status::{Condition, JobStatus};
