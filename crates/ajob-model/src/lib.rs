mod domain;
pub use domain::{
    ACTION_QUEUED, CAPABILITY_LABEL, CONDITION_READY, DIND_CONTAINER_NAME, DIND_IMAGE,
    DOOD_SUFFIX, ENV_DOCKER_ENABLED, ENV_LABELS, ENV_OWNER, ENV_REPO, LABEL_KEY_PROJECT,
    LABEL_KEYS_MANIFEST, LABEL_KEYS_REGION,
};
pub use domain::{Env, EnvVar, Extra, Flag, JobLabels};

mod error;
pub use error::{ModelError, ModelResult};

mod event;
pub use event::{Action, InboundEvent, JobMetadata, Repository};

mod options;
pub use options::LabeledOptions;

mod spec;
pub use spec::{
    Condition, Container, ExecutionHandle, ExecutionSpec, ExecutionTemplate, JobIdentity,
    JobSpec, JobStatus, ObjectMeta, RunSpec, TaskSpec, TaskTemplate,
};

mod strategy;
pub use strategy::BackoffStrategy;
