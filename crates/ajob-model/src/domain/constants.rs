//! Well-known strings shared by the gate, the label parser and the transformer.

/// Workflow job action that triggers a dispatch.
pub const ACTION_QUEUED: &str = "queued";

/// Label a workflow job must carry (case-insensitive) to be routed to a self-hosted job.
pub const CAPABILITY_LABEL: &str = "self-hosted";

/// Label key selecting the job platform project.
pub const LABEL_KEY_PROJECT: &str = "project";

/// Label keys selecting the job platform region. Both fill the same option.
pub const LABEL_KEYS_REGION: [&str; 2] = ["region", "location"];

/// Label keys selecting the manifest path inside the repository. Both fill the same option.
pub const LABEL_KEYS_MANIFEST: [&str; 2] = ["job-manifest", "runner-config"];

/// Injected environment entry: repository owner.
pub const ENV_OWNER: &str = "OWNER";

/// Injected environment entry: repository name.
pub const ENV_REPO: &str = "REPO";

/// Injected environment entry: comma-joined label set.
pub const ENV_LABELS: &str = "LABELS";

/// Container environment flag requesting a docker engine sidecar.
pub const ENV_DOCKER_ENABLED: &str = "DOCKER_ENABLED";

/// Suffix marking the docker-outside-of-docker variant of a runner image.
pub const DOOD_SUFFIX: &str = "-dood";

/// Name of the docker engine sidecar container.
pub const DIND_CONTAINER_NAME: &str = "docker";

/// Image of the docker engine sidecar container.
pub const DIND_IMAGE: &str = "docker:dind";

/// Status condition type reported by the job platform once a job can be run.
pub const CONDITION_READY: &str = "Ready";
