//! Manifest transformer: raw manifest text to a submittable [`ExecutionSpec`].
//!
//! Steps:
//! - parse the manifest (malformed input is a terminal parse error);
//! - append `OWNER`, `REPO` and `LABELS` to the first container's environment;
//! - when any container already carries `DOCKER_ENABLED=true`, switch the first
//!   container to the `-dood` image variant and append a docker engine sidecar.
use ajob_model::{
    Container, DIND_CONTAINER_NAME, DIND_IMAGE, DOOD_SUFFIX, ENV_DOCKER_ENABLED, ENV_LABELS,
    ENV_OWNER, ENV_REPO, ExecutionSpec, Flag, JobLabels,
};
use tracing::{debug, trace};

use crate::error::CoreError;

/// Values injected into the workload environment.
#[derive(Debug, Clone, Copy)]
pub struct EnvContext<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub labels: &'a JobLabels,
}

/// Fully materialized spec plus the job name taken from its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub spec: ExecutionSpec,
    pub name: String,
}

pub fn transform(raw: &str, ctx: &EnvContext<'_>) -> Result<Transformed, CoreError> {
    let mut spec = ExecutionSpec::from_yaml(raw).map_err(|e| CoreError::Parse(e.to_string()))?;
    let name = spec.name().to_string();

    // Must be decided on the manifest as written, before anything is appended.
    let docker_enabled = requests_docker(&spec);

    let containers = spec.containers_mut();
    let first = containers
        .first_mut()
        .ok_or_else(|| CoreError::Parse("no containers defined".into()))?;

    first.env.push(ENV_OWNER, ctx.owner);
    first.env.push(ENV_REPO, ctx.repo);
    first.env.push(ENV_LABELS, ctx.labels.joined(","));

    if docker_enabled {
        let rewritten = rewrite_dood_image(&first.image);
        debug!(from = %first.image, to = %rewritten, "docker enabled, switching runner image");
        first.image = rewritten;

        if containers.iter().any(|c| c.name() == Some(DIND_CONTAINER_NAME)) {
            debug!("docker sidecar already declared");
        } else {
            containers.push(Container::named(DIND_CONTAINER_NAME, DIND_IMAGE));
        }
    }

    trace!(job = %name, containers = spec.containers().len(), "manifest transformed");
    Ok(Transformed { spec, name })
}

/// `true` if any container declares `DOCKER_ENABLED=true`.
pub fn requests_docker(spec: &ExecutionSpec) -> bool {
    spec.containers().iter().any(|c| {
        c.env
            .iter()
            .any(|e| e.name() == ENV_DOCKER_ENABLED && Flag::from_env_value(e.value()).is_enabled())
    })
}

/// Insert the `-dood` suffix into the repository part of an image reference.
///
/// `acme/runner:latest` becomes `acme/runner-dood:latest`; tags, digests and registry
/// ports are preserved. Already rewritten references are returned unchanged.
pub fn rewrite_dood_image(image: &str) -> String {
    let (named, digest) = match image.find('@') {
        Some(at) => image.split_at(at),
        None => (image, ""),
    };
    let last_segment = named.rfind('/').map_or(0, |i| i + 1);
    let (repo, tag) = match named[last_segment..].rfind(':') {
        Some(colon) => named.split_at(last_segment + colon),
        None => (named, ""),
    };

    if repo.ends_with(DOOD_SUFFIX) {
        return image.to_string();
    }
    format!("{repo}{DOOD_SUFFIX}{tag}{digest}")
}
