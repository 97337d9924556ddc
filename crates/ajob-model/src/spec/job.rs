use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    Container, Extra, JobStatus,
    error::{ModelError, ModelResult},
};

/// Job resource: identity plus the template every execution is stamped from.
///
/// Parsed from the repository manifest, mutated by the transformer,
/// then submitted once (create or replace) and never touched again.
/// Unknown keys at every level are preserved in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: JobSpec,

    /// Present only on resources read back from the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    #[serde(default)]
    pub template: ExecutionTemplate,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Template for each execution (parallelism, task count).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,

    #[serde(default)]
    pub spec: RunSpec,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSpec {
    #[serde(default)]
    pub template: TaskTemplate,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Template for each task of an execution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    #[serde(default)]
    pub spec: TaskSpec,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl ExecutionSpec {
    /// Parse a YAML (or JSON) manifest and check it is submittable.
    pub fn from_yaml(raw: &str) -> ModelResult<Self> {
        if raw.trim().is_empty() {
            return Err(ModelError::Manifest("manifest is empty".into()));
        }
        let spec: Self = serde_yaml::from_str(raw)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Job name from `metadata.name`.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn containers(&self) -> &[Container] {
        &self.spec.template.spec.template.spec.containers
    }

    pub fn containers_mut(&mut self) -> &mut Vec<Container> {
        &mut self.spec.template.spec.template.spec.containers
    }

    /// `true` when the platform reports the resource ready to run.
    ///
    /// If both generations are known, the status must also describe the
    /// latest revision so a stale `Ready` from before an update is not trusted.
    pub fn is_ready(&self) -> bool {
        let Some(status) = &self.status else {
            return false;
        };
        let current = match (self.metadata.generation, status.observed_generation) {
            (Some(generation), Some(observed)) => observed >= generation,
            _ => true,
        };
        current && status.is_ready()
    }

    /// Rules:
    /// - `metadata.name` is not empty;
    /// - at least one container is defined;
    /// - every container names an image.
    pub fn validate(&self) -> ModelResult<()> {
        if self.name().trim().is_empty() {
            return Err(ModelError::Manifest("metadata.name is missing".into()));
        }
        if self.containers().is_empty() {
            return Err(ModelError::Manifest("no containers defined".into()));
        }
        if let Some(pos) = self.containers().iter().position(|c| c.image.trim().is_empty()) {
            return Err(ModelError::Manifest(format!("container #{pos} has no image")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Condition, EnvVar};

    const SAMPLE: &str = r#"
apiVersion: "run.googleapis.com/v1"
kind: Job
metadata:
  name: actions-runner-job
spec:
  template:
    spec:
      taskCount: 1
      template:
        spec:
          maxRetries: 0
          containers:
            - image: acme/actions-job:latest
              env:
                - name: RUNNER_SCOPE
                  value: repo
              resources:
                limits:
                  cpu: "2"
"#;

    #[test]
    fn parses_sample_manifest() {
        let spec = ExecutionSpec::from_yaml(SAMPLE).unwrap();

        assert_eq!(spec.api_version, "run.googleapis.com/v1");
        assert_eq!(spec.kind, "Job");
        assert_eq!(spec.name(), "actions-runner-job");
        assert_eq!(spec.containers().len(), 1);

        let c = &spec.containers()[0];
        assert_eq!(c.image, "acme/actions-job:latest");
        assert_eq!(c.env.0, vec![EnvVar::new("RUNNER_SCOPE", "repo")]);
    }

    #[test]
    fn unknown_fields_survive_serialization() {
        let spec = ExecutionSpec::from_yaml(SAMPLE).unwrap();
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["spec"]["template"]["spec"]["taskCount"], 1);
        assert_eq!(
            json["spec"]["template"]["spec"]["template"]["spec"]["maxRetries"],
            0
        );
        assert_eq!(
            json["spec"]["template"]["spec"]["template"]["spec"]["containers"][0]["resources"]["limits"]["cpu"],
            "2"
        );
        assert!(json.get("status").is_none());
    }

    #[test]
    fn rejects_empty_and_malformed_manifests() {
        assert!(matches!(ExecutionSpec::from_yaml(""), Err(ModelError::Manifest(_))));
        assert!(matches!(
            ExecutionSpec::from_yaml("metadata: [unterminated"),
            Err(ModelError::Manifest(_))
        ));
    }

    #[test]
    fn rejects_manifest_without_name_or_containers() {
        let no_name = "spec:\n  template:\n    spec:\n      template:\n        spec:\n          containers:\n            - image: a\n";
        assert!(ExecutionSpec::from_yaml(no_name).is_err());

        let no_containers = "metadata:\n  name: job\n";
        assert!(ExecutionSpec::from_yaml(no_containers).is_err());
    }

    #[test]
    fn readiness_follows_ready_condition() {
        let mut spec = ExecutionSpec::from_yaml(SAMPLE).unwrap();
        assert!(!spec.is_ready());

        spec.status = Some(JobStatus {
            conditions: vec![Condition::new("Ready", "Unknown")],
            ..Default::default()
        });
        assert!(!spec.is_ready());

        spec.status = Some(JobStatus {
            conditions: vec![Condition::new("Ready", "True")],
            ..Default::default()
        });
        assert!(spec.is_ready());
    }

    #[test]
    fn stale_generation_is_not_ready() {
        let mut spec = ExecutionSpec::from_yaml(SAMPLE).unwrap();
        spec.metadata.generation = Some(3);
        spec.status = Some(JobStatus {
            observed_generation: Some(2),
            conditions: vec![Condition::new("Ready", "True")],
            ..Default::default()
        });
        assert!(!spec.is_ready());

        if let Some(status) = spec.status.as_mut() {
            status.observed_generation = Some(3);
        }
        assert!(spec.is_ready());
    }
}
