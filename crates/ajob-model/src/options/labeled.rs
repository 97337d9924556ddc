use crate::{
    JobLabels, LABEL_KEY_PROJECT, LABEL_KEYS_MANIFEST, LABEL_KEYS_REGION,
    error::{ModelError, ModelResult},
};

/// Dispatch options encoded in workflow job labels.
///
/// Recognised keys:
/// - `project=<id>`
/// - `region=<name>` or `location=<name>` (same option)
/// - `job-manifest=<path>` or `runner-config=<path>` (same option)
///
/// The first non-empty value for an option wins; later duplicates are dropped.
/// Unrecognised labels are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledOptions {
    pub project: Option<String>,
    pub region: Option<String>,
    /// Repository path of the job manifest. Empty when no label supplied it.
    pub manifest_path: String,
}

impl LabeledOptions {
    /// Scan labels for recognised `key=value` tokens. Never fails.
    pub fn extract(labels: &JobLabels) -> Self {
        let mut opts = Self::default();

        for (key, value) in labels.key_values() {
            if value.trim().is_empty() {
                continue;
            }
            if key == LABEL_KEY_PROJECT {
                opts.project.get_or_insert_with(|| value.to_string());
            } else if LABEL_KEYS_REGION.contains(&key) {
                opts.region.get_or_insert_with(|| value.to_string());
            } else if LABEL_KEYS_MANIFEST.contains(&key) && opts.manifest_path.is_empty() {
                opts.manifest_path = value.to_string();
            }
        }
        opts
    }

    /// Reject options that cannot address a manifest.
    pub fn validate(&self) -> ModelResult<()> {
        if self.manifest_path.trim().is_empty() {
            return Err(ModelError::Invalid(format!(
                "no `{}=` label on the job",
                LABEL_KEYS_MANIFEST[0]
            )));
        }
        Ok(())
    }
}
