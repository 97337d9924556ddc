//! Resolution of the job platform target from label options and configured defaults.
use ajob_model::LabeledOptions;

use crate::error::CoreError;

/// Fallback project/region used when the job labels do not name one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetDefaults {
    pub project: Option<String>,
    pub region: Option<String>,
}

/// Where to read the manifest from and where to dispatch the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    pub project: String,
    pub region: String,
    pub manifest_path: String,
}

impl TargetDefaults {
    /// Labels override defaults. A target missing any field is a validation error.
    pub fn resolve(&self, opts: LabeledOptions) -> Result<DispatchTarget, CoreError> {
        opts.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let project = opts
            .project
            .or_else(|| self.project.clone())
            .ok_or_else(|| CoreError::Validation("no `project=` label and no default project".into()))?;
        let region = opts
            .region
            .or_else(|| self.region.clone())
            .ok_or_else(|| CoreError::Validation("no `region=` label and no default region".into()))?;

        Ok(DispatchTarget {
            project,
            region,
            manifest_path: opts.manifest_path,
        })
    }
}
