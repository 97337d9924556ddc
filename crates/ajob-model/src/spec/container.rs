use serde::{Deserialize, Serialize};

use crate::{Env, Extra};

/// Container definition inside a task template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Optional container name. Required by the platform only when a task has several containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Image reference (e.g. `ghcr.io/acme/actions-job:latest`).
    #[serde(default)]
    pub image: String,

    /// Environment entries in declaration order.
    #[serde(default, skip_serializing_if = "Env::is_empty")]
    pub env: Env,

    /// Command, args, resources, ports and the rest, passed through untouched.
    #[serde(flatten)]
    pub extra: Extra,
}

impl Container {
    /// Create a named container running `image`.
    pub fn named(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
