use serde::{Deserialize, Serialize};

use super::Extra;

/// Environment entry of a container definition.
///
/// `value` is optional because a manifest may source the variable via `valueFrom`;
/// such keys are carried untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    /// Variable name.
    name: String,
    /// Literal value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(flatten)]
    extra: Extra,
}

impl EnvVar {
    /// Create a literal name/value entry.
    pub fn new<K, V>(name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            value: Some(value.into()),
            extra: Extra::new(),
        }
    }

    /// Get the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the literal value, `None` for `valueFrom` entries.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl From<(String, String)> for EnvVar {
    fn from((name, value): (String, String)) -> Self {
        Self::new(name, value)
    }
}

impl From<(&str, &str)> for EnvVar {
    fn from((name, value): (&str, &str)) -> Self {
        Self::new(name, value)
    }
}
