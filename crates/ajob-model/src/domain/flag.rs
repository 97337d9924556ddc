use serde::{Deserialize, Serialize};

/// Boolean capability flag carried in a container environment.
///
/// Only the literal string `"true"` enables a flag; anything else (including
/// `"TRUE"`, `"1"` or an absent entry) leaves it disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flag(bool);

impl Flag {
    /// Create an enabled flag.
    pub const fn enabled() -> Self {
        Self(true)
    }

    /// Create a disabled flag.
    pub const fn disabled() -> Self {
        Self(false)
    }

    /// Interpret an environment value.
    pub fn from_env_value(value: Option<&str>) -> Self {
        Self(value == Some("true"))
    }

    /// Check if the flag is enabled.
    pub const fn is_enabled(&self) -> bool {
        self.0
    }

    /// Check if the flag is disabled.
    pub const fn is_disabled(&self) -> bool {
        !self.0
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::disabled()
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

impl From<Flag> for bool {
    fn from(f: Flag) -> Self {
        f.0
    }
}
