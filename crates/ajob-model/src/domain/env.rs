use serde::{Deserialize, Serialize};

use crate::EnvVar;

/// Ordered environment list of a container.
///
/// Serialized as a transparent array so it matches the manifest's `env:` sequence.
/// Order is significant: injected entries are appended, never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Env(pub Vec<EnvVar>);

impl Env {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    // Return len.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the environment is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &EnvVar> {
        self.0.iter()
    }

    /// Get the literal value for a name, returning the last matching entry.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|ev| ev.name() == name)
            .and_then(|ev| ev.value())
    }

    /// Number of entries carrying the given name.
    pub fn count(&self, name: &str) -> usize {
        self.0.iter().filter(|ev| ev.name() == name).count()
    }

    /// Append a literal entry.
    pub fn push<K, V>(&mut self, name: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.push(EnvVar::new(name, value));
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<EnvVar> for Env {
    fn from_iter<I: IntoIterator<Item = EnvVar>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
