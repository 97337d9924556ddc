use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered label list attached to a workflow job.
///
/// Labels are free-form strings such as `self-hosted` or `project=acme-ci`.
/// Order is preserved because the joined form is handed to the job verbatim.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobLabels(Vec<String>);

impl JobLabels {
    /// Create an empty label list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if no labels are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate labels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Case-insensitive membership test.
    pub fn contains_ignore_case(&self, label: &str) -> bool {
        self.0.iter().any(|l| l.eq_ignore_ascii_case(label))
    }

    /// Iterate `key=value` labels split at the first `=`; other labels are skipped.
    pub fn key_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|l| l.split_once('='))
    }

    /// Labels joined with `sep`, in insertion order.
    pub fn joined(&self, sep: &str) -> String {
        self.0.join(sep)
    }
}

impl<S: Into<String>> FromIterator<S> for JobLabels {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for JobLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined(","))
    }
}
