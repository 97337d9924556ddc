use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Exponential backoff between polls.
///
/// The first wait is `first_ms`; each following wait is the previous one
/// multiplied by `factor`, capped at `max_ms`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackoffStrategy {
    pub first_ms: u64,
    pub max_ms: u64,
    pub factor: f64,
}

impl BackoffStrategy {
    /// Doubling backoff starting at `first_ms`.
    pub fn doubling(first_ms: u64, max_ms: u64) -> Self {
        Self {
            first_ms,
            max_ms,
            factor: 2.0,
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.first_ms == 0 {
            return Err(ModelError::Invalid("backoff first_ms cannot be zero".into()));
        }
        if self.max_ms < self.first_ms {
            return Err(ModelError::Invalid(
                "backoff max_ms cannot be lower than first_ms".into(),
            ));
        }
        if self.factor.is_nan() || self.factor < 1.0 {
            return Err(ModelError::Invalid("backoff factor must be >= 1".into()));
        }
        Ok(())
    }

    pub fn first(&self) -> Duration {
        Duration::from_millis(self.first_ms)
    }

    /// Wait that follows `current`.
    pub fn next(&self, current: Duration) -> Duration {
        let max = Duration::from_millis(self.max_ms);
        current.mul_f64(self.factor).min(max)
    }
}
