//! Metrics collection abstraction for the dispatch pipeline.
//!
//! Backends (prometheus, statsd, etc) implement [`DispatchMetrics`] and are injected
//! into [`crate::controller::Controller`].
mod backend;
pub use backend::{DispatchMetrics, MetricsHandle, OutcomeKind};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
