//! Prometheus metrics backend for the ajob dispatcher.
//!
//! [`PrometheusMetrics`] implements [`ajob_core::DispatchMetrics`] and keeps its own registry,
//! rendered in the text exposition format by [`PrometheusMetrics::render`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use ajob_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: ajob_core::metrics::MetricsHandle = Arc::new(metrics.clone());
//!
//! handle.record_event_received();
//! assert!(metrics.render()?.contains("ajob_events_received_total 1"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `ajob_events_received_total` - Counter
//! - `ajob_dispatch_completed_total{outcome}` - Counter
//! - `ajob_dispatch_duration_seconds{outcome}` - Histogram
//! - `ajob_stage_errors_total{stage, error_kind}` - Counter
//! - `ajob_readiness_attempts` - Histogram
//! - `ajob_readiness_wait_seconds` - Histogram
//!
//! The HTTP route serving `/metrics` lives in the binary.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
