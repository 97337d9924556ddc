use std::sync::Arc;

use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder, proto::MetricFamily,
};

use ajob_core::metrics::{DispatchMetrics, OutcomeKind};

const NAMESPACE: &str = "ajob";

/// Prometheus metrics backend.
///
/// ## Label cardinality
/// All labels are bounded:
/// - `outcome`: "created", "updated", "non_target", "security_violation", "failed"
/// - `stage`: "fetch", "probe", "create", "update", "await_ready", "run"
/// - `error_kind`: `CoreError` / `FetchError` / `JobStoreError` labels
#[derive(Clone)]
pub struct PrometheusMetrics {
    events_received: Counter,
    dispatch_completed: CounterVec,
    dispatch_duration: HistogramVec,
    stage_errors: CounterVec,
    readiness_attempts: Histogram,
    readiness_wait: Histogram,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a new prometheus metrics backend with custom registry.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let events_received = Counter::with_opts(
            Opts::new("events_received_total", "Total number of workflow job events received")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(events_received.clone()))?;

        let dispatch_completed = CounterVec::new(
            Opts::new("dispatch_completed_total", "Total number of settled events")
                .namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(dispatch_completed.clone()))?;

        let dispatch_duration = HistogramVec::new(
            HistogramOpts::new(
                "dispatch_duration_seconds",
                "Time from event receipt to outcome in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(dispatch_duration.clone()))?;

        let stage_errors = CounterVec::new(
            Opts::new("stage_errors_total", "Total dispatch stage failures").namespace(NAMESPACE),
            &["stage", "error_kind"],
        )?;
        registry.register(Box::new(stage_errors.clone()))?;

        let readiness_attempts = Histogram::with_opts(
            HistogramOpts::new("readiness_attempts", "Polls needed before a job became ready")
                .namespace(NAMESPACE)
                .buckets(vec![1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0]),
        )?;
        registry.register(Box::new(readiness_attempts.clone()))?;

        let readiness_wait = Histogram::with_opts(
            HistogramOpts::new("readiness_wait_seconds", "Time spent waiting for job readiness")
                .namespace(NAMESPACE)
                .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(readiness_wait.clone()))?;

        Ok(Self {
            events_received,
            dispatch_completed,
            dispatch_duration,
            stage_errors,
            readiness_attempts,
            readiness_wait,
            registry,
        })
    }

    /// Create a new prometheus metrics backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Encode all metrics in the text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Content type matching [`render`](Self::render).
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Underlying registry, for registering custom metrics alongside the dispatcher's.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl DispatchMetrics for PrometheusMetrics {
    fn record_event_received(&self) {
        self.events_received.inc();
    }

    fn record_dispatch_completed(&self, outcome: OutcomeKind, duration_ms: u64) {
        let label = outcome.as_label();
        self.dispatch_completed.with_label_values(&[label]).inc();

        let duration_seconds = duration_ms as f64 / 1000.0;
        self.dispatch_duration
            .with_label_values(&[label])
            .observe(duration_seconds);
    }

    fn record_stage_error(&self, stage: &str, error_kind: &str) {
        self.stage_errors
            .with_label_values(&[stage, error_kind])
            .inc();
    }

    fn record_readiness_wait(&self, attempts: u32, waited_ms: u64) {
        self.readiness_attempts.observe(f64::from(attempts));
        self.readiness_wait.observe(waited_ms as f64 / 1000.0);
    }
}
