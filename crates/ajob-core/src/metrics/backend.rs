use std::sync::Arc;

/// Dispatch outcome classification for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Job created and started.
    Created,
    /// Job updated and started.
    Updated,
    /// Event acknowledged without action.
    NonTarget,
    /// Event rejected by policy.
    SecurityViolation,
    /// Dispatch failed at some stage.
    Failed,
}

impl OutcomeKind {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            OutcomeKind::Created => "created",
            OutcomeKind::Updated => "updated",
            OutcomeKind::NonTarget => "non_target",
            OutcomeKind::SecurityViolation => "security_violation",
            OutcomeKind::Failed => "failed",
        }
    }
}

/// Backend metrics collection interface.
///
/// Implementations are injected into the controller and dispatcher at construction time.
pub trait DispatchMetrics: Send + Sync + 'static {
    /// Record an inbound event reaching the controller.
    fn record_event_received(&self);
    /// Record the end of one event's processing.
    ///
    /// # Arguments
    /// - `outcome`: How the event was settled
    /// - `duration_ms`: Time from receipt to outcome in milliseconds
    fn record_dispatch_completed(&self, outcome: OutcomeKind, duration_ms: u64);
    /// Record a failed stage of the dispatch transaction.
    ///
    /// # Arguments
    /// - `stage`: Stage label (`fetch`, `probe`, `create`, ...)
    /// - `error_kind`: Error category
    fn record_stage_error(&self, stage: &str, error_kind: &str);
    /// Record a finished readiness wait, successful or not.
    fn record_readiness_wait(&self, attempts: u32, waited_ms: u64);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn DispatchMetrics>;
