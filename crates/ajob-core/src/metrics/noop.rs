use crate::metrics::backend::{DispatchMetrics, OutcomeKind};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl DispatchMetrics for NoOpMetrics {
    #[inline(always)]
    fn record_event_received(&self) {}

    #[inline(always)]
    fn record_dispatch_completed(&self, _: OutcomeKind, _: u64) {}

    #[inline(always)]
    fn record_stage_error(&self, _: &str, _: &str) {}

    #[inline(always)]
    fn record_readiness_wait(&self, _: u32, _: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_metrics_is_zero_size() {
        assert_eq!(std::mem::size_of::<NoOpMetrics>(), 0);
    }
}
