use ajob_core::controller::DispatchOutcome;
use ajob_model::InboundEvent;
use async_trait::async_trait;

/// Webhook event handler.
///
/// This trait abstracts the backend implementation, allowing users to:
/// - Use the provided `ControllerAdapter`
/// - Implement custom handlers (dry-run, queueing, etc.)
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Process one `workflow_job` event to a settled outcome.
    async fn workflow_job(&self, event: InboundEvent) -> DispatchOutcome;
}
