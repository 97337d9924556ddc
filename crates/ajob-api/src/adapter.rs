use std::{sync::Arc, time::Duration};

use ajob_core::controller::{Controller, DispatchOutcome};
use ajob_model::InboundEvent;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::handler::EventHandler;

/// Adapter that bridges `Controller` to `EventHandler`.
///
/// Each event runs under a child of the shutdown token, canceled once the
/// request deadline passes.
pub struct ControllerAdapter {
    controller: Arc<Controller>,
    shutdown: CancellationToken,
    timeout: Duration,
}

impl ControllerAdapter {
    /// Create a new adapter wrapping the given controller.
    pub fn new(controller: Arc<Controller>, shutdown: CancellationToken, timeout: Duration) -> Self {
        Self {
            controller,
            shutdown,
            timeout,
        }
    }
}

#[async_trait]
impl EventHandler for ControllerAdapter {
    async fn workflow_job(&self, event: InboundEvent) -> DispatchOutcome {
        let cancel = self.shutdown.child_token();

        let handle = self.controller.handle(&event, &cancel);
        tokio::pin!(handle);

        tokio::select! {
            out = &mut handle => out,
            _ = tokio::time::sleep(self.timeout) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "request deadline exceeded, canceling dispatch");
                cancel.cancel();
                handle.await
            }
        }
    }
}
