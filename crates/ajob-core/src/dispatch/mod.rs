//! Job dispatcher: the create-or-update-then-run transaction against one remote job.
//!
//! ```text
//! probe ─┬─ not found ─► Absent ──create──┐
//!        ├─ found ─────► Present ─update──┴─► Submitted ─await─► Ready ─run─► Started
//!        └─ error ─────► Failed
//! ```
//! Any stage error moves to `Failed`. A create conflict or an update against a
//! missing job is reported, never retried into the other branch.
mod lock;
pub use lock::{IdentityGuard, IdentityLocks};

mod readiness;
pub use readiness::{ReadinessPolicy, ReadyAfter};

use std::{fmt, sync::Arc};

use ajob_model::{ExecutionHandle, ExecutionSpec, JobIdentity};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace};

use crate::{
    error::{CoreError, Stage},
    guard::cancelable,
    metrics::{MetricsHandle, noop_metrics},
    store::{JobStore, JobStoreError},
};

/// Which reconcile branch a dispatch took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Created,
    Updated,
}

/// Successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub reconciled: Reconciled,
    pub execution: ExecutionHandle,
}

/// States of a single dispatch.
#[derive(Debug)]
pub enum DispatchState {
    Absent,
    Present,
    Submitted(Reconciled),
    Ready(Reconciled),
    Started(Dispatched),
    Failed(CoreError),
}

impl DispatchState {
    pub fn name(&self) -> &'static str {
        match self {
            DispatchState::Absent => "absent",
            DispatchState::Present => "present",
            DispatchState::Submitted(_) => "submitted",
            DispatchState::Ready(_) => "ready",
            DispatchState::Started(_) => "started",
            DispatchState::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct Dispatcher {
    store: Arc<dyn JobStore>,
    readiness: ReadinessPolicy,
    locks: Option<IdentityLocks>,
    metrics: MetricsHandle,
}

impl Dispatcher {
    /// Create a dispatcher with the default readiness policy and no per-identity locking.
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            readiness: ReadinessPolicy::default(),
            locks: None,
            metrics: noop_metrics(),
        }
    }

    pub fn with_readiness(mut self, policy: ReadinessPolicy) -> Self {
        self.readiness = policy;
        self
    }

    /// Serialise concurrent dispatches to the same job identity within this process.
    pub fn with_serialization(mut self, enabled: bool) -> Self {
        self.locks = enabled.then(IdentityLocks::new);
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Drive one job from probe to a started execution.
    ///
    /// `spec` is submitted at most once (create or update) and never mutated.
    #[instrument(level = "debug", skip(self, identity, spec, cancel), fields(job = %identity))]
    pub async fn dispatch(
        &self,
        identity: &JobIdentity,
        spec: &ExecutionSpec,
        cancel: &CancellationToken,
    ) -> Result<Dispatched, CoreError> {
        let _guard = match &self.locks {
            Some(locks) => Some(
                cancelable(cancel, Stage::Probe, locks.lock(identity)).await?,
            ),
            None => None,
        };

        let mut state = self.probe(identity, cancel).await;
        loop {
            trace!(state = state.name(), "dispatch state");
            state = match state {
                DispatchState::Absent => {
                    info!("job does not exist, creating");
                    self.submit(Reconciled::Created, identity, spec, cancel).await
                }
                DispatchState::Present => {
                    info!("job exists, updating");
                    self.submit(Reconciled::Updated, identity, spec, cancel).await
                }
                DispatchState::Submitted(reconciled) => {
                    let waited =
                        readiness::await_ready(self.store.as_ref(), identity, &self.readiness, cancel)
                            .await;
                    match waited {
                        Ok(after) => {
                            self.metrics
                                .record_readiness_wait(after.attempts, after.waited.as_millis() as u64);
                            DispatchState::Ready(reconciled)
                        }
                        Err(e) => {
                            if let CoreError::ReadinessTimeout { attempts, waited, .. } = &e {
                                self.metrics
                                    .record_readiness_wait(*attempts, waited.as_millis() as u64);
                            }
                            DispatchState::Failed(e)
                        }
                    }
                }
                DispatchState::Ready(reconciled) => self.start(identity, reconciled, cancel).await,
                DispatchState::Started(done) => {
                    info!(execution = %done.execution.execution, "job execution started");
                    return Ok(done);
                }
                DispatchState::Failed(err) => {
                    if let Some(stage) = err.stage() {
                        self.metrics.record_stage_error(stage.as_label(), err.as_label());
                    }
                    return Err(err);
                }
            };
        }
    }

    async fn probe(&self, identity: &JobIdentity, cancel: &CancellationToken) -> DispatchState {
        match cancelable(cancel, Stage::Probe, self.store.get(identity)).await {
            Ok(Ok(_)) => DispatchState::Present,
            Ok(Err(e)) if e.is_not_found() => DispatchState::Absent,
            Ok(Err(source)) => DispatchState::Failed(remote(Stage::Probe, identity, source)),
            Err(canceled) => DispatchState::Failed(canceled),
        }
    }

    async fn submit(
        &self,
        reconciled: Reconciled,
        identity: &JobIdentity,
        spec: &ExecutionSpec,
        cancel: &CancellationToken,
    ) -> DispatchState {
        let (stage, call) = match reconciled {
            Reconciled::Created => (Stage::Create, self.store.create(identity, spec)),
            Reconciled::Updated => (Stage::Update, self.store.update(identity, spec)),
        };
        match cancelable(cancel, stage, call).await {
            Ok(Ok(_)) => {
                debug!(stage = stage.as_label(), "job submitted");
                DispatchState::Submitted(reconciled)
            }
            Ok(Err(source)) => DispatchState::Failed(remote(stage, identity, source)),
            Err(canceled) => DispatchState::Failed(canceled),
        }
    }

    async fn start(
        &self,
        identity: &JobIdentity,
        reconciled: Reconciled,
        cancel: &CancellationToken,
    ) -> DispatchState {
        match cancelable(cancel, Stage::Run, self.store.run(identity)).await {
            Ok(Ok(execution)) => DispatchState::Started(Dispatched {
                reconciled,
                execution,
            }),
            Ok(Err(source)) => DispatchState::Failed(remote(Stage::Run, identity, source)),
            Err(canceled) => DispatchState::Failed(canceled),
        }
    }
}

fn remote(stage: Stage, identity: &JobIdentity, source: JobStoreError) -> CoreError {
    CoreError::Remote {
        stage,
        identity: identity.clone(),
        source,
    }
}
