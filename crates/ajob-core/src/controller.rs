//! Per-event pipeline: gate → label options → fetch → transform → dispatch.
//!
//! Every stage either passes its output forward or short-circuits; [`Controller::handle`]
//! always settles on a [`DispatchOutcome`] and never panics past its own boundary.
use std::sync::Arc;

use ajob_model::{
    CAPABILITY_LABEL, ExecutionHandle, InboundEvent, JobIdentity, LabeledOptions,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use crate::{
    dispatch::{Dispatched, Dispatcher, ReadinessPolicy, Reconciled},
    error::{CoreError, Stage},
    gate::{Rejection, SecurityGate},
    guard::cancelable,
    metrics::{MetricsHandle, OutcomeKind, noop_metrics},
    source::ManifestFetcher,
    store::JobStore,
    target::TargetDefaults,
    transform::{EnvContext, Transformed, transform},
};

/// Explicit configuration of the pipeline.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Label a job must carry to be handled.
    pub capability: String,
    /// Project/region used when the labels do not name one.
    pub defaults: TargetDefaults,
    pub readiness: ReadinessPolicy,
    /// Serialise dispatches to the same job identity within this process.
    pub serialize_same_job: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            capability: CAPABILITY_LABEL.to_string(),
            defaults: TargetDefaults::default(),
            readiness: ReadinessPolicy::default(),
            serialize_same_job: false,
        }
    }
}

/// Settled result of one event.
#[derive(Debug)]
pub enum DispatchOutcome {
    Rejected(Rejection),
    Created(ExecutionHandle),
    Updated(ExecutionHandle),
    Failed(CoreError),
}

impl DispatchOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            DispatchOutcome::Rejected(r) if r.is_security_violation() => {
                OutcomeKind::SecurityViolation
            }
            DispatchOutcome::Rejected(_) => OutcomeKind::NonTarget,
            DispatchOutcome::Created(_) => OutcomeKind::Created,
            DispatchOutcome::Updated(_) => OutcomeKind::Updated,
            DispatchOutcome::Failed(_) => OutcomeKind::Failed,
        }
    }

    /// Execution handle of a started job.
    pub fn execution(&self) -> Option<&ExecutionHandle> {
        match self {
            DispatchOutcome::Created(h) | DispatchOutcome::Updated(h) => Some(h),
            _ => None,
        }
    }
}

impl From<Result<Dispatched, CoreError>> for DispatchOutcome {
    fn from(res: Result<Dispatched, CoreError>) -> Self {
        match res {
            Ok(Dispatched {
                reconciled: Reconciled::Created,
                execution,
            }) => DispatchOutcome::Created(execution),
            Ok(Dispatched {
                reconciled: Reconciled::Updated,
                execution,
            }) => DispatchOutcome::Updated(execution),
            Err(e) if e.is_non_actionable() => DispatchOutcome::Rejected(match e {
                CoreError::Rejected(r) => r,
                CoreError::Validation(reason) => Rejection::non_target(reason),
                other => Rejection::non_target(other.to_string()),
            }),
            Err(e) => DispatchOutcome::Failed(e),
        }
    }
}

pub struct Controller {
    gate: SecurityGate,
    defaults: TargetDefaults,
    fetcher: Arc<dyn ManifestFetcher>,
    dispatcher: Dispatcher,
    metrics: MetricsHandle,
}

impl Controller {
    pub fn new(
        cfg: ControllerConfig,
        fetcher: Arc<dyn ManifestFetcher>,
        store: Arc<dyn JobStore>,
    ) -> Self {
        Self {
            gate: SecurityGate::new(cfg.capability),
            defaults: cfg.defaults,
            fetcher,
            dispatcher: Dispatcher::new(store)
                .with_readiness(cfg.readiness)
                .with_serialization(cfg.serialize_same_job),
            metrics: noop_metrics(),
        }
    }

    /// Replace the metrics backend for the controller and its dispatcher.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.dispatcher = self.dispatcher.with_metrics(metrics.clone());
        self.metrics = metrics;
        self
    }

    /// Process one event to completion.
    #[instrument(
        level = "info",
        skip(self, event, cancel),
        fields(repo = %event.repository.full_name, action = %event.action, sha = %event.head_sha)
    )]
    pub async fn handle(&self, event: &InboundEvent, cancel: &CancellationToken) -> DispatchOutcome {
        self.metrics.record_event_received();
        let started = Instant::now();

        let outcome = DispatchOutcome::from(self.process(event, cancel).await);
        match &outcome {
            DispatchOutcome::Rejected(r) if r.is_security_violation() => {
                warn!(security = true, reason = %r.reason, "event rejected");
            }
            DispatchOutcome::Rejected(r) => {
                debug!(reason = %r.reason, "event is not a dispatch target");
            }
            DispatchOutcome::Created(_) | DispatchOutcome::Updated(_) => {}
            DispatchOutcome::Failed(e) => {
                error!(
                    stage = e.stage().map(|s| s.as_label()).unwrap_or("transform"),
                    error = %e,
                    "dispatch failed"
                );
            }
        }

        self.metrics
            .record_dispatch_completed(outcome.kind(), started.elapsed().as_millis() as u64);
        outcome
    }

    async fn process(
        &self,
        event: &InboundEvent,
        cancel: &CancellationToken,
    ) -> Result<Dispatched, CoreError> {
        let admitted = self.gate.admit(event).map_err(CoreError::Rejected)?;

        let target = self
            .defaults
            .resolve(LabeledOptions::extract(&admitted.labels))?;
        let (owner, repo) = admitted
            .repository
            .owner_and_name()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let raw = cancelable(
            cancel,
            Stage::Fetch,
            self.fetcher
                .fetch(owner, repo, &target.manifest_path, &admitted.head_sha),
        )
        .await
        .and_then(|fetched| {
            fetched.map_err(|source| CoreError::Fetch {
                repo: admitted.repository.full_name.clone(),
                path: target.manifest_path.clone(),
                revision: admitted.head_sha.clone(),
                source,
            })
        })
        .inspect_err(|e| self.record_fetch_error(e))?;
        debug!(bytes = raw.len(), path = %target.manifest_path, "manifest fetched");

        let Transformed { spec, name } = transform(
            &raw,
            &EnvContext {
                owner,
                repo,
                labels: &admitted.labels,
            },
        )?;

        let identity = JobIdentity::new(target.project, target.region, name);
        self.dispatcher.dispatch(&identity, &spec, cancel).await
    }

    /// Failed and canceled fetches land in the same `stage_errors` series.
    fn record_fetch_error(&self, err: &CoreError) {
        let kind = match err {
            CoreError::Fetch { source, .. } => source.as_label(),
            other => other.as_label(),
        };
        self.metrics.record_stage_error(Stage::Fetch.as_label(), kind);
    }
}
