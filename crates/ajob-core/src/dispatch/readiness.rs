use std::time::Duration;

use ajob_model::{BackoffStrategy, JobIdentity};
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    error::{CoreError, Stage},
    store::JobStore,
};

/// Stand-in for a deadline too large to add to the clock.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 86_400);

/// Bounds of the readiness wait.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadinessPolicy {
    /// Delay between polls.
    pub backoff: BackoffStrategy,
    /// Overall budget for the wait, polls included.
    pub deadline: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            backoff: BackoffStrategy::doubling(10, 5_000),
            deadline: Duration::from_secs(5),
        }
    }
}

/// Result of a successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyAfter {
    pub attempts: u32,
    pub waited: Duration,
}

/// Poll `get` until the job reports `Ready=True`.
///
/// Every sleep and every poll races the deadline and the caller's cancellation,
/// so the wait never outlives either.
pub(crate) async fn await_ready(
    store: &dyn JobStore,
    identity: &JobIdentity,
    policy: &ReadinessPolicy,
    cancel: &CancellationToken,
) -> Result<ReadyAfter, CoreError> {
    let started = Instant::now();
    let deadline = started
        .checked_add(policy.deadline)
        .unwrap_or_else(|| started + FAR_FUTURE);
    let timeout = |attempts| CoreError::ReadinessTimeout {
        identity: identity.clone(),
        attempts,
        waited: started.elapsed(),
    };

    let mut delay = policy.backoff.first();
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CoreError::Canceled { stage: Stage::AwaitReady }),
            _ = sleep_until(deadline) => return Err(timeout(attempts)),
            res = store.get(identity) => res.map_err(|source| CoreError::Remote {
                stage: Stage::AwaitReady,
                identity: identity.clone(),
                source,
            })?,
        };

        if job.is_ready() {
            let waited = started.elapsed();
            debug!(attempts, waited_ms = waited.as_millis() as u64, "job ready");
            return Ok(ReadyAfter { attempts, waited });
        }
        trace!(attempt = attempts, delay_ms = delay.as_millis() as u64, "job not ready yet");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CoreError::Canceled { stage: Stage::AwaitReady }),
            _ = sleep_until(deadline) => return Err(timeout(attempts)),
            _ = sleep(delay) => {}
        }
        delay = policy.backoff.next(delay);
    }
}
