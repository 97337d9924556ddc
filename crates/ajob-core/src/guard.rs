use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, Stage};

/// Race an outbound call against the caller's cancellation.
///
/// On cancellation the call future is dropped, which aborts the request in flight.
pub(crate) async fn cancelable<F, T>(
    cancel: &CancellationToken,
    stage: Stage,
    fut: F,
) -> Result<T, CoreError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CoreError::Canceled { stage }),
        out = fut => Ok(out),
    }
}
