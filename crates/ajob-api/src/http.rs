use std::sync::Arc;

use ajob_core::controller::DispatchOutcome;
use ajob_model::InboundEvent;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::{
    error::ApiError,
    handler::EventHandler,
    payload::{DELIVERY_HEADER, EVENT_HEADER, EVENT_PING, EVENT_WORKFLOW_JOB, WorkflowJobPayload},
    signature::{SIGNATURE_HEADER, verify},
};

/// Webhook HTTP service builder.
pub struct WebhookApi<H> {
    handler: Arc<H>,
    secret: Arc<[u8]>,
}

struct WebhookState<H> {
    handler: Arc<H>,
    secret: Arc<[u8]>,
}

impl<H> Clone for WebhookState<H> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            secret: self.secret.clone(),
        }
    }
}

impl<H> WebhookApi<H>
where
    H: EventHandler,
{
    /// Create new webhook API with the given handler and signing secret.
    pub fn new(handler: Arc<H>, secret: impl AsRef<[u8]>) -> Self {
        Self {
            handler,
            secret: Arc::from(secret.as_ref()),
        }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - POST /github/events - Webhook delivery
    /// - GET /healthz - Liveness probe
    pub fn router(self) -> Router {
        Router::new()
            .route("/github/events", post(github_events::<H>))
            .route("/healthz", get(healthz))
            .with_state(WebhookState {
                handler: self.handler,
                secret: self.secret,
            })
            .layer(TraceLayer::new_for_http())
    }
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct StartedResponse {
    job: String,
    execution: String,
    reconciled: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /github/events
///
/// - invalid or missing signature: 400
/// - `ping`: 200 `pong`
/// - `workflow_job`: see [`outcome_response`]
/// - any other event: 404
async fn github_events<H>(
    State(state): State<WebhookState<H>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError>
where
    H: EventHandler,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    if let Err(e) = verify(&state.secret, signature, &body) {
        warn!(error = %e, "could not validate webhook payload");
        return Err(ApiError::InvalidSignature(e));
    }

    let event = headers
        .get(EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let delivery = headers
        .get(DELIVERY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    debug!(event, delivery, bytes = body.len(), "webhook received");

    match event {
        EVENT_PING => {
            info!(delivery, "handled ping event");
            Ok((StatusCode::OK, "pong").into_response())
        }
        EVENT_WORKFLOW_JOB => {
            let payload: WorkflowJobPayload = serde_json::from_slice(&body)
                .map_err(|e| ApiError::InvalidRequest(format!("malformed workflow_job payload: {e}")))?;
            let event = InboundEvent::try_from(payload)?;

            outcome_response(state.handler.workflow_job(event).await)
        }
        "" => Err(ApiError::InvalidRequest("missing X-GitHub-Event header".into())),
        other => {
            warn!(event = other, "received unregistered event");
            Err(ApiError::UnsupportedEvent(other.to_string()))
        }
    }
}

/// Map a settled outcome to the response the sender expects.
///
/// - Created/Updated: 200 with the execution handle
/// - non-target: 202
/// - security violation: 400
/// - failure: 500
fn outcome_response(outcome: DispatchOutcome) -> Result<Response, ApiError> {
    let (handle, reconciled) = match outcome {
        DispatchOutcome::Created(h) => (h, "created"),
        DispatchOutcome::Updated(h) => (h, "updated"),
        DispatchOutcome::Rejected(r) if r.is_security_violation() => {
            return Err(ApiError::Rejected(r.reason));
        }
        DispatchOutcome::Rejected(r) => {
            return Ok((StatusCode::ACCEPTED, r.reason).into_response());
        }
        DispatchOutcome::Failed(e) => return Err(ApiError::Internal(e.to_string())),
    };

    let body = StartedResponse {
        job: handle.job.to_string(),
        execution: handle.execution,
        reconciled,
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// GET /healthz
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
