use std::sync::{Arc, Mutex};

use ajob_api::{EventHandler, WebhookApi, signature::sign};
use ajob_core::{
    controller::DispatchOutcome,
    error::{CoreError, Stage},
    gate::Rejection,
};
use ajob_model::{Action, ExecutionHandle, InboundEvent, JobIdentity};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

const SECRET: &str = "webhook-secret";

/// Handler returning a fixed outcome and recording the events it saw.
struct FakeHandler {
    outcome: fn() -> DispatchOutcome,
    seen: Mutex<Vec<InboundEvent>>,
}

impl FakeHandler {
    fn new(outcome: fn() -> DispatchOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<InboundEvent> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventHandler for FakeHandler {
    async fn workflow_job(&self, event: InboundEvent) -> DispatchOutcome {
        self.seen.lock().unwrap().push(event);
        (self.outcome)()
    }
}

fn created() -> DispatchOutcome {
    DispatchOutcome::Created(ExecutionHandle {
        job: JobIdentity::new("proj1", "us-central1", "actions-runner-job"),
        execution: "actions-runner-job-7x2kq".into(),
    })
}

fn app(handler: &Arc<FakeHandler>) -> Router {
    WebhookApi::new(handler.clone(), SECRET).router()
}

fn workflow_job_body() -> String {
    serde_json::json!({
        "action": "queued",
        "workflow_job": {
            "id": 1,
            "run_id": 2,
            "head_sha": "abc123",
            "labels": ["self-hosted", "project=proj1", "region=us-central1", "job-manifest=.github/job.yaml"]
        },
        "repository": { "full_name": "acme/app", "private": true, "fork": false }
    })
    .to_string()
}

fn delivery(event: &str, body: &str, signature: Option<String>) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri("/github/events")
        .header("content-type", "application/json")
        .header("x-github-event", event)
        .header("x-github-delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958");
    if let Some(sig) = signature {
        req = req.header("x-hub-signature-256", sig);
    }
    req.body(Body::from(body.to_string())).unwrap()
}

fn signed(event: &str, body: &str) -> Request<Body> {
    delivery(event, body, Some(sign(SECRET.as_bytes(), body.as_bytes()).unwrap()))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn ping_answers_pong() {
    let handler = FakeHandler::new(created);
    let (status, body) = send(app(&handler), signed("ping", r#"{"zen":"Keep it logically awesome."}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "pong");
    assert!(handler.seen().is_empty());
}

#[tokio::test]
async fn bad_signature_is_rejected_before_parsing() {
    let handler = FakeHandler::new(created);
    let body = workflow_job_body();
    let forged = sign(b"another-secret", body.as_bytes()).unwrap();

    let (status, _) = send(app(&handler), delivery("workflow_job", &body, Some(forged))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app(&handler), delivery("workflow_job", &body, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(handler.seen().is_empty());
}

#[tokio::test]
async fn started_job_is_ok_with_execution_handle() {
    let handler = FakeHandler::new(created);
    let (status, body) = send(app(&handler), signed("workflow_job", &workflow_job_body())).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["execution"], "actions-runner-job-7x2kq");
    assert_eq!(json["job"], "proj1/us-central1/actions-runner-job");
    assert_eq!(json["reconciled"], "created");

    let seen = handler.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].action, Action::Queued);
    assert_eq!(seen[0].repository.full_name, "acme/app");
    assert_eq!(seen[0].head_sha, "abc123");
    assert_eq!(seen[0].labels.len(), 4);
}

#[tokio::test]
async fn non_target_is_accepted() {
    let handler = FakeHandler::new(|| {
        DispatchOutcome::Rejected(Rejection::non_target("action \"completed\" is not queued"))
    });
    let (status, _) = send(app(&handler), signed("workflow_job", &workflow_job_body())).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn security_violation_is_client_error() {
    let handler = FakeHandler::new(|| {
        DispatchOutcome::Rejected(Rejection::security("repository acme/app is public"))
    });
    let (status, _) = send(app(&handler), signed("workflow_job", &workflow_job_body())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failure_is_server_error_without_detail() {
    let handler = FakeHandler::new(|| {
        DispatchOutcome::Failed(CoreError::Canceled {
            stage: Stage::AwaitReady,
        })
    });
    let (status, body) = send(app(&handler), signed("workflow_job", &workflow_job_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("await_ready"), "{body}");
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let handler = FakeHandler::new(created);
    let (status, _) = send(app(&handler), signed("push", r#"{"ref":"refs/heads/main"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_payload_is_bad_request() {
    let handler = FakeHandler::new(created);
    let (status, _) = send(app(&handler), signed("workflow_job", r#"{"action":"queued"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(handler.seen().is_empty());
}

#[tokio::test]
async fn healthz_is_ok() {
    let handler = FakeHandler::new(created);
    let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let (status, body) = send(app(&handler), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
