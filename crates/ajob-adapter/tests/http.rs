use std::sync::{Arc, Mutex};

use ajob_adapter::{
    StaticToken, TokenSource,
    cloudrun::{CloudRunConfig, CloudRunJobs},
    github::{GithubConfig, GithubContents},
    metadata::{MetadataClient, MetadataTokenSource},
};
use ajob_core::{
    source::{FetchError, ManifestFetcher},
    store::{JobStore, JobStoreError},
};
use ajob_model::{ExecutionSpec, JobIdentity};
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
};

type Responder = Arc<dyn Fn(&Method, &str) -> (StatusCode, String) + Send + Sync>;

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: String,
}

#[derive(Clone)]
struct Stub {
    seen: Arc<Mutex<Vec<Seen>>>,
    respond: Responder,
}

impl Stub {
    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

async fn record(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let path = uri
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();
    let reply = (stub.respond)(&method, &path);
    stub.seen.lock().unwrap().push(Seen {
        method,
        uri: path,
        headers,
        body,
    });
    reply
}

/// Serve `respond` on an ephemeral local port; returns the base url.
async fn serve<F>(respond: F) -> (String, Stub)
where
    F: Fn(&Method, &str) -> (StatusCode, String) + Send + Sync + 'static,
{
    let stub = Stub {
        seen: Arc::default(),
        respond: Arc::new(respond),
    };
    let app = Router::new().fallback(record).with_state(stub.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), stub)
}

fn github(base: &str) -> GithubContents {
    GithubContents::new(GithubConfig {
        api_url: base.to_string(),
        token: "ghs_test".into(),
        ..Default::default()
    })
    .unwrap()
}

fn cloudrun(base: &str) -> CloudRunJobs {
    CloudRunJobs::new(
        CloudRunConfig {
            endpoint: Some(base.to_string()),
            ..Default::default()
        },
        Arc::new(StaticToken::new("ya29.test")),
    )
    .unwrap()
}

fn id() -> JobIdentity {
    JobIdentity::new("proj1", "us-central1", "actions-runner-job")
}

#[tokio::test]
async fn github_fetch_returns_raw_content() {
    let (base, stub) = serve(|_, _| (StatusCode::OK, "kind: Job\n".into())).await;

    let body = github(&base)
        .fetch("acme", "app", ".github/job.yaml", "abc123")
        .await
        .unwrap();
    assert_eq!(body, "kind: Job\n");

    let seen = stub.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(seen[0].uri, "/repos/acme/app/contents/.github/job.yaml?ref=abc123");
    assert_eq!(seen[0].headers["accept"], "application/vnd.github.raw+json");
    assert_eq!(seen[0].headers["authorization"], "Bearer ghs_test");
    assert!(seen[0].headers.contains_key("user-agent"));
}

#[tokio::test]
async fn github_status_codes_map_to_fetch_errors() {
    let (base, _) = serve(|_, path| {
        if path.contains("missing") {
            (StatusCode::NOT_FOUND, r#"{"message":"Not Found"}"#.into())
        } else if path.contains("secret") {
            (StatusCode::FORBIDDEN, "denied".into())
        } else {
            (StatusCode::BAD_GATEWAY, "oops".into())
        }
    })
    .await;
    let gh = github(&base);

    assert!(matches!(
        gh.fetch("o", "r", "missing.yaml", "sha").await,
        Err(FetchError::NotFound(_))
    ));
    assert!(matches!(
        gh.fetch("o", "r", "secret.yaml", "sha").await,
        Err(FetchError::Forbidden(_))
    ));
    assert!(matches!(
        gh.fetch("o", "r", "other.yaml", "sha").await,
        Err(FetchError::Upstream { status: 502, .. })
    ));
}

#[tokio::test]
async fn cloudrun_get_missing_job_is_not_found() {
    let (base, stub) = serve(|_, _| (StatusCode::NOT_FOUND, "{}".into())).await;

    let err = cloudrun(&base).get(&id()).await.unwrap_err();
    assert!(err.is_not_found(), "{err:?}");

    let seen = stub.seen();
    assert_eq!(
        seen[0].uri,
        "/apis/run.googleapis.com/v1/namespaces/proj1/jobs/actions-runner-job"
    );
    assert_eq!(seen[0].headers["authorization"], "Bearer ya29.test");
}

#[tokio::test]
async fn cloudrun_create_posts_manifest_to_collection() {
    let (base, stub) = serve(|method, _| {
        if *method == Method::POST {
            (
                StatusCode::OK,
                r#"{"apiVersion":"run.googleapis.com/v1","kind":"Job","metadata":{"name":"actions-runner-job","generation":1}}"#.into(),
            )
        } else {
            (StatusCode::METHOD_NOT_ALLOWED, String::new())
        }
    })
    .await;

    let mut spec = ExecutionSpec::default();
    spec.metadata.name = "actions-runner-job".into();

    let created = cloudrun(&base).create(&id(), &spec).await.unwrap();
    assert_eq!(created.metadata.generation, Some(1));

    let seen = stub.seen();
    assert_eq!(seen[0].uri, "/apis/run.googleapis.com/v1/namespaces/proj1/jobs");
    let sent: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(sent["apiVersion"], "run.googleapis.com/v1");
    assert_eq!(sent["kind"], "Job");
    assert_eq!(sent["metadata"]["name"], "actions-runner-job");
}

#[tokio::test]
async fn cloudrun_create_conflict_is_already_exists() {
    let (base, _) = serve(|_, _| (StatusCode::CONFLICT, "{}".into())).await;

    let err = cloudrun(&base)
        .create(&id(), &ExecutionSpec::default())
        .await
        .unwrap_err();
    assert!(matches!(err, JobStoreError::AlreadyExists(_)), "{err:?}");
}

#[tokio::test]
async fn cloudrun_update_replaces_job() {
    let (base, stub) = serve(|_, _| {
        (
            StatusCode::OK,
            r#"{"metadata":{"name":"actions-runner-job","generation":2}}"#.into(),
        )
    })
    .await;

    cloudrun(&base)
        .update(&id(), &ExecutionSpec::default())
        .await
        .unwrap();

    let seen = stub.seen();
    assert_eq!(seen[0].method, Method::PUT);
    assert!(seen[0].uri.ends_with("/jobs/actions-runner-job"));
}

#[tokio::test]
async fn cloudrun_run_returns_execution_name() {
    let (base, stub) = serve(|_, _| {
        (
            StatusCode::OK,
            r#"{"kind":"Execution","metadata":{"name":"actions-runner-job-7x2kq"}}"#.into(),
        )
    })
    .await;

    let handle = cloudrun(&base).run(&id()).await.unwrap();
    assert_eq!(handle.execution, "actions-runner-job-7x2kq");
    assert_eq!(handle.job, id());

    let seen = stub.seen();
    assert_eq!(seen[0].method, Method::POST);
    assert!(seen[0].uri.ends_with("/jobs/actions-runner-job:run"));
}

#[tokio::test]
async fn cloudrun_undecodable_body_is_decode_error() {
    let (base, _) = serve(|_, _| (StatusCode::OK, "<html>".into())).await;

    let err = cloudrun(&base).get(&id()).await.unwrap_err();
    assert!(matches!(err, JobStoreError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn metadata_reads_project_and_region() {
    let (base, stub) = serve(|_, path| match path {
        "/computeMetadata/v1/project/project-id" => (StatusCode::OK, "proj1".into()),
        "/computeMetadata/v1/instance/region" => {
            (StatusCode::OK, "projects/123456/regions/us-central1".into())
        }
        _ => (StatusCode::NOT_FOUND, String::new()),
    })
    .await;

    let md = MetadataClient::with_endpoint(base).unwrap();
    assert_eq!(md.project_id().await.unwrap(), "proj1");
    assert_eq!(md.region().await.unwrap(), "us-central1");
    assert!(
        stub.seen()
            .iter()
            .all(|s| s.headers["metadata-flavor"] == "Google")
    );
}

#[tokio::test]
async fn metadata_token_is_cached_until_expiry() {
    let (base, stub) = serve(|_, _| {
        (
            StatusCode::OK,
            r#"{"access_token":"ya29.meta","expires_in":3599,"token_type":"Bearer"}"#.into(),
        )
    })
    .await;

    let tokens = MetadataTokenSource::new(MetadataClient::with_endpoint(base).unwrap());
    assert_eq!(tokens.token().await.unwrap(), "ya29.meta");
    assert_eq!(tokens.token().await.unwrap(), "ya29.meta");
    assert_eq!(stub.seen().len(), 1);
}

#[tokio::test]
async fn metadata_token_failure_is_reported() {
    let (base, _) = serve(|_, _| (StatusCode::INTERNAL_SERVER_ERROR, "down".into())).await;

    let tokens = MetadataTokenSource::new(MetadataClient::with_endpoint(base).unwrap());
    assert!(tokens.token().await.is_err());
}
