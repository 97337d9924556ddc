use std::{net::SocketAddr, sync::Arc};

use ajob_adapter::{
    StaticToken, TokenSource,
    cloudrun::{CloudRunConfig, CloudRunJobs},
    github::{GithubConfig, GithubContents},
    metadata::{MetadataClient, MetadataTokenSource},
};
use ajob_api::{ControllerAdapter, WebhookApi};
use ajob_core::{
    controller::{Controller, ControllerConfig},
    target::TargetDefaults,
};
use ajob_observe::{init_local_offset, init_logger};
use ajob_prometheus::PrometheusMetrics;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod config;
use config::Config;

fn main() -> anyhow::Result<()> {
    // Local offset detection only works before worker threads exist.
    init_local_offset();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run())
}

async fn run() -> anyhow::Result<()> {
    // 1) config + logger
    let cfg = Config::from_env()?;
    init_logger(&cfg.logger)?;
    info!(port = cfg.port, format = %cfg.logger.format, "logger initialized");

    // 2) target defaults, metadata server as fallback
    let metadata = MetadataClient::new()?;
    let defaults = TargetDefaults {
        project: match cfg.project.clone() {
            Some(project) => Some(project),
            None => metadata
                .project_id()
                .await
                .inspect_err(|e| warn!(error = %e, "project id unavailable"))
                .ok(),
        },
        region: match cfg.region.clone() {
            Some(region) => Some(region),
            None => metadata
                .region()
                .await
                .inspect_err(|e| warn!(error = %e, "region unavailable"))
                .ok(),
        },
    };
    info!(project = ?defaults.project, region = ?defaults.region, "dispatch defaults resolved");

    // 3) transports
    let tokens: Arc<dyn TokenSource> = match cfg.access_token.clone() {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(MetadataTokenSource::new(metadata)),
    };
    let fetcher = GithubContents::new(GithubConfig {
        api_url: cfg.github_api_url.clone(),
        token: cfg.github_token.clone(),
        timeout: cfg.github_timeout,
    })?;
    let store = CloudRunJobs::new(
        CloudRunConfig {
            endpoint: cfg.cloud_run_endpoint.clone(),
            ..Default::default()
        },
        tokens,
    )?;

    // 4) controller + metrics
    let metrics =
        PrometheusMetrics::new().map_err(|e| anyhow::anyhow!("metrics registry: {e}"))?;
    let controller = Controller::new(
        ControllerConfig {
            capability: cfg.capability.clone(),
            defaults,
            readiness: cfg.readiness.clone(),
            serialize_same_job: cfg.serialize_same_job,
        },
        Arc::new(fetcher),
        Arc::new(store),
    )
    .with_metrics(Arc::new(metrics.clone()));

    // 5) http surface
    let shutdown = CancellationToken::new();
    let adapter = ControllerAdapter::new(
        Arc::new(controller),
        shutdown.clone(),
        cfg.request_timeout,
    );
    let app = WebhookApi::new(Arc::new(adapter), cfg.webhook_secret.as_bytes())
        .router()
        .merge(
            Router::new()
                .route("/metrics", get(render_metrics))
                .with_state(metrics),
        );

    // 6) serve until SIGINT/SIGTERM
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("server stopped");
    Ok(())
}

async fn render_metrics(State(metrics): State<PrometheusMetrics>) -> Response {
    match metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, metrics.content_type())], body).into_response(),
        Err(e) => {
            error!(error = %e, "metrics encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Resolves on SIGINT or SIGTERM and cancels in-flight dispatches.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "SIGINT handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
    shutdown.cancel();
}
