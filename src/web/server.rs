use axum::{routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::telemetry::{spawn_ingestion, NdjsonSource, StateStore, TelemetryError};

use super::api::czml as czml_handlers;
use super::config::Config;
use super::state::AppState;

/// How long to wait for the ingestion workers to report once the server is down.
const WORKER_DRAIN: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
    #[error("telemetry startup failed: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("connections still open after {0:?} grace period")]
    ShutdownTimeout(Duration),
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/czml", get(czml_handlers::stream))
        // Everything else is the browser client
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `app` until `shutdown` fires, then drains open connections for at
/// most `grace`.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> Result<(), ServerError> {
    let server =
        axum::serve(listener, app).with_graceful_shutdown(shutdown.clone().cancelled_owned());
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server => return Ok(result??),
        _ = shutdown.cancelled() => {}
    }

    log::info!("Shutting down, waiting up to {:?} for connections", grace);
    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => Ok(result??),
        Err(_) => {
            server.abort();
            Err(ServerError::ShutdownTimeout(grace))
        }
    }
}

pub async fn run_server(config: Config, shutdown: CancellationToken) -> Result<(), ServerError> {
    let bind_addr = config.web.bind.clone();
    let store = StateStore::new();

    let source = NdjsonSource::new(config.telemetry.endpoint.clone());
    log::info!("Connecting to telemetry at {}", source.endpoint());
    let workers = spawn_ingestion(&source, store.clone(), shutdown.clone()).await?;

    let state = AppState {
        store,
        settings: Arc::new(config.stream.clone()),
        timeline: config.timeline(),
        shutdown: shutdown.clone(),
    };
    let app = router(state, &config.web.static_dir);

    log::info!("Starting server on {}", bind_addr);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;
    let result = serve(listener, app, shutdown.clone(), config.web.shutdown_grace).await;

    shutdown.cancel();
    for worker in [workers.position, workers.attitude] {
        match tokio::time::timeout(WORKER_DRAIN, worker).await {
            Ok(Ok(report)) => log::info!(
                "{} worker finished: {:?} after {} samples",
                report.kind,
                report.outcome,
                report.samples
            ),
            Ok(Err(e)) => log::error!("Ingestion worker panicked: {}", e),
            Err(_) => log::warn!("Ingestion worker did not stop in time"),
        }
    }

    result
}
