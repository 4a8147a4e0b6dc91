//! HTTP exporter for camera metrics.
//!
//! Routes:
//! - `GET /metrics` — Prometheus text exposition of the registry.
//! - `GET /health` — `200` while a device is open, `503` otherwise.
//! - `GET /state` — the current still-capture state, e.g. `preview`.

use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

/// Failures while serving metrics.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind metrics listener: {0}")]
    Bind(#[from] std::io::Error),

    /// The server stopped with an error.
    #[error("metrics server failed: {0}")]
    Serve(String),
}

/// Where the exporter listens.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self::with_port(9090)
    }
}

impl MetricsServerConfig {
    /// Listens on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
        }
    }
}

/// The registry plus the last snapshot pushed into it.
pub struct MetricsState {
    registry: MetricsRegistry,
    latest: MetricsSnapshot,
}

impl MetricsState {
    /// Records a new camera snapshot.
    pub fn update(&mut self, snapshot: &MetricsSnapshot) {
        self.registry.update(snapshot);
        self.latest = snapshot.clone();
    }

    /// The last snapshot recorded.
    pub fn latest(&self) -> &MetricsSnapshot {
        &self.latest
    }
}

type SharedState = Arc<RwLock<MetricsState>>;

/// Serves camera metrics over HTTP.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: SharedState,
}

impl MetricsServer {
    /// Creates a server exporting `registry`.
    pub fn new(config: MetricsServerConfig, registry: MetricsRegistry) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(MetricsState {
                registry,
                latest: MetricsSnapshot::default(),
            })),
        }
    }

    /// Creates a server already seeded with `snapshot`.
    pub fn with_snapshot(
        config: MetricsServerConfig,
        registry: MetricsRegistry,
        snapshot: &MetricsSnapshot,
    ) -> Self {
        registry.update(snapshot);
        let server = Self::new(config, registry);
        if let Ok(mut state) = server.state.try_write() {
            state.latest = snapshot.clone();
        }
        server
    }

    /// Handle for pushing fresh snapshots while the server runs.
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .route("/state", get(state_handler))
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.state))
    }

    /// Serves until the process exits.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Metrics server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))
    }
}

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

async fn metrics_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;
    match state.registry.encode() {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, PROMETHEUS_TEXT)], body),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("failed to encode metrics: {e}"),
        ),
    }
}

async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    if state.read().await.latest.camera_open {
        (StatusCode::OK, "camera open")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "camera closed")
    }
}

async fn state_handler(State(state): State<SharedState>) -> impl IntoResponse {
    state.read().await.latest.capture_state.to_string()
}
