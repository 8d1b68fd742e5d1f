//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up middleware (request ID, tracing)
//! - Serve on a bound listener until a shutdown signal arrives
//! - Hand every request to the [`RequestPipeline`]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::InvalidHeaderValue, Request},
    response::Response,
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::pipeline::RequestPipeline;
use crate::lifecycle::signals::shutdown_signal;
use crate::upstream::UpstreamClient;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid CORS header value: {0}")]
    InvalidCorsHeader(#[from] InvalidHeaderValue),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RequestPipeline>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let pipeline = RequestPipeline::new(&config)?;
        Ok(Self::from_pipeline(config, pipeline))
    }

    /// Like [`HttpServer::new`], with a caller-supplied upstream client.
    pub fn with_client(config: ProxyConfig, client: UpstreamClient) -> Result<Self, ServerError> {
        let pipeline = RequestPipeline::with_client(&config, client)?;
        Ok(Self::from_pipeline(config, pipeline))
    }

    fn from_pipeline(config: ProxyConfig, pipeline: RequestPipeline) -> Self {
        let state = AppState {
            pipeline: Arc::new(pipeline),
        };
        Self {
            router: Self::build_router(state),
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server until SIGINT/SIGTERM or a message on `shutdown`.
    ///
    /// In-flight requests are allowed to finish once shutdown begins.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            target = %self.config.upstream.target_url,
            health_path = %self.config.service.health_path,
            cors_enabled = self.config.cors.enabled,
            "HTTP server starting"
        );

        let stop = async move {
            tokio::select! {
                _ = shutdown_signal() => {}
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown requested");
                }
            }
        };

        axum::serve(listener, self.router)
            .with_graceful_shutdown(stop)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler; every decision lives in the pipeline.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.pipeline.handle(request).await
}
