//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with admin, client and health routes
//! - Wire up middleware (request ID, tracing, limits, headers, metrics)
//! - Route groups carry their own request deadline (see resilience::timeouts)
//! - Serve with graceful shutdown on the lifecycle broadcast

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::env::{resolve_backend_url, EnvProvider, RuntimeEnv};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::security::{self, CorsPolicy};
use crate::upstream::{BackendClient, BackendRequest, BackendResponse, ReqwestTransport, Transport};
use crate::{admin, client};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub env: EnvProvider,
    pub backend: BackendClient,
    pub cors: Arc<CorsPolicy>,
}

impl AppState {
    pub fn new(config: GatewayConfig, env: EnvProvider, transport: Arc<dyn Transport>) -> Self {
        let cors = Arc::new(CorsPolicy::from_config(&config.cors));
        Self {
            config: Arc::new(config),
            env,
            backend: BackendClient::new(transport),
            cors,
        }
    }

    /// Fresh snapshot of the environment.
    pub fn runtime_env(&self) -> RuntimeEnv {
        self.env.snapshot()
    }

    /// Backend origin for the current request.
    pub fn backend_url(&self) -> String {
        resolve_backend_url(&self.runtime_env(), &self.config.backend)
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env().is_production()
    }

    pub fn read_policy(&self) -> RetryPolicy {
        RetryPolicy::for_reads(&self.config.retries, &self.config.timeouts)
    }

    pub fn write_policy(&self) -> RetryPolicy {
        RetryPolicy::for_writes(&self.config.retries, &self.config.timeouts)
    }

    /// Send `request` to the backend, mapping exhausted retries to a gateway error.
    pub async fn call_backend(
        &self,
        request: BackendRequest,
        policy: &RetryPolicy,
    ) -> Result<BackendResponse, GatewayError> {
        let url = request.url.clone();
        self.backend
            .send(request, policy)
            .await
            .map_err(|source| GatewayError::transport(url, source))
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Server reading the process environment and calling the backend over reqwest.
    pub fn new(config: GatewayConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::default());
        Self::with_state(AppState::new(config, EnvProvider::Process, transport))
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            router: build_router(state),
        }
    }

    /// The fully layered router, for driving with `oneshot` in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .route("/healthz", get(healthz))
        .merge(admin::router(state.clone()))
        .merge(client::router(state.clone()))
        .route_layer(middleware::from_fn(metrics::track_requests))
        .with_state(state);

    let router = security::limits::with_body_limit(router, config.listener.max_body_bytes);
    let router = if config.security.enable_headers {
        security::headers::with_security_headers(router)
    } else {
        router
    };

    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id(request.headers()),
            )
        }))
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn panic_response(_: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": "Internal server error",
            "error": "unexpected failure while handling the request",
        })),
    )
        .into_response()
}
