//! Shared utilities for integration tests.
//!
//! A mock backend (a real axum server on an ephemeral port) records every
//! request it receives and answers through a programmable closure.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Response, Uri};
use axum::Router;
use tokio::net::TcpListener;

use newsroom_gateway::config::{EnvProvider, GatewayConfig, RuntimeEnv};
use newsroom_gateway::http::{AppState, HttpServer};
use newsroom_gateway::lifecycle::Shutdown;
use newsroom_gateway::upstream::ReqwestTransport;

/// One request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// What the mock backend answers: status, extra headers, body.
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("content-type", "application/json".into())],
            body: body.to_string(),
        }
    }

    pub fn html(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![("content-type", "text/html".into())],
            body: body.to_string(),
        }
    }

    pub fn cookie(mut self, value: &str) -> Self {
        self.headers.push(("set-cookie", value.to_string()));
        self
    }
}

type Handler = dyn Fn(&Recorded, usize) -> Reply + Send + Sync;

#[derive(Clone)]
struct BackendState {
    hits: Arc<Mutex<Vec<Recorded>>>,
    handler: Arc<Handler>,
    delay: Option<std::time::Duration>,
}

#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    hits: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> Vec<Recorded> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.lock().unwrap().len()
    }
}

/// Start a backend whose handler gets the request and the number of earlier
/// requests to the same path.
pub async fn start_backend<F>(handler: F) -> MockBackend
where
    F: Fn(&Recorded, usize) -> Reply + Send + Sync + 'static,
{
    start_backend_with_delay(None, handler).await
}

pub async fn start_backend_with_delay<F>(delay: Option<std::time::Duration>, handler: F) -> MockBackend
where
    F: Fn(&Recorded, usize) -> Reply + Send + Sync + 'static,
{
    let hits = Arc::new(Mutex::new(Vec::new()));
    let state = BackendState {
        hits: hits.clone(),
        handler: Arc::new(handler),
        delay,
    };

    let app = Router::new().fallback(record_and_reply).with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, hits }
}

async fn record_and_reply(
    State(state): State<BackendState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response<Body> {
    let recorded = Recorded {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    };
    let previous = {
        let mut hits = state.hits.lock().unwrap();
        let previous = hits.iter().filter(|h| h.path == recorded.path).count();
        hits.push(recorded.clone());
        previous
    };

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    let reply = (state.handler)(&recorded, previous);
    let mut builder = Response::builder().status(reply.status);
    for (name, value) in reply.headers {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(reply.body)).unwrap()
}

/// An address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub struct Gateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Fast retry settings so failure tests finish quickly.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.retries.base_delay_ms = 10;
    config.retries.max_delay_ms = 40;
    config.timeouts.backend_ms = 2_000;
    config
}

/// Start the gateway pointed at `backend_url` on an ephemeral port.
pub async fn start_gateway(backend_url: &str, config: GatewayConfig) -> Gateway {
    start_gateway_with_env(RuntimeEnv::with_backend(backend_url), config).await
}

pub async fn start_gateway_with_env(env: RuntimeEnv, config: GatewayConfig) -> Gateway {
    let state = AppState::new(config, EnvProvider::Fixed(env), Arc::new(ReqwestTransport::default()));
    let server = HttpServer::with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    Gateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
