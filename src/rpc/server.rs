//! HTTP surface for the RPC dispatcher.
//!
//! A single `POST /rpc` endpoint accepts request envelopes; `GET /health`
//! answers liveness probes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::HttpConfig;
use crate::observability::{Logger, Severity};

use super::dispatcher::Dispatcher;
use super::response::ResponseEnvelope;

/// The RPC HTTP server.
pub struct RpcServer {
    config: HttpConfig,
    router: Router,
}

impl RpcServer {
    pub fn new(config: HttpConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let router = build_router(dispatcher);
        Self { config, router }
    }

    /// The router, for embedding the RPC surface into a larger app.
    pub fn router(self) -> Router {
        self.router
    }

    /// Binds and serves until the process stops.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse::<SocketAddr>()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
        let listener = TcpListener::bind(addr).await?;
        Logger::log(
            Severity::Info,
            "rpc_listening",
            &[("addr", &addr.to_string())],
        );
        axum::serve(listener, self.router).await
    }
}

fn build_router(dispatcher: Arc<Dispatcher>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/rpc", post(rpc))
        .with_state(dispatcher)
        .layer(cors)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn rpc(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(body): Json<Value>,
) -> Json<ResponseEnvelope> {
    Json(dispatcher.dispatch(body).await)
}
