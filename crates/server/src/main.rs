//! `booking-server`: Axum HTTP transport for the per-turn booking API.
//! Wires the three out-of-scope external collaborators (NLU provider,
//! execution backend, session store) to their concrete HTTP/Redis/
//! in-process implementations and serves `POST /v1/turn`, `GET
//! /healthz`, `GET /metrics`.

mod config;
mod error;
mod nlu_client;
mod routes;
mod state;
mod telemetry;

use crate::config::ServerConfig;
use crate::nlu_client::HttpNluClient;
use crate::state::AppState;
use booking_core::{ExecutionBackend, NluProvider, SessionStore};
use booking_orchestrator::Orchestrator;
use booking_persistence::{InMemorySessionStore, RedisSessionStore};
use booking_tools::{HttpExecutionBackend, InProcessExecutionBackend};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    let metrics_handle = telemetry::install_metrics_recorder();

    let config = ServerConfig::load();
    tracing::info!(bind_addr = %config.bind_addr, "starting booking-server");

    let Some(nlu_endpoint) = config.nlu_endpoint.clone() else {
        tracing::error!("BOOKING_SERVER_NLU_ENDPOINT is required: the NLU provider has no safe in-process default");
        std::process::exit(1);
    };
    let nlu: Arc<dyn NluProvider> = Arc::new(HttpNluClient::new(nlu_endpoint));

    let execution: Arc<dyn ExecutionBackend> = match &config.execution_endpoint {
        Some(endpoint) => Arc::new(HttpExecutionBackend::new(endpoint.clone())),
        None => {
            tracing::warn!("no execution endpoint configured, using the in-process reference backend");
            Arc::new(InProcessExecutionBackend::new())
        }
    };

    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => match RedisSessionStore::connect(url).await {
            Ok(store) => Arc::new(store),
            Err(err) => {
                tracing::error!(error = %err, "failed to connect to redis, falling back to in-memory sessions");
                Arc::new(InMemorySessionStore::new())
            }
        },
        None => {
            tracing::warn!("no redis url configured, using the in-memory session store (not durable across restarts)");
            Arc::new(InMemorySessionStore::new())
        }
    };

    let orchestrator = Arc::new(Orchestrator::new(nlu, execution, sessions));
    let state = AppState { orchestrator, metrics_handle };
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|err| panic!("failed to bind {}: {err}", config.bind_addr));

    tracing::info!(bind_addr = %config.bind_addr, "booking-server listening");
    axum::serve(listener, app).await.expect("axum server exited unexpectedly");
}
