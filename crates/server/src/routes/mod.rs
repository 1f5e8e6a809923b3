pub mod health;
pub mod metrics;
pub mod turn;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// The full route table: `POST /v1/turn` is the per-turn booking API;
/// `GET /healthz` and `GET /metrics` are ambient stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/turn", post(turn::handle_turn))
        .route("/healthz", get(health::healthz))
        .route("/metrics", get(metrics::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
