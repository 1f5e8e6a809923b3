//! `GET /metrics` Prometheus scrape route: ambient observability
//! alongside the per-turn API.

use crate::state::AppState;
use axum::extract::State;

pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}
