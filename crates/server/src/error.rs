//! Top-level server error type. Everything that can fail before a
//! `TurnRequest` even reaches the `Orchestrator` (bad JSON, a missing
//! route) is reported here as an HTTP status; once a turn is running,
//! failures are absorbed by `Orchestrator::handle_turn` and never reach
//! this layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid request body: {0}")]
    BadRequest(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };
        (status, Json(json!({ "success": false, "error": "BAD_REQUEST", "message": message }))).into_response()
    }
}
