//! `POST /v1/turn`: the per-turn booking API. A `State<AppState>`
//! extractor and `Json<Req> -> Json<Resp>` handler returning the
//! `{success, outcome, error, message}` outcome shape. A body that
//! doesn't even parse as a `TurnRequest` never reaches the
//! `Orchestrator` at all — it's rejected here as `ServerError::BadRequest`.

use crate::error::ServerError;
use crate::state::AppState;
use crate::telemetry;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use booking_core::outcome::{TurnRequest, TurnResponse};
use std::time::Instant;

pub async fn handle_turn(
    State(state): State<AppState>,
    request: Result<Json<TurnRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(json) => json,
        Err(rejection) => return ServerError::BadRequest(rejection.body_text()).into_response(),
    };

    let started = Instant::now();
    let user_id = request.user_id.clone();
    let domain = request.domain;

    let span = tracing::info_span!("turn", user_id = %user_id, %domain);
    let _enter = span.enter();

    let response = state.orchestrator.handle_turn(request).await;

    let outcome_status = response
        .outcome
        .as_ref()
        .map(outcome_status_label)
        .unwrap_or_else(|| response.error.map(|_| "ERROR").unwrap_or("UNKNOWN").to_string());
    telemetry::record_turn(&outcome_status, started.elapsed());

    Json(response).into_response()
}

fn outcome_status_label(outcome: &booking_core::outcome::TurnOutcome) -> String {
    use booking_core::outcome::TurnOutcome;
    match outcome {
        TurnOutcome::Ready { .. } => "READY".to_string(),
        TurnOutcome::Executed { .. } => "EXECUTED".to_string(),
        TurnOutcome::AwaitingConfirmation { .. } => "AWAITING_CONFIRMATION".to_string(),
        TurnOutcome::NeedsClarification { .. } => "NEEDS_CLARIFICATION".to_string(),
    }
}
