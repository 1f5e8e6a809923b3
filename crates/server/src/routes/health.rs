//! `GET /healthz` liveness route. Always `200 OK` once the process is
//! up — readiness of the collaborators it talks to is their own concern.

use axum::http::StatusCode;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
