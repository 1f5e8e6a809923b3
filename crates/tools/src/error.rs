//! `booking-tools` internal errors, converted to `CoreError::ExecutionFailed`
//! at the `ExecutionBackend` boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolsError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
}
