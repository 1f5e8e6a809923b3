//! The error taxonomy shared across crates.
//!
//! Pure dialogue functions never return `Result` for a domain reason — a
//! missing slot is a `ClarificationReason`, not an `Err`. `CoreError` exists
//! for genuine contract violations (a collaborator trait failing, a
//! poisoned lock) and for the handful of invariant checks that indicate a
//! bug rather than a recoverable outcome.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("NLU provider unavailable: {0}")]
    NluUnavailable(String),

    #[error("NLU provider timed out")]
    NluTimeout,

    #[error("session store unavailable: {0}")]
    SessionStoreUnavailable(String),

    #[error("execution backend failed: {0}")]
    ExecutionFailed(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
