//! Orchestrator-internal error type: distinguishes the two top-level
//! failure modes the per-turn API surfaces without touching
//! session state — everything else (session store errors, dispatch
//! errors) degrades gracefully inside `run_turn` instead of propagating.

use booking_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("NLU provider failed: {0}")]
    Nlu(#[from] CoreError),

    #[error("resolved intent has no handling defined")]
    UnsupportedIntent,
}
