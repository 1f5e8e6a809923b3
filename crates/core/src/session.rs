//! Persisted per-`(domain, user_id)` session state.

use crate::intent::{Intent, ModificationContext};
use crate::slots::{SlotKey, Slots};
use serde::{Deserialize, Serialize};

/// The three booking statuses a turn can resolve to. `Executed` is a
/// terminal variant of `Ready` reached only after a successful
/// `ExecutionBackend.dispatch` — it is never a `TurnFinalizer` output, only
/// an `Orchestrator` one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ready,
    Executed,
    NeedsClarification,
    AwaitingConfirmation,
}

impl Status {
    /// A session is persisted only while status is in
    /// {NEEDS_CLARIFICATION, AWAITING_CONFIRMATION}; READY and EXECUTED
    /// clear it.
    pub fn should_persist(self) -> bool {
        matches!(self, Status::NeedsClarification | Status::AwaitingConfirmation)
    }
}

/// Persisted session state, keyed externally by `(domain, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub intent: Intent,
    pub slots: Slots,
    pub missing_slots: Vec<SlotKey>,
    pub status: Status,
    pub awaiting_slot: Option<SlotKey>,
    #[serde(default)]
    pub modification_context: Option<ModificationContext>,
    /// Only populated for RESOLVED turns; any `clarification` field is
    /// force-cleared on every RESOLVED turn.
    #[serde(default)]
    pub resolved_booking_semantics: Option<serde_json::Value>,
    #[serde(default)]
    pub clarification: Option<serde_json::Value>,
}

impl SessionState {
    pub fn fresh(intent: Intent) -> Self {
        SessionState {
            intent,
            slots: Slots::new(),
            missing_slots: Vec::new(),
            status: Status::NeedsClarification,
            awaiting_slot: None,
            modification_context: None,
            resolved_booking_semantics: None,
            clarification: None,
        }
    }
}
