//! `PlanBuilder`: combines the decision with the YAML intent config
//! (commit + fallbacks) into the action plan for this turn. Never
//! recomputes `missing_slots` — that's `TurnFinalizer`'s job.

use booking_config::IntentConfigView;
use booking_core::nlu::ConfirmationState;
use booking_core::{Intent, SlotKey, Slots};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Ready,
    NeedsClarification,
    AwaitingConfirmation,
}

#[derive(Debug, Clone)]
pub struct PlanResult {
    pub status: PlanStatus,
    pub allowed_actions: Vec<String>,
    pub blocked_actions: Vec<String>,
    pub awaiting: Option<String>,
    pub awaiting_slot: Option<SlotKey>,
}

#[allow(clippy::too_many_arguments)]
pub fn plan(
    intent: Intent,
    missing_slots: &[SlotKey],
    needs_clarification: bool,
    confirmation_state: Option<ConfirmationState>,
    awaiting_slot_in: Option<SlotKey>,
    effective_slots: &Slots,
) -> PlanResult {
    let view = IntentConfigView::load();
    let commit_action = view.commit_action(intent).unwrap_or("").to_string();
    let awaiting_slot = resolve_awaiting_slot(awaiting_slot_in, effective_slots);

    if !missing_slots.is_empty() || needs_clarification {
        return PlanResult {
            status: PlanStatus::NeedsClarification,
            allowed_actions: Vec::new(),
            blocked_actions: vec![commit_action],
            awaiting: None,
            awaiting_slot,
        };
    }

    if confirmation_state == Some(ConfirmationState::Pending) {
        return PlanResult {
            status: PlanStatus::AwaitingConfirmation,
            allowed_actions: Vec::new(),
            blocked_actions: vec![commit_action],
            awaiting: Some("USER_CONFIRMATION".to_string()),
            awaiting_slot,
        };
    }

    // The awaited slot can outlive an empty `missing_slots`; a PlanBuilder
    // that would otherwise say READY must still clarify.
    if awaiting_slot.is_some() {
        return PlanResult {
            status: PlanStatus::NeedsClarification,
            allowed_actions: Vec::new(),
            blocked_actions: vec![commit_action],
            awaiting: None,
            awaiting_slot,
        };
    }

    let mut allowed_actions = vec![commit_action];
    for fallback in view.fallbacks(intent) {
        let matches = fallback
            .when_missing_any_of
            .iter()
            .any(|slot_name| missing_slots.iter().any(|k| k.as_str() == slot_name));
        if matches && !allowed_actions.contains(&fallback.action) {
            allowed_actions.push(fallback.action.clone());
        }
    }

    PlanResult {
        status: PlanStatus::Ready,
        allowed_actions,
        blocked_actions: Vec::new(),
        awaiting: None,
        awaiting_slot: None,
    }
}

/// Re-applies the "clear iff satisfied, else preserve" rule independently
/// of `TurnFinalizer`'s own awaiting-slot tracking — the PlanBuilder only
/// ever sees what `effective_slots` currently holds.
fn resolve_awaiting_slot(awaiting_slot_in: Option<SlotKey>, effective_slots: &Slots) -> Option<SlotKey> {
    match awaiting_slot_in {
        Some(slot) if effective_slots.contains(slot) => None,
        other => other,
    }
}
