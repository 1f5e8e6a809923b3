//! `TurnFinalizer`: from merged+promoted slots, intent and awaiting-slot
//! state, computes the single authoritative `TurnState` for this turn.
//! Nothing downstream recomputes `missing_slots`.

use crate::domain_filter;
use crate::slot_contract;
use booking_core::{Domain, Intent, ModificationContext, SlotKey, Slots, Status};

/// Logged as a single structured record per turn. Carries the full
/// lineage (raw → merged → promoted → effective) so a clarification can
/// be debugged without re-deriving intermediate state.
#[derive(Debug, Clone)]
pub struct TurnState {
    pub intent: Intent,
    pub raw_nlu_slots: Slots,
    pub merged_session_slots: Slots,
    pub promoted_slots: Slots,
    pub effective_slots: Slots,
    pub required_slots: Vec<SlotKey>,
    pub missing_slots: Vec<SlotKey>,
    pub awaiting_slot_before: Option<SlotKey>,
    pub awaiting_slot_after: Option<SlotKey>,
    pub status: Status,
    pub modification_context: Option<ModificationContext>,
}

/// `current_turn_slots` is the NLU extraction for *this* turn only (not
/// merged with session) — needed to tell "the user just mentioned a new
/// time" apart from "a time was already on the session" when deriving
/// MODIFY_BOOKING's `modification_context`.
#[allow(clippy::too_many_arguments)]
pub fn finalize(
    intent: Intent,
    domain: Domain,
    raw_nlu_slots: Slots,
    merged_session_slots: Slots,
    promoted_slots: Slots,
    current_turn_slots: &Slots,
    awaiting_slot_before: Option<SlotKey>,
) -> TurnState {
    let effective_slots = domain_filter::apply(&promoted_slots, intent, domain);

    let modification_context = derive_modification_context(intent, domain, current_turn_slots);

    let required_slots =
        slot_contract::required_planning_slots(intent, domain, &effective_slots, modification_context.as_ref());

    let mut missing_slots: Vec<SlotKey> = required_slots
        .iter()
        .copied()
        .filter(|k| !effective_slots.contains(*k))
        .collect();
    missing_slots.sort_by_key(|k| k.as_str());
    missing_slots.dedup();

    let awaiting_slot_after = resolve_awaiting_slot(awaiting_slot_before, &effective_slots, &missing_slots);

    let status = if missing_slots.is_empty() && awaiting_slot_after.is_none() {
        Status::Ready
    } else {
        Status::NeedsClarification
    };

    TurnState {
        intent,
        raw_nlu_slots,
        merged_session_slots,
        promoted_slots,
        effective_slots,
        required_slots,
        missing_slots,
        awaiting_slot_before,
        awaiting_slot_after,
        status,
        modification_context,
    }
}

fn derive_modification_context(
    intent: Intent,
    domain: Domain,
    current_turn_slots: &Slots,
) -> Option<ModificationContext> {
    if intent != Intent::ModifyBooking {
        return None;
    }
    Some(match domain {
        Domain::Service => ModificationContext {
            modifying_date: current_turn_slots.contains(SlotKey::Date),
            modifying_time: current_turn_slots.contains(SlotKey::Time),
            ..Default::default()
        },
        Domain::Reservation => ModificationContext {
            modifying_start_date: current_turn_slots.contains(SlotKey::StartDate),
            modifying_end_date: current_turn_slots.contains(SlotKey::EndDate),
            ..Default::default()
        },
    })
}

/// Rule set:
/// 1. satisfied this turn -> cleared.
/// 2. else exactly one still missing -> that one.
/// 3. else -> preserved (not cleared just because missing_slots is empty).
fn resolve_awaiting_slot(
    before: Option<SlotKey>,
    effective_slots: &Slots,
    missing_slots: &[SlotKey],
) -> Option<SlotKey> {
    if let Some(slot) = before {
        if effective_slots.contains(slot) {
            return None;
        }
    }
    if missing_slots.len() == 1 {
        return Some(missing_slots[0]);
    }
    before
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::SlotValue;

    fn slots_with(pairs: &[(SlotKey, SlotValue)]) -> Slots {
        let mut s = Slots::new();
        for (k, v) in pairs {
            s.set(*k, v.clone());
        }
        s
    }

    #[test]
    fn ready_requires_empty_missing_and_no_awaiting_slot() {
        let slots = slots_with(&[
            (SlotKey::ServiceId, SlotValue::Text("haircut".into())),
            (SlotKey::Date, SlotValue::Text("2026-03-11".into())),
            (SlotKey::Time, SlotValue::Text("11:00".into())),
        ]);
        let ts = finalize(
            Intent::CreateAppointment,
            Domain::Service,
            Slots::new(),
            Slots::new(),
            slots.clone(),
            &slots,
            None,
        );
        assert_eq!(ts.status, Status::Ready);
        assert!(ts.missing_slots.is_empty());
        assert!(ts.awaiting_slot_after.is_none());
    }

    #[test]
    fn single_missing_slot_becomes_awaiting() {
        let slots = slots_with(&[
            (SlotKey::ServiceId, SlotValue::Text("haircut".into())),
            (SlotKey::Date, SlotValue::Text("2026-03-11".into())),
        ]);
        let ts = finalize(
            Intent::CreateAppointment,
            Domain::Service,
            Slots::new(),
            Slots::new(),
            slots.clone(),
            &slots,
            None,
        );
        assert_eq!(ts.missing_slots, vec![SlotKey::Time]);
        assert_eq!(ts.awaiting_slot_after, Some(SlotKey::Time));
        assert_eq!(ts.status, Status::NeedsClarification);
    }

    #[test]
    fn awaiting_slot_not_satisfied_by_wrong_type_stays_pending() {
        // S4: awaiting_slot="time", user supplies only a date next turn.
        let current_turn = slots_with(&[(SlotKey::Date, SlotValue::Text("2026-03-18".into()))]);
        let effective = slots_with(&[
            (SlotKey::ServiceId, SlotValue::Text("haircut".into())),
            (SlotKey::Date, SlotValue::Text("2026-03-18".into())),
        ]);
        let ts = finalize(
            Intent::CreateAppointment,
            Domain::Service,
            Slots::new(),
            Slots::new(),
            effective,
            &current_turn,
            Some(SlotKey::Time),
        );
        assert_eq!(ts.status, Status::NeedsClarification);
        assert_eq!(ts.missing_slots, vec![SlotKey::Time]);
        assert_eq!(ts.awaiting_slot_after, Some(SlotKey::Time));
    }

    #[test]
    fn awaiting_slot_preserved_when_missing_becomes_empty_but_slot_unsatisfied() {
        // Contrived: awaiting_slot points at a slot outside required_slots
        // so missing_slots is empty yet the awaited slot was never filled.
        let effective = slots_with(&[
            (SlotKey::ServiceId, SlotValue::Text("haircut".into())),
            (SlotKey::Date, SlotValue::Text("2026-03-18".into())),
            (SlotKey::Time, SlotValue::Text("11:00".into())),
        ]);
        let ts = finalize(
            Intent::CreateAppointment,
            Domain::Service,
            Slots::new(),
            Slots::new(),
            effective,
            &Slots::new(),
            Some(SlotKey::BookingId),
        );
        assert!(ts.missing_slots.is_empty());
        assert_eq!(ts.awaiting_slot_after, Some(SlotKey::BookingId));
        assert_eq!(ts.status, Status::NeedsClarification);
    }
}
