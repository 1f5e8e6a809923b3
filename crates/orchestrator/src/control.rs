//! The `CONTEXTUAL_UPDATE` pseudo-intent: never a persisted `Intent`
//! variant, never serialized in any outcome —
//! just a signal the per-turn algorithm consults before deciding whether a
//! differing `nlu.intent` is a genuine intent change or a continuation.

use booking_core::{Intent, SessionState, SlotKey, Slots, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlag {
    ContextualUpdate,
    IntentChange,
    Continuation,
}

const MUTABLE_SLOTS: &[SlotKey] = &[SlotKey::Date, SlotKey::Time, SlotKey::Duration, SlotKey::StartDate, SlotKey::EndDate];

/// A turn is a contextual update when the live session already holds a
/// booking-creation intent, the fresh NLU intent differs, the fresh intent
/// is itself a booking-creation intent (i.e. the resolver fell through to
/// its `booking_mode`-authoritative rule rather than matching a real
/// non-booking signal), and this turn's own extraction touches only
/// mutable temporal slots — no new service mention.
pub fn classify(session: Option<&SessionState>, nlu_intent: Intent, this_turn_slots: &Slots) -> ControlFlag {
    let Some(session) = session else {
        return ControlFlag::Continuation;
    };
    if session.status == Status::Ready {
        return ControlFlag::Continuation;
    }
    if nlu_intent == session.intent || nlu_intent == Intent::Unknown {
        return ControlFlag::Continuation;
    }

    let both_booking_creation = matches!(session.intent, Intent::CreateAppointment | Intent::CreateReservation)
        && matches!(nlu_intent, Intent::CreateAppointment | Intent::CreateReservation);

    if both_booking_creation
        && !this_turn_slots.contains(SlotKey::ServiceId)
        && MUTABLE_SLOTS.iter().any(|slot| this_turn_slots.contains(*slot))
    {
        return ControlFlag::ContextualUpdate;
    }

    ControlFlag::IntentChange
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::SlotValue;

    #[test]
    fn no_session_is_a_plain_continuation() {
        assert_eq!(classify(None, Intent::CreateAppointment, &Slots::new()), ControlFlag::Continuation);
    }

    #[test]
    fn same_intent_is_a_continuation() {
        let session = SessionState::fresh(Intent::CreateAppointment);
        assert_eq!(classify(Some(&session), Intent::CreateAppointment, &Slots::new()), ControlFlag::Continuation);
    }

    #[test]
    fn mismatched_booking_mode_with_only_a_time_update_is_contextual() {
        let session = SessionState::fresh(Intent::CreateReservation);
        let mut turn_slots = Slots::new();
        turn_slots.set(SlotKey::Time, SlotValue::Text("15:00".into()));
        assert_eq!(
            classify(Some(&session), Intent::CreateAppointment, &turn_slots),
            ControlFlag::ContextualUpdate
        );
    }

    #[test]
    fn a_fresh_service_mention_is_a_genuine_intent_change() {
        let session = SessionState::fresh(Intent::CreateAppointment);
        let mut turn_slots = Slots::new();
        turn_slots.set(SlotKey::ServiceId, SlotValue::Text("haircut".into()));
        assert_eq!(
            classify(Some(&session), Intent::CreateReservation, &turn_slots),
            ControlFlag::IntentChange
        );
    }

    #[test]
    fn switching_to_a_non_booking_intent_is_an_intent_change() {
        let session = SessionState::fresh(Intent::CreateAppointment);
        assert_eq!(
            classify(Some(&session), Intent::CancelBooking, &Slots::new()),
            ControlFlag::IntentChange
        );
    }
}
