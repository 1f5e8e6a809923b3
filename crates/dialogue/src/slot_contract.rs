//! `SlotContract`: for each intent, the required planning slots —
//! deterministically narrowed for MODIFY_BOOKING by domain and
//! `modification_context`.

use booking_config::IntentConfigView;
use booking_core::{Domain, Intent, ModificationContext, SlotKey, Slots};

/// `requiredPlanningSlots(intent, collectedSlots?, modificationContext?)`.
/// `domain` disambiguates MODIFY_BOOKING (service) from MODIFY_RESERVATION
/// (reservation) — both parse to `Intent::ModifyBooking` (see
/// `Intent::parse`), so the domain the live session belongs to is what
/// selects which table row applies.
pub fn required_planning_slots(
    intent: Intent,
    domain: Domain,
    collected: &Slots,
    modification_context: Option<&ModificationContext>,
) -> Vec<SlotKey> {
    match intent {
        Intent::CreateAppointment => vec![SlotKey::ServiceId, SlotKey::Date, SlotKey::Time],
        Intent::CreateReservation => vec![SlotKey::ServiceId, SlotKey::StartDate, SlotKey::EndDate],
        Intent::CancelBooking => vec![SlotKey::BookingId],
        Intent::ModifyBooking => match domain {
            Domain::Service => modify_service_required(collected, modification_context),
            Domain::Reservation => modify_reservation_required(collected, modification_context),
        },
        _ => other_intent_required(intent),
    }
}

fn modify_service_required(
    collected: &Slots,
    modification_context: Option<&ModificationContext>,
) -> Vec<SlotKey> {
    let ctx = modification_context.copied().unwrap_or_default();
    if !ctx.is_empty() {
        return match (ctx.modifying_time, ctx.modifying_date) {
            (true, false) => vec![SlotKey::BookingId, SlotKey::Time],
            (false, true) => vec![SlotKey::BookingId, SlotKey::Date],
            (true, true) => vec![SlotKey::BookingId, SlotKey::Date, SlotKey::Time],
            (false, false) => vec![SlotKey::BookingId, SlotKey::Date, SlotKey::Time],
        };
    }
    let has_time = collected.contains(SlotKey::Time);
    let has_date = collected.contains(SlotKey::Date);
    match (has_time, has_date) {
        (true, false) => vec![SlotKey::BookingId, SlotKey::Time],
        (false, true) => vec![SlotKey::BookingId, SlotKey::Date],
        (true, true) => vec![SlotKey::BookingId, SlotKey::Date, SlotKey::Time],
        (false, false) => vec![SlotKey::BookingId, SlotKey::Date, SlotKey::Time],
    }
}

fn modify_reservation_required(
    collected: &Slots,
    modification_context: Option<&ModificationContext>,
) -> Vec<SlotKey> {
    let ctx = modification_context.copied().unwrap_or_default();
    if ctx.modifying_start_date && !ctx.modifying_end_date && !ctx.modifying_date {
        return vec![SlotKey::BookingId, SlotKey::StartDate];
    }
    if ctx.modifying_end_date && !ctx.modifying_start_date && !ctx.modifying_date {
        return vec![SlotKey::BookingId, SlotKey::EndDate];
    }
    if ctx.modifying_start_date && ctx.modifying_end_date {
        return vec![SlotKey::BookingId, SlotKey::StartDate, SlotKey::EndDate];
    }
    if ctx.modifying_date && !ctx.modifying_start_date && !ctx.modifying_end_date {
        // A generic "I want to change the date" without a specific
        // dimension is ambiguous between start/end; require both, same as
        // the absent/ambiguous row.
        return vec![SlotKey::BookingId, SlotKey::StartDate, SlotKey::EndDate];
    }

    let has_start = collected.contains(SlotKey::StartDate);
    let has_end = collected.contains(SlotKey::EndDate);
    match (has_start, has_end) {
        (true, false) => vec![SlotKey::BookingId, SlotKey::EndDate],
        (false, true) => vec![SlotKey::BookingId, SlotKey::StartDate],
        _ => vec![SlotKey::BookingId, SlotKey::StartDate, SlotKey::EndDate],
    }
}

/// For intents outside the booking/cancel table, fall back to the
/// `required_slots` declared in `intent_signals.yaml` (informational,
/// but still the contract `TurnFinalizer` needs for e.g.
/// BOOKING_INQUIRY's `booking_id`).
fn other_intent_required(intent: Intent) -> Vec<SlotKey> {
    let view = IntentConfigView::load();
    view.signals(intent)
        .map(|signals| {
            signals
                .required_slots
                .iter()
                .filter_map(|s| SlotKey::parse(s))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_service_context_narrows_to_time_only() {
        let ctx = ModificationContext {
            modifying_time: true,
            ..Default::default()
        };
        let required =
            required_planning_slots(Intent::ModifyBooking, Domain::Service, &Slots::new(), Some(&ctx));
        assert_eq!(required, vec![SlotKey::BookingId, SlotKey::Time]);
    }

    #[test]
    fn modify_service_absent_context_falls_back_to_collected_presence() {
        let mut collected = Slots::new();
        collected.set(SlotKey::Time, booking_core::SlotValue::Text("11:00".into()));
        let required = required_planning_slots(Intent::ModifyBooking, Domain::Service, &collected, None);
        assert_eq!(required, vec![SlotKey::BookingId, SlotKey::Time]);
    }

    #[test]
    fn modify_service_ambiguous_context_requires_both() {
        let required =
            required_planning_slots(Intent::ModifyBooking, Domain::Service, &Slots::new(), None);
        assert_eq!(required, vec![SlotKey::BookingId, SlotKey::Date, SlotKey::Time]);
    }

    #[test]
    fn modify_reservation_generic_date_flag_requires_both_anchors() {
        let ctx = ModificationContext {
            modifying_date: true,
            ..Default::default()
        };
        let required = required_planning_slots(
            Intent::ModifyBooking,
            Domain::Reservation,
            &Slots::new(),
            Some(&ctx),
        );
        assert_eq!(required, vec![SlotKey::BookingId, SlotKey::StartDate, SlotKey::EndDate]);
    }

    #[test]
    fn cancel_booking_requires_only_booking_id() {
        assert_eq!(
            required_planning_slots(Intent::CancelBooking, Domain::Service, &Slots::new(), None),
            vec![SlotKey::BookingId]
        );
    }
}
