//! `DomainFilter`: retains only slot keys valid for an intent's domain,
//! dropping cross-domain leakage (a `date` from a service turn must never
//! satisfy a reservation turn's `start_date`).

use booking_core::{Domain, Intent, SlotKey, Slots};

/// The domain-valid slot set. MODIFY_BOOKING in the service domain
/// additionally admits the delta slots `{start_date, end_date, duration}`
/// so a "move my haircut a week later" turn can carry them through to
/// the decision layer.
pub fn domain_slot_set(domain: Domain, intent: Intent) -> Vec<SlotKey> {
    match domain {
        Domain::Service => {
            let mut set = vec![
                SlotKey::ServiceId,
                SlotKey::Date,
                SlotKey::Time,
                SlotKey::HasDatetime,
                SlotKey::DateRange,
                SlotKey::BookingId,
            ];
            if intent == Intent::ModifyBooking {
                set.extend([SlotKey::StartDate, SlotKey::EndDate, SlotKey::Duration]);
            }
            set
        }
        Domain::Reservation => vec![
            SlotKey::ServiceId,
            SlotKey::StartDate,
            SlotKey::EndDate,
            SlotKey::DateRange,
            SlotKey::BookingId,
        ],
    }
}

/// `apply(rawMergedSlots, intent) -> filteredSlots`. The "never silently
/// discard every NLU slot" invariant is a test/debug-mode assertion, not
/// a hard runtime failure — in production we log at ERROR and return the
/// (correctly) empty result: pure functions return reasons, they never
/// throw for domain reasons, and invariant violations are logged at
/// ERROR with full context instead.
pub fn apply(slots: &Slots, intent: Intent, domain: Domain) -> Slots {
    let allowed = domain_slot_set(domain, intent);
    let (kept, dropped) = slots.retain_keys(&allowed);

    if !dropped.is_empty() {
        tracing::debug!(?dropped, intent = %intent, domain = %domain, "domain filter dropped slots");
    }

    if !slots.is_empty() && kept.is_empty() {
        tracing::error!(
            intent = %intent,
            domain = %domain,
            input_keys = ?slots.keys().collect::<Vec<_>>(),
            "domain filter emptied a non-empty slot set"
        );
        debug_assert!(false, "domain filter must never silently discard every NLU slot");
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::SlotValue;

    #[test]
    fn service_domain_drops_reservation_only_keys() {
        let mut slots = Slots::new();
        slots.set(SlotKey::StartDate, SlotValue::Text("2026-03-10".into()));
        slots.set(SlotKey::Date, SlotValue::Text("2026-03-10".into()));

        let filtered = apply(&slots, Intent::CreateAppointment, Domain::Service);
        assert!(filtered.contains(SlotKey::Date));
        assert!(!filtered.contains(SlotKey::StartDate));
    }

    #[test]
    fn modify_booking_service_domain_admits_delta_slots() {
        let mut slots = Slots::new();
        slots.set(SlotKey::StartDate, SlotValue::Text("2026-03-10".into()));

        let filtered = apply(&slots, Intent::ModifyBooking, Domain::Service);
        assert!(filtered.contains(SlotKey::StartDate));
    }

    #[test]
    fn reservation_domain_drops_time_and_has_datetime() {
        let mut slots = Slots::new();
        slots.set(SlotKey::Time, SlotValue::Text("11:00".into()));
        slots.set(SlotKey::HasDatetime, SlotValue::Bool(true));
        slots.set(SlotKey::ServiceId, SlotValue::Text("room".into()));

        let filtered = apply(&slots, Intent::CreateReservation, Domain::Reservation);
        assert!(filtered.contains(SlotKey::ServiceId));
        assert!(!filtered.contains(SlotKey::Time));
        assert!(!filtered.contains(SlotKey::HasDatetime));
    }
}
