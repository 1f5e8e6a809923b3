//! `Promoter`: pure, idempotent, additive derivation of slots from slots
//! already present. Never removes a key, never overwrites one — every
//! rule below goes through `Slots::insert_if_absent`.

use booking_core::nlu::DateRole;
use booking_core::{Intent, SlotKey, SlotValue, Slots};

/// The slice of this turn's semantic evidence the Promoter needs beyond
/// the slots themselves: which date refs carry an explicit role. Without
/// this, a bare `date` could be promoted into `start_date`/`end_date`
/// with no basis for which end it belongs to.
#[derive(Debug, Clone, Default)]
pub struct PromotionContext {
    pub date_roles: Vec<DateRole>,
}

impl PromotionContext {
    pub fn has_role(&self, role: DateRole) -> bool {
        self.date_roles.contains(&role)
    }
}

/// `promote(slots, intent, context) -> slots'` with `slots ⊆ slots'`.
pub fn promote(slots: &Slots, intent: Intent, context: &PromotionContext) -> Slots {
    let mut promoted = slots.clone();

    match intent {
        Intent::CreateReservation => promote_reservation(&mut promoted, context),
        Intent::CreateAppointment => promote_appointment(&mut promoted),
        _ => {}
    }

    restore_dropped_inputs(slots, &mut promoted);
    promoted
}

fn promote_reservation(slots: &mut Slots, context: &PromotionContext) {
    if let Some(range) = slots.get(SlotKey::DateRange).and_then(|v| v.as_range()).cloned() {
        slots.insert_if_absent(SlotKey::StartDate, SlotValue::Date(range.start));
        slots.insert_if_absent(SlotKey::EndDate, SlotValue::Date(range.end));
    }

    if let Some(date) = slots.get(SlotKey::Date).and_then(|v| v.as_date()) {
        if context.has_role(DateRole::StartDate) {
            slots.insert_if_absent(SlotKey::StartDate, SlotValue::Date(date));
        }
        if context.has_role(DateRole::EndDate) {
            slots.insert_if_absent(SlotKey::EndDate, SlotValue::Date(date));
        }
    }
}

fn promote_appointment(slots: &mut Slots) {
    if !slots.contains(SlotKey::Date) {
        if let Some(range) = slots.get(SlotKey::DateRange).and_then(|v| v.as_range()).cloned() {
            slots.insert_if_absent(SlotKey::Date, SlotValue::Date(range.start));
        }
    }

    if slots.contains(SlotKey::Date) && slots.contains(SlotKey::Time) {
        slots.insert_if_absent(SlotKey::HasDatetime, SlotValue::Bool(true));
    }
}

/// Defensive repair: re-insert any input key that disappeared during
/// promotion. This should never fire given the implementation above
/// only adds, but it's a bug to repair rather than crash on if it does.
fn restore_dropped_inputs(original: &Slots, promoted: &mut Slots) {
    for (key, value) in original.iter() {
        if !promoted.contains(key) {
            tracing::error!(slot = %key, "promoter dropped an input key, restoring defensively");
            promoted.set(key, value.clone());
        }
    }
}
