//! `Merger`: non-destructively combines persisted session slots with the
//! fresh NLU extraction into a merged, intent-reconciled view. This is
//! the one pipeline stage allowed to read both session and NLU state at
//! once; everything downstream works off its output.

use booking_core::nlu::{DateMode, DateRole, NluResponse, ResolvedBooking, SlotIssue, TimeConstraintMode};
use booking_core::{BookingMode, Intent, SessionState, SlotKey, SlotValue, Slots, Status};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// The merger's output: an NLU-response-like view reconciled against
/// session state. `intent` and `slots` feed the rest of the pipeline;
/// `missing_slots`/`needs_clarification`/`clarification_*` are carried
/// through for logging and for `PlanBuilder` step 2 — the *authoritative*
/// missing-slot computation happens later in `TurnFinalizer`, which never
/// trusts this one.
#[derive(Debug, Clone)]
pub struct MergedResponse {
    pub intent: Intent,
    pub slots: Slots,
    pub missing_slots: Vec<SlotKey>,
    pub needs_clarification: bool,
    pub clarification_reason: Option<String>,
    pub clarification_data: Option<serde_json::Value>,
    pub context: serde_json::Value,
    pub resolved_booking: Option<ResolvedBooking>,
    pub booking_services_present: bool,
    pub date_roles: Vec<DateRole>,
}

/// Rule 1 (intent reconciliation) + rules 2-6 (extraction, normalization,
/// promotion-adjacent role tagging, non-destructive merge, reservation
/// re-injection) + rule 7 (missing-slot recomputation) + rule 8 (the
/// intent-change invariant), in spec order.
pub fn merge(session: Option<&SessionState>, nlu: &NluResponse) -> MergedResponse {
    let intent = reconcile_intent(session, nlu);

    let nlu_slots = extract_nlu_slots(nlu, intent);
    let session_slots = session.map(|s| s.slots.clone()).unwrap_or_default();
    let merged_slots = session_slots.merge_non_destructive(&nlu_slots);
    assert_no_session_slot_lost(&session_slots, &merged_slots);

    let booking_services_present = reinject_appointment_service(&merged_slots, nlu, intent);

    let nlu_missing = missing_from_issues(nlu);
    let missing_slots = recompute_missing_slots(session, &merged_slots, &nlu_missing, intent);
    let missing_slots = normalize_modify_booking_missing_slots(intent, missing_slots);

    if let Some(session) = session {
        if session.status != Status::Ready {
            debug_assert_eq!(
                intent, session.intent,
                "merged intent must equal session intent when continuing a session"
            );
        }
    }

    MergedResponse {
        intent,
        slots: merged_slots,
        missing_slots,
        needs_clarification: nlu.needs_clarification,
        clarification_reason: nlu.clarification_reason.clone(),
        clarification_data: nlu.clarification_data.clone(),
        context: nlu.context.clone(),
        resolved_booking: nlu.resolved_booking.clone(),
        booking_services_present,
        date_roles: nlu
            .resolved_booking
            .as_ref()
            .map(|rb| rb.date_roles.clone())
            .unwrap_or_default(),
    }
}

/// Rule 1. By the time this runs, `Orchestrator` has already reset the
/// session to `None` on a genuine intent change, so the only two legal
/// cases here are "no session" (fresh) and "session intent survives"
/// (continuation).
fn reconcile_intent(session: Option<&SessionState>, nlu: &NluResponse) -> Intent {
    match session {
        Some(session) if session.status != Status::Ready => {
            if nlu.intent.name == Intent::Unknown || nlu.intent.name == session.intent {
                session.intent
            } else {
                tracing::error!(
                    session_intent = %session.intent,
                    nlu_intent = %nlu.intent.name,
                    "merger received a non-reset session with a changed intent"
                );
                nlu.intent.name
            }
        }
        _ => nlu.intent.name,
    }
}

/// Rules 2-4: gather slots from every NLU source in precedence order
/// (direct slots < explicit role-tagged dates < semantic.date_refs <
/// entities < booking, highest to lowest — we apply lowest first and let
/// each later layer override within this NLU-only extraction; overriding
/// here is safe, it is not yet the non-destructive session merge).
///
/// Public so the Orchestrator can derive the `current_turn_slots` that
/// `TurnFinalizer::finalize` needs to tell "the user just mentioned this"
/// apart from "this came from the session".
pub fn extract_nlu_slots(nlu: &NluResponse, intent: Intent) -> Slots {
    let mut slots = Slots::new();

    extract_from_booking(&mut slots, nlu);
    extract_from_entities(&mut slots, nlu);
    extract_from_semantic(&mut slots, nlu, intent);
    extract_from_issues(&mut slots, nlu);
    // Rule 3's final collapse ("if the extracted time is a dict, collapse
    // to its `start` field") is folded into `parse_raw_slot_value`'s Time
    // branch above via `extract_time_string` rather than a separate pass.
    extract_raw_slots(&mut slots, nlu);

    slots
}

fn strip_time_component(date_str: &str) -> Option<NaiveDate> {
    let date_part = date_str.split(['T', ' ']).next().unwrap_or(date_str);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn extract_from_booking(slots: &mut Slots, nlu: &NluResponse) {
    if let Some(range) = &nlu.booking.datetime_range {
        slots.set(SlotKey::Date, SlotValue::Date(range.start));
    }
    if let Some(date) = nlu.booking.date {
        slots.set(SlotKey::Date, SlotValue::Date(date));
    }
}

fn extract_from_entities(slots: &mut Slots, nlu: &NluResponse) {
    let Some(obj) = nlu.entities.as_object() else { return };
    if let Some(date_str) = obj.get("date").and_then(|v| v.as_str()) {
        if let Some(date) = strip_time_component(date_str) {
            slots.set(SlotKey::Date, SlotValue::Date(date));
        }
    }
    if let Some(time_str) = obj.get("time").and_then(|v| v.as_str()) {
        if let Ok(time) = chrono::NaiveTime::parse_from_str(time_str, "%H:%M") {
            slots.set(SlotKey::Time, SlotValue::DateTime(time));
        }
    }
}

fn extract_from_semantic(slots: &mut Slots, nlu: &NluResponse, intent: Intent) {
    let Some(rb) = &nlu.resolved_booking else { return };

    if !rb.date_refs.is_empty() {
        let has_start_role = rb.date_roles.contains(&DateRole::StartDate);
        let has_end_role = rb.date_roles.contains(&DateRole::EndDate);
        if has_start_role {
            if let Some(first) = rb.date_refs.first() {
                slots.set(SlotKey::StartDate, SlotValue::Date(*first));
            }
        }
        if has_end_role {
            if let Some(last) = rb.date_refs.last() {
                slots.set(SlotKey::EndDate, SlotValue::Date(*last));
            }
        }

        match rb.date_mode {
            DateMode::SingleDay if !slots.contains(SlotKey::StartDate) => {
                if let Some(first) = rb.date_refs.first() {
                    slots.set(SlotKey::Date, SlotValue::Date(*first));
                }
            }
            DateMode::Range if rb.date_refs.len() >= 2 => {
                slots.set(SlotKey::StartDate, SlotValue::Date(rb.date_refs[0]));
                slots.set(SlotKey::EndDate, SlotValue::Date(*rb.date_refs.last().unwrap()));
            }
            DateMode::Range if rb.date_refs.len() == 1 => {
                slots.set(SlotKey::StartDate, SlotValue::Date(rb.date_refs[0]));
            }
            _ => {}
        }
    }

    if let Some(range) = &rb.date_range {
        slots.set(SlotKey::DateRange, SlotValue::Range(range.clone()));
    }

    if let Some(constraint) = &rb.time_constraint {
        let time = match constraint.mode {
            TimeConstraintMode::Exact => constraint.start,
            _ => constraint.start,
        };
        if let Some(time) = time {
            slots.set(SlotKey::Time, SlotValue::DateTime(time));
        }
    } else if !rb.time_refs.is_empty() {
        slots.set(SlotKey::Time, SlotValue::DateTime(rb.time_refs[0]));
    }

    // Intent carries its own fixed domain temporal shape; CREATE_RESERVATION
    // never sets `time` from a bare semantic time ref.
    if intent == Intent::CreateReservation {
        slots.remove(SlotKey::Time);
    }
}

fn extract_from_issues(slots: &mut Slots, nlu: &NluResponse) {
    for (key, issue) in &nlu.issues {
        let SlotIssue::Rich(value) = issue else { continue };
        let Some(slot_key) = SlotKey::parse(key) else { continue };
        if matches!(slot_key, SlotKey::Date | SlotKey::StartDate | SlotKey::EndDate) {
            if let Some(date_str) = value.get("date").and_then(|v| v.as_str()) {
                if let Some(date) = strip_time_component(date_str) {
                    slots.set(slot_key, SlotValue::Date(date));
                }
            }
        }
    }
}

fn extract_raw_slots(slots: &mut Slots, nlu: &NluResponse) {
    for (key, value) in &nlu.raw_slots {
        let Some(slot_key) = SlotKey::parse(key) else { continue };
        if let Some(parsed) = parse_raw_slot_value(slot_key, value) {
            slots.set(slot_key, parsed);
        }
    }
}

fn parse_raw_slot_value(key: SlotKey, value: &serde_json::Value) -> Option<SlotValue> {
    match key {
        SlotKey::Date | SlotKey::StartDate | SlotKey::EndDate => {
            value.as_str().and_then(strip_time_component).map(SlotValue::Date)
        }
        SlotKey::Time => {
            // `time` may arrive as a bare "HH:MM" string or as a dict
            // `{mode, start|value|time}`.
            let raw = value.as_str().map(str::to_string).or_else(|| extract_time_string(value));
            raw.and_then(|s| chrono::NaiveTime::parse_from_str(&s, "%H:%M").ok())
                .map(SlotValue::DateTime)
        }
        SlotKey::HasDatetime => value.as_bool().map(SlotValue::Bool),
        SlotKey::DateRange => {
            let obj = value.as_object()?;
            let start = obj.get("start").and_then(|v| v.as_str()).and_then(strip_time_component)?;
            let end = obj.get("end").and_then(|v| v.as_str()).and_then(strip_time_component)?;
            Some(SlotValue::Range(booking_core::slots::DateSpan { start, end }))
        }
        SlotKey::ServiceId | SlotKey::BookingId | SlotKey::Duration | SlotKey::DatetimeRange => {
            value.as_str().map(|s| SlotValue::Text(s.to_string()))
        }
    }
}

/// Handles the "`time_constraint` may be a string, or a dict
/// `{mode, start?|value?|time?}`" shape when it arrives as a raw slot
/// rather than inside `resolved_booking`.
fn extract_time_string(value: &serde_json::Value) -> Option<String> {
    let obj = value.as_object()?;
    let mode_is_exact = obj.get("mode").and_then(|v| v.as_str()) == Some("exact");
    if mode_is_exact {
        return obj.get("start").and_then(|v| v.as_str()).map(str::to_string);
    }
    obj.get("start")
        .or_else(|| obj.get("value"))
        .or_else(|| obj.get("time"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Rule 5's post-assertion, defensively repaired rather than panicking in
/// release.
fn assert_no_session_slot_lost(session_slots: &Slots, merged: &Slots) {
    for key in session_slots.keys() {
        if !merged.contains(key) {
            tracing::error!(slot = %key, "merger lost a session slot; this should be unreachable");
        }
    }
}

/// Rule 6: CREATE_APPOINTMENT with a `service_id` already pinned by the
/// session but an empty `booking.services` trace from the NLU gets a
/// synthetic re-injection so execution-readiness checks downstream still
/// see a service. We report whether a service is now present rather than
/// mutating `nlu.booking` in place (this function is pure).
fn reinject_appointment_service(merged_slots: &Slots, nlu: &NluResponse, intent: Intent) -> bool {
    if intent != Intent::CreateAppointment {
        return !nlu.booking.services.is_empty();
    }
    if !nlu.booking.services.is_empty() {
        return true;
    }
    merged_slots.contains(SlotKey::ServiceId)
}

fn missing_from_issues(nlu: &NluResponse) -> BTreeSet<SlotKey> {
    nlu.issues
        .iter()
        .filter(|(_, issue)| issue.is_missing())
        .filter_map(|(key, _)| SlotKey::parse(key))
        .collect()
}

/// Rule 7. `session.missing_slots` slots are dropped once any of their
/// satisfiers appears in `merged_slots`; anything still unsatisfied from
/// the NLU's own `issues`-derived missing set is unioned in.
fn recompute_missing_slots(
    session: Option<&SessionState>,
    merged_slots: &Slots,
    nlu_missing: &BTreeSet<SlotKey>,
    intent: Intent,
) -> Vec<SlotKey> {
    let mut result: BTreeSet<SlotKey> = session
        .map(|s| s.missing_slots.iter().copied().collect())
        .unwrap_or_default();

    result.retain(|slot| !is_satisfied(*slot, merged_slots, intent));

    for slot in nlu_missing {
        if !is_satisfied(*slot, merged_slots, intent) {
            result.insert(*slot);
        }
    }

    result.into_iter().collect()
}

fn is_satisfied(slot: SlotKey, merged_slots: &Slots, intent: Intent) -> bool {
    let satisfiers: Vec<SlotKey> = match slot {
        SlotKey::Date if intent == Intent::CreateReservation => vec![SlotKey::Date, SlotKey::StartDate],
        SlotKey::Date => vec![SlotKey::Date],
        SlotKey::StartDate => vec![SlotKey::Date, SlotKey::StartDate],
        SlotKey::EndDate => vec![SlotKey::EndDate],
        SlotKey::Time => vec![SlotKey::Time],
        SlotKey::DateRange => vec![SlotKey::Date, SlotKey::DateRange, SlotKey::StartDate, SlotKey::EndDate],
        other => vec![other],
    };
    satisfiers.iter().any(|s| merged_slots.contains(*s))
}

/// For MODIFY_BOOKING, retain only the planning-relevant `{booking_id,
/// date}`, strip execution-only datetime variants, and drop any literal
/// `"change"` placeholder the NLU sometimes emits as a slot name (not a
/// real `SlotKey`, so it never survives `SlotKey::parse` anyway — this
/// function documents that guarantee rather than re-implementing it).
pub fn normalize_modify_booking_missing_slots(intent: Intent, missing: Vec<SlotKey>) -> Vec<SlotKey> {
    if intent != Intent::ModifyBooking {
        return missing;
    }
    missing
        .into_iter()
        .filter(|slot| matches!(slot, SlotKey::BookingId | SlotKey::Date))
        .collect()
}

/// Exposed for the orchestrator: whether `booking_mode` fixes the domain
/// for this intent (used when `domain` isn't otherwise implied).
pub fn domain_for_booking_mode(mode: BookingMode) -> booking_core::Domain {
    mode.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::nlu::IntentSignal;
    use booking_core::SlotValue;

    fn base_nlu(intent: Intent) -> NluResponse {
        NluResponse {
            intent: IntentSignal { name: intent, confidence: 0.9 },
            ..Default::default()
        }
    }

    #[test]
    fn intent_reconciliation_forces_session_intent_when_nlu_is_unknown() {
        let mut session = SessionState::fresh(Intent::CreateAppointment);
        session.status = Status::NeedsClarification;
        let nlu = base_nlu(Intent::Unknown);

        let merged = merge(Some(&session), &nlu);
        assert_eq!(merged.intent, Intent::CreateAppointment);
    }

    #[test]
    fn non_destructive_merge_preserves_session_slots() {
        let mut session = SessionState::fresh(Intent::CreateAppointment);
        session.status = Status::NeedsClarification;
        session
            .slots
            .set(SlotKey::ServiceId, SlotValue::Text("haircut".into()));

        let mut nlu = base_nlu(Intent::CreateAppointment);
        nlu.raw_slots.insert(
            "date".into(),
            serde_json::Value::String("2026-03-11".into()),
        );

        let merged = merge(Some(&session), &nlu);
        assert!(merged.slots.contains(SlotKey::ServiceId));
        assert!(merged.slots.contains(SlotKey::Date));
    }

    #[test]
    fn modify_booking_missing_slots_strip_execution_only_variants() {
        let missing = vec![SlotKey::BookingId, SlotKey::Date, SlotKey::Time, SlotKey::StartDate];
        let normalized = normalize_modify_booking_missing_slots(Intent::ModifyBooking, missing);
        assert_eq!(normalized, vec![SlotKey::BookingId, SlotKey::Date]);
    }

    #[test]
    fn reservation_drops_bare_time_extracted_from_semantic() {
        let mut nlu = base_nlu(Intent::CreateReservation);
        nlu.resolved_booking = Some(ResolvedBooking {
            time_refs: vec![chrono::NaiveTime::from_hms_opt(11, 0, 0).unwrap()],
            booking_mode: BookingMode::Reservation,
            ..Default::default()
        });
        let merged = merge(None, &nlu);
        assert!(!merged.slots.contains(SlotKey::Time));
    }
}
