//! End-to-end conversation scenarios, driving the full
//! `Orchestrator::handle_turn` pipeline turn by turn against a scripted
//! `NluProvider` fake and the in-memory session store — the same shape
//! as `orchestrator.rs`'s own inline tests, moved to a `tests/` binary
//! since these span multiple turns of a single conversation.

use async_trait::async_trait;
use booking_core::nlu::{
    DateMode, DateRole, IntentSignal, NluResponse, ResolvedBooking, ServiceAnnotationType, ServiceMention,
    TimeConstraint, TimeConstraintMode, TimeMode,
};
use booking_core::outcome::{TenantContextInput, TurnOutcome, TurnRequest};
use booking_core::slots::DateSpan;
use booking_core::{BookingMode, CoreResult, Domain, ExecutionBackend, Intent, NluProvider, SessionStore, TenantContext};
use booking_orchestrator::Orchestrator;
use booking_persistence::InMemorySessionStore;
use booking_tools::InProcessExecutionBackend;
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A scripted `NluProvider`: each call to `resolve` pops the next queued
/// response, so a test can script a full multi-turn conversation.
struct ScriptedNlu {
    responses: Mutex<Vec<NluResponse>>,
}

impl ScriptedNlu {
    fn new(responses: Vec<NluResponse>) -> Self {
        ScriptedNlu { responses: Mutex::new(responses) }
    }
}

#[async_trait]
impl NluProvider for ScriptedNlu {
    async fn resolve(
        &self,
        _user_id: &str,
        _text: &str,
        _domain: Domain,
        _timezone: &str,
        _tenant_context: &TenantContext,
    ) -> CoreResult<NluResponse> {
        let mut responses = self.responses.lock().unwrap();
        assert!(!responses.is_empty(), "scripted NLU ran out of queued turns");
        Ok(responses.remove(0))
    }
}

fn turn_request(text: &str, domain: Domain, booking_mode: BookingMode, aliases: &[(&str, &str)]) -> TurnRequest {
    TurnRequest {
        user_id: "u1".to_string(),
        text: text.to_string(),
        domain,
        timezone: "UTC".to_string(),
        tenant_context: TenantContextInput {
            booking_mode,
            aliases: Some(aliases.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>()),
        },
        phone_number: None,
        email: None,
        customer_id: None,
    }
}

fn orchestrator_with(responses: Vec<NluResponse>) -> (Orchestrator, Arc<dyn SessionStore>) {
    let nlu: Arc<dyn NluProvider> = Arc::new(ScriptedNlu::new(responses));
    let execution: Arc<dyn ExecutionBackend> = Arc::new(InProcessExecutionBackend::new());
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    (Orchestrator::new(nlu, execution, sessions.clone()), sessions)
}

fn service_alias(key: &str) -> ServiceMention {
    ServiceMention {
        text: key.to_string(),
        canonical: key.to_string(),
        annotation_type: ServiceAnnotationType::Alias,
        tenant_service_id: Some(key.to_string()),
    }
}

fn service_family(canonical: &str) -> ServiceMention {
    ServiceMention {
        text: canonical.to_string(),
        canonical: canonical.to_string(),
        annotation_type: ServiceAnnotationType::Family,
        tenant_service_id: None,
    }
}

/// S1 service multi-turn completion: "book a haircut" -> "tomorrow" ->
/// "11am", ending READY/EXECUTED with `has_datetime=true`.
#[tokio::test]
async fn s1_service_multi_turn_completion() {
    let mut turn1 = NluResponse::default();
    turn1.intent = IntentSignal { name: Intent::CreateAppointment, confidence: 0.9 };
    turn1.raw_slots.insert("service_id".to_string(), serde_json::json!("haircut"));

    let mut turn2 = NluResponse::default();
    turn2.intent = IntentSignal { name: Intent::CreateAppointment, confidence: 0.9 };
    turn2.raw_slots.insert("date".to_string(), serde_json::json!("2026-08-02"));

    let mut turn3 = NluResponse::default();
    turn3.intent = IntentSignal { name: Intent::CreateAppointment, confidence: 0.9 };
    turn3.raw_slots.insert("time".to_string(), serde_json::json!("11:00"));
    turn3.resolved_booking = Some(ResolvedBooking {
        services: vec![service_alias("haircut")],
        date_mode: DateMode::SingleDay,
        date_refs: vec![NaiveDate::from_ymd_opt(2026, 8, 2).unwrap()],
        time_mode: TimeMode::Exact,
        time_refs: vec![NaiveTime::from_hms_opt(11, 0, 0).unwrap()],
        booking_mode: BookingMode::Service,
        ..Default::default()
    });

    let (orchestrator, sessions) = orchestrator_with(vec![turn1, turn2, turn3]);
    let aliases = [("haircut", "haircut")];

    let r1 = orchestrator
        .handle_turn(turn_request("book a haircut", Domain::Service, BookingMode::Service, &aliases))
        .await;
    match r1.outcome.unwrap() {
        TurnOutcome::NeedsClarification { intent_name, data, .. } => {
            assert_eq!(intent_name, "CREATE_APPOINTMENT");
            assert_eq!(data.missing, vec!["date".to_string(), "time".to_string()]);
        }
        other => panic!("turn1: expected NEEDS_CLARIFICATION, got {other:?}"),
    }

    let r2 = orchestrator
        .handle_turn(turn_request("tomorrow", Domain::Service, BookingMode::Service, &aliases))
        .await;
    match r2.outcome.unwrap() {
        TurnOutcome::NeedsClarification { data, .. } => {
            assert_eq!(data.missing, vec!["time".to_string()]);
        }
        other => panic!("turn2: expected NEEDS_CLARIFICATION, got {other:?}"),
    }
    let persisted = sessions.get("u1", Domain::Service).await.unwrap().unwrap();
    assert_eq!(persisted.awaiting_slot, Some(booking_core::SlotKey::Time));

    let r3 = orchestrator
        .handle_turn(turn_request("11am", Domain::Service, BookingMode::Service, &aliases))
        .await;
    match r3.outcome.unwrap() {
        TurnOutcome::Executed { slots, .. } => {
            assert_eq!(slots.get(booking_core::SlotKey::HasDatetime), Some(&booking_core::SlotValue::Bool(true)));
        }
        other => panic!("turn3: expected EXECUTED, got {other:?}"),
    }
    assert!(sessions.get("u1", Domain::Service).await.unwrap().is_none());
}

/// S2 reservation range resolved in one turn.
#[tokio::test]
async fn s2_reservation_range_resolved_in_one_turn() {
    let mut turn = NluResponse::default();
    turn.intent = IntentSignal { name: Intent::CreateReservation, confidence: 0.9 };
    turn.raw_slots.insert("service_id".to_string(), serde_json::json!("room"));
    turn.raw_slots.insert(
        "date_range".to_string(),
        serde_json::json!({"start": "2026-03-10", "end": "2026-03-15"}),
    );
    turn.resolved_booking = Some(ResolvedBooking {
        services: vec![service_family("room")],
        date_range: Some(DateSpan {
            start: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
        }),
        date_mode: DateMode::Range,
        booking_mode: BookingMode::Reservation,
        ..Default::default()
    });

    let (orchestrator, sessions) = orchestrator_with(vec![turn]);
    let aliases = [("room", "room")];

    let response = orchestrator
        .handle_turn(turn_request("book a room march 10 to 15", Domain::Reservation, BookingMode::Reservation, &aliases))
        .await;

    match response.outcome.unwrap() {
        TurnOutcome::Executed { slots, .. } | TurnOutcome::Ready { slots, .. } => {
            let range = slots.get(booking_core::SlotKey::DateRange).unwrap().as_range().unwrap();
            assert_eq!(range.start, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
            assert_eq!(range.end, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
            assert_eq!(slots.get(booking_core::SlotKey::ServiceId).unwrap().as_text(), Some("room"));
        }
        other => panic!("expected READY/EXECUTED, got {other:?}"),
    }
    assert!(sessions.get("u1", Domain::Reservation).await.unwrap().is_none());
}

/// S3 intent change resets: "book haircut" then "cancel my booking"
/// discards the prior session slots.
#[tokio::test]
async fn s3_intent_change_resets_session() {
    let mut turn1 = NluResponse::default();
    turn1.intent = IntentSignal { name: Intent::CreateAppointment, confidence: 0.9 };
    turn1.raw_slots.insert("service_id".to_string(), serde_json::json!("haircut"));

    let mut turn2 = NluResponse::default();
    turn2.intent = IntentSignal { name: Intent::CancelBooking, confidence: 0.9 };

    let (orchestrator, sessions) = orchestrator_with(vec![turn1, turn2]);
    let aliases = [("haircut", "haircut")];

    let _ = orchestrator
        .handle_turn(turn_request("book haircut", Domain::Service, BookingMode::Service, &aliases))
        .await;

    let response = orchestrator
        .handle_turn(turn_request("cancel my booking", Domain::Service, BookingMode::Service, &aliases))
        .await;

    match response.outcome.unwrap() {
        TurnOutcome::NeedsClarification { intent_name, data, .. } => {
            assert_eq!(intent_name, "CANCEL_BOOKING");
            assert_eq!(data.missing, vec!["booking_id".to_string()]);
        }
        other => panic!("expected NEEDS_CLARIFICATION, got {other:?}"),
    }

    let persisted = sessions.get("u1", Domain::Service).await.unwrap().unwrap();
    assert_eq!(persisted.intent, Intent::CancelBooking);
    assert!(!persisted.slots.contains(booking_core::SlotKey::ServiceId));
}

/// S4 awaiting_slot guardrail: after turn2 of S1 awaits `time`, a date-only
/// reply must not satisfy it.
#[tokio::test]
async fn s4_awaiting_slot_rejects_wrong_slot_type() {
    let mut turn1 = NluResponse::default();
    turn1.intent = IntentSignal { name: Intent::CreateAppointment, confidence: 0.9 };
    turn1.raw_slots.insert("service_id".to_string(), serde_json::json!("haircut"));
    turn1.raw_slots.insert("date".to_string(), serde_json::json!("2026-08-02"));

    let mut turn2 = NluResponse::default();
    turn2.intent = IntentSignal { name: Intent::CreateAppointment, confidence: 0.9 };
    turn2.raw_slots.insert("date".to_string(), serde_json::json!("2026-08-09"));

    let (orchestrator, _sessions) = orchestrator_with(vec![turn1, turn2]);
    let aliases = [("haircut", "haircut")];

    let r1 = orchestrator
        .handle_turn(turn_request("book a haircut on aug 2", Domain::Service, BookingMode::Service, &aliases))
        .await;
    match r1.outcome.unwrap() {
        TurnOutcome::NeedsClarification { data, .. } => assert_eq!(data.missing, vec!["time".to_string()]),
        other => panic!("turn1: expected NEEDS_CLARIFICATION, got {other:?}"),
    }

    let r2 = orchestrator
        .handle_turn(turn_request("next week", Domain::Service, BookingMode::Service, &aliases))
        .await;
    match r2.outcome.unwrap() {
        TurnOutcome::NeedsClarification { data, .. } => assert_eq!(data.missing, vec!["time".to_string()]),
        other => panic!("turn2: expected NEEDS_CLARIFICATION (time still missing), got {other:?}"),
    }
}

/// S5 tenant ambiguity: one canonical family mapping to 3 tenant ids
/// blocks resolution even though a date_range is fully specified.
#[tokio::test]
async fn s5_tenant_ambiguity_blocks_resolution() {
    let mut turn = NluResponse::default();
    turn.intent = IntentSignal { name: Intent::CreateReservation, confidence: 0.9 };
    turn.resolved_booking = Some(ResolvedBooking {
        services: vec![service_family("room")],
        date_range: Some(DateSpan {
            start: NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 10, 9).unwrap(),
        }),
        date_mode: DateMode::Range,
        booking_mode: BookingMode::Reservation,
        ..Default::default()
    });
    turn.raw_slots.insert("service_id".to_string(), serde_json::json!("room"));
    turn.raw_slots.insert(
        "date_range".to_string(),
        serde_json::json!({"start": "2026-10-05", "end": "2026-10-09"}),
    );

    let (orchestrator, _sessions) = orchestrator_with(vec![turn]);
    let aliases = [("standard", "room"), ("deluxe", "room"), ("suite", "room")];

    let response = orchestrator
        .handle_turn(turn_request("book a room oct 5 to 9", Domain::Reservation, BookingMode::Reservation, &aliases))
        .await;

    match response.outcome.unwrap() {
        TurnOutcome::NeedsClarification { clarification_reason, .. } => {
            assert_eq!(clarification_reason, booking_core::clarification::ClarificationReason::AmbiguousService);
        }
        other => panic!("expected NEEDS_CLARIFICATION(AMBIGUOUS_SERVICE), got {other:?}"),
    }
}

/// S6 single unambiguous tenant alias resolves straight to READY.
#[tokio::test]
async fn s6_single_unambiguous_alias_is_ready() {
    let mut turn = NluResponse::default();
    turn.intent = IntentSignal { name: Intent::CreateAppointment, confidence: 0.9 };
    turn.resolved_booking = Some(ResolvedBooking {
        services: vec![service_alias("haircut")],
        date_mode: DateMode::SingleDay,
        date_refs: vec![NaiveDate::from_ymd_opt(2026, 7, 31).unwrap()],
        date_roles: vec![DateRole::StartDate],
        time_constraint: Some(TimeConstraint {
            mode: TimeConstraintMode::Exact,
            start: Some(NaiveTime::from_hms_opt(14, 0, 0).unwrap()),
            end: None,
        }),
        booking_mode: BookingMode::Service,
        ..Default::default()
    });
    turn.raw_slots.insert("service_id".to_string(), serde_json::json!("haircut"));
    turn.raw_slots.insert("date".to_string(), serde_json::json!("2026-07-31"));
    turn.raw_slots.insert("time".to_string(), serde_json::json!("14:00"));

    let (orchestrator, _sessions) = orchestrator_with(vec![turn]);
    let aliases = [("haircut", "haircut")];

    let response = orchestrator
        .handle_turn(turn_request("schedule haircut friday at 2pm", Domain::Service, BookingMode::Service, &aliases))
        .await;

    match response.outcome.unwrap() {
        TurnOutcome::Executed { slots, .. } => {
            assert_eq!(slots.get(booking_core::SlotKey::ServiceId).unwrap().as_text(), Some("haircut"));
        }
        other => panic!("expected EXECUTED, got {other:?}"),
    }
}
