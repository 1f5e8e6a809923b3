//! `ClarificationBuilder`: maps a missing-slot set and NLU issue shapes
//! to a canonical `ClarificationReason` plus the structured `data`
//! payload the transport layer surfaces to the user.

use booking_core::clarification::ClarificationReason;
use booking_core::nlu::SlotIssue;
use booking_core::SlotKey;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ClarificationData {
    pub reason: Option<ClarificationReason>,
    pub missing: Vec<String>,
    pub ambiguous: Vec<AmbiguousSlot>,
}

#[derive(Debug, Clone)]
pub struct AmbiguousSlot {
    pub slot: String,
    pub detail: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct ClarificationResult {
    pub reason: ClarificationReason,
    pub data: ClarificationData,
}

/// `missing_slots` is the authoritative, already-sorted set from
/// `TurnFinalizer`; `issues` is the NLU's raw per-slot issue map, consulted
/// only for `ambiguous` entries and `data.reason` inference.
pub fn build(missing_slots: &[SlotKey], issues: &HashMap<String, SlotIssue>) -> ClarificationResult {
    let reason = reason_for(missing_slots);

    let missing = missing_slots.iter().map(|k| k.as_str().to_string()).collect();
    let ambiguous = issues
        .iter()
        .filter(|(_, issue)| issue.is_ambiguous())
        .map(|(slot, issue)| AmbiguousSlot { slot: slot.clone(), detail: ambiguous_detail(issue) })
        .collect();

    let data = ClarificationData {
        reason: Some(reason_or_inferred(reason, missing_slots, issues)),
        missing,
        ambiguous,
    };

    ClarificationResult { reason, data }
}

fn reason_for(missing_slots: &[SlotKey]) -> ClarificationReason {
    let has = |key: SlotKey| missing_slots.contains(&key);

    match missing_slots.len() {
        2 if has(SlotKey::StartDate) && has(SlotKey::EndDate) => ClarificationReason::MissingDateRange,
        1 if has(SlotKey::StartDate) => ClarificationReason::MissingStartDate,
        1 if has(SlotKey::EndDate) => ClarificationReason::MissingEndDate,
        1 if has(SlotKey::Time) => ClarificationReason::MissingTime,
        1 if has(SlotKey::Date) => ClarificationReason::MissingDate,
        _ if has(SlotKey::Time) => ClarificationReason::MissingTime,
        _ => ClarificationReason::NeedsClarification,
    }
}

/// When the derived reason is the generic fallback, infer a more specific
/// one from the missing set, priority MISSING_TIME > MISSING_DATE >
/// MISSING_SERVICE > MISSING_CONTEXT.
fn reason_or_inferred(
    reason: ClarificationReason,
    missing_slots: &[SlotKey],
    _issues: &HashMap<String, SlotIssue>,
) -> ClarificationReason {
    if reason != ClarificationReason::NeedsClarification {
        return reason;
    }
    if missing_slots.contains(&SlotKey::Time) {
        ClarificationReason::MissingTime
    } else if missing_slots.contains(&SlotKey::Date) {
        ClarificationReason::MissingDate
    } else if missing_slots.contains(&SlotKey::ServiceId) {
        ClarificationReason::MissingService
    } else if missing_slots.is_empty() {
        ClarificationReason::MissingContext
    } else {
        ClarificationReason::NeedsClarification
    }
}

fn ambiguous_detail(issue: &SlotIssue) -> serde_json::Value {
    match issue {
        SlotIssue::Rich(value) => value.clone(),
        SlotIssue::Simple(label) => serde_json::json!({ "label": label }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_pair_maps_to_missing_date_range() {
        let result = build(&[SlotKey::StartDate, SlotKey::EndDate], &HashMap::new());
        assert_eq!(result.reason, ClarificationReason::MissingDateRange);
    }

    #[test]
    fn single_time_maps_to_missing_time() {
        let result = build(&[SlotKey::Time], &HashMap::new());
        assert_eq!(result.reason, ClarificationReason::MissingTime);
    }

    #[test]
    fn service_and_date_falls_back_to_needs_clarification_but_infers_date_reason() {
        let result = build(&[SlotKey::ServiceId, SlotKey::Date], &HashMap::new());
        assert_eq!(result.reason, ClarificationReason::NeedsClarification);
        assert_eq!(result.data.reason, Some(ClarificationReason::MissingDate));
    }

    #[test]
    fn ambiguous_issue_populates_data_ambiguous() {
        let mut issues = HashMap::new();
        issues.insert("time".to_string(), SlotIssue::Simple("ambiguous".to_string()));
        let result = build(&[], &issues);
        assert_eq!(result.data.ambiguous.len(), 1);
        assert_eq!(result.data.ambiguous[0].slot, "time");
    }

    #[test]
    fn rich_ambiguous_time_issue_is_preserved_as_structured_object() {
        let mut issues = HashMap::new();
        issues.insert(
            "time".to_string(),
            SlotIssue::Rich(serde_json::json!({"raw": "7", "start_hour": 7, "end_hour": 19, "candidates": ["07:00", "19:00"]})),
        );
        let result = build(&[SlotKey::Time], &issues);
        assert_eq!(result.data.ambiguous[0].detail["raw"], "7");
    }

    #[test]
    fn missing_list_always_present_even_when_empty() {
        let result = build(&[], &HashMap::new());
        assert!(result.data.missing.is_empty());
        assert!(result.data.ambiguous.is_empty());
    }
}
