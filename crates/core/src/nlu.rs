//! The NLU response shape consumed by the Merger and the
//! tenant/resolved-booking shapes consumed by the DecisionLayer.

use crate::intent::Intent;
use crate::slots::DateSpan;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why a slot could not be used as-is, attached per slot key in
/// `NluResponse.issues`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotIssue {
    /// The common case: `"missing"` or `"ambiguous"`.
    Simple(String),
    /// A rich issue, e.g. an ambiguous meridiem time:
    /// `{raw, start_hour, end_hour, candidates}`.
    Rich(serde_json::Value),
}

impl SlotIssue {
    pub fn is_missing(&self) -> bool {
        matches!(self, SlotIssue::Simple(s) if s == "missing")
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, SlotIssue::Simple(s) if s == "ambiguous") || matches!(self, SlotIssue::Rich(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMode {
    None,
    SingleDay,
    Range,
    Flexible,
}

impl Default for DateMode {
    fn default() -> Self {
        DateMode::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    None,
    Exact,
    Range,
    Window,
}

impl Default for TimeMode {
    fn default() -> Self {
        TimeMode::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeConstraintMode {
    Exact,
    Window,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeConstraint {
    pub mode: TimeConstraintMode,
    #[serde(default)]
    pub start: Option<NaiveTime>,
    #[serde(default)]
    pub end: Option<NaiveTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateRole {
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceAnnotationType {
    Alias,
    Family,
    Modifier,
}

/// One extracted service mention in the resolved-booking trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMention {
    pub text: String,
    pub canonical: String,
    pub annotation_type: ServiceAnnotationType,
    #[serde(default)]
    pub tenant_service_id: Option<String>,
}

/// `resolved_booking`: the semantic trace the DecisionLayer reasons over.
/// Distinct from the `Slots` the Merger/Promoter work with — this is raw
/// semantic evidence, not yet reconciled with session state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBooking {
    #[serde(default)]
    pub services: Vec<ServiceMention>,
    #[serde(default)]
    pub date_mode: DateMode,
    #[serde(default)]
    pub date_refs: Vec<NaiveDate>,
    #[serde(default)]
    pub date_roles: Vec<DateRole>,
    #[serde(default)]
    pub date_range: Option<DateSpan>,
    #[serde(default)]
    pub time_mode: TimeMode,
    #[serde(default)]
    pub time_refs: Vec<NaiveTime>,
    #[serde(default)]
    pub time_constraint: Option<TimeConstraint>,
    #[serde(default)]
    pub time_range: Option<(NaiveTime, NaiveTime)>,
    pub booking_mode: crate::intent::BookingMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSignal {
    pub name: Intent,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationState {
    Pending,
    Confirmed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingTrace {
    #[serde(default)]
    pub services: Vec<ServiceMention>,
    #[serde(default)]
    pub datetime_range: Option<DateSpan>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub confirmation_state: Option<ConfirmationState>,
}

/// The NLU response as received from the (external, out-of-scope) NLU
/// provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NluResponse {
    pub intent: IntentSignal,
    #[serde(default)]
    pub raw_slots: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub issues: HashMap<String, SlotIssue>,
    #[serde(default)]
    pub needs_clarification: bool,
    #[serde(default)]
    pub clarification_reason: Option<String>,
    #[serde(default)]
    pub clarification_data: Option<serde_json::Value>,
    #[serde(default)]
    pub context: serde_json::Value,
    #[serde(default)]
    pub resolved_booking: Option<ResolvedBooking>,
    #[serde(default)]
    pub booking: BookingTrace,
    /// `entities` surfaced alongside `resolved_booking`, consumed by
    /// `DecisionLayer.decide` as an optional second argument.
    #[serde(default)]
    pub entities: serde_json::Value,
}

impl Default for IntentSignal {
    fn default() -> Self {
        IntentSignal {
            name: Intent::Unknown,
            confidence: 0.0,
        }
    }
}

/// `tenant_context` input: `booking_mode` plus the alias table mapping
/// tenant-visible alias keys to canonical service families.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantContext {
    pub booking_mode: Option<crate::intent::BookingMode>,
    /// `alias_key -> canonical_family`. `None` means "no alias table was
    /// supplied" (distinct from `Some(empty map)`, see DecisionLayer step 4).
    pub aliases: Option<HashMap<String, String>>,
}

impl TenantContext {
    /// Invert `aliases` into `canonical_family -> [alias_key, ...]`.
    pub fn invert_aliases(&self) -> HashMap<String, Vec<String>> {
        let mut inverted: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(aliases) = &self.aliases {
            for (alias_key, family) in aliases {
                inverted.entry(family.clone()).or_default().push(alias_key.clone());
            }
        }
        inverted
    }
}
