//! `DecisionLayer`: tenant-authoritative service resolution plus
//! temporal-shape validation. Pure — returns a `DecisionResult` and a
//! `DecisionTrace` for logging, never throws for a domain reason.

use booking_core::clarification::ClarificationReason;
use booking_core::intent::{BookingMode, Intent};
use booking_core::nlu::{DateMode, ResolvedBooking, ServiceAnnotationType, TimeConstraintMode, TimeMode};
use booking_core::nlu::TenantContext;
use chrono::NaiveTime;

/// Policy hooks. Both default to `true`.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    pub allow_time_windows: bool,
    pub allow_constraint_only_time: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Policy { allow_time_windows: true, allow_constraint_only_time: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionStatus {
    Resolved,
    NeedsClarification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveTimeMode {
    Exact,
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveTimeSource {
    Constraint,
    Primary,
    Window,
}

#[derive(Debug, Clone, Copy)]
pub struct EffectiveTime {
    pub mode: EffectiveTimeMode,
    pub source: EffectiveTimeSource,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

#[derive(Debug, Clone)]
pub struct DecisionResult {
    pub status: DecisionStatus,
    pub reason: Option<ClarificationReason>,
    pub effective_time: Option<EffectiveTime>,
    pub resolved_service_id: Option<String>,
}

/// Internal trace, logged but not part of the public outcome contract:
/// `resolution_strategy` plus expected vs. actual temporal shape, kept
/// for debugging clarifications.
#[derive(Debug, Clone)]
pub struct DecisionTrace {
    pub resolution_strategy: &'static str,
    pub expected_temporal_shape: Option<&'static str>,
    pub actual_temporal_shape: &'static str,
}

pub fn decide(
    resolved_booking: Option<&ResolvedBooking>,
    policy: &Policy,
    intent: Intent,
    tenant_context: &TenantContext,
) -> (DecisionResult, DecisionTrace) {
    let Some(rb) = resolved_booking else {
        return passthrough_for_non_booking(intent, "no_resolved_booking");
    };

    let booking_mode = match intent {
        Intent::CreateAppointment => BookingMode::Service,
        Intent::CreateReservation => BookingMode::Reservation,
        _ => return passthrough_for_non_booking(intent, "not_a_booking_intent"),
    };

    let (service_resolution, resolution_strategy) =
        resolve_tenant_service_id(rb, tenant_context, booking_mode);

    let resolved_service_id = match service_resolution {
        ServiceResolution::Resolved(id) => id,
        ServiceResolution::Unsupported => {
            return clarify(
                ClarificationReason::UnsupportedService,
                resolution_strategy,
                booking_mode,
            )
        }
        ServiceResolution::Ambiguous => {
            return clarify(ClarificationReason::AmbiguousService, resolution_strategy, booking_mode)
        }
        ServiceResolution::Missing => {
            return clarify(ClarificationReason::MissingService, resolution_strategy, booking_mode)
        }
    };

    let temporal_check = match booking_mode {
        BookingMode::Service => validate_appointment_temporal(rb),
        BookingMode::Reservation => validate_reservation_temporal(rb),
    };

    if let Err(reason) = temporal_check {
        return clarify(reason, resolution_strategy, booking_mode);
    }

    if let Some(reason) = check_policy_hooks(rb, policy, booking_mode) {
        return clarify(reason, resolution_strategy, booking_mode);
    }

    let effective_time = build_effective_time(rb);

    (
        DecisionResult {
            status: DecisionStatus::Resolved,
            reason: None,
            effective_time,
            resolved_service_id: Some(resolved_service_id),
        },
        DecisionTrace {
            resolution_strategy,
            expected_temporal_shape: Some(temporal_shape_name(booking_mode)),
            actual_temporal_shape: temporal_shape_name(booking_mode),
        },
    )
}

fn passthrough_for_non_booking(_intent: Intent, strategy: &'static str) -> (DecisionResult, DecisionTrace) {
    (
        DecisionResult {
            status: DecisionStatus::Resolved,
            reason: None,
            effective_time: None,
            resolved_service_id: None,
        },
        DecisionTrace { resolution_strategy: strategy, expected_temporal_shape: None, actual_temporal_shape: "none" },
    )
}

fn clarify(
    reason: ClarificationReason,
    resolution_strategy: &'static str,
    booking_mode: BookingMode,
) -> (DecisionResult, DecisionTrace) {
    (
        DecisionResult { status: DecisionStatus::NeedsClarification, reason: Some(reason), effective_time: None, resolved_service_id: None },
        DecisionTrace {
            resolution_strategy,
            expected_temporal_shape: Some(temporal_shape_name(booking_mode)),
            actual_temporal_shape: "incomplete",
        },
    )
}

fn temporal_shape_name(mode: BookingMode) -> &'static str {
    match mode {
        BookingMode::Service => "datetime_range",
        BookingMode::Reservation => "date_range",
    }
}

enum ServiceResolution {
    Resolved(String),
    Unsupported,
    Ambiguous,
    Missing,
}

/// Service resolution, tenant-authoritative and strict.
fn resolve_tenant_service_id(
    rb: &ResolvedBooking,
    tenant_context: &TenantContext,
    booking_mode: BookingMode,
) -> (ServiceResolution, &'static str) {
    let services: Vec<_> = rb
        .services
        .iter()
        .filter(|s| s.annotation_type != ServiceAnnotationType::Modifier)
        .collect();

    if services.is_empty() {
        return (ServiceResolution::Missing, "no_services");
    }

    if let Some(aliased) = services
        .iter()
        .find(|s| s.annotation_type == ServiceAnnotationType::Alias && s.tenant_service_id.is_some())
    {
        return (
            ServiceResolution::Resolved(aliased.tenant_service_id.clone().unwrap()),
            "alias_direct",
        );
    }

    let mut canonical_families: Vec<String> = Vec::new();
    for s in &services {
        if !canonical_families.contains(&s.canonical) {
            canonical_families.push(s.canonical.clone());
        }
    }
    if canonical_families.is_empty() {
        return (ServiceResolution::Missing, "no_canonical_family");
    }

    if tenant_context.aliases.is_none() {
        // CREATE_APPOINTMENT tolerates an unresolved canonical family when
        // at least one was extracted; CREATE_RESERVATION never does.
        if booking_mode == BookingMode::Service {
            return (
                ServiceResolution::Resolved(canonical_families[0].clone()),
                "canonical_fallback",
            );
        }
        return (ServiceResolution::Unsupported, "no_tenant_context");
    }

    let inverted = tenant_context.invert_aliases();

    let mut unique_tenant_services: Vec<String> = Vec::new();
    for family in &canonical_families {
        if let Some(aliases) = inverted.get(family) {
            for alias in aliases {
                if !unique_tenant_services.contains(alias) {
                    unique_tenant_services.push(alias.clone());
                }
            }
        }
    }

    match unique_tenant_services.len() {
        0 => (ServiceResolution::Unsupported, "family_union"),
        n if n >= 2 => (ServiceResolution::Ambiguous, "family_union"),
        _ => {
            let any_family_ambiguous = canonical_families
                .iter()
                .any(|f| inverted.get(f).map(|a| a.len() >= 2).unwrap_or(false));
            if any_family_ambiguous {
                (ServiceResolution::Ambiguous, "family_union")
            } else {
                (ServiceResolution::Resolved(unique_tenant_services[0].clone()), "family_union")
            }
        }
    }
}

/// APPOINTMENT requires `datetime_range`. Time is checked before date: a
/// missing value resolves to MISSING_TIME or MISSING_DATE with time
/// checked first.
fn validate_appointment_temporal(rb: &ResolvedBooking) -> Result<(), ClarificationReason> {
    let date_ok = matches!(rb.date_mode, DateMode::SingleDay | DateMode::Range) && !rb.date_refs.is_empty();
    let time_ok = rb
        .time_constraint
        .as_ref()
        .map(|tc| matches!(tc.mode, TimeConstraintMode::Exact | TimeConstraintMode::Window | TimeConstraintMode::Fuzzy))
        .unwrap_or(false)
        || (matches!(rb.time_mode, TimeMode::Exact | TimeMode::Range | TimeMode::Window) && !rb.time_refs.is_empty());

    if !time_ok {
        return Err(ClarificationReason::MissingTime);
    }
    if !date_ok {
        return Err(ClarificationReason::MissingDate);
    }
    Ok(())
}

/// RESERVATION requires `date_range`: a distinct start and end anchor.
fn validate_reservation_temporal(rb: &ResolvedBooking) -> Result<(), ClarificationReason> {
    let has_range = rb.date_range.is_some();
    let two_refs = rb.date_refs.len() >= 2;
    let range_mode_both_ends = rb.date_mode == DateMode::Range && rb.date_refs.len() >= 2;

    if has_range || two_refs || range_mode_both_ends {
        return Ok(());
    }
    if rb.date_refs.is_empty() {
        return Err(ClarificationReason::MissingStartDate);
    }
    Err(ClarificationReason::MissingEndDate)
}

fn check_policy_hooks(
    rb: &ResolvedBooking,
    policy: &Policy,
    booking_mode: BookingMode,
) -> Option<ClarificationReason> {
    if !policy.allow_time_windows && rb.time_mode == TimeMode::Window {
        return Some(ClarificationReason::PolicyTimeWindow);
    }

    let is_fuzzy = rb.time_constraint.as_ref().map(|tc| tc.mode == TimeConstraintMode::Fuzzy).unwrap_or(false);
    if is_fuzzy && booking_mode == BookingMode::Service {
        return Some(ClarificationReason::MissingTimeFuzzy);
    }

    let constraint_only = rb.time_constraint.is_some() && rb.time_refs.is_empty();
    if !policy.allow_constraint_only_time && constraint_only {
        return Some(ClarificationReason::PolicyConstraintOnlyTime);
    }

    None
}

/// `effective_time` from the first available of: `time_constraint`
/// (exact/constraint), exact `time_refs` (exact/primary), window
/// (window/window), range (exact/primary).
fn build_effective_time(rb: &ResolvedBooking) -> Option<EffectiveTime> {
    if let Some(tc) = &rb.time_constraint {
        if tc.mode == TimeConstraintMode::Exact {
            if let Some(start) = tc.start {
                return Some(EffectiveTime {
                    mode: EffectiveTimeMode::Exact,
                    source: EffectiveTimeSource::Constraint,
                    start: Some(start),
                    end: tc.end,
                });
            }
        }
    }

    if rb.time_mode == TimeMode::Exact {
        if let Some(&start) = rb.time_refs.first() {
            return Some(EffectiveTime {
                mode: EffectiveTimeMode::Exact,
                source: EffectiveTimeSource::Primary,
                start: Some(start),
                end: None,
            });
        }
    }

    if rb.time_mode == TimeMode::Window {
        if let Some(range) = rb.time_range {
            return Some(EffectiveTime {
                mode: EffectiveTimeMode::Window,
                source: EffectiveTimeSource::Window,
                start: Some(range.0),
                end: Some(range.1),
            });
        }
    }

    if rb.time_mode == TimeMode::Range {
        if let Some(&start) = rb.time_refs.first() {
            return Some(EffectiveTime {
                mode: EffectiveTimeMode::Exact,
                source: EffectiveTimeSource::Primary,
                start: Some(start),
                end: rb.time_refs.get(1).copied(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::nlu::{ServiceMention, TimeConstraint};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn tenant(aliases: &[(&str, &str)]) -> TenantContext {
        TenantContext {
            booking_mode: Some(BookingMode::Service),
            aliases: Some(aliases.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>()),
        }
    }

    fn service_alias(text: &str, tenant_id: &str) -> ServiceMention {
        ServiceMention {
            text: text.into(),
            canonical: text.into(),
            annotation_type: ServiceAnnotationType::Alias,
            tenant_service_id: Some(tenant_id.into()),
        }
    }

    fn service_family(canonical: &str) -> ServiceMention {
        ServiceMention { text: canonical.into(), canonical: canonical.into(), annotation_type: ServiceAnnotationType::Family, tenant_service_id: None }
    }

    #[test]
    fn alias_annotation_resolves_immediately_without_ambiguity_check() {
        let rb = ResolvedBooking {
            services: vec![service_alias("haircut", "haircut")],
            date_mode: DateMode::SingleDay,
            date_refs: vec![NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()],
            time_mode: TimeMode::Exact,
            time_refs: vec![NaiveTime::from_hms_opt(11, 0, 0).unwrap()],
            booking_mode: BookingMode::Service,
            ..Default::default()
        };
        let (result, _) = decide(Some(&rb), &Policy::default(), Intent::CreateAppointment, &tenant(&[]));
        assert_eq!(result.status, DecisionStatus::Resolved);
        assert_eq!(result.resolved_service_id.as_deref(), Some("haircut"));
    }

    #[test]
    fn ambiguous_family_union_blocks_resolution() {
        let rb = ResolvedBooking {
            services: vec![service_family("room")],
            date_range: Some(booking_core::slots::DateSpan {
                start: NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 10, 9).unwrap(),
            }),
            date_mode: DateMode::Range,
            booking_mode: BookingMode::Reservation,
            ..Default::default()
        };
        let tenant_ctx = tenant(&[("standard", "room"), ("deluxe", "room"), ("suite", "room")]);
        let (result, _) = decide(Some(&rb), &Policy::default(), Intent::CreateReservation, &tenant_ctx);
        assert_eq!(result.status, DecisionStatus::NeedsClarification);
        assert_eq!(result.reason, Some(ClarificationReason::AmbiguousService));
    }

    #[test]
    fn single_unambiguous_alias_resolves_reservation() {
        let rb = ResolvedBooking {
            services: vec![service_family("room")],
            date_range: Some(booking_core::slots::DateSpan {
                start: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            }),
            date_mode: DateMode::Range,
            booking_mode: BookingMode::Reservation,
            ..Default::default()
        };
        let tenant_ctx = tenant(&[("room", "room")]);
        let (result, _) = decide(Some(&rb), &Policy::default(), Intent::CreateReservation, &tenant_ctx);
        assert_eq!(result.status, DecisionStatus::Resolved);
        assert_eq!(result.resolved_service_id.as_deref(), Some("room"));
    }

    #[test]
    fn missing_time_is_reported_before_missing_date() {
        let rb = ResolvedBooking {
            services: vec![service_alias("haircut", "haircut")],
            booking_mode: BookingMode::Service,
            ..Default::default()
        };
        let (result, _) = decide(Some(&rb), &Policy::default(), Intent::CreateAppointment, &tenant(&[]));
        assert_eq!(result.reason, Some(ClarificationReason::MissingTime));
    }

    #[test]
    fn reservation_requires_tenant_resolution_even_with_one_canonical_family() {
        let rb = ResolvedBooking {
            services: vec![service_family("room")],
            date_range: Some(booking_core::slots::DateSpan {
                start: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            }),
            date_mode: DateMode::Range,
            booking_mode: BookingMode::Reservation,
            ..Default::default()
        };
        let no_tenant = TenantContext { booking_mode: Some(BookingMode::Reservation), aliases: None };
        let (result, _) = decide(Some(&rb), &Policy::default(), Intent::CreateReservation, &no_tenant);
        assert_eq!(result.status, DecisionStatus::NeedsClarification);
        assert_eq!(result.reason, Some(ClarificationReason::UnsupportedService));
    }

    #[test]
    fn appointment_accepts_canonical_family_without_tenant_context() {
        let rb = ResolvedBooking {
            services: vec![service_family("haircut")],
            date_mode: DateMode::SingleDay,
            date_refs: vec![NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()],
            time_constraint: Some(TimeConstraint { mode: TimeConstraintMode::Exact, start: Some(NaiveTime::from_hms_opt(14, 0, 0).unwrap()), end: None }),
            booking_mode: BookingMode::Service,
            ..Default::default()
        };
        let no_tenant = TenantContext { booking_mode: Some(BookingMode::Service), aliases: None };
        let (result, _) = decide(Some(&rb), &Policy::default(), Intent::CreateAppointment, &no_tenant);
        assert_eq!(result.status, DecisionStatus::Resolved);
        assert_eq!(result.resolved_service_id.as_deref(), Some("haircut"));
    }
}
