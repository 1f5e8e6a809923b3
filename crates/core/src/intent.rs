//! Canonical intent and domain vocabulary.
//!
//! `Intent` is a closed enumeration rather than a free-form string: every
//! component downstream of the NLU boundary matches on it exhaustively, so a
//! new intent is a compile error everywhere it needs handling, not a typo
//! that silently falls through to `UNKNOWN`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The shape of date/time data an intent requires before it can be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalShape {
    /// A single anchored date and time (appointments).
    DatetimeRange,
    /// A start/end date span (reservations).
    DateRange,
}

/// Business domain a booking belongs to. Orthogonal to intent except that
/// `booking_mode` pins the two CREATE_* intents to a fixed domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Service,
    Reservation,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Service => write!(f, "service"),
            Domain::Reservation => write!(f, "reservation"),
        }
    }
}

/// The `booking_mode` field of `TenantContext`; authoritative for splitting
/// the two CREATE_* intents (see `IntentResolver` rule 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingMode {
    Service,
    Reservation,
}

impl Default for BookingMode {
    fn default() -> Self {
        BookingMode::Service
    }
}

impl From<BookingMode> for Domain {
    fn from(mode: BookingMode) -> Self {
        match mode {
            BookingMode::Service => Domain::Service,
            BookingMode::Reservation => Domain::Reservation,
        }
    }
}

/// Canonical intent tag. Ordering here doubles as signal-priority order for
/// `IntentResolver` (`PAYMENT` highest, `RECOMMENDATION` lowest) except for
/// the two CREATE_* variants, which are never matched by signal at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    CreateAppointment,
    CreateReservation,
    ModifyBooking,
    CancelBooking,
    BookingInquiry,
    Availability,
    Details,
    Quote,
    Discovery,
    Recommendation,
    Payment,
    Unknown,
}

impl Intent {
    /// Signal-priority order used by `IntentResolver` step 1. Only
    /// non-booking intents participate; `CREATE_*` are resolved from
    /// `booking_mode`, never from a signal match.
    pub const SIGNAL_PRIORITY: &'static [Intent] = &[
        Intent::Payment,
        Intent::CancelBooking,
        Intent::ModifyBooking,
        Intent::BookingInquiry,
        Intent::Availability,
        Intent::Details,
        Intent::Quote,
        Intent::Discovery,
        Intent::Recommendation,
    ];

    /// Only the two booking-creation intents carry a required temporal
    /// shape; everything else is `None`.
    pub fn temporal_shape(self) -> Option<TemporalShape> {
        match self {
            Intent::CreateAppointment => Some(TemporalShape::DatetimeRange),
            Intent::CreateReservation => Some(TemporalShape::DateRange),
            _ => None,
        }
    }

    /// Whether a successful commit of this intent produces a
    /// `resolved_booking_semantics` payload worth persisting.
    pub fn produces_booking_payload(self) -> bool {
        matches!(
            self,
            Intent::CreateAppointment
                | Intent::CreateReservation
                | Intent::ModifyBooking
                | Intent::CancelBooking
        )
    }

    /// The fixed domain for intents whose domain isn't determined by
    /// `booking_mode` alone (MODIFY_BOOKING/CANCEL_BOOKING are dispatched
    /// against whichever domain the live session already belongs to, so
    /// they have no fixed domain of their own and return `None` here).
    pub fn fixed_domain(self) -> Option<Domain> {
        match self {
            Intent::CreateAppointment => Some(Domain::Service),
            Intent::CreateReservation => Some(Domain::Reservation),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::CreateAppointment => "CREATE_APPOINTMENT",
            Intent::CreateReservation => "CREATE_RESERVATION",
            Intent::ModifyBooking => "MODIFY_BOOKING",
            Intent::CancelBooking => "CANCEL_BOOKING",
            Intent::BookingInquiry => "BOOKING_INQUIRY",
            Intent::Availability => "AVAILABILITY",
            Intent::Details => "DETAILS",
            Intent::Quote => "QUOTE",
            Intent::Discovery => "DISCOVERY",
            Intent::Recommendation => "RECOMMENDATION",
            Intent::Payment => "PAYMENT",
            Intent::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(raw: &str) -> Intent {
        match raw {
            "CREATE_APPOINTMENT" => Intent::CreateAppointment,
            "CREATE_RESERVATION" => Intent::CreateReservation,
            "MODIFY_BOOKING" | "MODIFY_RESERVATION" => Intent::ModifyBooking,
            "CANCEL_BOOKING" => Intent::CancelBooking,
            "BOOKING_INQUIRY" => Intent::BookingInquiry,
            "AVAILABILITY" => Intent::Availability,
            "DETAILS" => Intent::Details,
            "QUOTE" => Intent::Quote,
            "DISCOVERY" => Intent::Discovery,
            "RECOMMENDATION" => Intent::Recommendation,
            "PAYMENT" => Intent::Payment,
            _ => Intent::Unknown,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Intent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Intent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Intent::parse(&raw))
    }
}

/// MODIFY_BOOKING/MODIFY_RESERVATION narrow their required slots based on
/// which dimensions the user actually intends to change. `service` domain
/// uses `{modifying_date, modifying_time}`; `reservation` domain uses
/// `{modifying_start_date, modifying_end_date, modifying_date}`. All flags
/// default to `false`/absent, which is distinct from ambiguous when no
/// flags are set at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModificationContext {
    #[serde(default)]
    pub modifying_date: bool,
    #[serde(default)]
    pub modifying_time: bool,
    #[serde(default)]
    pub modifying_start_date: bool,
    #[serde(default)]
    pub modifying_end_date: bool,
}

impl ModificationContext {
    pub fn is_empty(&self) -> bool {
        *self == ModificationContext::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_canonical_names() {
        for intent in [
            Intent::CreateAppointment,
            Intent::CreateReservation,
            Intent::ModifyBooking,
            Intent::CancelBooking,
            Intent::BookingInquiry,
            Intent::Availability,
            Intent::Details,
            Intent::Quote,
            Intent::Discovery,
            Intent::Recommendation,
            Intent::Payment,
        ] {
            assert_eq!(Intent::parse(intent.as_str()), intent);
        }
    }

    #[test]
    fn unknown_text_parses_to_unknown() {
        assert_eq!(Intent::parse("SOMETHING_ELSE"), Intent::Unknown);
    }

    #[test]
    fn modify_reservation_aliases_to_modify_booking() {
        assert_eq!(Intent::parse("MODIFY_RESERVATION"), Intent::ModifyBooking);
    }

    #[test]
    fn only_booking_creation_intents_carry_a_temporal_shape() {
        assert_eq!(
            Intent::CreateAppointment.temporal_shape(),
            Some(TemporalShape::DatetimeRange)
        );
        assert_eq!(
            Intent::CreateReservation.temporal_shape(),
            Some(TemporalShape::DateRange)
        );
        assert_eq!(Intent::CancelBooking.temporal_shape(), None);
    }
}
