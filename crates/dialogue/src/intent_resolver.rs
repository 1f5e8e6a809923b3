//! `IntentResolver`: deterministic, ordered, rule-based intent
//! resolution. No ML — every decision traces back to a signal match in
//! `intent_signals.yaml` or to the authoritative `booking_mode`.

use booking_config::IntentConfigView;
use booking_core::{BookingMode, Intent};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentResolution {
    pub intent: Intent,
    pub confidence: f32,
}

/// Lowercase + strip punctuation, collapsing to the word-token form every
/// signal pattern is compiled against.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `resolve(sentence, entities, booking_mode) -> (intent, confidence)`.
pub fn resolve(text: &str, entities: &serde_json::Value, booking_mode: BookingMode) -> IntentResolution {
    let normalized = normalize(text);
    let view = IntentConfigView::load();

    for (intent, signals) in view.signal_priority_entries() {
        if signals.matches(&normalized) {
            let confidence = if has_required_entity(signals, entities) { 0.95 } else { 0.85 };
            return IntentResolution { intent, confidence };
        }
    }

    // Step 2: no non-booking signal matched, so this is a booking turn.
    // `booking_mode` is authoritative and is never overridden by a signal.
    let intent = match booking_mode {
        BookingMode::Service => Intent::CreateAppointment,
        BookingMode::Reservation => Intent::CreateReservation,
    };
    IntentResolution { intent, confidence: 0.75 }
}

fn has_required_entity(signals: &booking_config::CompiledSignals, entities: &serde_json::Value) -> bool {
    let Some(obj) = entities.as_object() else { return false };
    signals
        .intent_defining_slots
        .iter()
        .any(|slot| obj.get(slot).map(|v| !v.is_null()).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cancel_signal_outranks_booking_mode() {
        let resolution = resolve("please cancel my booking", &json!({}), BookingMode::Service);
        assert_eq!(resolution.intent, Intent::CancelBooking);
    }

    #[test]
    fn payment_outranks_cancel_when_both_could_plausibly_match() {
        // PAYMENT is higher priority than CANCEL_BOOKING; a sentence that
        // only matches PAYMENT's signals must never fall through.
        let resolution = resolve("i want to pay now for my booking", &json!({}), BookingMode::Service);
        assert_eq!(resolution.intent, Intent::Payment);
    }

    #[test]
    fn no_signal_match_falls_back_to_booking_mode() {
        let resolution = resolve("book a haircut for tomorrow", &json!({}), BookingMode::Service);
        assert_eq!(resolution.intent, Intent::CreateAppointment);
        assert_eq!(resolution.confidence, 0.75);
    }

    #[test]
    fn reservation_booking_mode_is_authoritative_over_service() {
        let resolution = resolve("book a room", &json!({}), BookingMode::Reservation);
        assert_eq!(resolution.intent, Intent::CreateReservation);
    }

    #[test]
    fn matching_signal_with_required_entity_gets_high_confidence() {
        let resolution = resolve(
            "check my booking status",
            &json!({"booking_id": "bk_123"}),
            BookingMode::Service,
        );
        assert_eq!(resolution.intent, Intent::BookingInquiry);
        assert_eq!(resolution.confidence, 0.95);
    }

    #[test]
    fn normalize_strips_punctuation_and_lowercases() {
        assert_eq!(normalize("Cancel My Booking!"), "cancel my booking");
    }
}
