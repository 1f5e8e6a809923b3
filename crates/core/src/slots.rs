//! The closed slot vocabulary and the `Slots` value type.
//!
//! Booking slot values come from a fixed set of primitive shapes. A plain
//! `HashMap<String, serde_json::Value>` would let every layer reinvent its
//! own notion of "present", so `Slots` wraps a typed map keyed by `SlotKey`
//! and holding `SlotValue`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed slot vocabulary. Variants are declared in the order
/// `missing_slots` should report them in — `#[derive(Ord)]` compares by
/// declaration order, so a `BTreeSet<SlotKey>` of missing slots falls out
/// sorted for free without a separate string-sort pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKey {
    ServiceId,
    Date,
    Time,
    StartDate,
    EndDate,
    DateRange,
    DatetimeRange,
    HasDatetime,
    BookingId,
    Duration,
}

// `SlotKey` is a map key in `Slots` and needs to (de)serialize to/from the
// snake_case wire form (`"service_id"`), not the derive default (variant
// name). Manual impls mirror `Intent`'s in `intent.rs`.
impl Serialize for SlotKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        SlotKey::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unknown slot key: {raw}")))
    }
}

impl SlotKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SlotKey::ServiceId => "service_id",
            SlotKey::Date => "date",
            SlotKey::Time => "time",
            SlotKey::StartDate => "start_date",
            SlotKey::EndDate => "end_date",
            SlotKey::DateRange => "date_range",
            SlotKey::DatetimeRange => "datetime_range",
            SlotKey::HasDatetime => "has_datetime",
            SlotKey::BookingId => "booking_id",
            SlotKey::Duration => "duration",
        }
    }

    pub fn parse(raw: &str) -> Option<SlotKey> {
        Some(match raw {
            "service_id" => SlotKey::ServiceId,
            "date" => SlotKey::Date,
            "time" => SlotKey::Time,
            "start_date" => SlotKey::StartDate,
            "end_date" => SlotKey::EndDate,
            "date_range" => SlotKey::DateRange,
            "datetime_range" => SlotKey::DatetimeRange,
            "has_datetime" => SlotKey::HasDatetime,
            "booking_id" => SlotKey::BookingId,
            "duration" => SlotKey::Duration,
            _ => return None,
        })
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A date span, used for both `date_range` and `time_range`-shaped values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A primitive slot value: string, ISO date, ISO datetime, boolean, or a
/// `{start, end}` span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Text(String),
    Date(NaiveDate),
    DateTime(chrono::NaiveTime),
    Bool(bool),
    Range(DateSpan),
}

impl SlotValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SlotValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            SlotValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SlotValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&DateSpan> {
        match self {
            SlotValue::Range(r) => Some(r),
            _ => None,
        }
    }
}

/// A present/absent map of slot key to slot value. A key is "present" only
/// if explicitly inserted — presence is never inferred.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slots(BTreeMap<SlotKey, SlotValue>);

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: SlotKey) -> Option<&SlotValue> {
        self.0.get(&key)
    }

    pub fn contains(&self, key: SlotKey) -> bool {
        self.0.contains_key(&key)
    }

    /// Insert only if absent. Returns `true` if the key was newly inserted.
    /// Every additive rule in `Promoter`/`Merger` goes through this so the
    /// "never overwrite" invariant is enforced in one place.
    pub fn insert_if_absent(&mut self, key: SlotKey, value: SlotValue) -> bool {
        if self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value);
        true
    }

    /// Unconditional set. Used only at slot-extraction time, never inside
    /// `Promoter` (which must never overwrite).
    pub fn set(&mut self, key: SlotKey, value: SlotValue) {
        self.0.insert(key, value);
    }

    pub fn remove(&mut self, key: SlotKey) -> Option<SlotValue> {
        self.0.remove(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &SlotValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Retain only the given keys, returning the dropped keys (for trace
    /// logging by `DomainFilter`).
    pub fn retain_keys(&self, allowed: &[SlotKey]) -> (Slots, Vec<SlotKey>) {
        let mut kept = Slots::new();
        let mut dropped = Vec::new();
        for (k, v) in self.iter() {
            if allowed.contains(&k) {
                kept.set(k, v.clone());
            } else {
                dropped.push(k);
            }
        }
        (kept, dropped)
    }

    /// Non-destructive merge: copy every present key from `other` over
    /// `self`, but never remove a key from `self` that `other` lacks.
    pub fn merge_non_destructive(&self, other: &Slots) -> Slots {
        let mut merged = self.clone();
        for (k, v) in other.iter() {
            merged.set(k, v.clone());
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_if_absent_never_overwrites() {
        let mut slots = Slots::new();
        slots.insert_if_absent(SlotKey::Date, SlotValue::Text("2026-03-10".into()));
        slots.insert_if_absent(SlotKey::Date, SlotValue::Text("2026-04-01".into()));
        assert_eq!(
            slots.get(SlotKey::Date),
            Some(&SlotValue::Text("2026-03-10".into()))
        );
    }

    #[test]
    fn merge_non_destructive_keeps_session_only_keys() {
        let mut session = Slots::new();
        session.set(SlotKey::ServiceId, SlotValue::Text("haircut".into()));
        session.set(SlotKey::Date, SlotValue::Text("2026-03-10".into()));

        let mut incoming = Slots::new();
        incoming.set(SlotKey::Time, SlotValue::Text("11:00".into()));

        let merged = session.merge_non_destructive(&incoming);
        assert!(merged.contains(SlotKey::ServiceId));
        assert!(merged.contains(SlotKey::Date));
        assert!(merged.contains(SlotKey::Time));
    }

    #[test]
    fn merge_non_destructive_lets_incoming_refine_a_value() {
        let mut session = Slots::new();
        session.set(SlotKey::Date, SlotValue::Text("tomorrow".into()));

        let mut incoming = Slots::new();
        incoming.set(SlotKey::Date, SlotValue::Text("2026-03-11".into()));

        let merged = session.merge_non_destructive(&incoming);
        assert_eq!(
            merged.get(SlotKey::Date),
            Some(&SlotValue::Text("2026-03-11".into()))
        );
    }

    #[test]
    fn retain_keys_reports_dropped_keys() {
        let mut slots = Slots::new();
        slots.set(SlotKey::ServiceId, SlotValue::Text("room".into()));
        slots.set(SlotKey::Time, SlotValue::Text("11:00".into()));

        let (kept, dropped) = slots.retain_keys(&[SlotKey::ServiceId, SlotKey::StartDate]);
        assert!(kept.contains(SlotKey::ServiceId));
        assert!(!kept.contains(SlotKey::Time));
        assert_eq!(dropped, vec![SlotKey::Time]);
    }
}
