//! Raw deserialization shape of `intent_signals.yaml`.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignalSet {
    #[serde(default)]
    pub any: Vec<String>,
    #[serde(default)]
    pub all: Vec<Vec<String>>,
    #[serde(default)]
    pub ordered: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntentSignalEntry {
    #[serde(default)]
    pub signals: SignalSet,
    #[serde(default)]
    pub required_slots: Vec<String>,
    #[serde(default)]
    pub intent_defining_slots: Vec<String>,
    #[serde(default)]
    pub is_booking: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntentSignalFile {
    pub intents: HashMap<String, IntentSignalEntry>,
}
