//! Raw deserialization shape of `intent_execution.yaml`.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub action: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhenMissing {
    pub any_of: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fallback {
    pub action: String,
    pub when_missing: WhenMissing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntentExecution {
    pub commit: Commit,
    #[serde(default)]
    pub fallbacks: Vec<Fallback>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntentExecutionFile {
    pub intents: HashMap<String, IntentExecution>,
}
