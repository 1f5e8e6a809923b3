//! The per-turn API request/response shapes. Transport-independent:
//! `booking-server` is the only crate that binds these to HTTP, but the
//! shapes themselves belong to the core contract.

use crate::clarification::ClarificationReason;
use crate::intent::{BookingMode, Domain};
use crate::nlu::TenantContext;
use crate::slots::Slots;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct TenantContextInput {
    pub booking_mode: BookingMode,
    #[serde(default)]
    pub aliases: Option<HashMap<String, String>>,
}

/// Per-turn request.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    pub user_id: String,
    pub text: String,
    pub domain: Domain,
    pub timezone: String,
    pub tenant_context: TenantContextInput,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
}

impl From<&TenantContextInput> for TenantContext {
    fn from(input: &TenantContextInput) -> Self {
        TenantContext {
            booking_mode: Some(input.booking_mode),
            aliases: input.aliases.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Awaiting {
    UserConfirmation,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BookingView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_state: Option<String>,
}

/// `data` payload of a NEEDS_CLARIFICATION outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ClarificationData {
    pub reason: ClarificationReason,
    pub missing: Vec<String>,
    pub ambiguous: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClarificationFacts {
    pub slots: Slots,
    pub missing_slots: Vec<String>,
    pub context: serde_json::Value,
}

/// Outcome variants, tagged by `status`. `EXECUTED` and `READY` share a
/// shape; `EXECUTED` is only ever constructed after a successful dispatch
/// (see `crate::session::Status`).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum TurnOutcome {
    #[serde(rename = "READY")]
    Ready {
        intent_name: String,
        action_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        booking_code: Option<String>,
        booking: BookingView,
        slots: Slots,
    },
    #[serde(rename = "EXECUTED")]
    Executed {
        intent_name: String,
        action_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        booking_code: Option<String>,
        booking: BookingView,
        slots: Slots,
    },
    #[serde(rename = "AWAITING_CONFIRMATION")]
    AwaitingConfirmation {
        intent_name: String,
        action_name: String,
        booking: BookingView,
        slots: Slots,
        awaiting: Awaiting,
    },
    #[serde(rename = "NEEDS_CLARIFICATION")]
    NeedsClarification {
        intent_name: String,
        clarification_reason: ClarificationReason,
        template_key: String,
        data: ClarificationData,
        context: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        booking: Option<BookingView>,
        facts: ClarificationFacts,
    },
}

/// Top-level error codes surfaced without touching session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnErrorCode {
    MissingIntent,
    UnsupportedIntent,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TurnOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TurnErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TurnResponse {
    pub fn ok(outcome: TurnOutcome) -> Self {
        TurnResponse {
            success: true,
            outcome: Some(outcome),
            error: None,
            message: None,
        }
    }

    pub fn failed(error: TurnErrorCode, message: impl Into<String>) -> Self {
        TurnResponse {
            success: false,
            outcome: None,
            error: Some(error),
            message: Some(message.into()),
        }
    }
}
