//! `InProcessExecutionBackend`: a reference `ExecutionBackend` that
//! commits bookings in-process rather than calling out to a real
//! scheduling system. A per-action dispatch table rather than a
//! discoverable tool registry, since the contract here is one
//! `dispatch` call.

use crate::error::ToolsError;
use async_trait::async_trait;
use booking_core::traits::{DispatchOutcome, DispatchStatus};
use booking_core::{CoreError, CoreResult, ExecutionBackend};
use std::collections::HashSet;
use uuid::Uuid;

/// Declares what each action does on dispatch: commit actions produce a
/// `booking_code`; informational actions (availability, quote, discovery…)
/// execute with none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    Commit,
    Informational,
}

fn action_kind(action_name: &str) -> Option<ActionKind> {
    match action_name {
        "book_appointment" | "book_reservation" | "modify_booking" | "cancel_booking" => {
            Some(ActionKind::Commit)
        }
        "lookup_booking" | "check_availability" | "provide_details" | "provide_quote"
        | "discovery_search" | "recommend_services" | "initiate_payment" => {
            Some(ActionKind::Informational)
        }
        _ => None,
    }
}

pub struct InProcessExecutionBackend {
    known_actions: HashSet<&'static str>,
}

impl InProcessExecutionBackend {
    pub fn new() -> Self {
        InProcessExecutionBackend {
            known_actions: [
                "book_appointment",
                "book_reservation",
                "modify_booking",
                "cancel_booking",
                "lookup_booking",
                "check_availability",
                "provide_details",
                "provide_quote",
                "discovery_search",
                "recommend_services",
                "initiate_payment",
            ]
            .into_iter()
            .collect(),
        }
    }

    fn generate_booking_code() -> String {
        format!("BK-{}", Uuid::new_v4().simple())
    }
}

impl Default for InProcessExecutionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionBackend for InProcessExecutionBackend {
    async fn dispatch(
        &self,
        action_name: &str,
        _facts: &serde_json::Value,
        _booking: &serde_json::Value,
    ) -> CoreResult<DispatchOutcome> {
        if !self.known_actions.contains(action_name) {
            let err = ToolsError::UnknownAction(action_name.to_string());
            tracing::error!(action = action_name, error = %err, "execution backend received an unknown action");
            return Err(CoreError::ExecutionFailed(err.to_string()));
        }

        let booking_code = match action_kind(action_name) {
            Some(ActionKind::Commit) => Some(Self::generate_booking_code()),
            _ => None,
        };

        Ok(DispatchOutcome { status: DispatchStatus::Executed, booking_code, error: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_action_produces_a_booking_code() {
        let backend = InProcessExecutionBackend::new();
        let outcome = backend
            .dispatch("book_appointment", &serde_json::json!({}), &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(outcome.status, DispatchStatus::Executed);
        assert!(outcome.booking_code.unwrap().starts_with("BK-"));
    }

    #[tokio::test]
    async fn informational_action_has_no_booking_code() {
        let backend = InProcessExecutionBackend::new();
        let outcome = backend
            .dispatch("check_availability", &serde_json::json!({}), &serde_json::json!({}))
            .await
            .unwrap();
        assert!(outcome.booking_code.is_none());
    }

    #[tokio::test]
    async fn unknown_action_is_an_execution_error() {
        let backend = InProcessExecutionBackend::new();
        let result = backend
            .dispatch("fly_to_the_moon", &serde_json::json!({}), &serde_json::json!({}))
            .await;
        assert!(result.is_err());
    }
}
