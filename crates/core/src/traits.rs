//! Collaborator traits: the external systems this core talks to but does
//! not implement. The Orchestrator depends only on these traits;
//! `booking-persistence` and `booking-tools` provide concrete
//! implementations, and tests substitute fakes.

use crate::error::CoreResult;
use crate::intent::Domain;
use crate::nlu::{NluResponse, TenantContext};
use crate::session::SessionState;
use async_trait::async_trait;

/// `resolve(user_id, text, domain, timezone, tenant_context) -> NLU response`.
/// Out of scope to implement; the core only calls it.
#[async_trait]
pub trait NluProvider: Send + Sync {
    async fn resolve(
        &self,
        user_id: &str,
        text: &str,
        domain: Domain,
        timezone: &str,
        tenant_context: &TenantContext,
    ) -> CoreResult<NluResponse>;
}

/// Outcome of `ExecutionBackend.dispatch`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DispatchOutcome {
    pub status: DispatchStatus,
    pub booking_code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchStatus {
    Executed,
    Error,
}

/// `dispatch(action_name, facts, booking) -> {status, booking_code?, error?}`.
/// Idempotent-by-booking-code retries are encouraged, not required, of
/// implementations.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn dispatch(
        &self,
        action_name: &str,
        facts: &serde_json::Value,
        booking: &serde_json::Value,
    ) -> CoreResult<DispatchOutcome>;
}

/// `get/set/clear`. Key format `<prefix>:<domain>:user:<user_id>` is an
/// implementation detail of the store, not exposed here.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: &str, domain: Domain) -> CoreResult<Option<SessionState>>;

    async fn set(
        &self,
        user_id: &str,
        domain: Domain,
        state: &SessionState,
        ttl_seconds: u64,
    ) -> CoreResult<()>;

    async fn clear(&self, user_id: &str, domain: Domain) -> CoreResult<()>;
}
