//! `HttpExecutionBackend`: a concrete `ExecutionBackend` that dispatches
//! to a real scheduling system over HTTP, alongside
//! `InProcessExecutionBackend`'s in-process reference implementation.
//! Like `booking_persistence::RedisSessionStore`, the execution backend
//! is an out-of-scope external collaborator specified only by
//! interface — this crate still ships a concrete adapter against it.

use crate::error::ToolsError;
use async_trait::async_trait;
use booking_core::traits::DispatchOutcome;
use booking_core::{CoreError, CoreResult, ExecutionBackend};
use serde::Serialize;

#[derive(Serialize)]
struct DispatchRequest<'a> {
    action_name: &'a str,
    facts: &'a serde_json::Value,
    booking: &'a serde_json::Value,
}

pub struct HttpExecutionBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpExecutionBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpExecutionBackend { client: reqwest::Client::new(), endpoint: endpoint.into() }
    }

    async fn dispatch_inner(
        &self,
        action_name: &str,
        facts: &serde_json::Value,
        booking: &serde_json::Value,
    ) -> Result<DispatchOutcome, ToolsError> {
        let body = DispatchRequest { action_name, facts, booking };
        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let outcome = response.json::<DispatchOutcome>().await?;
        Ok(outcome)
    }
}

#[async_trait]
impl ExecutionBackend for HttpExecutionBackend {
    async fn dispatch(
        &self,
        action_name: &str,
        facts: &serde_json::Value,
        booking: &serde_json::Value,
    ) -> CoreResult<DispatchOutcome> {
        self.dispatch_inner(action_name, facts, booking).await.map_err(|err| {
            tracing::error!(error = %err, action = action_name, "execution backend HTTP dispatch failed");
            CoreError::ExecutionFailed(err.to_string())
        })
    }
}
