//! `HttpNluClient`: the concrete `NluProvider` bound to an HTTP
//! endpoint. The NLU provider is an out-of-scope external collaborator
//! specified only by interface — this is the thin adapter
//! `booking-server` needs to actually run against one, not a
//! reimplementation of NLU itself.

use async_trait::async_trait;
use booking_core::nlu::TenantContext as CoreTenantContext;
use booking_core::{CoreError, CoreResult, Domain, NluProvider, NluResponse};
use serde::Serialize;

#[derive(Serialize)]
struct ResolveRequest<'a> {
    user_id: &'a str,
    text: &'a str,
    domain: Domain,
    timezone: &'a str,
    tenant_context: &'a CoreTenantContext,
}

pub struct HttpNluClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNluClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpNluClient { client: reqwest::Client::new(), endpoint: endpoint.into() }
    }
}

#[async_trait]
impl NluProvider for HttpNluClient {
    async fn resolve(
        &self,
        user_id: &str,
        text: &str,
        domain: Domain,
        timezone: &str,
        tenant_context: &CoreTenantContext,
    ) -> CoreResult<NluResponse> {
        let body = ResolveRequest { user_id, text, domain, timezone, tenant_context };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| CoreError::NluUnavailable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(CoreError::NluUnavailable(format!("NLU provider returned HTTP {}", response.status())));
        }

        response.json::<NluResponse>().await.map_err(|err| CoreError::NluUnavailable(err.to_string()))
    }
}
