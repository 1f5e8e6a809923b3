//! Shared Axum app state: one `Orchestrator`, cloned cheaply per
//! request (it's `Arc` internally — see `booking_orchestrator`).

use booking_orchestrator::Orchestrator;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub metrics_handle: PrometheusHandle,
}
