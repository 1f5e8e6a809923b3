//! `tracing` + Prometheus bootstrap. `init_tracing()` sets up a single
//! `fmt` subscriber, JSON in production, `env-filter` driven by
//! `RUST_LOG`. `install_metrics_recorder()` wires `metrics-exporter-
//! prometheus` so `GET /metrics` has a recorder to scrape.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).json().init();
}

pub fn install_metrics_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("prometheus recorder installs exactly once per process")
}

/// Turn-level counters/histogram, recorded once per `POST /v1/turn`:
/// counts turns by outcome status and histograms per-turn latency.
pub fn record_turn(outcome_status: &str, elapsed: std::time::Duration) {
    metrics::counter!("booking_turns_total", "status" => outcome_status.to_string()).increment(1);
    metrics::histogram!("booking_turn_duration_seconds").record(elapsed.as_secs_f64());
}
