//! Per-consumer config views: each downstream crate sees only the slice
//! of config it needs rather than the whole registry.

use crate::registry::{self, CompiledFallback, CompiledSignals, IntentRegistry};
use booking_core::Intent;

/// What `booking-dialogue` (`IntentResolver`, `PlanBuilder`) needs.
pub struct IntentConfigView {
    registry: &'static IntentRegistry,
}

impl IntentConfigView {
    pub fn load() -> Self {
        IntentConfigView {
            registry: registry::registry(),
        }
    }

    pub fn commit_action(&self, intent: Intent) -> Option<&'static str> {
        self.registry
            .execution_plan(intent)
            .map(|plan| plan.commit_action.as_str())
    }

    pub fn fallbacks(&self, intent: Intent) -> &'static [CompiledFallback] {
        self.registry
            .execution_plan(intent)
            .map(|plan| plan.fallbacks.as_slice())
            .unwrap_or(&[])
    }

    pub fn signals(&self, intent: Intent) -> Option<&'static CompiledSignals> {
        self.registry.signals_for(intent)
    }

    pub fn signal_priority_entries(&self) -> impl Iterator<Item = (Intent, &'static CompiledSignals)> {
        self.registry.signal_priority_entries()
    }
}

impl Default for IntentConfigView {
    fn default() -> Self {
        Self::load()
    }
}

/// What `booking-orchestrator` needs: timeouts and TTLs, not intent
/// tables. Defaults match a 30-60 minute session TTL and conservative
/// per-external-call deadlines.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfigView {
    pub session_ttl_seconds: u64,
    pub nlu_timeout_ms: u64,
    pub execution_timeout_ms: u64,
    pub session_store_timeout_ms: u64,
}

impl Default for RuntimeConfigView {
    fn default() -> Self {
        RuntimeConfigView {
            session_ttl_seconds: 45 * 60,
            nlu_timeout_ms: 2_500,
            execution_timeout_ms: 5_000,
            session_store_timeout_ms: 500,
        }
    }
}

impl RuntimeConfigView {
    /// Layers defaults < environment overrides (`BOOKING_*`). There is no
    /// YAML file for this view — just the four scalars above — so the
    /// middle layer of the usual defaults-<-file-<-env stack is a no-op
    /// here.
    pub fn load() -> Self {
        let defaults = RuntimeConfigView::default();
        let builder = config::Config::builder()
            .set_default("session_ttl_seconds", defaults.session_ttl_seconds)
            .and_then(|b| b.set_default("nlu_timeout_ms", defaults.nlu_timeout_ms))
            .and_then(|b| b.set_default("execution_timeout_ms", defaults.execution_timeout_ms))
            .and_then(|b| b.set_default("session_store_timeout_ms", defaults.session_store_timeout_ms))
            .and_then(|b| b.add_source(config::Environment::with_prefix("BOOKING")).build());

        match builder {
            Ok(cfg) => RuntimeConfigView {
                session_ttl_seconds: cfg.get("session_ttl_seconds").unwrap_or(defaults.session_ttl_seconds),
                nlu_timeout_ms: cfg.get("nlu_timeout_ms").unwrap_or(defaults.nlu_timeout_ms),
                execution_timeout_ms: cfg
                    .get("execution_timeout_ms")
                    .unwrap_or(defaults.execution_timeout_ms),
                session_store_timeout_ms: cfg
                    .get("session_store_timeout_ms")
                    .unwrap_or(defaults.session_store_timeout_ms),
            },
            Err(err) => {
                tracing::error!(error = %err, "runtime config load failed, using defaults");
                defaults
            }
        }
    }
}
