//! `booking-config` — loads and compiles `intent_execution.yaml` /
//! `intent_signals.yaml` once per process into immutable, shared views.

pub mod error;
pub mod execution;
pub mod registry;
pub mod signals;
pub mod views;

pub use error::ConfigError;
pub use registry::{registry, CompiledFallback, CompiledSignals, ExecutionPlan, IntentRegistry};
pub use views::{IntentConfigView, RuntimeConfigView};
