//! `booking-orchestrator` — the stateful per-turn control flow. Every
//! pure pipeline stage lives in `booking-dialogue`; this crate only
//! sequences them, performs the collaborator I/O, and holds the
//! per-`(user_id, domain)` lock.

pub mod control;
pub mod error;
pub mod locks;
pub mod orchestrator;

pub use control::ControlFlag;
pub use error::OrchestratorError;
pub use orchestrator::Orchestrator;
