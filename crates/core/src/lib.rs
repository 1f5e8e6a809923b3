//! `booking-core` — shared domain types and collaborator traits for the
//! booking orchestrator. No I/O lives here; every type is plain data or a
//! trait implemented elsewhere.

pub mod clarification;
pub mod error;
pub mod intent;
pub mod nlu;
pub mod outcome;
pub mod session;
pub mod slots;
pub mod traits;

pub use clarification::ClarificationReason;
pub use error::{CoreError, CoreResult};
pub use intent::{BookingMode, Domain, Intent, ModificationContext, TemporalShape};
pub use nlu::{NluResponse, ResolvedBooking, TenantContext};
pub use outcome::{TurnErrorCode, TurnOutcome, TurnRequest, TurnResponse};
pub use session::{SessionState, Status};
pub use slots::{SlotKey, SlotValue, Slots};
pub use traits::{DispatchOutcome, DispatchStatus, ExecutionBackend, NluProvider, SessionStore};
