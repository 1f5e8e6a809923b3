//! `booking-dialogue` — the pure per-turn pipeline: Merger → Promoter →
//! DomainFilter → TurnFinalizer → DecisionLayer → PlanBuilder →
//! ClarificationBuilder, plus the IntentResolver and SlotContract they
//! lean on. Nothing here performs I/O; every function is a plain
//! transform over explicit inputs — the Orchestrator is the only
//! stateful node.

pub mod clarification;
pub mod decision;
pub mod domain_filter;
pub mod intent_resolver;
pub mod merger;
pub mod plan_builder;
pub mod promoter;
pub mod slot_contract;
pub mod turn_finalizer;

pub use clarification::{AmbiguousSlot, ClarificationData, ClarificationResult};
pub use decision::{DecisionResult, DecisionStatus, DecisionTrace, EffectiveTime, Policy};
pub use intent_resolver::IntentResolution;
pub use merger::MergedResponse;
pub use plan_builder::{PlanResult, PlanStatus};
pub use promoter::PromotionContext;
pub use turn_finalizer::TurnState;
