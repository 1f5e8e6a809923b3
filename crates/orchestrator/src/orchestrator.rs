//! `Orchestrator`: the single stateful node. Everything else in
//! `booking-dialogue` is a pure function over explicit inputs; this
//! module is the only place that performs I/O or holds a lock.

use crate::control::{self, ControlFlag};
use crate::error::OrchestratorError;
use crate::locks::ConversationLocks;
use booking_config::RuntimeConfigView;
use booking_core::clarification::ClarificationReason;
use booking_core::nlu::ConfirmationState;
use booking_core::outcome::{Awaiting, BookingView, ClarificationData, ClarificationFacts, TurnErrorCode, TurnOutcome, TurnRequest, TurnResponse};
use booking_core::{CoreError, Domain, ExecutionBackend, Intent, NluProvider, SessionStore, Slots, Status, TenantContext};
use booking_dialogue::decision::{self, DecisionStatus, Policy};
use booking_dialogue::{clarification, domain_filter, merger, plan_builder, promoter, turn_finalizer};
use booking_dialogue::plan_builder::PlanStatus;
use booking_dialogue::promoter::PromotionContext;
use std::sync::Arc;
use std::time::Duration;

pub struct Orchestrator {
    nlu: Arc<dyn NluProvider>,
    execution: Arc<dyn ExecutionBackend>,
    sessions: Arc<dyn SessionStore>,
    config: RuntimeConfigView,
    policy: Policy,
    locks: ConversationLocks,
}

impl Orchestrator {
    pub fn new(
        nlu: Arc<dyn NluProvider>,
        execution: Arc<dyn ExecutionBackend>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Orchestrator {
            nlu,
            execution,
            sessions,
            config: RuntimeConfigView::load(),
            policy: Policy::default(),
            locks: ConversationLocks::new(),
        }
    }

    fn lock_key(user_id: &str, domain: Domain) -> String {
        format!("{domain}:{user_id}")
    }

    /// The per-turn algorithm, wrapped in the per-`(user_id, domain)`
    /// mutex that serializes concurrent turns for the same conversation.
    pub async fn handle_turn(&self, request: TurnRequest) -> TurnResponse {
        let key = Self::lock_key(&request.user_id, request.domain);
        let _guard = self.locks.acquire(&key).await;

        match self.run_turn(&request).await {
            Ok(response) => response,
            Err(OrchestratorError::Nlu(_)) => {
                TurnResponse::failed(TurnErrorCode::MissingIntent, "NLU provider unavailable for this turn")
            }
            Err(OrchestratorError::UnsupportedIntent) => {
                TurnResponse::failed(TurnErrorCode::UnsupportedIntent, "resolved intent has no handling defined")
            }
        }
    }

    async fn run_turn(&self, request: &TurnRequest) -> Result<TurnResponse, OrchestratorError> {
        let domain = request.domain;
        let tenant_context: TenantContext = (&request.tenant_context).into();

        let session = self.load_session(&request.user_id, domain).await;

        let nlu_timeout = Duration::from_millis(self.config.nlu_timeout_ms);
        let nlu_response = match tokio::time::timeout(
            nlu_timeout,
            self.nlu.resolve(&request.user_id, &request.text, domain, &request.timezone, &tenant_context),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                tracing::error!(error = %err, user_id = %request.user_id, %domain, "NLU provider returned an error");
                return Err(OrchestratorError::Nlu(err));
            }
            Err(_) => {
                tracing::error!(user_id = %request.user_id, %domain, "NLU provider timed out");
                return Err(OrchestratorError::Nlu(CoreError::NluTimeout));
            }
        };

        let this_turn_slots = merger::extract_nlu_slots(&nlu_response, nlu_response.intent.name);
        let control_flag = control::classify(session.as_ref(), nlu_response.intent.name, &this_turn_slots);

        let mut nlu_response = nlu_response;
        let session = match control_flag {
            ControlFlag::IntentChange => {
                tracing::info!(
                    user_id = %request.user_id, %domain,
                    previous_intent = ?session.as_ref().map(|s| s.intent),
                    new_intent = %nlu_response.intent.name,
                    "intent change detected, resetting session"
                );
                None
            }
            ControlFlag::ContextualUpdate => {
                // Persisted intent never changes to CONTEXTUAL_UPDATE; keep
                // continuing the session's own CREATE_* intent.
                if let Some(session) = &session {
                    nlu_response.intent.name = session.intent;
                }
                session
            }
            ControlFlag::Continuation => session,
        };

        let merged = merger::merge(session.as_ref(), &nlu_response);
        let intent = merged.intent;

        if intent == Intent::Unknown {
            return Err(OrchestratorError::UnsupportedIntent);
        }

        let promotion_context = PromotionContext { date_roles: merged.date_roles.clone() };
        let promoted = promoter::promote(&merged.slots, intent, &promotion_context);
        let effective_domain = domain_for(intent, domain);
        let eff = domain_filter::apply(&promoted, intent, effective_domain);

        let awaiting_slot_before = session.as_ref().and_then(|s| s.awaiting_slot);
        let ts = turn_finalizer::finalize(
            intent,
            effective_domain,
            this_turn_slots.clone(),
            merged.slots.clone(),
            promoted,
            &this_turn_slots,
            awaiting_slot_before,
        );

        let (dec, trace) = decision::decide(merged.resolved_booking.as_ref(), &self.policy, intent, &tenant_context);
        tracing::info!(
            user_id = %request.user_id, %domain, %intent,
            missing_slots = ?ts.missing_slots,
            decision_status = ?dec.status,
            resolution_strategy = trace.resolution_strategy,
            expected_temporal_shape = ?trace.expected_temporal_shape,
            actual_temporal_shape = trace.actual_temporal_shape,
            "turn finalized"
        );

        let confirmation_state = nlu_response.booking.confirmation_state;
        let plan = plan_builder::plan(
            intent,
            &ts.missing_slots,
            merged.needs_clarification,
            confirmation_state,
            ts.awaiting_slot_after,
            &eff,
        );

        let (outcome, skip_persist) = match plan.status {
            PlanStatus::NeedsClarification => (
                self.build_clarification_outcome(intent, &ts.missing_slots, &nlu_response, &merged.context, dec.reason, &eff),
                false,
            ),
            PlanStatus::AwaitingConfirmation => (
                TurnOutcome::AwaitingConfirmation {
                    intent_name: intent.as_str().to_string(),
                    action_name: plan.blocked_actions.first().cloned().unwrap_or_default(),
                    booking: BookingView { confirmation_state: Some("pending".to_string()) },
                    slots: eff.clone(),
                    awaiting: Awaiting::UserConfirmation,
                },
                false,
            ),
            PlanStatus::Ready if dec.status == DecisionStatus::NeedsClarification => (
                self.build_clarification_outcome(intent, &[], &nlu_response, &merged.context, dec.reason, &eff),
                false,
            ),
            PlanStatus::Ready => match self.dispatch(intent, &plan.allowed_actions, &eff, &dec).await {
                ExecutionAttempt::Settled(outcome) => (outcome, false),
                ExecutionAttempt::TimedOut => {
                    // §5 fail-closed: a dispatch timeout must not be reported
                    // READY, and the prior session must survive untouched.
                    (self.build_timeout_outcome(intent, &merged.context, &eff), true)
                }
            },
        };

        if skip_persist {
            return Ok(TurnResponse::ok(outcome));
        }

        let new_status = status_for(&outcome);
        self.persist_or_clear(&request.user_id, domain, intent, &eff, &ts.missing_slots, &ts.awaiting_slot_after, new_status, &outcome)
            .await;

        Ok(TurnResponse::ok(outcome))
    }

    async fn load_session(&self, user_id: &str, domain: Domain) -> Option<booking_core::SessionState> {
        let timeout = Duration::from_millis(self.config.session_store_timeout_ms);
        match tokio::time::timeout(timeout, self.sessions.get(user_id, domain)).await {
            Ok(Ok(session)) => session,
            Ok(Err(err)) => {
                tracing::error!(error = %err, user_id, %domain, "session store get failed, continuing without prior session");
                None
            }
            Err(_) => {
                tracing::error!(user_id, %domain, "session store get timed out, continuing without prior session");
                None
            }
        }
    }

    fn build_clarification_outcome(
        &self,
        intent: Intent,
        missing_slots: &[booking_core::SlotKey],
        nlu_response: &booking_core::NluResponse,
        context: &serde_json::Value,
        decision_reason: Option<ClarificationReason>,
        effective_slots: &Slots,
    ) -> TurnOutcome {
        let built = clarification::build(missing_slots, &nlu_response.issues);
        let reason = if missing_slots.is_empty() {
            decision_reason.unwrap_or(built.reason)
        } else {
            built.reason
        };

        let ambiguous = built
            .data
            .ambiguous
            .into_iter()
            .map(|a| serde_json::json!({ "slot": a.slot, "detail": a.detail }))
            .collect();

        TurnOutcome::NeedsClarification {
            intent_name: intent.as_str().to_string(),
            clarification_reason: reason,
            template_key: format!("clarification.{}", reason.as_str().to_lowercase()),
            data: ClarificationData { reason, missing: built.data.missing, ambiguous, options: None },
            context: context.clone(),
            booking: None,
            facts: ClarificationFacts {
                slots: effective_slots.clone(),
                missing_slots: missing_slots.iter().map(|k| k.as_str().to_string()).collect(),
                context: context.clone(),
            },
        }
    }

    /// §5 fail-closed outcome for an external-call timeout that must not
    /// mutate persisted state: the accumulated slots are still surfaced
    /// (nothing was lost, the turn just couldn't complete), but
    /// `missing`/`ambiguous` are empty since no slot computation failed.
    fn build_timeout_outcome(&self, intent: Intent, context: &serde_json::Value, effective_slots: &Slots) -> TurnOutcome {
        let reason = ClarificationReason::NeedsClarification;
        TurnOutcome::NeedsClarification {
            intent_name: intent.as_str().to_string(),
            clarification_reason: reason,
            template_key: format!("clarification.{}", reason.as_str().to_lowercase()),
            data: ClarificationData { reason, missing: Vec::new(), ambiguous: Vec::new(), options: None },
            context: context.clone(),
            booking: None,
            facts: ClarificationFacts { slots: effective_slots.clone(), missing_slots: Vec::new(), context: context.clone() },
        }
    }

    async fn dispatch(
        &self,
        intent: Intent,
        allowed_actions: &[String],
        effective_slots: &Slots,
        dec: &decision::DecisionResult,
    ) -> ExecutionAttempt {
        let action_name = allowed_actions.first().cloned().unwrap_or_default();
        let facts = serde_json::to_value(effective_slots).unwrap_or(serde_json::Value::Null);
        let booking = serde_json::json!({ "service_id": dec.resolved_service_id });

        let timeout = Duration::from_millis(self.config.execution_timeout_ms);
        let dispatch_result = tokio::time::timeout(timeout, self.execution.dispatch(&action_name, &facts, &booking)).await;

        match dispatch_result {
            Ok(Ok(outcome)) if outcome.status == booking_core::DispatchStatus::Executed => {
                ExecutionAttempt::Settled(TurnOutcome::Executed {
                    intent_name: intent.as_str().to_string(),
                    action_name,
                    booking_code: outcome.booking_code,
                    booking: BookingView::default(),
                    slots: effective_slots.clone(),
                })
            }
            Ok(Ok(outcome)) => {
                tracing::error!(error = ?outcome.error, intent = %intent, action = %action_name, "execution backend reported an error status");
                ExecutionAttempt::Settled(TurnOutcome::Ready {
                    intent_name: intent.as_str().to_string(),
                    action_name,
                    booking_code: None,
                    booking: BookingView::default(),
                    slots: effective_slots.clone(),
                })
            }
            Ok(Err(err)) => {
                tracing::error!(error = %err, intent = %intent, action = %action_name, "execution backend dispatch failed");
                ExecutionAttempt::Settled(TurnOutcome::Ready {
                    intent_name: intent.as_str().to_string(),
                    action_name,
                    booking_code: None,
                    booking: BookingView::default(),
                    slots: effective_slots.clone(),
                })
            }
            Err(_) => {
                tracing::error!(intent = %intent, action = %action_name, "execution backend dispatch timed out");
                ExecutionAttempt::TimedOut
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn persist_or_clear(
        &self,
        user_id: &str,
        domain: Domain,
        intent: Intent,
        effective_slots: &Slots,
        missing_slots: &[booking_core::SlotKey],
        awaiting_slot: &Option<booking_core::SlotKey>,
        status: Status,
        outcome: &TurnOutcome,
    ) {
        let timeout = Duration::from_millis(self.config.session_store_timeout_ms);

        if !status.should_persist() {
            if let Err(err) = tokio::time::timeout(timeout, self.sessions.clear(user_id, domain)).await {
                tracing::error!(error = %err, user_id, %domain, "session store clear timed out");
            }
            return;
        }

        let mut state = booking_core::SessionState::fresh(intent);
        state.slots = effective_slots.clone();
        state.missing_slots = missing_slots.to_vec();
        state.status = status;
        state.awaiting_slot = *awaiting_slot;
        if let TurnOutcome::NeedsClarification { data, .. } = outcome {
            state.clarification = serde_json::to_value(data).ok();
        }

        match tokio::time::timeout(timeout, self.sessions.set(user_id, domain, &state, self.config.session_ttl_seconds)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::error!(error = %err, user_id, %domain, "session store set failed"),
            Err(_) => tracing::error!(user_id, %domain, "session store set timed out"),
        }
    }
}

/// `dispatch`'s own result, kept separate from `TurnOutcome` (and from
/// `booking_core::DispatchOutcome`, the execution backend's own result
/// shape) so `run_turn` can tell "a settled outcome to persist" apart
/// from "the call timed out, leave the prior session exactly as it was"
/// (§5 fail-closed).
enum ExecutionAttempt {
    Settled(TurnOutcome),
    TimedOut,
}

fn domain_for(intent: Intent, requested: Domain) -> Domain {
    intent.fixed_domain().unwrap_or(requested)
}

fn status_for(outcome: &TurnOutcome) -> Status {
    match outcome {
        TurnOutcome::Ready { .. } | TurnOutcome::Executed { .. } => Status::Ready,
        TurnOutcome::AwaitingConfirmation { .. } => Status::AwaitingConfirmation,
        TurnOutcome::NeedsClarification { .. } => Status::NeedsClarification,
    }
}
