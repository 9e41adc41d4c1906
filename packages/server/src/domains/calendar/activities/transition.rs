//! Workflow transitions - entry-point functions for state changes
//!
//! Every write goes through the same path: resolve the target state,
//! authorize the actor, validate the comment, apply, then save with the
//! prior state and version as the optimistic guard. A failure at any step
//! leaves the stored event untouched.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::common::auth::Actor;
use crate::common::EventId;
use crate::domains::calendar::events::WorkflowEvent;
use crate::domains::calendar::models::{Event, WorkflowAction, WorkflowState};
use crate::domains::calendar::workflow::{transitions, ApprovalAuditTrail, WorkflowError};
use crate::kernel::ServerDeps;

/// A validated, authorized transition that has not been saved yet.
#[derive(Debug, Clone)]
pub struct PreparedTransition {
    /// State the event was read in; the save only lands if it still is.
    pub expected_state: WorkflowState,
    /// The event as it will look once saved.
    pub event: Event,
}

/// Check and apply `action` to an in-memory copy of `event`.
///
/// Pure: nothing is persisted or published.
pub fn prepare_transition(
    event: &Event,
    action: WorkflowAction,
    actor: &Actor,
    comment: Option<&str>,
    at: DateTime<Utc>,
) -> Result<PreparedTransition, WorkflowError> {
    transitions::resolve_next_state(event.workflow_state, action)?;
    actor.can(action).on(event).check()?;
    let (to_state, entry) = transitions::apply(event, action, actor, comment, at)?;

    let mut next = event.clone();
    if let Some(note) = &entry.comment {
        next.approval_comments = Some(note.clone());
    }
    ApprovalAuditTrail::append(&mut next, entry)?;

    next.workflow_state = to_state;
    if to_state.is_approval_milestone() {
        next.approved_by = Some(actor.id);
        next.approved_at = Some(at);
    }
    next.updated_at = at;
    next.version = event.version + 1;

    Ok(PreparedTransition {
        expected_state: event.workflow_state,
        event: next,
    })
}

/// Save a prepared transition and announce it.
pub async fn commit_transition(
    prepared: PreparedTransition,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    let PreparedTransition {
        expected_state,
        event,
    } = prepared;

    if let Err(err) = deps.event_store.save_event(&event, expected_state).await {
        if err.is_retryable() {
            warn!(
                event_id = %event.id,
                expected = %expected_state,
                "Transition lost a concurrent update"
            );
        }
        return Err(err);
    }

    info!(
        event_id = %event.id,
        from = %expected_state,
        to = %event.workflow_state,
        "Event transitioned"
    );

    if let Some(fact) = WorkflowEvent::transitioned(&event) {
        deps.workflow_feed.publish(fact).await;
    }
    Ok(event)
}

/// Load, transition and save one event.
pub async fn transition_event(
    event_id: EventId,
    action: WorkflowAction,
    actor: &Actor,
    comment: Option<&str>,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    let event = deps.event_store.load_event(event_id).await?;
    run_transition(&event, action, actor, comment, deps).await
}

async fn run_transition(
    event: &Event,
    action: WorkflowAction,
    actor: &Actor,
    comment: Option<&str>,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    info!(
        event_id = %event.id,
        action = %action,
        actor_id = %actor.id,
        role = %actor.role,
        "Transitioning event"
    );

    let prepared = match prepare_transition(event, action, actor, comment, Utc::now()) {
        Ok(prepared) => prepared,
        Err(WorkflowError::PermissionDenied(reason)) => {
            warn!(
                event_id = %event.id,
                action = %action,
                actor_id = %actor.id,
                %reason,
                "Transition denied"
            );
            deps.workflow_feed
                .publish(WorkflowEvent::denied(event, action, actor.id, reason.to_string()))
                .await;
            return Err(WorkflowError::PermissionDenied(reason));
        }
        Err(err) => return Err(err),
    };

    commit_transition(prepared, deps).await
}

pub async fn submit_event(
    event_id: EventId,
    actor: &Actor,
    comment: Option<&str>,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    transition_event(event_id, WorkflowAction::Submit, actor, comment, deps).await
}

pub async fn approve_internal(
    event_id: EventId,
    actor: &Actor,
    comment: Option<&str>,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    transition_event(event_id, WorkflowAction::ApproveInternal, actor, comment, deps).await
}

pub async fn request_public_approval(
    event_id: EventId,
    actor: &Actor,
    comment: Option<&str>,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    transition_event(event_id, WorkflowAction::RequestPublicApproval, actor, comment, deps).await
}

pub async fn approve_public(
    event_id: EventId,
    actor: &Actor,
    comment: Option<&str>,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    transition_event(event_id, WorkflowAction::ApprovePublic, actor, comment, deps).await
}

pub async fn publish_event(
    event_id: EventId,
    actor: &Actor,
    comment: Option<&str>,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    transition_event(event_id, WorkflowAction::Publish, actor, comment, deps).await
}

/// Single "approve" button: the step is inferred from the current state.
pub async fn approve_event(
    event_id: EventId,
    actor: &Actor,
    comment: Option<&str>,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    let event = deps.event_store.load_event(event_id).await?;
    let rule = transitions::resolve_unified_approve(event.workflow_state)?;
    run_transition(&event, rule.action, actor, comment, deps).await
}

pub async fn request_changes(
    event_id: EventId,
    actor: &Actor,
    comment: &str,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    transition_event(event_id, WorkflowAction::RequestChanges, actor, Some(comment), deps).await
}

pub async fn reject_event(
    event_id: EventId,
    actor: &Actor,
    comment: &str,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    transition_event(event_id, WorkflowAction::Reject, actor, Some(comment), deps).await
}

pub async fn resubmit_event(
    event_id: EventId,
    actor: &Actor,
    comment: Option<&str>,
    deps: &ServerDeps,
) -> Result<Event, WorkflowError> {
    transition_event(event_id, WorkflowAction::Resubmit, actor, comment, deps).await
}
