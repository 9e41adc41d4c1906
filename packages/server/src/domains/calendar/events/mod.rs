//! Facts emitted after workflow decisions, for dashboards and notifiers.
//!
//! Events are published only after the outcome is final: a transition once
//! its write has committed, a denial once the guard has refused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{EventId, MemberId, OrganizationId};
use crate::domains::calendar::models::{Event, WorkflowAction, WorkflowState};
use crate::domains::calendar::workflow::ApprovalAuditTrail;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    EventTransitioned {
        event_id: EventId,
        owner_organization_id: OrganizationId,
        supervising_entity_id: OrganizationId,
        from_state: WorkflowState,
        to_state: WorkflowState,
        action: WorkflowAction,
        actor_id: MemberId,
        occurred_at: DateTime<Utc>,
    },
    AuthorizationDenied {
        event_id: EventId,
        owner_organization_id: OrganizationId,
        supervising_entity_id: OrganizationId,
        action: WorkflowAction,
        actor_id: MemberId,
        reason: String,
    },
}

impl WorkflowEvent {
    /// Built from the committed event; its last history entry is the
    /// transition just made.
    pub fn transitioned(event: &Event) -> Option<Self> {
        let entry = ApprovalAuditTrail::of(event).latest()?;
        Some(Self::EventTransitioned {
            event_id: event.id,
            owner_organization_id: event.owner_organization_id,
            supervising_entity_id: event.supervising_entity_id,
            from_state: entry.from_state,
            to_state: entry.to_state,
            action: entry.action,
            actor_id: entry.actor_id,
            occurred_at: entry.timestamp,
        })
    }

    pub fn denied(
        event: &Event,
        action: WorkflowAction,
        actor_id: MemberId,
        reason: impl Into<String>,
    ) -> Self {
        Self::AuthorizationDenied {
            event_id: event.id,
            owner_organization_id: event.owner_organization_id,
            supervising_entity_id: event.supervising_entity_id,
            action,
            actor_id,
            reason: reason.into(),
        }
    }

    /// Organizations that should hear about this: owner and supervisor.
    pub fn audience(&self) -> Vec<OrganizationId> {
        let (owner, supervisor) = match self {
            Self::EventTransitioned {
                owner_organization_id,
                supervising_entity_id,
                ..
            }
            | Self::AuthorizationDenied {
                owner_organization_id,
                supervising_entity_id,
                ..
            } => (*owner_organization_id, *supervising_entity_id),
        };
        if owner == supervisor {
            vec![owner]
        } else {
            vec![owner, supervisor]
        }
    }
}
