use serde::{Deserialize, Serialize};

use super::{AuthError, AuthorizationGuard, Role};
use crate::common::entity_ids::{MemberId, OrganizationId};
use crate::domains::calendar::models::{Event, WorkflowAction};

/// The authenticated identity executing a transition.
///
/// Resolved by the identity provider before any workflow call; the workflow
/// never looks roles up on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: MemberId,
    pub name: String,
    pub role: Role,
    pub organization_id: OrganizationId,
}

impl Actor {
    pub fn new(
        id: MemberId,
        name: impl Into<String>,
        role: Role,
        organization_id: OrganizationId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            organization_id,
        }
    }

    /// Specify what action the actor wants to perform
    pub fn can(&self, action: WorkflowAction) -> ActionCheck<'_> {
        ActionCheck {
            actor: self,
            action,
        }
    }
}

/// Builder after specifying the action
pub struct ActionCheck<'a> {
    actor: &'a Actor,
    action: WorkflowAction,
}

impl<'a> ActionCheck<'a> {
    /// Specify the event the action targets
    pub fn on<'e>(self, event: &'e Event) -> EventCheck<'a, 'e> {
        EventCheck {
            actor: self.actor,
            action: self.action,
            event,
        }
    }
}

/// Builder after specifying the target event
pub struct EventCheck<'a, 'e> {
    actor: &'a Actor,
    action: WorkflowAction,
    event: &'e Event,
}

impl EventCheck<'_, '_> {
    /// Perform the authorization check
    pub fn check(self) -> Result<(), AuthError> {
        AuthorizationGuard::authorize(self.actor, self.action, self.event)
    }
}
