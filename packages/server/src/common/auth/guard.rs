use lazy_static::lazy_static;
use std::collections::HashMap;

use super::{Actor, AuthError, Role, RoleScope};
use crate::domains::calendar::models::{Event, WorkflowAction};

/// Permission matrix: which roles may execute each action.
///
/// Scope comes from the role (see `Role::scope`), so `organizer_admin` is
/// always checked against the owning organization and entity roles against
/// the supervising entity.
const PERMISSION_MATRIX: [(WorkflowAction, &[Role]); 8] = [
    (
        WorkflowAction::Submit,
        &[Role::OrganizerAdmin, Role::EntityStaff, Role::EntityAdmin],
    ),
    (
        WorkflowAction::ApproveInternal,
        &[Role::EntityAdmin, Role::EntityStaff, Role::PlatformAdmin],
    ),
    (
        WorkflowAction::RequestPublicApproval,
        &[Role::EntityStaff, Role::EntityAdmin],
    ),
    (
        WorkflowAction::ApprovePublic,
        &[Role::EntityAdmin, Role::PlatformAdmin],
    ),
    (
        WorkflowAction::Publish,
        &[Role::EntityAdmin, Role::PlatformAdmin],
    ),
    (
        WorkflowAction::RequestChanges,
        &[Role::EntityAdmin, Role::EntityStaff, Role::PlatformAdmin],
    ),
    (
        WorkflowAction::Reject,
        &[Role::EntityAdmin, Role::EntityStaff, Role::PlatformAdmin],
    ),
    (WorkflowAction::Resubmit, &[Role::OrganizerAdmin]),
];

lazy_static! {
    static ref PERMISSIONS: HashMap<WorkflowAction, &'static [Role]> =
        PERMISSION_MATRIX.into_iter().collect();
}

/// Decides whether an actor may execute an action on an event.
///
/// Independent of whether the transition is structurally valid; the workflow
/// requires both checks to pass.
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Roles allowed to execute `action`.
    pub fn allowed_roles(action: WorkflowAction) -> &'static [Role] {
        PERMISSIONS.get(&action).copied().unwrap_or(&[])
    }

    pub fn authorize(
        actor: &Actor,
        action: WorkflowAction,
        event: &Event,
    ) -> Result<(), AuthError> {
        let role = actor.role;
        if !Self::allowed_roles(action).contains(&role) {
            return Err(AuthError::RoleNotPermitted { role, action });
        }

        match role.scope() {
            RoleScope::Global => Ok(()),
            RoleScope::SupervisingEntity => {
                if actor.organization_id == event.supervising_entity_id {
                    Ok(())
                } else {
                    Err(AuthError::NotSupervisingEntity { role, action })
                }
            }
            RoleScope::OwningOrganization => {
                if actor.organization_id == event.owner_organization_id {
                    Ok(())
                } else {
                    Err(AuthError::NotOwningOrganization { role, action })
                }
            }
        }
    }
}
