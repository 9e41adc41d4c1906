use thiserror::Error;

use super::Role;
use crate::domains::calendar::models::WorkflowAction;

/// Authorization errors for workflow actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Role {role} may not {action} events")]
    RoleNotPermitted { role: Role, action: WorkflowAction },

    #[error("{role} must belong to the event's supervising entity to {action} it")]
    NotSupervisingEntity { role: Role, action: WorkflowAction },

    #[error("{role} must belong to the event's owning organization to {action} it")]
    NotOwningOrganization { role: Role, action: WorkflowAction },
}
