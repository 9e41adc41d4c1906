use thiserror::Error;

use crate::common::auth::AuthError;
use crate::common::EventId;
use crate::domains::calendar::models::{WorkflowAction, WorkflowState};

/// Failures surfaced by workflow operations. Nothing is recovered locally;
/// callers map each variant to their own response.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Invalid transition: cannot {requested} an event in state {from}")]
    InvalidTransition {
        from: WorkflowState,
        requested: &'static str,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(#[from] AuthError),

    #[error("Validation failed for {action}: {message}")]
    Validation {
        action: WorkflowAction,
        message: String,
    },

    #[error("Conflict: event {event_id} is no longer in state {expected}")]
    Conflict {
        event_id: EventId,
        expected: WorkflowState,
    },

    #[error("Event not found: {0}")]
    NotFound(EventId),

    #[error("Invalid pagination: {0}")]
    InvalidPagination(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl WorkflowError {
    pub fn invalid_transition(from: WorkflowState, action: WorkflowAction) -> Self {
        Self::InvalidTransition {
            from,
            requested: action.as_str(),
        }
    }

    /// Only a lost optimistic race is worth re-reading and retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
