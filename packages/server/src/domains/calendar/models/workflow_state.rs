use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::impl_text_sqlx_type;

/// Lifecycle stage of a calendar event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Draft,
    PendingInternalApproval,
    ApprovedInternal,
    PendingPublicApproval,
    Published,
    RequiresChanges,
    Rejected,
    Cancelled,
}

impl WorkflowState {
    pub const ALL: [WorkflowState; 8] = [
        WorkflowState::Draft,
        WorkflowState::PendingInternalApproval,
        WorkflowState::ApprovedInternal,
        WorkflowState::PendingPublicApproval,
        WorkflowState::Published,
        WorkflowState::RequiresChanges,
        WorkflowState::Rejected,
        WorkflowState::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Draft => "draft",
            WorkflowState::PendingInternalApproval => "pending_internal_approval",
            WorkflowState::ApprovedInternal => "approved_internal",
            WorkflowState::PendingPublicApproval => "pending_public_approval",
            WorkflowState::Published => "published",
            WorkflowState::RequiresChanges => "requires_changes",
            WorkflowState::Rejected => "rejected",
            WorkflowState::Cancelled => "cancelled",
        }
    }

    /// States out of which no `request_changes` or `reject` is ever allowed.
    pub fn is_terminal_for_negative_actions(&self) -> bool {
        matches!(
            self,
            WorkflowState::Rejected | WorkflowState::Published | WorkflowState::Cancelled
        )
    }

    /// Targets that stamp `approved_by` / `approved_at`.
    pub fn is_approval_milestone(&self) -> bool {
        matches!(
            self,
            WorkflowState::ApprovedInternal | WorkflowState::Published
        )
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        WorkflowState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid workflow state: {}", s))
    }
}

impl_text_sqlx_type!(WorkflowState);

/// Named action that triggers a transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Submit,
    ApproveInternal,
    RequestPublicApproval,
    ApprovePublic,
    /// Same transition as `ApprovePublic`, kept for callers that name it this way.
    Publish,
    RequestChanges,
    Reject,
    Resubmit,
}

impl WorkflowAction {
    pub const ALL: [WorkflowAction; 8] = [
        WorkflowAction::Submit,
        WorkflowAction::ApproveInternal,
        WorkflowAction::RequestPublicApproval,
        WorkflowAction::ApprovePublic,
        WorkflowAction::Publish,
        WorkflowAction::RequestChanges,
        WorkflowAction::Reject,
        WorkflowAction::Resubmit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Submit => "submit",
            WorkflowAction::ApproveInternal => "approve_internal",
            WorkflowAction::RequestPublicApproval => "request_public_approval",
            WorkflowAction::ApprovePublic => "approve_public",
            WorkflowAction::Publish => "publish",
            WorkflowAction::RequestChanges => "request_changes",
            WorkflowAction::Reject => "reject",
            WorkflowAction::Resubmit => "resubmit",
        }
    }

    /// `request_changes` and `reject` are the negative actions guarded by
    /// the terminal-state rule.
    pub fn is_negative(&self) -> bool {
        matches!(self, WorkflowAction::RequestChanges | WorkflowAction::Reject)
    }
}

impl std::fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        WorkflowAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid workflow action: {}", s))
    }
}

impl_text_sqlx_type!(WorkflowAction);
