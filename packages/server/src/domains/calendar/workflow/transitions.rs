//! Fixed transition table of the publication workflow.
//!
//! The table is data: a map keyed by `(from_state, action)`. Negative actions
//! (`request_changes`, `reject`) get a row for every state outside the
//! terminal set, so the terminal guard is expressed by the absence of rows.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use std::collections::HashMap;

use super::WorkflowError;
use crate::common::auth::{Actor, AuthorizationGuard, Role};
use crate::common::AuditEntryId;
use crate::domains::calendar::models::{AuditEntry, Event, WorkflowAction, WorkflowState};

/// Minimum reason length (in characters, after trimming) for `reject`.
pub const REJECT_MIN_COMMENT_LENGTH: usize = 10;

/// Minimum reason length (in characters, after trimming) for `request_changes`.
pub const REQUEST_CHANGES_MIN_COMMENT_LENGTH: usize = 20;

/// Happy-path rows: `(from, action, to)`.
const FORWARD_TRANSITIONS: [(WorkflowState, WorkflowAction, WorkflowState); 6] = [
    (
        WorkflowState::Draft,
        WorkflowAction::Submit,
        WorkflowState::PendingInternalApproval,
    ),
    (
        WorkflowState::PendingInternalApproval,
        WorkflowAction::ApproveInternal,
        WorkflowState::ApprovedInternal,
    ),
    (
        WorkflowState::ApprovedInternal,
        WorkflowAction::RequestPublicApproval,
        WorkflowState::PendingPublicApproval,
    ),
    (
        WorkflowState::PendingPublicApproval,
        WorkflowAction::ApprovePublic,
        WorkflowState::Published,
    ),
    (
        WorkflowState::PendingPublicApproval,
        WorkflowAction::Publish,
        WorkflowState::Published,
    ),
    (
        WorkflowState::RequiresChanges,
        WorkflowAction::Resubmit,
        WorkflowState::PendingInternalApproval,
    ),
];

/// Rows available out of every non-terminal state.
const NEGATIVE_TRANSITIONS: [(WorkflowAction, WorkflowState); 2] = [
    (WorkflowAction::RequestChanges, WorkflowState::RequiresChanges),
    (WorkflowAction::Reject, WorkflowState::Rejected),
];

/// The single-button "approve" path: the action is inferred from the state.
const UNIFIED_APPROVE: [(WorkflowState, WorkflowAction); 3] = [
    (
        WorkflowState::PendingInternalApproval,
        WorkflowAction::ApproveInternal,
    ),
    (
        WorkflowState::ApprovedInternal,
        WorkflowAction::RequestPublicApproval,
    ),
    (
        WorkflowState::PendingPublicApproval,
        WorkflowAction::ApprovePublic,
    ),
];

/// One permitted state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRule {
    pub from_state: WorkflowState,
    pub action: WorkflowAction,
    pub to_state: WorkflowState,
    pub allowed_roles: &'static [Role],
    pub requires_comment: bool,
    pub min_comment_length: usize,
}

impl TransitionRule {
    fn new(from_state: WorkflowState, action: WorkflowAction, to_state: WorkflowState) -> Self {
        let min_comment_length = min_comment_length(action);
        Self {
            from_state,
            action,
            to_state,
            allowed_roles: AuthorizationGuard::allowed_roles(action),
            requires_comment: min_comment_length > 0,
            min_comment_length,
        }
    }
}

fn min_comment_length(action: WorkflowAction) -> usize {
    match action {
        WorkflowAction::Reject => REJECT_MIN_COMMENT_LENGTH,
        WorkflowAction::RequestChanges => REQUEST_CHANGES_MIN_COMMENT_LENGTH,
        _ => 0,
    }
}

fn build_transition_table() -> HashMap<(WorkflowState, WorkflowAction), TransitionRule> {
    let forward = FORWARD_TRANSITIONS
        .into_iter()
        .map(|(from, action, to)| TransitionRule::new(from, action, to));

    let negative = WorkflowState::ALL
        .into_iter()
        .filter(|state| !state.is_terminal_for_negative_actions())
        .flat_map(|from| {
            NEGATIVE_TRANSITIONS
                .into_iter()
                .map(move |(action, to)| TransitionRule::new(from, action, to))
        });

    forward
        .chain(negative)
        .map(|rule| ((rule.from_state, rule.action), rule))
        .collect()
}

lazy_static! {
    static ref TRANSITIONS: HashMap<(WorkflowState, WorkflowAction), TransitionRule> =
        build_transition_table();
}

/// Look up the rule for `(state, action)`.
pub fn rule_for(
    state: WorkflowState,
    action: WorkflowAction,
) -> Result<&'static TransitionRule, WorkflowError> {
    TRANSITIONS
        .get(&(state, action))
        .ok_or_else(|| WorkflowError::invalid_transition(state, action))
}

/// All rules, in no particular order.
pub fn rules() -> impl Iterator<Item = &'static TransitionRule> {
    TRANSITIONS.values()
}

pub fn resolve_next_state(
    state: WorkflowState,
    action: WorkflowAction,
) -> Result<WorkflowState, WorkflowError> {
    rule_for(state, action).map(|rule| rule.to_state)
}

/// Infer the approval step from the current state alone.
pub fn resolve_unified_approve(
    state: WorkflowState,
) -> Result<&'static TransitionRule, WorkflowError> {
    let action = UNIFIED_APPROVE
        .iter()
        .find(|(from, _)| *from == state)
        .map(|(_, action)| *action)
        .ok_or(WorkflowError::InvalidTransition {
            from: state,
            requested: "approve",
        })?;
    rule_for(state, action)
}

/// Check the comment an action carries. Negative actions need a reason of a
/// minimum length; everything else takes an optional note.
pub fn validate_comment(
    action: WorkflowAction,
    comment: Option<&str>,
) -> Result<(), WorkflowError> {
    let min = min_comment_length(action);
    if min == 0 {
        return Ok(());
    }

    let length = comment.map(|c| c.trim().chars().count()).unwrap_or(0);
    if length == 0 {
        return Err(WorkflowError::Validation {
            action,
            message: "a comment explaining the decision is required".to_string(),
        });
    }
    if length < min {
        return Err(WorkflowError::Validation {
            action,
            message: format!(
                "comment must be at least {} characters (got {})",
                min, length
            ),
        });
    }
    Ok(())
}

/// Pure transition step: resolve the target state, validate the comment and
/// build the audit entry. Does not authorize and does not persist.
pub fn apply(
    event: &Event,
    action: WorkflowAction,
    actor: &Actor,
    comment: Option<&str>,
    at: DateTime<Utc>,
) -> Result<(WorkflowState, AuditEntry), WorkflowError> {
    let to_state = resolve_next_state(event.workflow_state, action)?;
    validate_comment(action, comment)?;

    let comment = comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let entry = AuditEntry {
        id: AuditEntryId::new(),
        event_id: event.id,
        timestamp: at,
        actor_id: actor.id,
        actor_name: actor.name.clone(),
        from_state: event.workflow_state,
        to_state,
        action,
        comment,
    };
    Ok((to_state, entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_rows() {
        use WorkflowAction::*;
        use WorkflowState::*;

        assert_eq!(resolve_next_state(Draft, Submit).unwrap(), PendingInternalApproval);
        assert_eq!(
            resolve_next_state(PendingInternalApproval, ApproveInternal).unwrap(),
            ApprovedInternal
        );
        assert_eq!(
            resolve_next_state(ApprovedInternal, RequestPublicApproval).unwrap(),
            PendingPublicApproval
        );
        assert_eq!(resolve_next_state(PendingPublicApproval, ApprovePublic).unwrap(), Published);
        assert_eq!(resolve_next_state(PendingPublicApproval, Publish).unwrap(), Published);
        assert_eq!(
            resolve_next_state(RequiresChanges, Resubmit).unwrap(),
            PendingInternalApproval
        );
    }

    #[test]
    fn test_table_size() {
        // 6 forward rows + 2 negative rows for each of the 5 non-terminal states
        assert_eq!(rules().count(), 16);
    }

    #[test]
    fn test_negative_actions_blocked_from_terminal_states() {
        for state in [
            WorkflowState::Rejected,
            WorkflowState::Published,
            WorkflowState::Cancelled,
        ] {
            for action in [WorkflowAction::RequestChanges, WorkflowAction::Reject] {
                assert!(matches!(
                    resolve_next_state(state, action),
                    Err(WorkflowError::InvalidTransition { .. })
                ));
            }
        }
    }

    #[test]
    fn test_negative_actions_allowed_elsewhere() {
        for state in WorkflowState::ALL
            .into_iter()
            .filter(|s| !s.is_terminal_for_negative_actions())
        {
            assert_eq!(
                resolve_next_state(state, WorkflowAction::Reject).unwrap(),
                WorkflowState::Rejected
            );
            assert_eq!(
                resolve_next_state(state, WorkflowAction::RequestChanges).unwrap(),
                WorkflowState::RequiresChanges
            );
        }
    }

    #[test]
    fn test_unified_approve() {
        assert_eq!(
            resolve_unified_approve(WorkflowState::PendingInternalApproval)
                .unwrap()
                .to_state,
            WorkflowState::ApprovedInternal
        );
        assert_eq!(
            resolve_unified_approve(WorkflowState::ApprovedInternal)
                .unwrap()
                .action,
            WorkflowAction::RequestPublicApproval
        );
        assert_eq!(
            resolve_unified_approve(WorkflowState::PendingPublicApproval)
                .unwrap()
                .to_state,
            WorkflowState::Published
        );
        for state in [
            WorkflowState::Draft,
            WorkflowState::Published,
            WorkflowState::RequiresChanges,
            WorkflowState::Rejected,
            WorkflowState::Cancelled,
        ] {
            assert!(resolve_unified_approve(state).is_err());
        }
    }

    #[test]
    fn test_comment_minimums_differ_per_action() {
        assert!(validate_comment(WorkflowAction::Reject, Some("0123456789")).is_ok());
        assert!(validate_comment(WorkflowAction::Reject, Some("short")).is_err());
        assert!(validate_comment(WorkflowAction::RequestChanges, Some("0123456789")).is_err());
        assert!(
            validate_comment(WorkflowAction::RequestChanges, Some("please add a venue map")).is_ok()
        );
    }

    #[test]
    fn test_comment_is_trimmed_before_counting() {
        assert!(validate_comment(WorkflowAction::Reject, Some("   short    ")).is_err());
        assert!(validate_comment(WorkflowAction::Reject, None).is_err());
        assert!(validate_comment(WorkflowAction::Reject, Some("   ")).is_err());
    }

    #[test]
    fn test_optional_comment_elsewhere() {
        assert!(validate_comment(WorkflowAction::Submit, None).is_ok());
        assert!(validate_comment(WorkflowAction::ApproveInternal, Some("ok")).is_ok());
    }

    #[test]
    fn test_rules_carry_guard_roles() {
        let rule = rule_for(WorkflowState::Draft, WorkflowAction::Resubmit);
        assert!(rule.is_err());

        let rule = rule_for(WorkflowState::RequiresChanges, WorkflowAction::Resubmit).unwrap();
        assert_eq!(rule.allowed_roles, &[Role::OrganizerAdmin]);
        assert!(!rule.requires_comment);

        let rule = rule_for(WorkflowState::Draft, WorkflowAction::Reject).unwrap();
        assert!(rule.requires_comment);
        assert_eq!(rule.min_comment_length, REJECT_MIN_COMMENT_LENGTH);
    }
}
