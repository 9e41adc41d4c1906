//! Per-organization workflow statistics derived from state and audit history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::OrganizationId;
use crate::domains::calendar::models::{Event, WorkflowAction, WorkflowState};
use crate::domains::calendar::workflow::categorizer::{self, BucketCounts};
use crate::domains::calendar::workflow::{ApprovalAuditTrail, WorkflowError};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStatistics {
    pub total_events: usize,
    /// Every state is present, zero when unused.
    pub by_state: BTreeMap<WorkflowState, usize>,
    pub buckets: BucketCounts,
    pub transitions: usize,
    pub approvals: usize,
    pub rejections: usize,
    pub change_requests: usize,
    pub resubmissions: usize,
    /// Mean hours from the first submission to publication, over published
    /// events that were ever submitted.
    pub mean_hours_to_publish: Option<f64>,
}

pub fn compute_statistics(events: &[Event], now: DateTime<Utc>) -> WorkflowStatistics {
    let mut by_state: BTreeMap<WorkflowState, usize> =
        WorkflowState::ALL.into_iter().map(|s| (s, 0)).collect();
    let mut stats = WorkflowStatistics {
        total_events: events.len(),
        by_state: BTreeMap::new(),
        buckets: categorizer::build_summary_counts(events, now),
        transitions: 0,
        approvals: 0,
        rejections: 0,
        change_requests: 0,
        resubmissions: 0,
        mean_hours_to_publish: None,
    };
    let mut publish_hours = Vec::new();

    for event in events {
        *by_state.entry(event.workflow_state).or_default() += 1;

        for entry in ApprovalAuditTrail::of(event).entries() {
            stats.transitions += 1;
            match entry.action {
                WorkflowAction::ApproveInternal
                | WorkflowAction::ApprovePublic
                | WorkflowAction::Publish => stats.approvals += 1,
                WorkflowAction::Reject => stats.rejections += 1,
                WorkflowAction::RequestChanges => stats.change_requests += 1,
                WorkflowAction::Resubmit => stats.resubmissions += 1,
                WorkflowAction::Submit | WorkflowAction::RequestPublicApproval => {}
            }
        }

        if let Some(hours) = hours_to_publish(event) {
            publish_hours.push(hours);
        }
    }

    stats.by_state = by_state;
    if !publish_hours.is_empty() {
        stats.mean_hours_to_publish =
            Some(publish_hours.iter().sum::<f64>() / publish_hours.len() as f64);
    }
    stats
}

fn hours_to_publish(event: &Event) -> Option<f64> {
    let entries = ApprovalAuditTrail::of(event).entries();
    let submitted = entries
        .iter()
        .find(|e| e.action == WorkflowAction::Submit)?;
    let published = entries
        .iter()
        .rev()
        .find(|e| e.to_state == WorkflowState::Published)?;
    let elapsed = published.timestamp - submitted.timestamp;
    Some(elapsed.num_seconds() as f64 / 3600.0)
}

pub async fn get_workflow_statistics(
    organization_id: OrganizationId,
    now: DateTime<Utc>,
    deps: &ServerDeps,
) -> Result<WorkflowStatistics, WorkflowError> {
    let events = deps.event_store.find_by_organization(organization_id).await?;
    Ok(compute_statistics(&events, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AuditEntryId, MemberId};
    use crate::domains::calendar::models::{AuditEntry, CreateEvent};
    use chrono::Duration;

    fn event_with(steps: &[(WorkflowAction, WorkflowState, i64)]) -> Event {
        let start = Utc::now() + Duration::days(30);
        let mut event = CreateEvent::builder()
            .title("Rally")
            .start_date(start)
            .end_date(start + Duration::days(1))
            .owner_organization_id(OrganizationId::new())
            .supervising_entity_id(OrganizationId::new())
            .build()
            .into_event()
            .unwrap();
        let base = Utc::now();
        for (action, to_state, hours) in steps {
            event.history.push(AuditEntry {
                id: AuditEntryId::new(),
                event_id: event.id,
                timestamp: base + Duration::hours(*hours),
                actor_id: MemberId::new(),
                actor_name: "Test".to_string(),
                from_state: event.workflow_state,
                to_state: *to_state,
                action: *action,
                comment: None,
            });
            event.workflow_state = *to_state;
        }
        event
    }

    #[test]
    fn test_counts_actions_and_states() {
        use WorkflowAction::*;
        use WorkflowState::*;

        let published = event_with(&[
            (Submit, PendingInternalApproval, 0),
            (ApproveInternal, ApprovedInternal, 2),
            (RequestPublicApproval, PendingPublicApproval, 3),
            (ApprovePublic, Published, 10),
        ]);
        let rejected = event_with(&[
            (Submit, PendingInternalApproval, 0),
            (RequestChanges, RequiresChanges, 1),
            (Resubmit, PendingInternalApproval, 2),
            (Reject, Rejected, 3),
        ]);
        let draft = event_with(&[]);

        let stats = compute_statistics(&[published, rejected, draft], Utc::now());
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.by_state[&Published], 1);
        assert_eq!(stats.by_state[&Rejected], 1);
        assert_eq!(stats.by_state[&Draft], 1);
        assert_eq!(stats.by_state[&Cancelled], 0);
        assert_eq!(stats.transitions, 8);
        assert_eq!(stats.approvals, 2);
        assert_eq!(stats.rejections, 1);
        assert_eq!(stats.change_requests, 1);
        assert_eq!(stats.resubmissions, 1);
        assert_eq!(stats.mean_hours_to_publish, Some(10.0));
        assert_eq!(stats.buckets.historic, 1);
        assert_eq!(stats.buckets.published, 1);
        assert_eq!(stats.buckets.pending, 1);
    }

    #[test]
    fn test_empty_organization() {
        let stats = compute_statistics(&[], Utc::now());
        assert_eq!(stats.total_events, 0);
        assert_eq!(stats.by_state.len(), WorkflowState::ALL.len());
        assert!(stats.mean_hours_to_publish.is_none());
        assert_eq!(stats.buckets.total(), 0);
    }
}
