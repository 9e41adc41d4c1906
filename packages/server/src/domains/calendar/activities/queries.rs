//! Read operations for dashboards and listings.
//!
//! Reads are not linearized with in-flight transitions; each event is
//! categorized from one snapshot of its state and end date.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::common::pagination::{Page, PaginationArgs};
use crate::common::{EventId, OrganizationId};
use crate::domains::calendar::models::{AuditEntry, Event};
use crate::domains::calendar::workflow::categorizer::{self, BucketCounts, DashboardBucket};
use crate::domains::calendar::workflow::WorkflowError;
use crate::kernel::ServerDeps;

pub async fn get_bucket(
    event_id: EventId,
    now: DateTime<Utc>,
    deps: &ServerDeps,
) -> Result<DashboardBucket, WorkflowError> {
    let event = deps.event_store.load_event(event_id).await?;
    let bucket = categorizer::categorize(&event, now);
    debug!(
        event_id = %event_id,
        state = %event.workflow_state,
        bucket = %bucket,
        "Categorized event"
    );
    Ok(bucket)
}

/// Badge counts for an organization's dashboard.
pub async fn get_summary_counts(
    organization_id: OrganizationId,
    now: DateTime<Utc>,
    deps: &ServerDeps,
) -> Result<BucketCounts, WorkflowError> {
    let events = deps.event_store.find_by_organization(organization_id).await?;
    let counts = categorizer::build_summary_counts(&events, now);
    debug!(organization_id = %organization_id, total = counts.total(), "Built summary counts");
    Ok(counts)
}

/// Badge counts computed by the store from each bucket's query filter.
pub async fn count_events_by_tab(
    organization_id: OrganizationId,
    now: DateTime<Utc>,
    deps: &ServerDeps,
) -> Result<BucketCounts, WorkflowError> {
    let mut counts = BucketCounts::default();
    for bucket in DashboardBucket::ALL {
        let filter = categorizer::query_filter(bucket, now);
        let count = deps
            .event_store
            .count_matching(Some(organization_id), &filter)
            .await?;
        match bucket {
            DashboardBucket::RequiresAction => counts.requires_action = count,
            DashboardBucket::Pending => counts.pending = count,
            DashboardBucket::Published => counts.published = count,
            DashboardBucket::Historic => counts.historic = count,
        }
    }
    Ok(counts)
}

pub async fn get_history(
    event_id: EventId,
    deps: &ServerDeps,
) -> Result<Vec<AuditEntry>, WorkflowError> {
    let history = deps.event_store.find_history(event_id).await?;
    debug!(event_id = %event_id, entries = history.len(), "Loaded history");
    Ok(history)
}

/// One page of a dashboard tab, oldest event first.
pub async fn list_events_by_tab(
    organization_id: OrganizationId,
    bucket: DashboardBucket,
    now: DateTime<Utc>,
    pagination: &PaginationArgs,
    deps: &ServerDeps,
) -> Result<Page<Event>, WorkflowError> {
    let args = pagination
        .validate()
        .map_err(WorkflowError::InvalidPagination)?;
    let filter = categorizer::query_filter(bucket, now);

    let fetched = deps
        .event_store
        .find_matching(Some(organization_id), &filter, &args)
        .await?;
    let page = Page::from_fetched(fetched, &args, |event| event.id.into_uuid());

    debug!(
        organization_id = %organization_id,
        bucket = %bucket,
        returned = page.items.len(),
        has_next_page = page.page_info.has_next_page,
        "Listed events"
    );
    Ok(page)
}
