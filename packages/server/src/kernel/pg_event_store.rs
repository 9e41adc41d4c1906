//! Postgres-backed event store.
//!
//! Thin adapter over the model queries; the conditional update in
//! `save_event` is what turns a lost race into `Conflict`. The update is
//! guarded on the row version as well as the state, so self-loop
//! transitions (same state before and after) still race safely.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::BaseEventStore;
use crate::common::pagination::ValidatedPaginationArgs;
use crate::common::{EventId, OrganizationId};
use crate::domains::calendar::models::{AuditEntry, CreateEvent, Event, WorkflowState};
use crate::domains::calendar::workflow::{EventPredicate, WorkflowError};

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseEventStore for PgEventStore {
    async fn create_event(&self, input: CreateEvent) -> Result<Event, WorkflowError> {
        Ok(Event::create(input, &self.pool).await?)
    }

    async fn load_event(&self, id: EventId) -> Result<Event, WorkflowError> {
        Event::find_by_id_with_history(id, &self.pool)
            .await?
            .ok_or(WorkflowError::NotFound(id))
    }

    async fn save_event(
        &self,
        event: &Event,
        expected_prior_state: WorkflowState,
    ) -> Result<(), WorkflowError> {
        let entry = event.history.last().ok_or_else(|| {
            WorkflowError::Internal(anyhow::anyhow!(
                "event {} saved without a new audit entry",
                event.id
            ))
        })?;

        let mut tx = self.pool.begin().await?;

        let updated = event
            .update_workflow_if_unchanged(expected_prior_state, &mut tx)
            .await?;
        if updated == 0 {
            let exists = Event::exists(event.id, &mut tx).await?;
            tx.rollback().await?;
            debug!(
                event_id = %event.id,
                expected = %expected_prior_state,
                version = event.version,
                exists,
                "Conditional update matched no rows"
            );
            return Err(if exists {
                WorkflowError::Conflict {
                    event_id: event.id,
                    expected: expected_prior_state,
                }
            } else {
                WorkflowError::NotFound(event.id)
            });
        }

        entry.insert(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Event>, WorkflowError> {
        Ok(Event::find_by_organization(organization_id, &self.pool).await?)
    }

    async fn find_matching(
        &self,
        organization_id: Option<OrganizationId>,
        filter: &EventPredicate,
        args: &ValidatedPaginationArgs,
    ) -> Result<Vec<Event>, WorkflowError> {
        let mut events = Event::find_matching(organization_id, filter, args, &self.pool).await?;

        let ids: Vec<EventId> = events.iter().map(|e| e.id).collect();
        let mut histories = AuditEntry::find_by_events(&ids, &self.pool).await?;
        for event in &mut events {
            event.history = histories.remove(&event.id).unwrap_or_default();
        }
        Ok(events)
    }

    async fn count_matching(
        &self,
        organization_id: Option<OrganizationId>,
        filter: &EventPredicate,
    ) -> Result<i64, WorkflowError> {
        Ok(Event::count_matching(organization_id, filter, &self.pool).await?)
    }

    async fn find_history(&self, id: EventId) -> Result<Vec<AuditEntry>, WorkflowError> {
        let mut conn = self.pool.acquire().await?;
        if !Event::exists(id, &mut conn).await? {
            return Err(WorkflowError::NotFound(id));
        }
        drop(conn);
        Ok(AuditEntry::find_by_event(id, &self.pool).await?)
    }
}
