// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Workflow rules live in domains/calendar/workflow and call through these.
//
// Naming convention: Base* for trait names (e.g., BaseEventStore)

use async_trait::async_trait;

use crate::common::pagination::ValidatedPaginationArgs;
use crate::common::{EventId, OrganizationId};
use crate::domains::calendar::models::{AuditEntry, CreateEvent, Event, WorkflowState};
use crate::domains::calendar::workflow::{EventPredicate, WorkflowError};

// =============================================================================
// Event Store Trait (Infrastructure - event persistence)
// =============================================================================

#[async_trait]
pub trait BaseEventStore: Send + Sync {
    /// Insert a new event in its entry state.
    async fn create_event(&self, input: CreateEvent) -> Result<Event, WorkflowError>;

    /// Load an event with its full history. `NotFound` if missing.
    async fn load_event(&self, id: EventId) -> Result<Event, WorkflowError>;

    /// Persist the workflow fields and the newest history entry, but only if
    /// the stored state still equals `expected_prior_state` and the stored
    /// version is `event.version() - 1`.
    ///
    /// `event.history` must be the stored history plus exactly one entry.
    /// Fails with `Conflict` when the stored event moved on and `NotFound`
    /// when the event is gone. Nothing is written on failure.
    async fn save_event(
        &self,
        event: &Event,
        expected_prior_state: WorkflowState,
    ) -> Result<(), WorkflowError>;

    /// Every event the organization owns or supervises, with history.
    async fn find_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Event>, WorkflowError>;

    /// Up to `args.fetch_limit()` events matching `filter`, ordered by id,
    /// strictly after `args.cursor`. `None` scope means all organizations.
    async fn find_matching(
        &self,
        organization_id: Option<OrganizationId>,
        filter: &EventPredicate,
        args: &ValidatedPaginationArgs,
    ) -> Result<Vec<Event>, WorkflowError>;

    async fn count_matching(
        &self,
        organization_id: Option<OrganizationId>,
        filter: &EventPredicate,
    ) -> Result<i64, WorkflowError>;

    /// History of one event, oldest first. `NotFound` if missing.
    async fn find_history(&self, id: EventId) -> Result<Vec<AuditEntry>, WorkflowError>;
}
