// TestDependencies - in-memory implementations for testing
//
// Provides an event store that honors the same contract as PgEventStore
// (conditional save, ordering, pagination) without a database.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::{BaseEventStore, ServerDeps, WorkflowFeed};
use crate::common::pagination::ValidatedPaginationArgs;
use crate::common::{EventId, OrganizationId};
use crate::domains::calendar::models::{AuditEntry, CreateEvent, Event, WorkflowState};
use crate::domains::calendar::workflow::{EventPredicate, WorkflowError};

// =============================================================================
// In-memory Event Store
// =============================================================================

/// Events keyed by id. `BTreeMap` keeps id order, matching `ORDER BY id`.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<Mutex<BTreeMap<EventId, Event>>>,
    save_calls: Arc<Mutex<Vec<(EventId, WorkflowState)>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an event as-is, bypassing entry-state validation.
    pub fn with_event(self, event: Event) -> Self {
        self.insert(event);
        self
    }

    pub fn insert(&self, event: Event) {
        self.lock_events().insert(event.id, event);
    }

    /// Current stored copy of an event.
    pub fn get(&self, id: EventId) -> Option<Event> {
        self.lock_events().get(&id).cloned()
    }

    /// Every `(event_id, expected_prior_state)` passed to `save_event`.
    pub fn save_calls(&self) -> Vec<(EventId, WorkflowState)> {
        self.save_calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lock_events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_events().is_empty()
    }

    fn lock_events(&self) -> std::sync::MutexGuard<'_, BTreeMap<EventId, Event>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn scoped(
        events: &BTreeMap<EventId, Event>,
        organization_id: Option<OrganizationId>,
        filter: &EventPredicate,
    ) -> Vec<Event> {
        events
            .values()
            .filter(|e| organization_id.map_or(true, |org| e.belongs_to(org)))
            .filter(|e| filter.matches(&e.snapshot()))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BaseEventStore for InMemoryEventStore {
    async fn create_event(&self, input: CreateEvent) -> Result<Event, WorkflowError> {
        let event = input.into_event()?;
        self.insert(event.clone());
        Ok(event)
    }

    async fn load_event(&self, id: EventId) -> Result<Event, WorkflowError> {
        self.get(id).ok_or(WorkflowError::NotFound(id))
    }

    async fn save_event(
        &self,
        event: &Event,
        expected_prior_state: WorkflowState,
    ) -> Result<(), WorkflowError> {
        self.save_calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((event.id, expected_prior_state));

        let mut events = self.lock_events();
        let stored = events
            .get_mut(&event.id)
            .ok_or(WorkflowError::NotFound(event.id))?;

        if stored.workflow_state != expected_prior_state || stored.version + 1 != event.version {
            return Err(WorkflowError::Conflict {
                event_id: event.id,
                expected: expected_prior_state,
            });
        }

        let appends_one = event.history.len() == stored.history.len() + 1
            && event.history.starts_with(&stored.history);
        if !appends_one {
            return Err(WorkflowError::Internal(anyhow::anyhow!(
                "event {} must be saved with exactly one new audit entry",
                event.id
            )));
        }

        *stored = event.clone();
        Ok(())
    }

    async fn find_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Event>, WorkflowError> {
        let events = self.lock_events();
        Ok(Self::scoped(&events, Some(organization_id), &EventPredicate::Always))
    }

    async fn find_matching(
        &self,
        organization_id: Option<OrganizationId>,
        filter: &EventPredicate,
        args: &ValidatedPaginationArgs,
    ) -> Result<Vec<Event>, WorkflowError> {
        let events = self.lock_events();
        Ok(Self::scoped(&events, organization_id, filter)
            .into_iter()
            .filter(|e| args.cursor.map_or(true, |cursor| e.id.into_uuid() > cursor))
            .take(args.fetch_limit() as usize)
            .collect())
    }

    async fn count_matching(
        &self,
        organization_id: Option<OrganizationId>,
        filter: &EventPredicate,
    ) -> Result<i64, WorkflowError> {
        let events = self.lock_events();
        Ok(Self::scoped(&events, organization_id, filter).len() as i64)
    }

    async fn find_history(&self, id: EventId) -> Result<Vec<AuditEntry>, WorkflowError> {
        self.get(id)
            .map(|event| event.history)
            .ok_or(WorkflowError::NotFound(id))
    }
}

// =============================================================================
// TestDependencies Builder
// =============================================================================

/// Builds `ServerDeps` over an in-memory store, keeping handles for asserts.
pub struct TestDependencies {
    pub event_store: InMemoryEventStore,
    pub workflow_feed: WorkflowFeed,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            event_store: InMemoryEventStore::new(),
            workflow_feed: WorkflowFeed::new(),
        }
    }

    pub fn with_event(self, event: Event) -> Self {
        self.event_store.insert(event);
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(Arc::new(self.event_store.clone()), self.workflow_feed.clone())
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
