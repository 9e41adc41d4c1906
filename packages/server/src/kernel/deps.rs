//! Server dependencies for activities (using traits for testability)
//!
//! Persistence goes through `BaseEventStore` so workflow code runs the same
//! against Postgres and the in-memory store used in tests.

use sqlx::PgPool;
use std::sync::Arc;

use crate::kernel::{BaseEventStore, PgEventStore, WorkflowFeed};

/// Dependencies accessible to activities
#[derive(Clone)]
pub struct ServerDeps {
    pub event_store: Arc<dyn BaseEventStore>,
    /// In-process pub/sub for workflow notifications
    pub workflow_feed: WorkflowFeed,
}

impl ServerDeps {
    pub fn new(event_store: Arc<dyn BaseEventStore>, workflow_feed: WorkflowFeed) -> Self {
        Self {
            event_store,
            workflow_feed,
        }
    }

    /// Production wiring: Postgres store and a feed with the given capacity.
    pub fn postgres(pool: PgPool, feed_capacity: usize) -> Self {
        Self::new(
            Arc::new(PgEventStore::new(pool)),
            WorkflowFeed::with_capacity(feed_capacity),
        )
    }
}
