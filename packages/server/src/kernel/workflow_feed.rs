//! In-process pub/sub for workflow notifications.
//!
//! One broadcast channel per organization. A transition is delivered to the
//! owning organization and to the supervising entity.
//!
//! # Usage
//!
//! Producers (activities):
//!   feed.publish(WorkflowEvent::transitioned(&event)).await;
//!
//! Consumers (dashboards, notifiers):
//!   let rx = feed.subscribe(organization_id).await;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::common::OrganizationId;
use crate::domains::calendar::events::WorkflowEvent;

pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Thread-safe, cloneable. Keyed by organization.
#[derive(Clone)]
pub struct WorkflowFeed {
    channels: Arc<RwLock<HashMap<OrganizationId, broadcast::Sender<WorkflowEvent>>>>,
    capacity: usize,
}

impl WorkflowFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Deliver to every organization in the event's audience. Returns how
    /// many receivers got it; zero when nobody is listening.
    pub async fn publish(&self, event: WorkflowEvent) -> usize {
        let channels = self.channels.read().await;
        event
            .audience()
            .into_iter()
            .filter_map(|organization_id| channels.get(&organization_id))
            .map(|tx| tx.send(event.clone()).unwrap_or(0))
            .sum()
    }

    /// Subscribe to one organization. Creates the channel if needed.
    pub async fn subscribe(
        &self,
        organization_id: OrganizationId,
    ) -> broadcast::Receiver<WorkflowEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(organization_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Drop channels nobody listens to anymore.
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }

    pub async fn topic_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for WorkflowFeed {
    fn default() -> Self {
        Self::new()
    }
}
