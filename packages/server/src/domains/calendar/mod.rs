//! Calendar domain: events and their publication workflow.

pub mod activities;
pub mod events;
pub mod models;
pub mod workflow;

pub use events::WorkflowEvent;
pub use models::{AuditEntry, CreateEvent, Event, WorkflowAction, WorkflowState};
pub use workflow::{BucketCounts, DashboardBucket, WorkflowError};
