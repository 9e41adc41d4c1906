//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod pg_event_store;
pub mod test_dependencies;
pub mod traits;
pub mod workflow_feed;

pub use deps::ServerDeps;
pub use pg_event_store::PgEventStore;
pub use test_dependencies::{InMemoryEventStore, TestDependencies};
pub use traits::*;
pub use workflow_feed::WorkflowFeed;
