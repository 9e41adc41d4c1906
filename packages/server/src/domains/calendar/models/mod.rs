pub mod audit_entry;
pub mod event;
pub mod workflow_state;

pub use audit_entry::AuditEntry;
pub use event::{CreateEvent, Event, EventSnapshot};
pub use workflow_state::{WorkflowAction, WorkflowState};
