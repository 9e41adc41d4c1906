//! Publication workflow core: transition table, categorization and audit
//! trail. Everything here is synchronous and free of I/O; persistence and
//! orchestration live in `activities`.

pub mod audit_trail;
pub mod categorizer;
pub mod errors;
pub mod predicate;
pub mod transitions;

pub use audit_trail::ApprovalAuditTrail;
pub use categorizer::{BucketCounts, DashboardBucket};
pub use errors::WorkflowError;
pub use predicate::EventPredicate;
pub use transitions::TransitionRule;
