//! Calendar activities - entry-point functions for workflow operations
//!
//! Activities take typed input and `&ServerDeps`, run the workflow core and
//! talk to the store. They return the updated event or a `WorkflowError`.

pub mod queries;
pub mod statistics;
pub mod transition;

pub use queries::{
    count_events_by_tab, get_bucket, get_history, get_summary_counts, list_events_by_tab,
};
pub use statistics::{compute_statistics, get_workflow_statistics, WorkflowStatistics};
pub use transition::{
    approve_event, approve_internal, approve_public, commit_transition, prepare_transition,
    publish_event, reject_event, request_changes, request_public_approval, resubmit_event,
    submit_event, transition_event, PreparedTransition,
};
