// Tourism Events Calendar - Publication Workflow Core
//
// Moves calendar events from draft to publication under a fixed transition
// table, role-based authorization, an append-only audit trail and dashboard
// bucket categorization.
//
// Workflow rules are organized per-domain in domains/*/workflow/

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
