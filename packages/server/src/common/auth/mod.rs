//! Authorization for workflow actions.
//!
//! Every workflow action goes through the same fluent check:
//!
//! ```rust,ignore
//! use crate::common::auth::Actor;
//!
//! actor
//!     .can(WorkflowAction::ApproveInternal)
//!     .on(&event)
//!     .check()?;
//! ```
//!
//! The check consults the single permission matrix in `AuthorizationGuard`;
//! call sites never compare role strings themselves.

mod builder;
mod errors;
mod guard;
mod role;

pub use builder::{Actor, ActionCheck, EventCheck};
pub use errors::AuthError;
pub use guard::AuthorizationGuard;
pub use role::{Role, RoleScope};
