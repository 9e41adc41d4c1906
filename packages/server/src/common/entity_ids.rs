//! Typed ID definitions for the calendar's entities.
//!
//! ```rust
//! use events_core::common::{EventId, OrganizationId};
//!
//! let event_id = EventId::new();
//! let organization_id = OrganizationId::new();
//! // let wrong: OrganizationId = event_id; // compile error
//! # let _ = (event_id, organization_id);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for calendar events.
pub struct CalendarEvent;

/// Marker type for audit trail entries.
pub struct AuditEntryRecord;

/// Marker type for members (the people acting on events).
pub struct Member;

/// Marker type for organizations: external organizers and supervising
/// government entities share one id space.
pub struct Organization;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for calendar events.
pub type EventId = Id<CalendarEvent>;

/// Typed ID for audit trail entries.
pub type AuditEntryId = Id<AuditEntryRecord>;

/// Typed ID for members.
pub type MemberId = Id<Member>;

/// Typed ID for organizations.
pub type OrganizationId = Id<Organization>;
