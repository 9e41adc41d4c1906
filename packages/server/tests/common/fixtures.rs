//! Test fixtures for creating events and actors.

use chrono::{DateTime, Duration, Utc};
use events_core::common::auth::{Actor, Role};
use events_core::common::{MemberId, OrganizationId};
use events_core::domains::calendar::models::{AuditEntry, CreateEvent, Event, WorkflowState};
use events_core::domains::calendar::workflow::ApprovalAuditTrail;

/// The organizations around one event, plus an unrelated entity.
#[derive(Debug, Clone, Copy)]
pub struct Orgs {
    pub owner: OrganizationId,
    pub supervisor: OrganizationId,
    pub other_entity: OrganizationId,
}

impl Orgs {
    pub fn new() -> Self {
        Self {
            owner: OrganizationId::new(),
            supervisor: OrganizationId::new(),
            other_entity: OrganizationId::new(),
        }
    }

    pub fn entity_admin(&self) -> Actor {
        Actor::new(MemberId::new(), "Entity Admin", Role::EntityAdmin, self.supervisor)
    }

    pub fn entity_staff(&self) -> Actor {
        Actor::new(MemberId::new(), "Entity Staff", Role::EntityStaff, self.supervisor)
    }

    pub fn organizer_admin(&self) -> Actor {
        Actor::new(MemberId::new(), "Organizer", Role::OrganizerAdmin, self.owner)
    }

    pub fn platform_admin(&self) -> Actor {
        Actor::new(
            MemberId::new(),
            "Platform Admin",
            Role::PlatformAdmin,
            OrganizationId::new(),
        )
    }

    /// Entity admin of a different supervising entity.
    pub fn foreign_entity_admin(&self) -> Actor {
        Actor::new(MemberId::new(), "Other Entity", Role::EntityAdmin, self.other_entity)
    }

    /// One actor per role, each in the organization its role is scoped to.
    pub fn every_role(&self) -> Vec<Actor> {
        vec![
            self.platform_admin(),
            self.entity_admin(),
            self.entity_staff(),
            self.organizer_admin(),
        ]
    }

    pub fn create_input(&self, title: &str, end_date: DateTime<Utc>) -> CreateEvent {
        CreateEvent::builder()
            .title(title)
            .start_date(end_date - Duration::hours(4))
            .end_date(end_date)
            .owner_organization_id(self.owner)
            .supervising_entity_id(self.supervisor)
            .build()
    }
}

impl Default for Orgs {
    fn default() -> Self {
        Self::new()
    }
}

/// An upcoming event forced into `state`, with empty history.
pub fn event_in(orgs: &Orgs, state: WorkflowState) -> Event {
    event_ending(orgs, state, Utc::now() + Duration::days(30))
}

pub fn event_ending(orgs: &Orgs, state: WorkflowState, end_date: DateTime<Utc>) -> Event {
    let mut event = orgs
        .create_input("Test Event", end_date)
        .into_event()
        .expect("fixture input is valid");
    event.workflow_state = state;
    event
}

/// An event's audit trail, oldest first.
pub fn history(event: &Event) -> &[AuditEntry] {
    ApprovalAuditTrail::of(event).entries()
}

pub fn long_reason() -> &'static str {
    "a sufficiently long reason here"
}
