use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Role codes carried by an authenticated actor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator; may act on any event.
    PlatformAdmin,
    /// Administrator of a supervising government entity.
    EntityAdmin,
    /// Reviewer on the staff of a supervising government entity.
    EntityStaff,
    /// Administrator of an external organizer that owns events.
    OrganizerAdmin,
}

/// Which of the event's organizations an actor must belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleScope {
    Global,
    SupervisingEntity,
    OwningOrganization,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::PlatformAdmin,
        Role::EntityAdmin,
        Role::EntityStaff,
        Role::OrganizerAdmin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PlatformAdmin => "platform_admin",
            Role::EntityAdmin => "entity_admin",
            Role::EntityStaff => "entity_staff",
            Role::OrganizerAdmin => "organizer_admin",
        }
    }

    pub fn scope(&self) -> RoleScope {
        match self {
            Role::PlatformAdmin => RoleScope::Global,
            Role::EntityAdmin | Role::EntityStaff => RoleScope::SupervisingEntity,
            Role::OrganizerAdmin => RoleScope::OwningOrganization,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid role code: {}", s))
    }
}
