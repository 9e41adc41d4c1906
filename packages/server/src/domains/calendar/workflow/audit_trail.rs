use anyhow::{ensure, Result};

use crate::domains::calendar::models::{AuditEntry, Event};

/// Append-only view over an event's history.
///
/// Entries are kept in insertion order, which is chronological. Existing
/// entries are never edited or removed.
pub struct ApprovalAuditTrail<'a> {
    entries: &'a [AuditEntry],
}

impl<'a> ApprovalAuditTrail<'a> {
    pub fn of(event: &'a Event) -> Self {
        Self {
            entries: &event.history,
        }
    }

    /// Record one transition on `event`.
    pub fn append(event: &mut Event, entry: AuditEntry) -> Result<()> {
        ensure!(
            entry.event_id == event.id,
            "audit entry for event {} appended to event {}",
            entry.event_id,
            event.id
        );
        ensure!(
            entry.from_state == event.workflow_state,
            "audit entry starts at {} but event is in {}",
            entry.from_state,
            event.workflow_state
        );
        event.history.push(entry);
        Ok(())
    }

    /// Entries oldest first, read-only.
    pub fn entries(&self) -> &'a [AuditEntry] {
        self.entries
    }

    pub fn latest(&self) -> Option<&'a AuditEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
