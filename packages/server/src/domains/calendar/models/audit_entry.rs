use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;

use super::{WorkflowAction, WorkflowState};
use crate::common::{AuditEntryId, EventId, MemberId};

/// One immutable record of a past transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub event_id: EventId,
    pub timestamp: DateTime<Utc>,
    pub actor_id: MemberId,
    pub actor_name: String,
    pub from_state: WorkflowState,
    pub to_state: WorkflowState,
    pub action: WorkflowAction,
    pub comment: Option<String>,
}

impl AuditEntry {
    pub async fn insert(&self, conn: &mut PgConnection) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO event_audit_entries (
                id, event_id, timestamp, actor_id, actor_name,
                from_state, to_state, action, comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(self.id)
        .bind(self.event_id)
        .bind(self.timestamp)
        .bind(self.actor_id)
        .bind(&self.actor_name)
        .bind(self.from_state)
        .bind(self.to_state)
        .bind(self.action)
        .bind(&self.comment)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// History for one event, oldest first.
    pub async fn find_by_event(event_id: EventId, pool: &PgPool) -> Result<Vec<Self>> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT * FROM event_audit_entries
            WHERE event_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(entries)
    }

    /// Histories for many events, each oldest first.
    pub async fn find_by_events(
        event_ids: &[EventId],
        pool: &PgPool,
    ) -> Result<HashMap<EventId, Vec<Self>>> {
        if event_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<uuid::Uuid> = event_ids.iter().map(|id| id.into_uuid()).collect();
        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT * FROM event_audit_entries
            WHERE event_id = ANY($1)
            ORDER BY seq ASC
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        let mut grouped: HashMap<EventId, Vec<Self>> = HashMap::new();
        for entry in entries {
            grouped.entry(entry.event_id).or_default().push(entry);
        }
        Ok(grouped)
    }
}
