use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use typed_builder::TypedBuilder;

use super::{AuditEntry, WorkflowState};
use crate::common::pagination::ValidatedPaginationArgs;
use crate::common::{EventId, MemberId, OrganizationId};
use crate::domains::calendar::workflow::predicate::EventPredicate;

/// A calendar event moving through the publication workflow.
///
/// History is only appended by workflow transitions; outside the crate it
/// is read through `ApprovalAuditTrail`.
///
/// ```compile_fail
/// use chrono::Utc;
/// use events_core::common::OrganizationId;
/// use events_core::domains::calendar::models::CreateEvent;
///
/// let mut event = CreateEvent::builder()
///     .title("Feria")
///     .start_date(Utc::now())
///     .end_date(Utc::now())
///     .owner_organization_id(OrganizationId::new())
///     .supervising_entity_id(OrganizationId::new())
///     .build()
///     .into_event()
///     .unwrap();
/// event.history.clear();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub workflow_state: WorkflowState,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    // Ownership
    pub owner_organization_id: OrganizationId,
    pub supervising_entity_id: OrganizationId,

    // Latest review outcome
    pub approval_comments: Option<String>,
    pub approved_by: Option<MemberId>,
    pub approved_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Number of workflow saves so far. A save only lands on the version it
    /// was prepared from.
    pub(crate) version: i64,

    /// Chronological audit trail, read through `ApprovalAuditTrail`.
    /// Loaded separately from `event_audit_entries`.
    #[sqlx(skip)]
    #[serde(default)]
    pub(crate) history: Vec<AuditEntry>,
}

/// The pair of fields categorization reads, copied out in one go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSnapshot {
    pub workflow_state: WorkflowState,
    pub end_date: DateTime<Utc>,
}

/// Input for seeding an event. Events enter the workflow in `draft` or
/// `pending_internal_approval`.
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct CreateEvent {
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub owner_organization_id: OrganizationId,
    pub supervising_entity_id: OrganizationId,
    #[builder(default = WorkflowState::Draft)]
    pub initial_state: WorkflowState,
}

impl CreateEvent {
    pub fn validate(&self) -> Result<()> {
        if !matches!(
            self.initial_state,
            WorkflowState::Draft | WorkflowState::PendingInternalApproval
        ) {
            anyhow::bail!(
                "Events must start in draft or pending_internal_approval (got {})",
                self.initial_state
            );
        }
        if self.end_date < self.start_date {
            anyhow::bail!("Event end date must not precede its start date");
        }
        Ok(())
    }

    /// Build the in-memory record this input describes.
    pub fn into_event(self) -> Result<Event> {
        self.validate()?;
        let now = Utc::now();
        Ok(Event {
            id: EventId::new(),
            title: self.title,
            workflow_state: self.initial_state,
            start_date: self.start_date,
            end_date: self.end_date,
            owner_organization_id: self.owner_organization_id,
            supervising_entity_id: self.supervising_entity_id,
            approval_comments: None,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
            history: Vec::new(),
        })
    }
}

impl Event {
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn snapshot(&self) -> EventSnapshot {
        EventSnapshot {
            workflow_state: self.workflow_state,
            end_date: self.end_date,
        }
    }

    /// Organizations see events they own and events they supervise.
    pub fn belongs_to(&self, organization_id: OrganizationId) -> bool {
        self.owner_organization_id == organization_id
            || self.supervising_entity_id == organization_id
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Event {
    /// Find event by ID (without history)
    pub async fn find_by_id(id: EventId, pool: &PgPool) -> Result<Option<Self>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(event)
    }

    /// Find event by ID with its full audit trail
    pub async fn find_by_id_with_history(id: EventId, pool: &PgPool) -> Result<Option<Self>> {
        let Some(mut event) = Self::find_by_id(id, pool).await? else {
            return Ok(None);
        };
        event.history = AuditEntry::find_by_event(id, pool).await?;
        Ok(Some(event))
    }

    pub async fn exists(id: EventId, conn: &mut PgConnection) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(conn)
        .await?;
        Ok(exists)
    }

    pub async fn create(input: CreateEvent, pool: &PgPool) -> Result<Self> {
        input.validate()?;
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                id, title, workflow_state, start_date, end_date,
                owner_organization_id, supervising_entity_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(EventId::new())
        .bind(&input.title)
        .bind(input.initial_state)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.owner_organization_id)
        .bind(input.supervising_entity_id)
        .fetch_one(pool)
        .await?;
        Ok(event)
    }

    /// Write the workflow fields only if the stored row is still in
    /// `expected_state` at the version just before `self.version`.
    /// Returns the number of rows updated (0 or 1).
    pub async fn update_workflow_if_unchanged(
        &self,
        expected_state: WorkflowState,
        conn: &mut PgConnection,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET workflow_state = $2,
                approval_comments = $3,
                approved_by = $4,
                approved_at = $5,
                updated_at = $6,
                version = $7
            WHERE id = $1 AND workflow_state = $8 AND version = $9
            "#,
        )
        .bind(self.id)
        .bind(self.workflow_state)
        .bind(&self.approval_comments)
        .bind(self.approved_by)
        .bind(self.approved_at)
        .bind(self.updated_at)
        .bind(self.version)
        .bind(expected_state)
        .bind(self.version - 1)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Every event an organization owns or supervises, with history.
    pub async fn find_by_organization(
        organization_id: OrganizationId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let mut events = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE owner_organization_id = $1 OR supervising_entity_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(pool)
        .await?;

        let ids: Vec<EventId> = events.iter().map(|e| e.id).collect();
        let mut histories = AuditEntry::find_by_events(&ids, pool).await?;
        for event in &mut events {
            event.history = histories.remove(&event.id).unwrap_or_default();
        }
        Ok(events)
    }

    /// Keyset-paginated listing of events matching a bucket predicate.
    /// Fetches `limit + 1` rows so the caller can detect another page.
    pub async fn find_matching(
        organization_id: Option<OrganizationId>,
        filter: &EventPredicate,
        args: &ValidatedPaginationArgs,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let mut qb = Self::scoped_query("SELECT * FROM events", organization_id, filter);
        if let Some(cursor) = args.cursor {
            qb.push(" AND id > ").push_bind(cursor);
        }
        qb.push(" ORDER BY id ASC LIMIT ").push_bind(args.fetch_limit());

        let events = qb.build_query_as::<Event>().fetch_all(pool).await?;
        Ok(events)
    }

    pub async fn count_matching(
        organization_id: Option<OrganizationId>,
        filter: &EventPredicate,
        pool: &PgPool,
    ) -> Result<i64> {
        let mut qb = Self::scoped_query("SELECT COUNT(*) FROM events", organization_id, filter);
        let count = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
        Ok(count)
    }

    fn scoped_query(
        select: &str,
        organization_id: Option<OrganizationId>,
        filter: &EventPredicate,
    ) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(select);
        qb.push(" WHERE ");
        if let Some(organization_id) = organization_id {
            qb.push("(owner_organization_id = ")
                .push_bind(organization_id)
                .push(" OR supervising_entity_id = ")
                .push_bind(organization_id)
                .push(") AND ");
        }
        qb.push("(");
        filter.push_sql(&mut qb);
        qb.push(")");
        qb
    }
}
