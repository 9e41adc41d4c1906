//! Command-line access to the publication workflow.
//!
//! Every command prints one JSON document on stdout; logs go to stderr.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use events_core::common::auth::{Actor, Role};
use events_core::common::pagination::PaginationArgs;
use events_core::common::{EventId, MemberId, OrganizationId};
use events_core::config::Config;
use events_core::domains::calendar::activities;
use events_core::domains::calendar::models::{CreateEvent, WorkflowAction, WorkflowState};
use events_core::domains::calendar::{DashboardBucket, WorkflowError};
use events_core::kernel::ServerDeps;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "events-cli")]
#[command(about = "Tourism events calendar: publication workflow")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,

    /// Create an event in draft (or pending internal approval)
    Seed {
        title: String,
        #[arg(long)]
        owner: OrganizationId,
        #[arg(long)]
        supervisor: OrganizationId,
        /// RFC 3339 timestamp
        #[arg(long)]
        start: DateTime<Utc>,
        /// RFC 3339 timestamp
        #[arg(long)]
        end: DateTime<Utc>,
        /// Start in pending_internal_approval instead of draft
        #[arg(long)]
        submitted: bool,
    },

    /// Apply a named action (submit, approve_internal, reject, ...)
    Transition {
        event_id: EventId,
        action: WorkflowAction,
        #[command(flatten)]
        actor: ActorArgs,
        #[arg(long)]
        comment: Option<String>,
    },

    /// Apply the next approval step for the event's current state
    Approve {
        event_id: EventId,
        #[command(flatten)]
        actor: ActorArgs,
        #[arg(long)]
        comment: Option<String>,
    },

    /// Dashboard bucket of one event
    Bucket { event_id: EventId },

    /// Bucket counts for an organization
    Summary { organization_id: OrganizationId },

    /// One page of a dashboard tab
    List {
        organization_id: OrganizationId,
        bucket: DashboardBucket,
        #[arg(long)]
        first: Option<i32>,
        #[arg(long)]
        after: Option<String>,
    },

    /// Audit trail of one event
    History { event_id: EventId },

    /// Workflow statistics for an organization
    Stats { organization_id: OrganizationId },
}

#[derive(Args)]
struct ActorArgs {
    /// Acting member (random if omitted)
    #[arg(long)]
    actor_id: Option<MemberId>,
    #[arg(long, default_value = "cli")]
    actor_name: String,
    /// platform_admin, entity_admin, entity_staff or organizer_admin
    #[arg(long)]
    role: Role,
    /// Organization the actor belongs to
    #[arg(long)]
    organization: OrganizationId,
}

impl ActorArgs {
    fn into_actor(self) -> Actor {
        Actor::new(
            self.actor_id.unwrap_or_default(),
            self.actor_name,
            self.role,
            self.organization,
        )
    }
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct Response<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

#[derive(Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
    retryable: bool,
}

fn error_kind(err: &WorkflowError) -> &'static str {
    match err {
        WorkflowError::InvalidTransition { .. } => "invalid_transition",
        WorkflowError::PermissionDenied(_) => "permission_denied",
        WorkflowError::Validation { .. } => "validation_error",
        WorkflowError::Conflict { .. } => "conflict",
        WorkflowError::NotFound(_) => "not_found",
        WorkflowError::InvalidPagination(_) => "invalid_pagination",
        WorkflowError::Database(_) => "database",
        WorkflowError::Internal(_) => "internal",
    }
}

/// Print the outcome. Workflow failures are reported in JSON and turn into
/// a non-zero exit status.
fn output<T: Serialize>(result: Result<T, WorkflowError>) -> Result<()> {
    let (response, failed) = match result {
        Ok(data) => (
            Response {
                success: true,
                data: Some(data),
                error: None,
            },
            false,
        ),
        Err(err) => (
            Response {
                success: false,
                data: None,
                error: Some(ErrorBody {
                    kind: error_kind(&err),
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                }),
            },
            true,
        ),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("Failed to serialize response")?
    );
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,events_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pool = get_pool(&config).await?;

    if let Commands::Migrate = cli.command {
        return cmd_migrate(&pool).await;
    }

    let deps = ServerDeps::postgres(pool, config.workflow_feed_capacity);
    let now = Utc::now();

    match cli.command {
        Commands::Migrate => Ok(()),
        Commands::Seed {
            title,
            owner,
            supervisor,
            start,
            end,
            submitted,
        } => {
            let initial_state = if submitted {
                WorkflowState::PendingInternalApproval
            } else {
                WorkflowState::Draft
            };
            let input = CreateEvent::builder()
                .title(title)
                .start_date(start)
                .end_date(end)
                .owner_organization_id(owner)
                .supervising_entity_id(supervisor)
                .initial_state(initial_state)
                .build();
            output(deps.event_store.create_event(input).await)
        }
        Commands::Transition {
            event_id,
            action,
            actor,
            comment,
        } => {
            let actor = actor.into_actor();
            output(
                activities::transition_event(event_id, action, &actor, comment.as_deref(), &deps)
                    .await,
            )
        }
        Commands::Approve {
            event_id,
            actor,
            comment,
        } => {
            let actor = actor.into_actor();
            output(activities::approve_event(event_id, &actor, comment.as_deref(), &deps).await)
        }
        Commands::Bucket { event_id } => {
            output(activities::get_bucket(event_id, now, &deps).await)
        }
        Commands::Summary { organization_id } => {
            output(activities::get_summary_counts(organization_id, now, &deps).await)
        }
        Commands::List {
            organization_id,
            bucket,
            first,
            after,
        } => {
            let pagination = PaginationArgs { first, after };
            output(
                activities::list_events_by_tab(organization_id, bucket, now, &pagination, &deps)
                    .await,
            )
        }
        Commands::History { event_id } => output(activities::get_history(event_id, &deps).await),
        Commands::Stats { organization_id } => {
            output(activities::get_workflow_statistics(organization_id, now, &deps).await)
        }
    }
}

async fn get_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

async fn cmd_migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");
    output::<&str>(Ok("migrations applied"))
}
