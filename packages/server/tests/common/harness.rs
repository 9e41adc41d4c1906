//! Test harnesses.
//!
//! `TestHarness` runs the workflow over the in-memory store. `PgHarness`
//! uses a shared Postgres container: started once, migrated once, reused.

use anyhow::{Context, Result};
use events_core::domains::calendar::models::Event;
use events_core::kernel::{InMemoryEventStore, ServerDeps, TestDependencies, WorkflowFeed};
use sqlx::PgPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Initialize tracing for tests. Respects RUST_LOG.
/// Run tests with: RUST_LOG=debug cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory dependencies with handles for assertions.
pub struct TestHarness {
    pub deps: ServerDeps,
    pub store: InMemoryEventStore,
    pub feed: WorkflowFeed,
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();
        let test_deps = TestDependencies::new();
        Self {
            deps: test_deps.server_deps(),
            store: test_deps.event_store,
            feed: test_deps.workflow_feed,
        }
    }

    pub fn with_events(events: impl IntoIterator<Item = Event>) -> Self {
        let harness = Self::new();
        for event in events {
            harness.store.insert(event);
        }
        harness
    }

    /// Stored copy, panicking if missing.
    pub fn stored(&self, event: &Event) -> Event {
        self.store.get(event.id).expect("event is stored")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared Postgres container, kept alive for the whole test run.
struct SharedTestInfra {
    db_url: String,
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Postgres-backed dependencies on the shared container.
pub struct PgHarness {
    pub db_pool: PgPool,
    pub deps: ServerDeps,
}

impl PgHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;
        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;
        Ok(Self {
            deps: ServerDeps::postgres(db_pool.clone(), 16),
            db_pool,
        })
    }
}
