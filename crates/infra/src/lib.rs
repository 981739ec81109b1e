mod config;
mod repos;
mod system;

pub use config::Config;
pub use repos::{DeleteResult, IEventRepo, Repos};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};
use tracing::info;

const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

#[derive(Clone)]
pub struct SlotbookContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl SlotbookContext {
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
        }
    }

    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let repos = Repos::create_postgres(&params.postgres_connection_string).await?;
        Ok(Self {
            repos,
            config: Config::new(),
            sys: Arc::new(RealSys {}),
        })
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<SlotbookContext> {
    // cargo run inmemory
    let inmemory_arg_set = std::env::args().nth(1).map_or(false, |arg| arg == "inmemory");
    if inmemory_arg_set {
        info!("Inmemory argument provided. Going to use inmemory infra.");
        return Ok(SlotbookContext::create_inmemory());
    }

    match std::env::var(PSQL_CONNECTION_STRING) {
        Ok(postgres_connection_string) => {
            info!(
                "{} env var was provided. Going to use postgres.",
                PSQL_CONNECTION_STRING
            );
            run_migration(&postgres_connection_string).await?;
            SlotbookContext::create(ContextParams {
                postgres_connection_string,
            })
            .await
        }
        Err(_) => {
            info!(
                "{} env var was not provided. Going to use inmemory infra.",
                PSQL_CONNECTION_STRING
            );
            Ok(SlotbookContext::create_inmemory())
        }
    }
}

pub async fn run_migration(connection_string: &str) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(connection_string)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    Ok(())
}
