mod transaction_repo;
mod user_repo;

use crate::transaction_repo::TransactionRepo;
use crate::user_repo::UserRepo;
use crate::HealthCheck;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{query, Pool, Postgres};
use std::sync::Arc;
use tracing::{error, info};

pub struct SQLxRepo {
    pool: Pool<Postgres>,
}

impl SQLxRepo {
    pub fn new(pool: Pool<Postgres>) -> SQLxRepo {
        SQLxRepo { pool }
    }
}

#[async_trait]
impl HealthCheck for SQLxRepo {
    async fn check(&self) -> bool {
        match query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                error!(%e, "Database health check failed");
                false
            }
        }
    }
}

/// Connects to PostgreSQL and applies the embedded migrations for the shared tables.
/// Per-user transaction tables are created on demand.
pub async fn create_repos(
    database_url: &str,
    max_pool_size: u32,
) -> Result<
    (
        Arc<dyn UserRepo>,
        Arc<dyn TransactionRepo>,
        Arc<dyn HealthCheck>,
    ),
    anyhow::Error,
> {
    let pool = PgPoolOptions::new()
        .max_connections(max_pool_size)
        .connect(database_url)
        .await
        .context("Unable to connect to database")?;

    info!("Running migrations");
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Unable to run migrations")?;

    let repo = Arc::new(SQLxRepo::new(pool));
    let user_repo: Arc<dyn UserRepo> = repo.clone();
    let transaction_repo: Arc<dyn TransactionRepo> = repo.clone();
    let health_check: Arc<dyn HealthCheck> = repo;
    Ok((user_repo, transaction_repo, health_check))
}
