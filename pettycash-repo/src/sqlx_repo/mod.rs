mod category_repo;
mod transaction_repo;
mod user_repo;

use crate::category_repo::CategoryRepo;
use crate::transaction_repo::TransactionRepo;
use crate::user_repo::UserRepo;
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use tracing::info;

/// SQLSTATE raised when a row is still referenced by a foreign key.
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub struct SQLxRepo {
    pool: Pool<Postgres>,
}

impl SQLxRepo {
    pub fn new(pool: Pool<Postgres>) -> SQLxRepo {
        SQLxRepo { pool }
    }
}

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|e| e.code())
        .map_or(false, |code| code == FOREIGN_KEY_VIOLATION)
}

pub async fn create_repos(
    database_url: String,
    max_pool_size: u32,
) -> Result<
    (
        Arc<dyn UserRepo>,
        Arc<dyn TransactionRepo>,
        Arc<dyn CategoryRepo>,
    ),
    anyhow::Error,
> {
    let pool = PgPoolOptions::new()
        .max_connections(max_pool_size)
        .connect(&database_url)
        .await
        .context("Unable to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Unable to run database migrations")?;
    info!("database migrations applied");

    let repo = Arc::new(SQLxRepo::new(pool));
    Ok((repo.clone(), repo.clone(), repo))
}
