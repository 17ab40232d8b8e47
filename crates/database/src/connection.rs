use crate::error::DbError;
use dotenvy::dotenv;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// Reads the `DATABASE_URL` from the environment (loading `.env` when
/// present), creates a connection pool with robust settings, and returns it.
/// This pool is shared across the entire application.
pub async fn connect() -> Result<PgPool, DbError> {
    // The .env file is optional in deployed environments.
    dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    Ok(pool)
}

/// Applies any pending database migrations.
///
/// Called on startup by both the CLI and the web server so the schema is
/// always up-to-date before the first query runs.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
