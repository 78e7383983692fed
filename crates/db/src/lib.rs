//! Persistence layer: Postgres models and repositories.
//!
//! Repositories are zero-sized structs with async methods taking `&PgPool`;
//! multi-statement operations expose `_inner` variants over an open
//! transaction so the engine crate can compose them atomically.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod models;
pub mod repositories;

/// Connect to Postgres and run pending migrations.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// Cheap liveness probe for the database connection.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
