//! Persistence for the mediashelf catalog.
//!
//! Row models and transfer objects live in [`models`]; [`postgres`] and
//! [`memory`] implement the core storage port; [`catalog::Catalog`] wires one
//! generic service per entity type onto either backend.

use sqlx::postgres::PgPoolOptions;

pub mod catalog;
pub mod memory;
pub mod models;
pub mod postgres;

pub use catalog::Catalog;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to prove the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
