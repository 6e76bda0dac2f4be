//! Database initialization
//!
//! The importer holds exactly one connection: every pool created here is
//! capped at a single connection so only one transaction is ever open.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (or create) the database file and ensure the housing schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = single_connection_pool(&db_url).await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_housing_table(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the housing schema
///
/// The single connection never expires, so the data lives as long as the pool.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let pool = single_connection_pool("sqlite::memory:").await?;
    create_housing_table(&pool).await?;
    Ok(pool)
}

async fn single_connection_pool(db_url: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(db_url)
        .await?;
    Ok(pool)
}

/// Create the housing table and its lookup indexes (idempotent)
pub async fn create_housing_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS housing (
            guid TEXT PRIMARY KEY,
            zip_code INTEGER NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            county TEXT NOT NULL,
            median_age INTEGER NOT NULL,
            total_rooms INTEGER NOT NULL,
            total_bedrooms INTEGER NOT NULL,
            population INTEGER NOT NULL,
            households INTEGER NOT NULL,
            median_income INTEGER NOT NULL,
            median_house_value INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Aggregate lookups filter on these two columns
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_housing_zip_code ON housing(zip_code)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_housing_total_rooms ON housing(total_rooms)")
        .execute(pool)
        .await?;

    Ok(())
}
