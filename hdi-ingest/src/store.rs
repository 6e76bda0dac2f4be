//! Record store: persistence and aggregate reads for merged housing entries

use async_trait::async_trait;
use hdi_common::db::HousingEntry;
use hdi_common::Result;
use sqlx::SqlitePool;
use std::time::Instant;
use tracing::{debug, warn};

/// Persistence collaborator for the merge and query stages
///
/// `insert` is atomic per entry: a failed insert leaves nothing behind.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Remove every persisted entry; returns the number removed
    async fn clear(&self) -> Result<u64>;

    /// Persist one entry in its own transaction
    async fn insert(&self, entry: &HousingEntry) -> Result<()>;

    /// SUM(total_bedrooms) over entries with total_rooms > `rooms`; 0 when none match
    async fn sum_bedrooms_above(&self, rooms: i64) -> Result<i64>;

    /// AVG(median_income) over entries with zip_code = `zip_code`; 0 when none match
    async fn average_income_for_zip(&self, zip_code: i64) -> Result<f64>;
}

/// SQLite-backed store over the `housing` table
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Wrap a pool whose schema was created by `hdi_common::db::init_database`
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of persisted entries
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM housing")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Load one persisted entry by identifier
    pub async fn fetch(&self, guid: &str) -> Result<Option<HousingEntry>> {
        let row = sqlx::query_as::<_, HousingRow>(
            r#"
            SELECT guid, zip_code, city, state, county, median_age,
                   total_rooms, total_bedrooms, population, households,
                   median_income, median_house_value
            FROM housing
            WHERE guid = ?
            "#,
        )
        .bind(guid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(HousingEntry::from))
    }
}

#[derive(sqlx::FromRow)]
struct HousingRow {
    guid: String,
    zip_code: i64,
    city: String,
    state: String,
    county: String,
    median_age: i64,
    total_rooms: i64,
    total_bedrooms: i64,
    population: i64,
    households: i64,
    median_income: i64,
    median_house_value: i64,
}

impl From<HousingRow> for HousingEntry {
    fn from(row: HousingRow) -> Self {
        Self {
            guid: row.guid,
            zip_code: row.zip_code,
            city: row.city,
            state: row.state,
            county: row.county,
            median_age: row.median_age,
            total_rooms: row.total_rooms,
            total_bedrooms: row.total_bedrooms,
            population: row.population,
            households: row.households,
            median_income: row.median_income,
            median_house_value: row.median_house_value,
        }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM housing")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert(&self, entry: &HousingEntry) -> Result<()> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO housing (
                guid, zip_code, city, state, county, median_age,
                total_rooms, total_bedrooms, population, households,
                median_income, median_house_value
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.guid)
        .bind(entry.zip_code)
        .bind(&entry.city)
        .bind(&entry.state)
        .bind(&entry.county)
        .bind(entry.median_age)
        .bind(entry.total_rooms)
        .bind(entry.total_bedrooms)
        .bind(entry.population)
        .bind(entry.households)
        .bind(entry.median_income)
        .bind(entry.median_house_value)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {
                tx.commit().await?;
                debug!(
                    guid = %entry.guid,
                    held_us = started.elapsed().as_micros() as u64,
                    "Entry committed"
                );
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(guid = %entry.guid, error = %rollback_err, "Rollback failed");
                }
                Err(e.into())
            }
        }
    }

    async fn sum_bedrooms_above(&self, rooms: i64) -> Result<i64> {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT SUM(total_bedrooms) FROM housing WHERE total_rooms > ?")
                .bind(rooms)
                .fetch_one(&self.pool)
                .await?;
        Ok(total.unwrap_or(0))
    }

    async fn average_income_for_zip(&self, zip_code: i64) -> Result<f64> {
        let average: Option<f64> =
            sqlx::query_scalar("SELECT AVG(median_income) FROM housing WHERE zip_code = ?")
                .bind(zip_code)
                .fetch_one(&self.pool)
                .await?;
        Ok(average.unwrap_or(0.0))
    }
}
