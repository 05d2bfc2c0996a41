//! Database operations for the `attorneys` table.

use bardir_core::MergedRecord;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `attorneys` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttorneyRow {
    pub bar_number: String,
    pub license_date: String,
    pub prefix: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub suffix: String,
    pub firm: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub familiar_name: String,
    pub telephone: String,
    pub detail_url: String,
    pub practice_areas: Option<String>,
    /// Listing page the record was first seen on.
    pub page: i64,
    pub jurisdiction: String,
    pub ingested_at: DateTime<Utc>,
}

/// Result of [`upsert_attorney`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// A row with the same bar number already existed and was left untouched.
    Duplicate,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts a merged record, silently skipping bar numbers already stored.
///
/// The first write for a bar number wins; later writes never modify it, so
/// re-ingesting a page after an interrupted run is safe.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_attorney(
    pool: &SqlitePool,
    record: &MergedRecord,
    jurisdiction: &str,
) -> Result<UpsertOutcome, DbError> {
    let summary = &record.summary;
    let detail = &record.detail;

    let result = sqlx::query(
        "INSERT OR IGNORE INTO attorneys \
             (bar_number, license_date, prefix, first_name, middle_name, last_name, suffix, \
              firm, street, city, state, zip, familiar_name, telephone, detail_url, \
              practice_areas, page, jurisdiction, ingested_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
    )
    .bind(&detail.bar_number)
    .bind(&detail.license_date)
    .bind(&summary.prefix)
    .bind(&summary.first_name)
    .bind(&summary.middle_name)
    .bind(&summary.last_name)
    .bind(&summary.suffix)
    .bind(&summary.firm)
    .bind(&summary.address.street)
    .bind(&summary.address.city)
    .bind(&summary.address.state)
    .bind(&summary.address.zip)
    .bind(&summary.familiar_name)
    .bind(&summary.telephone)
    .bind(&summary.detail_url)
    .bind(detail.practice_areas.as_deref())
    .bind(i64::from(record.page))
    .bind(jurisdiction)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        Ok(UpsertOutcome::Duplicate)
    } else {
        Ok(UpsertOutcome::Inserted)
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns the stored row for `bar_number`, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_attorney(
    pool: &SqlitePool,
    bar_number: &str,
) -> Result<Option<AttorneyRow>, DbError> {
    let row = sqlx::query_as::<_, AttorneyRow>(
        "SELECT bar_number, license_date, prefix, first_name, middle_name, last_name, suffix, \
                firm, street, city, state, zip, familiar_name, telephone, detail_url, \
                practice_areas, page, jurisdiction, ingested_at \
         FROM attorneys \
         WHERE bar_number = ?1",
    )
    .bind(bar_number)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns every stored bar number in ascending order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_bar_numbers(pool: &SqlitePool) -> Result<Vec<String>, DbError> {
    let rows = sqlx::query_scalar::<_, String>("SELECT bar_number FROM attorneys ORDER BY bar_number")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Counts stored attorneys, optionally restricted to one jurisdiction tag.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_attorneys(pool: &SqlitePool, jurisdiction: Option<&str>) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attorneys WHERE ?1 IS NULL OR jurisdiction = ?1",
    )
    .bind(jurisdiction)
    .fetch_one(pool)
    .await?;
    Ok(count)
}
