//! Page-level progress bookkeeping for resumable runs.
//!
//! Progress is keyed by the search's progress key so that runs over different
//! filter sets never share a resume point.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `completed_pages` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompletedPageRow {
    pub progress_key: String,
    pub page: i64,
    pub record_count: i64,
    pub completed_at: DateTime<Utc>,
}

/// Records that every entry of `page` was handled.
///
/// Marking a page twice refreshes its record count and timestamp.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn mark_page_complete(
    pool: &SqlitePool,
    progress_key: &str,
    page: u32,
    record_count: usize,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO completed_pages (progress_key, page, record_count, completed_at) \
         VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT (progress_key, page) DO UPDATE SET \
             record_count = excluded.record_count, \
             completed_at = excluded.completed_at",
    )
    .bind(progress_key)
    .bind(i64::from(page))
    .bind(i64::try_from(record_count).unwrap_or(i64::MAX))
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns the lowest page ordinal not yet marked complete for `progress_key`.
///
/// Gaps count: with pages 0, 1 and 3 complete the resume point is 2.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn resume_page(pool: &SqlitePool, progress_key: &str) -> Result<u32, DbError> {
    let pages = sqlx::query_scalar::<_, i64>(
        "SELECT page FROM completed_pages WHERE progress_key = ?1 ORDER BY page",
    )
    .bind(progress_key)
    .fetch_all(pool)
    .await?;

    Ok(first_gap(&pages))
}

fn first_gap(sorted_pages: &[i64]) -> u32 {
    let mut next: u32 = 0;
    for &page in sorted_pages {
        if page != i64::from(next) {
            break;
        }
        next += 1;
    }
    next
}

/// Returns completed pages for `progress_key`, ordered by page.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_completed_pages(
    pool: &SqlitePool,
    progress_key: &str,
) -> Result<Vec<CompletedPageRow>, DbError> {
    let rows = sqlx::query_as::<_, CompletedPageRow>(
        "SELECT progress_key, page, record_count, completed_at \
         FROM completed_pages \
         WHERE progress_key = ?1 \
         ORDER BY page",
    )
    .bind(progress_key)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Forgets all progress for `progress_key`. Stored attorneys are kept.
///
/// Returns the number of page rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn reset_progress(pool: &SqlitePool, progress_key: &str) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM completed_pages WHERE progress_key = ?1")
        .bind(progress_key)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::first_gap;

    #[test]
    fn first_gap_handles_empty_contiguous_and_holes() {
        assert_eq!(first_gap(&[]), 0);
        assert_eq!(first_gap(&[0, 1, 2]), 3);
        assert_eq!(first_gap(&[0, 1, 3]), 2);
        assert_eq!(first_gap(&[1, 2]), 0);
    }
}
