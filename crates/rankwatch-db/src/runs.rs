//! Database operations for `runs` and `run_observations`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `runs` table.
///
/// `ended_at` is NULL while the run's workers are still going; a run with
/// both timestamps set has ended, regardless of how many workers aborted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunRow {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// One raw position reading, as loaded for aggregation.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct ObservationRow {
    pub keyword_id: i64,
    pub app_id: i64,
    pub position: i32,
}

/// Creates a run with `started_at = NOW()` and returns the new row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_run(pool: &PgPool) -> Result<RunRow, DbError> {
    let row = sqlx::query_as::<_, RunRow>(
        "INSERT INTO runs DEFAULT VALUES RETURNING id, started_at, ended_at",
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as ended by setting `ended_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run does not exist or has
/// already ended, or [`DbError::Sqlx`] if the update fails.
pub async fn end_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE runs SET ended_at = NOW() WHERE id = $1 AND ended_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition { id });
    }

    Ok(())
}

/// Records one raw position reading for a run.
///
/// Observation rows are insert-only; nothing ever updates them.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_run_observation(
    pool: &PgPool,
    run_id: i64,
    keyword_id: i64,
    app_id: i64,
    position: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO run_observations (run_id, keyword_id, app_id, position) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(run_id)
    .bind(keyword_id)
    .bind(app_id)
    .bind(position)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns the runs whose `started_at` falls on the given calendar day,
/// evaluated in UTC as the half-open window `[day 00:00, day+1 00:00)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_runs_started_on(pool: &PgPool, day: NaiveDate) -> Result<Vec<RunRow>, DbError> {
    let window_start = day.and_time(NaiveTime::MIN).and_utc();

    let rows = sqlx::query_as::<_, RunRow>(
        "SELECT id, started_at, ended_at \
         FROM runs \
         WHERE started_at >= $1 AND started_at < $1 + INTERVAL '1 day' \
         ORDER BY id",
    )
    .bind(window_start)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns every observation belonging to the given runs, ordered by run then
/// insertion order.
///
/// The ordering matters: the aggregation's repeat-count tie-break picks the
/// value that appears first in this sequence.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_observations_for_runs(
    pool: &PgPool,
    run_ids: &[i64],
) -> Result<Vec<ObservationRow>, DbError> {
    if run_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, ObservationRow>(
        "SELECT keyword_id, app_id, position \
         FROM run_observations \
         WHERE run_id = ANY($1) \
         ORDER BY run_id, id",
    )
    .bind(run_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
