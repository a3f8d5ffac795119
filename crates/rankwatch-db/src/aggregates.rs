//! Database operations for `daily_aggregates`.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::DbError;

/// A daily aggregate row ready for insertion.
#[derive(Debug, Clone)]
pub struct NewDailyAggregate {
    pub date: NaiveDate,
    pub keyword_id: i64,
    pub app_id: i64,
    pub position: i32,
}

/// Bulk-inserts one batch of daily aggregate rows in a single statement.
///
/// Returns the number of rows written. This is a plain INSERT: existing rows
/// for the same day are neither replaced nor deduplicated, so aggregating the
/// same day twice appends a second set of rows (see DESIGN.md).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_daily_aggregates(
    pool: &PgPool,
    rows: &[NewDailyAggregate],
) -> Result<u64, DbError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO daily_aggregates (date, keyword_id, app_id, position) ");
    builder.push_values(rows, |mut b, row| {
        b.push_bind(row.date)
            .push_bind(row.keyword_id)
            .push_bind(row.app_id)
            .push_bind(row.position);
    });

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}
