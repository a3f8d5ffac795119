//! Database operations for `apps` and the `app_keywords` link table.

use sqlx::PgPool;

use crate::DbError;

/// A row from the `apps` table.
///
/// The canonical store URL is derived from `package_id` by the core crate and
/// never stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppRow {
    pub id: i64,
    pub name: String,
    pub package_id: String,
    pub region_code: String,
    pub is_active: bool,
}

/// An (app, keyword) link from `app_keywords`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct LinkedPair {
    pub keyword_id: i64,
    pub app_id: i64,
}

/// Returns the active apps linked to the given keyword, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_apps_for_keyword(
    pool: &PgPool,
    keyword_id: i64,
) -> Result<Vec<AppRow>, DbError> {
    let rows = sqlx::query_as::<_, AppRow>(
        "SELECT a.id, a.name, a.package_id, a.region_code, a.is_active \
         FROM apps a \
         JOIN app_keywords ak ON ak.app_id = a.id \
         WHERE ak.keyword_id = $1 AND a.is_active \
         ORDER BY a.id",
    )
    .bind(keyword_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns every (keyword, app) link, ordered by keyword then app.
///
/// The daily aggregation writes one row per link, so this listing is the full
/// set of pairs a day's aggregate covers, including pairs no run observed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_linked_pairs(pool: &PgPool) -> Result<Vec<LinkedPair>, DbError> {
    let rows = sqlx::query_as::<_, LinkedPair>(
        "SELECT ak.keyword_id, ak.app_id \
         FROM app_keywords ak \
         ORDER BY ak.keyword_id, ak.app_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
