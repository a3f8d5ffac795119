//! Database operations for `keywords`.

use sqlx::PgPool;

use crate::DbError;

/// A keyword joined with its region's search attributes.
///
/// `store_link_attributes` is the opaque query fragment appended verbatim to
/// store search requests; `None` (or empty) means the region is not
/// measurable and the worker skips the keyword.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeywordRow {
    pub id: i64,
    pub name: String,
    pub region_code: String,
    pub store_link_attributes: Option<String>,
}

/// Returns the keywords eligible for measurement: those linked to at least
/// one active app, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_keywords_with_active_apps(pool: &PgPool) -> Result<Vec<KeywordRow>, DbError> {
    let rows = sqlx::query_as::<_, KeywordRow>(
        "SELECT k.id, k.name, k.region_code, r.store_link_attributes \
         FROM keywords k \
         JOIN regions r ON r.code = k.region_code \
         WHERE EXISTS ( \
             SELECT 1 FROM app_keywords ak \
             JOIN apps a ON a.id = ak.app_id \
             WHERE ak.keyword_id = k.id AND a.is_active \
         ) \
         ORDER BY k.id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
