//! The pipeline's view of the relational store.
//!
//! The store is an external collaborator: the coordinator and aggregator only
//! ever talk to this trait, so their retry/abort and reduction behavior can be
//! exercised without a database.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use rankwatch_db::{
    AppRow, DbError, KeywordRow, LinkedPair, NewDailyAggregate, ObservationRow, RunRow,
};

/// Everything the measurement and aggregation passes need from persistence.
///
/// Every method surfaces the underlying [`DbError`] unchanged.
#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Keywords linked to at least one active app, in measurement order.
    async fn eligible_keywords(&self) -> Result<Vec<KeywordRow>, DbError>;

    /// Active apps linked to one keyword.
    async fn active_apps_for_keyword(&self, keyword_id: i64) -> Result<Vec<AppRow>, DbError>;

    /// Persists a new run with its start timestamp.
    async fn create_run(&self) -> Result<RunRow, DbError>;

    /// Stamps a run's end timestamp.
    async fn end_run(&self, run_id: i64) -> Result<(), DbError>;

    /// Records one raw (keyword, app) position reading for a run.
    async fn record_observation(
        &self,
        run_id: i64,
        keyword_id: i64,
        app_id: i64,
        position: i32,
    ) -> Result<(), DbError>;

    /// Runs whose start timestamp falls on the given day (UTC).
    async fn runs_started_on(&self, day: NaiveDate) -> Result<Vec<RunRow>, DbError>;

    /// Every (keyword, app) link the daily aggregate must cover.
    async fn linked_pairs(&self) -> Result<Vec<LinkedPair>, DbError>;

    /// All observations belonging to the given runs, in insertion order.
    async fn observations_for_runs(&self, run_ids: &[i64]) -> Result<Vec<ObservationRow>, DbError>;

    /// Bulk-inserts one day's aggregate rows; returns the count written.
    async fn insert_daily_aggregates(&self, rows: &[NewDailyAggregate]) -> Result<u64, DbError>;
}

/// Production [`Store`] backed by the Postgres pool.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn eligible_keywords(&self) -> Result<Vec<KeywordRow>, DbError> {
        rankwatch_db::list_keywords_with_active_apps(&self.pool).await
    }

    async fn active_apps_for_keyword(&self, keyword_id: i64) -> Result<Vec<AppRow>, DbError> {
        rankwatch_db::list_active_apps_for_keyword(&self.pool, keyword_id).await
    }

    async fn create_run(&self) -> Result<RunRow, DbError> {
        rankwatch_db::create_run(&self.pool).await
    }

    async fn end_run(&self, run_id: i64) -> Result<(), DbError> {
        rankwatch_db::end_run(&self.pool, run_id).await
    }

    async fn record_observation(
        &self,
        run_id: i64,
        keyword_id: i64,
        app_id: i64,
        position: i32,
    ) -> Result<(), DbError> {
        rankwatch_db::insert_run_observation(&self.pool, run_id, keyword_id, app_id, position)
            .await
    }

    async fn runs_started_on(&self, day: NaiveDate) -> Result<Vec<RunRow>, DbError> {
        rankwatch_db::list_runs_started_on(&self.pool, day).await
    }

    async fn linked_pairs(&self) -> Result<Vec<LinkedPair>, DbError> {
        rankwatch_db::list_linked_pairs(&self.pool).await
    }

    async fn observations_for_runs(&self, run_ids: &[i64]) -> Result<Vec<ObservationRow>, DbError> {
        rankwatch_db::list_observations_for_runs(&self.pool, run_ids).await
    }

    async fn insert_daily_aggregates(&self, rows: &[NewDailyAggregate]) -> Result<u64, DbError> {
        rankwatch_db::insert_daily_aggregates(&self.pool, rows).await
    }
}
