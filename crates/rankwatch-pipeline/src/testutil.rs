//! In-memory store and scripted channels for exercising the pipeline without
//! a database or network.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rankwatch_core::app_config::{AppConfig, ChannelKind};
use rankwatch_db::{
    AppRow, DbError, KeywordRow, LinkedPair, NewDailyAggregate, ObservationRow, RunRow,
};
use rankwatch_scraper::{ChannelFactory, FetchError, SearchChannel};

use crate::store::Store;

pub(crate) fn keyword(id: i64, name: &str) -> KeywordRow {
    KeywordRow {
        id,
        name: name.to_string(),
        region_code: "mx".to_string(),
        store_link_attributes: Some("hl=es-ES&gl=MX".to_string()),
    }
}

pub(crate) fn app(id: i64, package_id: &str) -> AppRow {
    AppRow {
        id,
        name: format!("app-{id}"),
        package_id: package_id.to_string(),
        region_code: "mx".to_string(),
        is_active: true,
    }
}

pub(crate) fn test_config(worker_count: usize) -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        log_level: "info".to_string(),
        channel: ChannelKind::Http,
        worker_count,
        fetch_delay_secs: 0.0,
        store_base_url: "https://store.test/search?c=apps".to_string(),
        request_timeout_secs: 5,
        user_agent: "rankwatch-test/0.1".to_string(),
        page_load_timeout_secs: 5,
        browser_headless: true,
        db_max_connections: 1,
        db_min_connections: 1,
        db_acquire_timeout_secs: 1,
    }
}

/// In-memory [`Store`]. Reads are seeded up front; writes land in mutexed
/// vectors the tests inspect afterwards.
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub keywords: Vec<KeywordRow>,
    pub apps_by_keyword: HashMap<i64, Vec<AppRow>>,
    pub pairs: Vec<LinkedPair>,
    /// Simulates an insert failure for observations of this keyword.
    pub fail_observations_for_keyword: Option<i64>,
    pub runs: Mutex<Vec<RunRow>>,
    pub observations: Mutex<Vec<(i64, ObservationRow)>>,
    pub aggregates: Mutex<Vec<NewDailyAggregate>>,
    pub next_run_id: AtomicI64,
}

#[async_trait]
impl Store for MemoryStore {
    async fn eligible_keywords(&self) -> Result<Vec<KeywordRow>, DbError> {
        Ok(self.keywords.clone())
    }

    async fn active_apps_for_keyword(&self, keyword_id: i64) -> Result<Vec<AppRow>, DbError> {
        Ok(self
            .apps_by_keyword
            .get(&keyword_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_run(&self) -> Result<RunRow, DbError> {
        let id = self.next_run_id.fetch_add(1, Ordering::SeqCst) + 1;
        let run = RunRow {
            id,
            started_at: Utc::now(),
            ended_at: None,
        };
        self.runs.lock().unwrap().push(run.clone());
        Ok(run)
    }

    async fn end_run(&self, run_id: i64) -> Result<(), DbError> {
        let mut runs = self.runs.lock().unwrap();
        let run = runs
            .iter_mut()
            .find(|run| run.id == run_id && run.ended_at.is_none())
            .ok_or(DbError::InvalidRunTransition { id: run_id })?;
        run.ended_at = Some(Utc::now());
        Ok(())
    }

    async fn record_observation(
        &self,
        run_id: i64,
        keyword_id: i64,
        app_id: i64,
        position: i32,
    ) -> Result<(), DbError> {
        if self.fail_observations_for_keyword == Some(keyword_id) {
            return Err(DbError::Sqlx(sqlx::Error::PoolClosed));
        }
        self.observations.lock().unwrap().push((
            run_id,
            ObservationRow {
                keyword_id,
                app_id,
                position,
            },
        ));
        Ok(())
    }

    async fn runs_started_on(&self, day: NaiveDate) -> Result<Vec<RunRow>, DbError> {
        Ok(self
            .runs
            .lock()
            .unwrap()
            .iter()
            .filter(|run| run.started_at.date_naive() == day)
            .cloned()
            .collect())
    }

    async fn linked_pairs(&self) -> Result<Vec<LinkedPair>, DbError> {
        Ok(self.pairs.clone())
    }

    async fn observations_for_runs(&self, run_ids: &[i64]) -> Result<Vec<ObservationRow>, DbError> {
        Ok(self
            .observations
            .lock()
            .unwrap()
            .iter()
            .filter(|(run_id, _)| run_ids.contains(run_id))
            .map(|(_, row)| *row)
            .collect())
    }

    async fn insert_daily_aggregates(&self, rows: &[NewDailyAggregate]) -> Result<u64, DbError> {
        self.aggregates.lock().unwrap().extend(rows.iter().cloned());
        Ok(rows.len() as u64)
    }
}

/// Per-fetch scripted channel behavior.
pub(crate) enum ScriptedOutcome {
    Ranked(Vec<String>),
    Recoverable,
    NoResults,
    Fatal,
}

/// A channel that replays a fixed outcome sequence, one per fetch call.
/// Running past the script is a fatal fault: a test bug, surfaced loudly.
pub(crate) struct ScriptedChannel {
    outcomes: VecDeque<ScriptedOutcome>,
}

impl ScriptedChannel {
    pub(crate) fn new(outcomes: Vec<ScriptedOutcome>) -> Self {
        Self {
            outcomes: outcomes.into(),
        }
    }
}

#[async_trait]
impl SearchChannel for ScriptedChannel {
    async fn fetch_ranking(
        &mut self,
        keyword: &str,
        _region_attributes: &str,
    ) -> Result<Vec<String>, FetchError> {
        match self.outcomes.pop_front() {
            Some(ScriptedOutcome::Ranked(links)) => Ok(links),
            Some(ScriptedOutcome::Recoverable) => Err(FetchError::Recoverable {
                context: keyword.to_string(),
                reason: "scripted".to_string(),
            }),
            Some(ScriptedOutcome::NoResults) => Err(FetchError::NoResults {
                keyword: keyword.to_string(),
            }),
            Some(ScriptedOutcome::Fatal) => Err(FetchError::Fatal {
                context: keyword.to_string(),
                reason: "scripted".to_string(),
            }),
            None => Err(FetchError::Fatal {
                context: keyword.to_string(),
                reason: "scripted channel exhausted".to_string(),
            }),
        }
    }
}

/// Hands out pre-scripted channels in order; an empty queue makes `open`
/// fail, which doubles as the "channel cannot be opened" scenario.
pub(crate) struct ScriptedFactory {
    channels: Mutex<VecDeque<ScriptedChannel>>,
}

impl ScriptedFactory {
    pub(crate) fn new(channels: Vec<ScriptedChannel>) -> Self {
        Self {
            channels: Mutex::new(channels.into()),
        }
    }
}

#[async_trait]
impl ChannelFactory for ScriptedFactory {
    async fn open(&self) -> Result<Box<dyn SearchChannel>, FetchError> {
        match self.channels.lock().unwrap().pop_front() {
            Some(channel) => Ok(Box::new(channel)),
            None => Err(FetchError::Fatal {
                context: "channel open".to_string(),
                reason: "no scripted channels left".to_string(),
            }),
        }
    }
}
