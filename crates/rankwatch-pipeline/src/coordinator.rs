//! The run coordinator: owns one measurement run, shards the eligible
//! keywords, spawns the workers, and joins them before stamping the end.

use std::sync::Arc;
use std::time::Duration;

use rankwatch_core::{partition, AppConfig};
use rankwatch_scraper::ChannelFactory;
use tokio::task::JoinSet;

use crate::store::Store;
use crate::worker::{process_shard, KeywordJob};
use crate::PipelineError;

/// Outcome of one measurement run, for logging and operator eyeballs.
///
/// There is no run-level failure status: a run that reached its end timestamp
/// has "ended", and partial coverage shows up as an observation count smaller
/// than the expected keyword × app pairs.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub run_id: i64,
    pub keywords: usize,
    pub workers_spawned: usize,
    pub workers_aborted: usize,
    pub observations: usize,
}

pub struct RunCoordinator {
    store: Arc<dyn Store>,
    factory: Arc<dyn ChannelFactory>,
    worker_count: usize,
    pacing: Duration,
}

impl RunCoordinator {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        factory: Arc<dyn ChannelFactory>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            factory,
            worker_count: config.worker_count.max(1),
            pacing: Duration::from_secs_f64(config.fetch_delay_secs.max(0.0)),
        }
    }

    /// Executes one full measurement run.
    ///
    /// The run row is created before the workers start and its end timestamp
    /// is written after every worker has returned, aborted or not. Worker
    /// faults never surface here; only store failures outside the worker loop
    /// do.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Db`] if loading the work list or writing the
    /// run row fails.
    pub async fn run_measurement(&self) -> Result<RunSummary, PipelineError> {
        let keywords = self.store.eligible_keywords().await?;
        let mut jobs = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let apps = self.store.active_apps_for_keyword(keyword.id).await?;
            jobs.push(KeywordJob { keyword, apps });
        }
        let keyword_count = jobs.len();

        let shards = partition(jobs, self.worker_count);

        let run = self.store.create_run().await?;
        tracing::info!(
            run_id = run.id,
            keywords = keyword_count,
            workers = self.worker_count,
            "measurement run started"
        );

        let mut set = JoinSet::new();
        let mut workers_spawned = 0usize;
        for (index, shard) in shards.into_iter().enumerate() {
            if shard.is_empty() {
                continue;
            }
            workers_spawned += 1;
            set.spawn(process_shard(
                index,
                run.id,
                shard,
                Arc::clone(&self.factory),
                Arc::clone(&self.store),
                self.pacing,
            ));
        }

        let mut workers_aborted = 0usize;
        let mut observations = 0usize;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(report) => {
                    if report.aborted {
                        workers_aborted += 1;
                    }
                    observations += report.observations;
                }
                Err(e) => {
                    tracing::error!(error = %e, "worker task panicked");
                    workers_aborted += 1;
                }
            }
        }

        self.store.end_run(run.id).await?;
        tracing::info!(
            run_id = run.id,
            observations,
            workers_aborted,
            "measurement run ended"
        );

        Ok(RunSummary {
            run_id: run.id,
            keywords: keyword_count,
            workers_spawned,
            workers_aborted,
            observations,
        })
    }
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
