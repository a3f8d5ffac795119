//! One measurement worker: a keyword shard processed sequentially over an
//! exclusively-owned fetch channel, with the retry-then-abort fault policy.

use std::sync::Arc;
use std::time::Duration;

use rankwatch_core::ranking::{resolve_positions, store_link};
use rankwatch_db::{AppRow, DbError, KeywordRow};
use rankwatch_scraper::{ChannelFactory, FetchError, SearchChannel};

use crate::store::Store;

/// A keyword with its active linked apps, preloaded so the worker never reads
/// from the store mid-shard.
pub(crate) struct KeywordJob {
    pub keyword: KeywordRow,
    pub apps: Vec<AppRow>,
}

/// What one worker did with its shard. Purely informational; faults are
/// contained here and never propagate across workers.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkerReport {
    pub worker: usize,
    /// Keywords with observations written.
    pub processed: usize,
    /// Keywords skipped with a warning (missing attributes, no apps, or no
    /// measurable results).
    pub skipped: usize,
    /// Observation rows written.
    pub observations: usize,
    /// True when the worker stopped before exhausting its shard.
    pub aborted: bool,
}

/// One fetch-resolve-record attempt for a keyword.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("observation write failed: {0}")]
    Store(#[from] DbError),
}

#[derive(PartialEq, Eq)]
enum StepOutcome {
    Continue,
    Abort,
}

/// Processes one shard sequentially. Pacing is slept between successive
/// keyword fetches; the channel is owned by this worker for its whole life
/// and only replaced after a recoverable fault.
pub(crate) async fn process_shard(
    worker: usize,
    run_id: i64,
    shard: Vec<KeywordJob>,
    factory: Arc<dyn ChannelFactory>,
    store: Arc<dyn Store>,
    pacing: Duration,
) -> WorkerReport {
    let mut report = WorkerReport {
        worker,
        ..WorkerReport::default()
    };
    if shard.is_empty() {
        return report;
    }

    tracing::info!(worker, run_id, keywords = shard.len(), "worker started");

    let mut channel = match factory.open().await {
        Ok(channel) => channel,
        Err(e) => {
            tracing::error!(worker, error = %e, "could not open channel; aborting worker");
            report.aborted = true;
            return report;
        }
    };

    for (index, job) in shard.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(pacing).await;
        }

        let keyword = &job.keyword;
        let Some(attributes) = keyword
            .store_link_attributes
            .as_deref()
            .filter(|a| !a.is_empty())
        else {
            tracing::warn!(
                worker,
                keyword = %keyword.name,
                region = %keyword.region_code,
                "keyword region has no search attributes; skipping"
            );
            report.skipped += 1;
            continue;
        };
        if job.apps.is_empty() {
            tracing::warn!(worker, keyword = %keyword.name, "keyword has no active linked apps; skipping");
            report.skipped += 1;
            continue;
        }

        match observe_keyword(channel.as_mut(), store.as_ref(), run_id, job, attributes).await {
            Ok(written) => {
                report.processed += 1;
                report.observations += written;
            }
            Err(AttemptError::Fetch(FetchError::NoResults { .. })) => {
                tracing::warn!(worker, keyword = %keyword.name, "no results; backing off and retrying once");
                tokio::time::sleep(pacing).await;
                let retry =
                    observe_keyword(channel.as_mut(), store.as_ref(), run_id, job, attributes)
                        .await;
                if fold_retry(worker, keyword, retry, &mut report) == StepOutcome::Abort {
                    break;
                }
            }
            Err(AttemptError::Fetch(FetchError::Recoverable { .. })) => {
                tracing::warn!(worker, keyword = %keyword.name, "recoverable channel fault; replacing channel and retrying");
                channel = match factory.open().await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        tracing::error!(
                            worker,
                            error = %e,
                            "replacement channel could not be opened; aborting worker's remaining shard"
                        );
                        report.aborted = true;
                        break;
                    }
                };
                let retry =
                    observe_keyword(channel.as_mut(), store.as_ref(), run_id, job, attributes)
                        .await;
                if fold_retry(worker, keyword, retry, &mut report) == StepOutcome::Abort {
                    break;
                }
            }
            Err(e) => {
                tracing::error!(
                    worker,
                    keyword = %keyword.name,
                    error = %e,
                    "unrecoverable failure; aborting worker's remaining shard"
                );
                report.aborted = true;
                break;
            }
        }
    }

    tracing::info!(
        worker,
        processed = report.processed,
        skipped = report.skipped,
        observations = report.observations,
        aborted = report.aborted,
        "worker finished"
    );
    report
}

/// Fetches the ranking for one keyword and records a position for every
/// active linked app. Returns the number of observations written.
async fn observe_keyword(
    channel: &mut dyn SearchChannel,
    store: &dyn Store,
    run_id: i64,
    job: &KeywordJob,
    attributes: &str,
) -> Result<usize, AttemptError> {
    let ranked = channel
        .fetch_ranking(&job.keyword.name, attributes)
        .await?;

    let links: Vec<String> = job
        .apps
        .iter()
        .map(|app| store_link(&app.package_id))
        .collect();
    let positions = resolve_positions(&ranked, &links);

    let mut written = 0usize;
    for (app, position) in job.apps.iter().zip(positions) {
        store
            .record_observation(run_id, job.keyword.id, app.id, position)
            .await?;
        written += 1;
    }
    Ok(written)
}

/// Folds a retry attempt into the report. A success continues the shard, a
/// still-empty result skips just this keyword, and anything else (including
/// a second recoverable fault) ends the worker's shard.
fn fold_retry(
    worker: usize,
    keyword: &KeywordRow,
    result: Result<usize, AttemptError>,
    report: &mut WorkerReport,
) -> StepOutcome {
    match result {
        Ok(written) => {
            report.processed += 1;
            report.observations += written;
            StepOutcome::Continue
        }
        Err(AttemptError::Fetch(FetchError::NoResults { .. })) => {
            tracing::warn!(worker, keyword = %keyword.name, "still no results; keyword has no measurable ranking today");
            report.skipped += 1;
            StepOutcome::Continue
        }
        Err(e) => {
            tracing::error!(
                worker,
                keyword = %keyword.name,
                error = %e,
                "retry failed; aborting worker's remaining shard"
            );
            report.aborted = true;
            StepOutcome::Abort
        }
    }
}

#[cfg(test)]
#[path = "worker_test.rs"]
mod tests;
