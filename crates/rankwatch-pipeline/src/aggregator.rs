//! The daily aggregation pass: one representative position per linked
//! (keyword, app) pair, reduced from all of a day's raw observations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rankwatch_core::representative_position;
use rankwatch_db::NewDailyAggregate;

use crate::store::Store;
use crate::PipelineError;

#[derive(Debug, Clone, Copy)]
pub struct AggregateSummary {
    pub day: NaiveDate,
    pub runs: usize,
    pub pairs: usize,
    pub rows_written: u64,
}

/// Single-threaded batch reducer. Runs separately from measurement and is not
/// designed to execute concurrently with an in-flight run for the same day.
pub struct Aggregator {
    store: Arc<dyn Store>,
}

impl Aggregator {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Reduces one day's observations into daily aggregate rows.
    ///
    /// Every linked (keyword, app) pair gets a row, including pairs no run
    /// covered (position 0). Rows are appended with a single bulk insert;
    /// nothing deletes or replaces earlier rows for the same day, so
    /// re-running a day writes a second set of rows (see DESIGN.md).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Db`] if any load or the insert fails.
    pub async fn aggregate_day(&self, day: NaiveDate) -> Result<AggregateSummary, PipelineError> {
        let runs = self.store.runs_started_on(day).await?;
        let run_ids: Vec<i64> = runs.iter().map(|run| run.id).collect();
        tracing::info!(%day, runs = runs.len(), "starting daily aggregation");

        let observations = self.store.observations_for_runs(&run_ids).await?;

        // Positions grouped per pair, preserving the day's insertion order;
        // the reduction's tie-break depends on it.
        let mut by_pair: HashMap<(i64, i64), Vec<i32>> = HashMap::new();
        for obs in &observations {
            by_pair
                .entry((obs.keyword_id, obs.app_id))
                .or_default()
                .push(obs.position);
        }

        let pairs = self.store.linked_pairs().await?;
        let rows: Vec<NewDailyAggregate> = pairs
            .iter()
            .map(|pair| {
                let positions = by_pair
                    .get(&(pair.keyword_id, pair.app_id))
                    .map_or(&[][..], Vec::as_slice);
                NewDailyAggregate {
                    date: day,
                    keyword_id: pair.keyword_id,
                    app_id: pair.app_id,
                    position: representative_position(positions),
                }
            })
            .collect();

        let rows_written = self.store.insert_daily_aggregates(&rows).await?;
        tracing::info!(
            %day,
            pairs = rows.len(),
            rows_written,
            "daily aggregation complete"
        );

        Ok(AggregateSummary {
            day,
            runs: runs.len(),
            pairs: rows.len(),
            rows_written,
        })
    }
}

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod tests;
