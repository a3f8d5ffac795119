//! The `aggregate` command: reduce one day's observations into daily rows.

use std::sync::Arc;

use chrono::NaiveDate;
use rankwatch_pipeline::{Aggregator, PgStore};

pub(crate) async fn run(pool: sqlx::PgPool, day: &str) -> anyhow::Result<()> {
    let day = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid day '{day}': {e} (expected YYYY-MM-DD)"))?;

    let store = Arc::new(PgStore::new(pool));
    let aggregator = Aggregator::new(store);
    let summary = aggregator.aggregate_day(day).await?;

    println!(
        "aggregated {} pairs from {} runs for {}: {} rows written",
        summary.pairs, summary.runs, summary.day, summary.rows_written
    );

    Ok(())
}
