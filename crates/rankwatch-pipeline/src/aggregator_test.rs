use std::sync::Arc;

use super::*;
use crate::store::Store;
use crate::testutil::MemoryStore;
use chrono::Utc;
use rankwatch_db::LinkedPair;

/// Store with pairs (k1,a1), (k1,a2), (k2,a1) and three runs today.
async fn seeded_store() -> (Arc<MemoryStore>, NaiveDate, Vec<i64>) {
    let store = Arc::new(MemoryStore {
        pairs: vec![
            LinkedPair {
                keyword_id: 1,
                app_id: 1,
            },
            LinkedPair {
                keyword_id: 1,
                app_id: 2,
            },
            LinkedPair {
                keyword_id: 2,
                app_id: 1,
            },
        ],
        ..MemoryStore::default()
    });

    let mut run_ids = Vec::new();
    let mut day = Utc::now().date_naive();
    for i in 0..3 {
        let run = store.create_run().await.unwrap();
        if i == 0 {
            day = run.started_at.date_naive();
        }
        run_ids.push(run.id);
    }
    (store, day, run_ids)
}

#[tokio::test]
async fn reduces_each_pair_with_the_mode_rule() {
    let (store, day, runs) = seeded_store().await;

    // (k1, a1): repeated value 2 wins over the lone 5.
    store.record_observation(runs[0], 1, 1, 2).await.unwrap();
    store.record_observation(runs[1], 1, 1, 2).await.unwrap();
    store.record_observation(runs[2], 1, 1, 5).await.unwrap();
    // (k1, a2): all distinct with a zero, so the others are averaged.
    store.record_observation(runs[0], 1, 2, 0).await.unwrap();
    store.record_observation(runs[1], 1, 2, 4).await.unwrap();
    store.record_observation(runs[2], 1, 2, 8).await.unwrap();
    // (k2, a1): never observed; stays at the empty-list default below.

    let aggregator = Aggregator::new(store.clone());
    let summary = aggregator.aggregate_day(day).await.expect("should aggregate");

    assert_eq!(summary.runs, 3);
    assert_eq!(summary.pairs, 3);
    assert_eq!(summary.rows_written, 3);

    let rows = store.aggregates.lock().unwrap();
    let position_of = |keyword_id: i64, app_id: i64| {
        rows.iter()
            .find(|row| row.keyword_id == keyword_id && row.app_id == app_id)
            .map(|row| row.position)
            .expect("row must exist")
    };
    assert_eq!(position_of(1, 1), 2);
    assert_eq!(position_of(1, 2), 6);
    assert_eq!(position_of(2, 1), 0);
    assert!(rows.iter().all(|row| row.date == day));
}

#[tokio::test]
async fn rerunning_a_day_appends_duplicate_rows() {
    let (store, day, runs) = seeded_store().await;
    store.record_observation(runs[0], 1, 1, 3).await.unwrap();

    let aggregator = Aggregator::new(store.clone());
    aggregator.aggregate_day(day).await.expect("first pass");
    aggregator.aggregate_day(day).await.expect("second pass");

    // Known behavior: nothing deduplicates or replaces the first pass's rows.
    assert_eq!(store.aggregates.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn day_without_runs_still_writes_a_zero_row_per_pair() {
    let store = Arc::new(MemoryStore {
        pairs: vec![LinkedPair {
            keyword_id: 1,
            app_id: 1,
        }],
        ..MemoryStore::default()
    });

    let aggregator = Aggregator::new(store.clone());
    let day = Utc::now().date_naive();
    let summary = aggregator.aggregate_day(day).await.expect("should aggregate");

    assert_eq!(summary.runs, 0);
    assert_eq!(summary.rows_written, 1);
    let rows = store.aggregates.lock().unwrap();
    assert_eq!(rows[0].position, 0);
}

#[tokio::test]
async fn observations_from_another_day_are_ignored() {
    let (store, day, runs) = seeded_store().await;
    store.record_observation(runs[0], 1, 1, 9).await.unwrap();

    let other_day = day.pred_opt().expect("yesterday exists");
    let aggregator = Aggregator::new(store.clone());
    let summary = aggregator
        .aggregate_day(other_day)
        .await
        .expect("should aggregate");

    assert_eq!(summary.runs, 0);
    let rows = store.aggregates.lock().unwrap();
    // All pairs exist but none carry today's reading.
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.position == 0));
}
