pub mod aggregator;
pub mod coordinator;
pub mod store;
pub mod worker;

pub use aggregator::{AggregateSummary, Aggregator};
pub use coordinator::{RunCoordinator, RunSummary};
pub use store::{PgStore, Store};
pub use worker::WorkerReport;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Db(#[from] rankwatch_db::DbError),
}

#[cfg(test)]
pub(crate) mod testutil;
