pub mod config;
pub mod date_util;
pub mod error;
pub mod llm;
pub mod period;
pub mod query;
pub mod report;
pub mod runner;
pub mod storage;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::Config;
pub use error::{Error, Result};
pub use llm::{CompletionService, DEFAULT_PROVIDERS};
pub use period::{plan_periods, Granularity, ReportPeriod};
pub use query::{
    JobState, JobStatus, PollPolicy, QueryClient, QueryService, RawResultSet, RawRow, TableResult,
};
pub use report::{discover_range, PeriodTables, ReportBundle};
pub use runner::{NoopProgress, PeriodOutcome, PeriodStatus, ReportProgress, RunSummary};
pub use storage::{BlobStore, InsightRecord, MemoryBlobStore};

use std::sync::Arc;

/// Main entry point for the batch reporting engine.
///
/// All three external collaborators are injected; nothing is constructed at
/// process scope, so tests substitute fakes for any of them.
pub struct ReportEngine {
    query: QueryClient,
    completion: Arc<dyn CompletionService>,
    store: Arc<dyn BlobStore>,
    config: Config,
}

impl ReportEngine {
    pub fn new(
        query_service: Arc<dyn QueryService>,
        completion: Arc<dyn CompletionService>,
        store: Arc<dyn BlobStore>,
        config: Config,
    ) -> Self {
        Self::with_poll_policy(query_service, completion, store, config, PollPolicy::default())
    }

    pub fn with_poll_policy(
        query_service: Arc<dyn QueryService>,
        completion: Arc<dyn CompletionService>,
        store: Arc<dyn BlobStore>,
        config: Config,
        policy: PollPolicy,
    ) -> Self {
        Self {
            query: QueryClient::with_policy(query_service, policy),
            completion,
            store,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full batch over every reporting period in the dataset.
    pub async fn run(&self, progress: &dyn ReportProgress) -> Result<RunSummary> {
        runner::run_batch(
            &self.query,
            self.completion.as_ref(),
            self.store.as_ref(),
            &self.config,
            progress,
        )
        .await
    }
}
