use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::llm::{self, CompletionService};
use crate::period::{plan_periods, ReportPeriod};
use crate::query::QueryClient;
use crate::report;
use crate::storage::{self, BlobStore, InsightRecord};

/// How one period's processing ended. Skipped and failed are distinct on
/// purpose: a sparse period is expected, a failed one needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PeriodStatus {
    Completed,
    SkippedNoData,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodOutcome {
    pub label: String,
    pub status: PeriodStatus,
    pub error: Option<String>,
}

/// Summary of a whole batch run across all planned periods.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub periods_total: usize,
    pub completed: usize,
    pub skipped_no_data: usize,
    pub failed: usize,
    pub outcomes: Vec<PeriodOutcome>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: Vec<PeriodOutcome>) -> Self {
        let completed = outcomes
            .iter()
            .filter(|o| o.status == PeriodStatus::Completed)
            .count();
        let skipped_no_data = outcomes
            .iter()
            .filter(|o| o.status == PeriodStatus::SkippedNoData)
            .count();
        let failed = outcomes
            .iter()
            .filter(|o| o.status == PeriodStatus::Failed)
            .count();
        Self {
            periods_total: outcomes.len(),
            completed,
            skipped_no_data,
            failed,
            outcomes,
        }
    }

    pub fn is_total_success(&self) -> bool {
        self.failed == 0 && self.skipped_no_data == 0
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "completed {}/{} periods ({} skipped for no data, {} failed)",
            self.completed, self.periods_total, self.skipped_no_data, self.failed
        )
    }
}

/// Observer hooks for driver-side progress reporting.
pub trait ReportProgress {
    fn on_range_discovered(&self, _min_date: chrono::NaiveDate, _max_date: chrono::NaiveDate) {}
    fn on_period_start(&self, _period: &ReportPeriod, _index: usize, _total: usize) {}
    fn on_period_complete(&self, _outcome: &PeriodOutcome) {}
}

/// Progress reporter that does nothing.
pub struct NoopProgress;

impl ReportProgress for NoopProgress {}

/// Drive the whole batch: discover the dataset extent, plan the periods,
/// and process each one in ascending order.
///
/// A failure inside one period is caught, logged, and recorded; it never
/// aborts the remaining periods. Only `EmptyDataset` from the bootstrap
/// query is fatal, since there is nothing to plan. The summary keeps
/// failed periods separate from no-data skips: a failed period is never
/// reported as a skip.
pub async fn run_batch(
    query: &QueryClient,
    completion: &dyn CompletionService,
    store: &dyn BlobStore,
    config: &Config,
    progress: &dyn ReportProgress,
) -> Result<RunSummary> {
    let (min_date, max_date) =
        report::discover_range(query, &config.database, &config.table, &config.output_location)
            .await?;
    progress.on_range_discovered(min_date, max_date);

    let periods = plan_periods(min_date, max_date, config.mode);
    let total = periods.len();
    log::info!("planned {total} {} periods over {min_date}..{max_date}", config.mode);

    let mut outcomes = Vec::with_capacity(total);
    for (index, period) in periods.iter().enumerate() {
        progress.on_period_start(period, index, total);
        log::info!("generating report for period {period}");

        let outcome = match process_period(query, completion, store, config, period).await {
            Ok(true) => PeriodOutcome {
                label: period.label.clone(),
                status: PeriodStatus::Completed,
                error: None,
            },
            Ok(false) => PeriodOutcome {
                label: period.label.clone(),
                status: PeriodStatus::SkippedNoData,
                error: None,
            },
            Err(e) => {
                log::error!("period {} failed: {e}", period.label);
                PeriodOutcome {
                    label: period.label.clone(),
                    status: PeriodStatus::Failed,
                    error: Some(e.to_string()),
                }
            }
        };
        progress.on_period_complete(&outcome);
        outcomes.push(outcome);
    }

    let summary = RunSummary::from_outcomes(outcomes);
    log::info!("batch complete: {summary}");
    Ok(summary)
}

/// Process one period end to end. Returns `Ok(false)` when the period was
/// skipped by the no-data gate, `Ok(true)` when both artifacts persisted.
async fn process_period(
    query: &QueryClient,
    completion: &dyn CompletionService,
    store: &dyn BlobStore,
    config: &Config,
    period: &ReportPeriod,
) -> Result<bool> {
    let bundle = report::assemble(
        query,
        &config.database,
        &config.table,
        &config.output_location,
        period,
        config.max_concurrent_queries,
    )
    .await?;

    let Some(bundle) = bundle else {
        return Ok(false);
    };

    let csv_key = storage::persist_tabular(store, &config.bucket, config.mode, &bundle).await?;
    log::info!("saved tabular artifact {csv_key}");

    // The CSV stays put even if every provider below fails: raw data
    // survives an unavailable narrative, and operators diagnose the two
    // artifacts independently.
    let narrative = llm::narrate(completion, &config.providers, &bundle, config.mode).await?;

    let record = InsightRecord::new(config.mode, &bundle.period.label, narrative);
    let insight_key = storage::persist_insight(store, &config.bucket, config.mode, &record).await?;
    log::info!("saved insight artifact {insight_key}");

    Ok(true)
}
