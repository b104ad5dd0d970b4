pub mod client;
pub mod results;
pub mod templates;

pub use client::{PollPolicy, QueryClient};
pub use results::{markdown_block, materialize, TableResult};
pub use templates::SubQueries;

use async_trait::async_trait;

use crate::error::Result;

/// Terminal and non-terminal states of a submitted query job.
/// Once a job reaches a terminal state it never transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Running => "RUNNING",
            JobState::Succeeded => "SUCCEEDED",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of a job's status as reported by the query service.
/// `failure_reason` is populated only on non-success terminal states,
/// and even then the service may omit it.
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub state: JobState,
    pub failure_reason: Option<String>,
}

impl JobStatus {
    pub fn running() -> Self {
        Self {
            state: JobState::Running,
            failure_reason: None,
        }
    }

    pub fn succeeded() -> Self {
        Self {
            state: JobState::Succeeded,
            failure_reason: None,
        }
    }
}

/// One row of a raw result set. The service omits a cell's value rather
/// than sending an empty string, hence `Option`.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub cells: Vec<Option<String>>,
}

impl RawRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(|c| Some(c.into())).collect(),
        }
    }
}

/// Raw rows/columns of a completed query, header row first.
#[derive(Debug, Clone, Default)]
pub struct RawResultSet {
    pub rows: Vec<RawRow>,
}

/// The external asynchronous query service (Athena-style): submit a
/// statement, poll the job until terminal, fetch the result set.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn submit(&self, sql: &str, database: &str, output_location: &str) -> Result<String>;

    async fn poll(&self, job_id: &str) -> Result<JobStatus>;

    async fn fetch_results(&self, job_id: &str) -> Result<RawResultSet>;
}
