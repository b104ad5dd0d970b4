use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::query::results::{materialize, TableResult};
use crate::query::{JobState, QueryService};

/// How the client waits on an in-flight job.
///
/// The default reproduces the batch job's behavior: re-check once per second
/// with no ceiling, since the query service's SLA is minutes. Setting
/// `max_wait` converts a stuck job into an `Error::Query` instead of
/// polling forever; tests use a zero interval with a fake service.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: None,
        }
    }
}

/// Submits analytical statements to the query service and drives each job
/// to a terminal state. Owns nothing across calls: each submitted job is
/// private to its `submit_and_await` invocation.
pub struct QueryClient {
    service: Arc<dyn QueryService>,
    policy: PollPolicy,
}

impl QueryClient {
    pub fn new(service: Arc<dyn QueryService>) -> Self {
        Self::with_policy(service, PollPolicy::default())
    }

    pub fn with_policy(service: Arc<dyn QueryService>, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    /// Submit `sql`, poll until the job is terminal, and return the
    /// materialized table on success. Failure and cancellation surface as
    /// `Error::Query` carrying the service-reported reason, or a
    /// placeholder when the service supplied none.
    pub async fn submit_and_await(
        &self,
        sql: &str,
        database: &str,
        output_location: &str,
    ) -> Result<TableResult> {
        let job_id = self.service.submit(sql, database, output_location).await?;
        log::debug!("submitted query job {job_id}");

        let mut waited = Duration::ZERO;
        let status = loop {
            let status = self.service.poll(&job_id).await?;
            if status.state.is_terminal() {
                break status;
            }
            if let Some(max_wait) = self.policy.max_wait {
                if waited >= max_wait {
                    return Err(Error::Query {
                        job_id,
                        reason: format!("still running after {}s", max_wait.as_secs()),
                    });
                }
            }
            tokio::time::sleep(self.policy.interval).await;
            waited += self.policy.interval;
        };

        match status.state {
            JobState::Succeeded => {
                let raw = self.service.fetch_results(&job_id).await?;
                Ok(materialize(&raw))
            }
            state => Err(Error::Query {
                job_id,
                reason: format!(
                    "{state}: {}",
                    status
                        .failure_reason
                        .as_deref()
                        .unwrap_or("no reason provided")
                ),
            }),
        }
    }
}
