//! Hand-rolled fakes for the three service seams, shared across test modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::llm::CompletionService;
use crate::query::{
    JobState, JobStatus, PollPolicy, QueryClient, QueryService, RawResultSet, RawRow,
};

/// Build a raw result set from string slices, header row first.
pub fn raw(rows: &[&[&str]]) -> RawResultSet {
    RawResultSet {
        rows: rows
            .iter()
            .map(|r| RawRow::new(r.iter().copied()))
            .collect(),
    }
}

/// A client over the given fake with a zero poll interval.
pub fn instant_client(service: Arc<FakeQueryService>) -> QueryClient {
    QueryClient::with_policy(
        service,
        PollPolicy {
            interval: Duration::ZERO,
            max_wait: None,
        },
    )
}

enum Outcome {
    Rows(RawResultSet),
    Fail(String),
}

/// Fake query service routing by SQL substring: the first registered rule
/// whose needle occurs in the submitted statement decides the outcome.
/// Unrouted statements succeed with a small generic table.
pub struct FakeQueryService {
    rules: Mutex<Vec<(String, Outcome)>>,
    jobs: Mutex<HashMap<String, String>>,
    next_id: AtomicU64,
    submitted: Mutex<Vec<String>>,
}

impl FakeQueryService {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            jobs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn on(&self, needle: &str, result: RawResultSet) {
        self.rules
            .lock()
            .unwrap()
            .push((needle.to_string(), Outcome::Rows(result)));
    }

    pub fn fail_on(&self, needle: &str, reason: &str) {
        self.rules
            .lock()
            .unwrap()
            .push((needle.to_string(), Outcome::Fail(reason.to_string())));
    }

    /// Every statement submitted so far, in submission order.
    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    fn sql_for(&self, job_id: &str) -> String {
        self.jobs.lock().unwrap().get(job_id).cloned().unwrap_or_default()
    }

    fn failure_for(&self, sql: &str) -> Option<String> {
        let rules = self.rules.lock().unwrap();
        for (needle, outcome) in rules.iter() {
            if sql.contains(needle) {
                return match outcome {
                    Outcome::Fail(reason) => Some(reason.clone()),
                    Outcome::Rows(_) => None,
                };
            }
        }
        None
    }
}

#[async_trait]
impl QueryService for FakeQueryService {
    async fn submit(&self, sql: &str, _database: &str, _output_location: &str) -> Result<String> {
        let id = format!("job-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.jobs.lock().unwrap().insert(id.clone(), sql.to_string());
        self.submitted.lock().unwrap().push(sql.to_string());
        Ok(id)
    }

    async fn poll(&self, job_id: &str) -> Result<JobStatus> {
        let sql = self.sql_for(job_id);
        match self.failure_for(&sql) {
            Some(reason) => Ok(JobStatus {
                state: JobState::Failed,
                failure_reason: Some(reason),
            }),
            None => Ok(JobStatus::succeeded()),
        }
    }

    async fn fetch_results(&self, job_id: &str) -> Result<RawResultSet> {
        let sql = self.sql_for(job_id);
        let rules = self.rules.lock().unwrap();
        for (needle, outcome) in rules.iter() {
            if sql.contains(needle) {
                if let Outcome::Rows(result) = outcome {
                    return Ok(result.clone());
                }
            }
        }
        Ok(raw(&[&["k", "v"], &["x", "1"]]))
    }
}

/// Fake completion service with a scripted outcome per provider id.
/// Providers without a script fail, which keeps fallback tests honest.
pub struct FakeCompletionService {
    outcomes: Mutex<HashMap<String, std::result::Result<String, String>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCompletionService {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(&self, provider: &str, text: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(provider.to_string(), Ok(text.to_string()));
    }

    pub fn fail(&self, provider: &str, reason: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(provider.to_string(), Err(reason.to_string()));
    }

    /// Providers called so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for FakeCompletionService {
    async fn complete(
        &self,
        provider: &str,
        _system_prompt: &str,
        _user_prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(provider.to_string());
        match self.outcomes.lock().unwrap().get(provider) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(reason)) => Err(Error::Completion(reason.clone())),
            None => Err(Error::Completion("no scripted response".to_string())),
        }
    }
}
