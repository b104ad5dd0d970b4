use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("query {job_id} failed: {reason}")]
    Query { job_id: String, reason: String },

    #[error("dataset has no rows with a parseable date; nothing to report on")]
    EmptyDataset,

    #[error("completion request failed: {0}")]
    Completion(String),

    #[error("all completion providers failed: {0}")]
    NarrationUnavailable(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid date: {0}")]
    DateParse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
