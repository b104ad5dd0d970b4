use crate::error::{Error, Result};
use crate::llm::DEFAULT_PROVIDERS;
use crate::period::Granularity;

const DEFAULT_BUCKET: &str = "sk-shopsense-retail-uploads";
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Runtime configuration for one batch run. This is a scheduled job with no
/// CLI surface; everything comes from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database (catalog schema) the query service runs statements against.
    pub database: String,
    /// Sales fact table name.
    pub table: String,
    /// Query service staging location for result sets.
    pub output_location: String,
    /// Bucket the two per-period artifacts are written to.
    pub bucket: String,
    pub mode: Granularity,
    /// Ceiling on concurrently in-flight sub-queries within one period.
    pub max_concurrent_queries: usize,
    /// Ordered completion-provider fallback chain.
    pub providers: Vec<String>,
}

impl Config {
    pub fn new(
        database: impl Into<String>,
        table: impl Into<String>,
        output_location: impl Into<String>,
        bucket: impl Into<String>,
        mode: Granularity,
    ) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            output_location: output_location.into(),
            bucket: bucket.into(),
            mode,
            max_concurrent_queries: DEFAULT_MAX_CONCURRENT,
            providers: DEFAULT_PROVIDERS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Read configuration from the environment. `ATHENA_DATABASE`,
    /// `ATHENA_TABLE`, and `ATHENA_OUTPUT_LOCATION` are required;
    /// `REPORTS_BUCKET`, `REPORT_MODE`, `MAX_CONCURRENT_QUERIES`, and
    /// `LLM_PROVIDERS` (comma-separated) have defaults.
    pub fn from_env() -> Result<Self> {
        fn require(name: &str) -> Result<String> {
            std::env::var(name).map_err(|_| Error::Config(format!("{name} is not set")))
        }

        let mode_str = std::env::var("REPORT_MODE").unwrap_or_else(|_| "weekly".to_string());
        let mut config = Self::new(
            require("ATHENA_DATABASE")?,
            require("ATHENA_TABLE")?,
            require("ATHENA_OUTPUT_LOCATION")?,
            std::env::var("REPORTS_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            Granularity::parse(&mode_str)?,
        );

        if let Ok(raw) = std::env::var("MAX_CONCURRENT_QUERIES") {
            config.max_concurrent_queries = raw
                .parse()
                .map_err(|_| Error::Config(format!("MAX_CONCURRENT_QUERIES: {raw:?}")))?;
        }
        if let Ok(raw) = std::env::var("LLM_PROVIDERS") {
            let providers: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !providers.is_empty() {
                config.providers = providers;
            }
        }

        Ok(config)
    }
}
