use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::period::Granularity;
use crate::query::TableResult;
use crate::report::ReportBundle;

/// The external blob store the two per-period artifacts land in.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<()>;

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

/// Key of the raw top-sellers CSV for a period.
pub fn actual_sales_key(mode: Granularity, label: &str) -> String {
    format!("actual-sales/{mode}/actual_{label}.csv")
}

/// Key of the narrative JSON for a period. The `llm_summary` field of this
/// object is the input contract the document renderer depends on.
pub fn insight_key(mode: Granularity, label: &str) -> String {
    format!("llm-insights/{mode}/report_{label}.json")
}

/// The persisted narrative artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRecord {
    pub report_type: String,
    pub report_date: String,
    pub generated_on: String,
    pub llm_summary: String,
}

impl InsightRecord {
    pub fn new(mode: Granularity, label: &str, llm_summary: String) -> Self {
        Self {
            report_type: mode.as_str().to_string(),
            report_date: label.to_string(),
            generated_on: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            llm_summary,
        }
    }
}

/// Encode a table as CSV, header row first. Cells containing a comma,
/// quote, or line break are quoted with doubled inner quotes.
pub fn to_csv(table: &TableResult) -> String {
    fn encode_row(cells: &[String]) -> String {
        cells
            .iter()
            .map(|cell| {
                if cell.contains([',', '"', '\n', '\r']) {
                    format!("\"{}\"", cell.replace('"', "\"\""))
                } else {
                    cell.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    let mut out = String::new();
    out.push_str(&encode_row(&table.headers));
    out.push_str("\r\n");
    for row in &table.rows {
        out.push_str(&encode_row(row));
        out.push_str("\r\n");
    }
    out
}

/// Persist the period's raw tabular artifact (the top-sellers CSV).
/// Returns the object key.
pub async fn persist_tabular(
    store: &dyn BlobStore,
    bucket: &str,
    mode: Granularity,
    bundle: &ReportBundle,
) -> Result<String> {
    let key = actual_sales_key(mode, &bundle.period.label);
    let csv = to_csv(&bundle.tables.top_sellers);
    store
        .put(bucket, &key, csv.into_bytes(), Some("text/csv"))
        .await?;
    Ok(key)
}

/// Persist the period's narrative artifact. Returns the object key.
pub async fn persist_insight(
    store: &dyn BlobStore,
    bucket: &str,
    mode: Granularity,
    record: &InsightRecord,
) -> Result<String> {
    let key = insight_key(mode, &record.report_date);
    let json = serde_json::to_vec_pretty(record).map_err(|e| Error::Storage(e.to_string()))?;
    store
        .put(bucket, &key, json, Some("application/json"))
        .await?;
    Ok(key)
}

/// In-memory blob store (for testing).
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: tokio::sync::Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored keys in a bucket, sorted.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let objects = self.objects.lock().await;
        let mut keys: Vec<String> = objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<()> {
        self.objects
            .lock()
            .await
            .insert((bucket.to_string(), key.to_string()), bytes);
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| Error::Storage(format!("no such object: {bucket}/{key}")))
    }
}
