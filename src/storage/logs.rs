//! Log-store collaborator — best-effort scan/summary records via a hosted
//! PostgREST backend.
//!
//! Every insert here is observability, not business state: callers log
//! failures and return the primary response unchanged.

use serde_json::Value;

use super::StorageError;

/// Table for health-device scan records.
pub const HEALTH_SCAN_TABLE: &str = "health-scan";
/// Table for health-summary generation records.
pub const HEALTH_SUMMARY_TABLE: &str = "health-summary";

/// The hosted relational log store, seen as a row sink.
#[async_trait::async_trait]
pub trait LogStore: Send + Sync {
    async fn insert(&self, table: &str, record: Value) -> Result<(), StorageError>;
}

/// PostgREST-backed log store (`POST {url}/rest/v1/{table}`).
pub struct RestLogStore {
    base_url: String,
    service_key: String,
    client: reqwest::Client,
}

impl RestLogStore {
    pub fn new(base_url: &str, service_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl LogStore for RestLogStore {
    async fn insert(&self, table: &str, record: Value) -> Result<(), StorageError> {
        if self.base_url.is_empty() {
            return Err(StorageError::NotConfigured("LOGSTORE_URL"));
        }

        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=minimal")
            .json(&record)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    StorageError::Connection(self.base_url.clone())
                } else {
                    StorageError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(table, "log record inserted");
        Ok(())
    }
}

/// In-memory log store for tests; records every inserted row.
#[cfg(test)]
pub struct MockLogStore {
    pub rows: std::sync::Mutex<Vec<(String, Value)>>,
    pub fail: bool,
}

#[cfg(test)]
impl MockLogStore {
    pub fn new() -> Self {
        Self {
            rows: std::sync::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            rows: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl LogStore for MockLogStore {
    async fn insert(&self, table: &str, record: Value) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::NotConfigured("mock"));
        }
        self.rows.lock().unwrap().push((table.to_string(), record));
        Ok(())
    }
}
