//! Durable remote record store
//!
//! Records are JSON objects keyed by a string id within a named table.
//! `upsert` is idempotent: re-sending the same record for the same key
//! merges into the existing record instead of creating a duplicate.
//! Timestamps (`created_at` / `updated_at`) are assigned at write time.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::StoreError;

/// Durable store interface consumed by the reconciler
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert or merge a partial record under `key`
    ///
    /// Returns the full record after the write. Top-level fields in
    /// `record` overwrite the stored record's fields; fields not present in
    /// `record` are left untouched.
    async fn upsert(&self, table: &str, key: &str, record: Value) -> Result<Value, StoreError>;

    /// Query records by field equality, all filters ANDed
    async fn query(&self, table: &str, filters: &[(String, String)]) -> Result<Vec<Value>, StoreError>;
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn matches_filters(record: &Value, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(field, want)| match record.get(field) {
        Some(Value::String(s)) => s == want,
        Some(other) => other.to_string() == *want,
        None => false,
    })
}

/// In-memory durable store, used by tests and cache-only mode
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count records in a table
    pub fn count(&self, table: &str) -> usize {
        self.lock().get(table).map(|t| t.len()).unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, HashMap<String, Value>>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn upsert(&self, table: &str, key: &str, record: Value) -> Result<Value, StoreError> {
        debug!(%table, %key, "MemoryStore::upsert: called");
        let patch = match record {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidRecord(format!(
                    "expected JSON object, got {}",
                    value_kind(&other)
                )));
            }
        };

        let mut tables = self.lock();
        let rows = tables.entry(table.to_string()).or_default();

        let merged = match rows.get(key) {
            Some(Value::Object(existing)) => {
                debug!(%key, "MemoryStore::upsert: merging into existing record");
                let mut merged = existing.clone();
                for (k, v) in patch {
                    merged.insert(k, v);
                }
                merged.insert("updated_at".to_string(), json!(now_millis()));
                merged
            }
            _ => {
                debug!(%key, "MemoryStore::upsert: inserting fresh record");
                let mut merged = Map::new();
                merged.insert("id".to_string(), json!(key));
                for (k, v) in patch {
                    merged.insert(k, v);
                }
                let now = now_millis();
                merged.insert("created_at".to_string(), json!(now));
                merged.insert("updated_at".to_string(), json!(now));
                merged
            }
        };

        let full = Value::Object(merged);
        rows.insert(key.to_string(), full.clone());
        Ok(full)
    }

    async fn query(&self, table: &str, filters: &[(String, String)]) -> Result<Vec<Value>, StoreError> {
        debug!(%table, filter_count = filters.len(), "MemoryStore::query: called");
        let tables = self.lock();
        let rows = match tables.get(table) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .values()
            .filter(|r| matches_filters(r, filters))
            .cloned()
            .collect())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Configuration for the REST-backed durable store
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL, e.g. `https://project.example.co/rest/v1`
    pub base_url: String,
    /// API key sent as both `apikey` and bearer token
    pub api_key: String,
    /// Request timeout
    pub timeout: std::time::Duration,
}

/// Durable store over a PostgREST-style HTTP API
///
/// Upserts POST the full record with `Prefer: resolution=merge-duplicates`
/// so a crash-and-retry of the same write never duplicates rows.
pub struct RestStore {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl RestStore {
    pub fn new(config: &RestConfig) -> Result<Self, StoreError> {
        debug!(base_url = %config.base_url, "RestStore::new: called");
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", self.api_key.clone())
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Build a filtered select; filter values go through the query encoder
    /// so arbitrary field values cannot break the URL
    fn query_request(&self, table: &str, filters: &[(String, String)]) -> reqwest::RequestBuilder {
        let mut params: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        for (field, value) in filters {
            params.push((field.clone(), format!("eq.{}", value)));
        }
        self.request(reqwest::Method::GET, format!("{}/{}", self.base_url, table))
            .query(&params)
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn upsert(&self, table: &str, key: &str, record: Value) -> Result<Value, StoreError> {
        debug!(%table, %key, "RestStore::upsert: called");
        let mut record = match record {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidRecord(format!(
                    "expected JSON object, got {}",
                    value_kind(&other)
                )));
            }
        };
        record.insert("id".to_string(), json!(key));
        record.insert("updated_at".to_string(), json!(now_millis()));

        let url = format!("{}/{}?on_conflict=id", self.base_url, table);
        let response = self
            .request(reqwest::Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&Value::Object(record))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "RestStore::upsert: HTTP error");
            return Err(StoreError::Http {
                status: status.as_u16(),
                message,
            });
        }

        // return=representation yields an array with the written row
        let rows: Vec<Value> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidRecord("upsert returned no rows".to_string()))
    }

    async fn query(&self, table: &str, filters: &[(String, String)]) -> Result<Vec<Value>, StoreError> {
        debug!(%table, filter_count = filters.len(), "RestStore::query: called");
        let response = self.query_request(table, filters).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "RestStore::query: HTTP error");
            return Err(StoreError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_inserts_fresh_record() {
        let store = MemoryStore::new();
        let record = store
            .upsert("plans", "plan-1", json!({"destination": "Kyoto"}))
            .await
            .unwrap();

        assert_eq!(record["id"], "plan-1");
        assert_eq!(record["destination"], "Kyoto");
        assert!(record["created_at"].is_number());
        assert_eq!(store.count("plans"), 1);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_key() {
        let store = MemoryStore::new();
        let record = json!({"destination": "Kyoto", "budget": "Mid-range"});

        store.upsert("plans", "plan-1", record.clone()).await.unwrap();
        store.upsert("plans", "plan-1", record).await.unwrap();

        // Same key twice: one record, not two
        assert_eq!(store.count("plans"), 1);
    }

    #[tokio::test]
    async fn test_upsert_merges_partial_record() {
        let store = MemoryStore::new();
        store
            .upsert("plans", "plan-1", json!({"destination": "Kyoto", "budget": "Mid-range"}))
            .await
            .unwrap();

        let merged = store
            .upsert("plans", "plan-1", json!({"budget": "Luxury"}))
            .await
            .unwrap();

        assert_eq!(merged["destination"], "Kyoto");
        assert_eq!(merged["budget"], "Luxury");
    }

    #[tokio::test]
    async fn test_upsert_rejects_non_object() {
        let store = MemoryStore::new();
        let result = store.upsert("plans", "plan-1", json!([1, 2, 3])).await;
        assert!(matches!(result, Err(StoreError::InvalidRecord(_))));
    }

    #[tokio::test]
    async fn test_query_by_field_equality() {
        let store = MemoryStore::new();
        store
            .upsert("transcripts", "c-1", json!({"destination": "Kyoto"}))
            .await
            .unwrap();
        store
            .upsert("transcripts", "c-2", json!({"destination": "Lisbon"}))
            .await
            .unwrap();

        let rows = store
            .query("transcripts", &[("destination".to_string(), "Kyoto".to_string())])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "c-1");
    }

    #[tokio::test]
    async fn test_query_unknown_table_is_empty() {
        let store = MemoryStore::new();
        let rows = store.query("nope", &[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_rest_query_url_encodes_filter_values() {
        let store = RestStore::new(&RestConfig {
            base_url: "https://db.example.co/rest/v1".to_string(),
            api_key: "test-key".to_string(),
            timeout: std::time::Duration::from_secs(5),
        })
        .unwrap();

        let request = store
            .query_request(
                "transcripts",
                &[("destination".to_string(), "Bali, Indonesia & more".to_string())],
            )
            .build()
            .unwrap();

        let url = request.url().as_str();
        assert!(url.starts_with("https://db.example.co/rest/v1/transcripts?select=*"));
        // Raw spaces, commas and ampersands never reach the wire
        assert!(!url.contains(' '));
        assert!(!url.contains("Indonesia &"));
        assert!(url.contains("destination=eq."));
    }
}
