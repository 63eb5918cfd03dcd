// REST client layer: response envelope, error taxonomy and the HTTP seam
// the cache and fetcher components talk through.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Error taxonomy for everything that can go wrong between a component
/// and the backend. Boundary components (cache, fetcher) convert these
/// to display strings in their state; `Validation` is raised locally
/// before any network call and never sent to the server.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Application(String),

    #[error("Invalid response payload: {0}")]
    Decode(String),

    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },
}

impl ApiError {
    pub fn validation(field: &str, message: &str) -> Self {
        ApiError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Envelope wrapping every REST response:
/// `{ status, message, payload, statusCode, timestamp }`.
/// A `status: false` is an application-level error regardless of the
/// HTTP status code.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub payload: Option<T>,
    #[serde(default)]
    pub status_code: i32,
    #[serde(default)]
    pub timestamp: String,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the payload of a successful envelope, mapping
    /// `status: false` to `Application` and a missing payload to
    /// `Decode`.
    pub fn into_payload(self) -> Result<T, ApiError> {
        if !self.status {
            let message = if self.message.is_empty() {
                "request rejected by server".to_string()
            } else {
                self.message
            };
            return Err(ApiError::Application(message));
        }
        self.payload
            .ok_or_else(|| ApiError::Decode("missing payload in successful response".to_string()))
    }
}

/// Abstract HTTP seam. Implementations resolve the envelope themselves
/// and hand back the bare payload, so callers only ever deserialize
/// typed payload structs.
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// Issues a GET for `path` with the given query pairs and returns
    /// the envelope payload. Pairs with empty values must be omitted
    /// by the caller; `limit`/`offset` are decimal-encoded integers.
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError>;
}

/// Configuration for the production client.
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// `HttpClient` backed by reqwest. No automatic retries: a failed
/// request is re-issued only by an explicit caller action.
pub struct RestHttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestHttpClient {
    pub fn new(config: RestClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl HttpClient for RestHttpClient {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, params = query.len(), "issuing GET");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        // The envelope is authoritative, not the HTTP status: parse it
        // even on non-2xx responses and let `status: false` decide.
        let envelope: ApiEnvelope<Value> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        envelope.into_payload().map_err(|e| {
            tracing::warn!(%url, error = %e, "request failed");
            e
        })
    }
}

// Mock backend for tests across the crate. Serves reference
// collections verbatim and pages monument result sets by the
// limit/offset query pairs, applying q/state/category filters the way
// the real search endpoints do.
#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct MockApi {
        reference: Mutex<HashMap<String, Value>>,
        result_sets: Mutex<HashMap<String, Vec<Value>>>,
        fail_next: AtomicUsize,
        delay_ms: AtomicUsize,
        calls: AtomicUsize,
    }

    impl MockApi {
        pub fn new() -> Self {
            Self {
                reference: Mutex::new(HashMap::new()),
                result_sets: Mutex::new(HashMap::new()),
                fail_next: AtomicUsize::new(0),
                delay_ms: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }

        /// Registers a payload served as-is for `path`.
        pub fn add_reference(&self, path: &str, payload: Value) {
            self.reference.lock().insert(path.to_string(), payload);
        }

        /// Registers the full (unpaged) result set behind a search path.
        pub fn add_result_set(&self, path: &str, items: Vec<Value>) {
            self.result_sets.lock().insert(path.to_string(), items);
        }

        pub fn fail_next_requests(&self, count: usize) {
            self.fail_next.store(count, Ordering::SeqCst);
        }

        pub fn set_delay(&self, delay_ms: usize) {
            self.delay_ms.store(delay_ms, Ordering::SeqCst);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn matches(item: &Value, query: &[(String, String)]) -> bool {
            for (key, value) in query {
                match key.as_str() {
                    "q" => {
                        let name = item["name"].as_str().unwrap_or_default().to_lowercase();
                        if !name.contains(&value.to_lowercase()) {
                            return false;
                        }
                    }
                    "state" | "category" => {
                        if item[key.as_str()].as_str() != Some(value.as_str()) {
                            return false;
                        }
                    }
                    _ => {}
                }
            }
            true
        }
    }

    #[async_trait]
    impl HttpClient for MockApi {
        async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let delay = self.delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay as u64)).await;
            }

            let fail_count = self.fail_next.load(Ordering::SeqCst);
            if fail_count > 0 {
                self.fail_next.store(fail_count - 1, Ordering::SeqCst);
                return Err(ApiError::Application(
                    "Internal Server Error".to_string(),
                ));
            }

            if let Some(payload) = self.reference.lock().get(path) {
                return Ok(payload.clone());
            }

            let result_sets = self.result_sets.lock();
            let all = result_sets
                .get(path)
                .ok_or_else(|| ApiError::Application(format!("no route for {path}")))?;

            let lookup = |key: &str| {
                query
                    .iter()
                    .find(|(k, _)| k == key)
                    .and_then(|(_, v)| v.parse::<usize>().ok())
            };
            let limit = lookup("limit").unwrap_or(20);
            let offset = lookup("offset").unwrap_or(0);

            let filtered: Vec<Value> = all
                .iter()
                .filter(|item| Self::matches(item, query))
                .cloned()
                .collect();
            let page: Vec<Value> = filtered.iter().skip(offset).take(limit).cloned().collect();
            let has_more = offset + page.len() < filtered.len();

            Ok(json!({
                "monuments": page,
                "total": filtered.len(),
                "hasMore": has_more,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_success_unwraps_payload() {
        let raw = json!({
            "status": true,
            "message": "ok",
            "payload": [{"id": "c1", "name": "Jaipur"}],
            "statusCode": 200,
            "timestamp": "2025-08-25T10:00:00Z",
        });
        let envelope: ApiEnvelope<Value> = serde_json::from_value(raw).unwrap();
        let payload = envelope.into_payload().unwrap();
        assert_eq!(payload[0]["name"], "Jaipur");
    }

    #[test]
    fn envelope_status_false_is_application_error_regardless_of_payload() {
        let raw = json!({
            "status": false,
            "message": "city not found",
            "payload": [{"id": "c1"}],
            "statusCode": 200,
            "timestamp": "",
        });
        let envelope: ApiEnvelope<Value> = serde_json::from_value(raw).unwrap();
        match envelope.into_payload() {
            Err(ApiError::Application(message)) => assert_eq!(message, "city not found"),
            other => panic!("expected application error, got {other:?}"),
        }
    }

    #[test]
    fn envelope_missing_payload_is_decode_error() {
        let raw = json!({ "status": true, "message": "", "statusCode": 200 });
        let envelope: ApiEnvelope<Value> = serde_json::from_value(raw).unwrap();
        assert!(matches!(envelope.into_payload(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn envelope_without_message_gets_fallback_text() {
        let raw = json!({ "status": false, "statusCode": 500 });
        let envelope: ApiEnvelope<Value> = serde_json::from_value(raw).unwrap();
        match envelope.into_payload() {
            Err(ApiError::Application(message)) => {
                assert_eq!(message, "request rejected by server")
            }
            other => panic!("expected application error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mock_pages_and_filters_result_sets() {
        let api = mock::MockApi::new();
        let items: Vec<Value> = (0..30)
            .map(|i| {
                json!({
                    "id": format!("m{i}"),
                    "name": format!("Monument {i}"),
                    "state": if i % 2 == 0 { "Rajasthan" } else { "Kerala" },
                })
            })
            .collect();
        api.add_result_set("/places-of-interest/search", items);

        let page = api
            .get(
                "/places-of-interest/search",
                &[
                    ("state".to_string(), "Rajasthan".to_string()),
                    ("limit".to_string(), "10".to_string()),
                    ("offset".to_string(), "0".to_string()),
                ],
            )
            .await
            .unwrap();

        assert_eq!(page["monuments"].as_array().unwrap().len(), 10);
        assert_eq!(page["total"], 15);
        assert_eq!(page["hasMore"], true);
    }
}
