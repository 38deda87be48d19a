//! Mock Falcon API client for testing
//!
//! Serves scripted collections, pages and entity lookups from memory so the
//! paging, hydration and orchestration logic can be exercised without a
//! network.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use super::{FalconApi, Query};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockFalconClient::new()
///     .with_collection("/iocs/combined/indicator/v1", iocs)
///     .await;
///
/// let all = fetch_all(&mock, "/iocs/combined/indicator/v1", 2000, PageStrategy::ShortPage).await?;
/// ```
#[derive(Default)]
pub struct MockFalconClient {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Full collections served by offset/limit slicing
    collections: HashMap<String, Vec<Value>>,
    /// Explicit pages, indexed by `offset / limit`
    pages: HashMap<String, Vec<Vec<Value>>>,
    /// Overrides for `meta.pagination.total`
    reported_totals: HashMap<String, u64>,
    /// Bodies returned verbatim
    raw: HashMap<String, Value>,
    /// Details endpoints: path -> id -> record
    entities: HashMap<String, HashMap<String, Value>>,
    /// Ids whose details request fails
    failing_ids: HashMap<String, HashSet<String>>,
    /// (path, offset) pairs that fail with the given status
    failing_offsets: HashMap<(String, usize), u16>,
    /// Paths that always fail with the given status
    failing_paths: HashMap<String, u16>,
    /// Every request received, in order
    captured: Vec<CapturedRequest>,
}

/// A captured API request for test assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl CapturedRequest {
    /// First value of a query parameter
    pub fn param(&self, key: &str) -> Option<String> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Every value of a (possibly repeated) query parameter
    pub fn params(&self, key: &str) -> Vec<String> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

impl MockFalconClient {
    /// Create a new mock client with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `items` from `path` using offset/limit slicing.
    pub async fn with_collection(self, path: &str, items: Vec<Value>) -> Self {
        self.state
            .lock()
            .await
            .collections
            .insert(path.to_string(), items);
        self
    }

    /// Serve explicit pages from `path`; page `n` answers offset `n * limit`.
    pub async fn with_pages(self, path: &str, pages: Vec<Vec<Value>>) -> Self {
        self.state.lock().await.pages.insert(path.to_string(), pages);
        self
    }

    /// Report `total` in the pagination metadata regardless of the data served.
    pub async fn with_reported_total(self, path: &str, total: u64) -> Self {
        self.state
            .lock()
            .await
            .reported_totals
            .insert(path.to_string(), total);
        self
    }

    /// Answer `path` with `body` verbatim.
    pub async fn with_raw_response(self, path: &str, body: Value) -> Self {
        self.state.lock().await.raw.insert(path.to_string(), body);
        self
    }

    /// Serve records by id from a details endpoint. Records are keyed by their `id` field.
    pub async fn with_entities(self, path: &str, records: Vec<Value>) -> Self {
        let by_id = records
            .into_iter()
            .filter_map(|r| {
                let id = r.get("id")?.as_str()?.to_string();
                Some((id, r))
            })
            .collect();
        self.state
            .lock()
            .await
            .entities
            .insert(path.to_string(), by_id);
        self
    }

    /// Make any details request containing `id` fail.
    pub async fn fail_id(self, path: &str, id: &str) -> Self {
        self.state
            .lock()
            .await
            .failing_ids
            .entry(path.to_string())
            .or_default()
            .insert(id.to_string());
        self
    }

    /// Make the page at `offset` fail with `status`.
    pub async fn fail_at_offset(self, path: &str, offset: usize, status: u16) -> Self {
        self.state
            .lock()
            .await
            .failing_offsets
            .insert((path.to_string(), offset), status);
        self
    }

    /// Make every request to `path` fail with `status`.
    pub async fn fail_path(self, path: &str, status: u16) -> Self {
        self.state
            .lock()
            .await
            .failing_paths
            .insert(path.to_string(), status);
        self
    }

    /// Get all captured requests for test assertions.
    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.state.lock().await.captured.clone()
    }

    /// Captured requests to one path
    pub async fn calls_to(&self, path: &str) -> Vec<CapturedRequest> {
        self.captured_requests()
            .await
            .into_iter()
            .filter(|c| c.path == path)
            .collect()
    }
}

fn status_error(status: u16, body: &str) -> crate::error::Error {
    ApiError::Status {
        status,
        body: body.to_string(),
    }
    .into()
}

#[async_trait]
impl FalconApi for MockFalconClient {
    async fn get_json(&self, path: &str, query: &Query) -> Result<Value> {
        let mut state = self.state.lock().await;

        let request = CapturedRequest {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };
        state.captured.push(request.clone());

        if let Some(status) = state.failing_paths.get(path) {
            return Err(status_error(*status, "scripted failure"));
        }

        if let Some(body) = state.raw.get(path) {
            return Ok(body.clone());
        }

        if let Some(records) = state.entities.get(path) {
            let ids = request.params("ids");
            if let Some(failing) = state.failing_ids.get(path) {
                if let Some(bad) = ids.iter().find(|id| failing.contains(*id)) {
                    return Err(status_error(404, &format!("id {} not found", bad)));
                }
            }
            let resources: Vec<Value> = ids.iter().filter_map(|id| records.get(id).cloned()).collect();
            return Ok(json!({ "resources": resources, "meta": {} }));
        }

        let offset: usize = request
            .param("offset")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let limit: usize = request
            .param("limit")
            .and_then(|v| v.parse().ok())
            .unwrap_or(100)
            .max(1);

        if let Some(status) = state.failing_offsets.get(&(path.to_string(), offset)) {
            return Err(status_error(*status, "scripted page failure"));
        }

        let (page, served_total) = if let Some(pages) = state.pages.get(path) {
            let page = pages.get(offset / limit).cloned().unwrap_or_default();
            (page, pages.iter().map(Vec::len).sum::<usize>())
        } else if let Some(items) = state.collections.get(path) {
            let page: Vec<Value> = items.iter().skip(offset).take(limit).cloned().collect();
            (page, items.len())
        } else {
            return Err(status_error(404, &format!("no route for {}", path)));
        };

        let total = state
            .reported_totals
            .get(path)
            .copied()
            .unwrap_or(served_total as u64);

        Ok(json!({
            "resources": page,
            "meta": {
                "pagination": { "offset": offset, "limit": limit, "total": total }
            }
        }))
    }
}
