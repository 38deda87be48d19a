//! Offset pagination over Falcon list endpoints
//!
//! Falcon list and query endpoints accept `offset` + `limit` and answer with
//! `{resources: [...], meta: {pagination: {offset, limit, total}}}`. Not every
//! endpoint reports a trustworthy `total`, so the loop supports two
//! termination strategies.

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use super::FalconApi;
use crate::error::{ApiError, Error, ExportError, Result};

/// How the fetch loop decides it has seen the last page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStrategy {
    /// Stop on the first page with fewer than `page_size` items (or none).
    ShortPage,
    /// Stop once `offset + page.len()` reaches `meta.pagination.total`.
    TotalCount,
}

/// One decoded page
#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub resources: Option<Vec<Value>>,

    #[serde(default)]
    pub meta: PageMeta,
}

/// Response metadata
#[derive(Debug, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub pagination: Option<PaginationMeta>,
}

/// Pagination block of the response metadata
#[derive(Debug, Default, Deserialize)]
pub struct PaginationMeta {
    #[serde(default)]
    pub offset: Option<u64>,

    #[serde(default)]
    pub limit: Option<u64>,

    #[serde(default)]
    pub total: Option<u64>,
}

impl Page {
    /// Decode a response body. `resources: null` counts as an empty page.
    pub fn from_value(body: Value) -> std::result::Result<Self, ApiError> {
        serde_json::from_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Unexpected page shape: {}", e)))
    }

    /// Reported total, when the endpoint provides one
    pub fn total(&self) -> Option<u64> {
        self.meta.pagination.as_ref().and_then(|p| p.total)
    }

    /// Take the page's resources, empty when the server sent none
    pub fn into_resources(self) -> Vec<Value> {
        self.resources.unwrap_or_default()
    }
}

/// Fetch every resource (record or identifier) from an offset-paginated endpoint.
///
/// Pages are requested one at a time and accumulated in arrival order. Any
/// failure aborts the whole listing; nothing from earlier pages is returned.
pub async fn fetch_all<A>(
    api: &A,
    endpoint: &str,
    page_size: usize,
    strategy: PageStrategy,
) -> Result<Vec<Value>>
where
    A: FalconApi + ?Sized,
{
    let page_size = page_size.max(1);
    let mut all = Vec::new();
    let mut offset = 0usize;

    loop {
        let query = [
            ("limit", page_size.to_string()),
            ("offset", offset.to_string()),
        ];

        let fetch_err = |source: ApiError| ExportError::Fetch {
            endpoint: endpoint.to_string(),
            offset,
            source,
        };

        let body = match api.get_json(endpoint, &query).await {
            Ok(body) => body,
            Err(Error::Api(source)) => return Err(fetch_err(source).into()),
            Err(other) => return Err(other),
        };
        let page = Page::from_value(body).map_err(fetch_err)?;
        let total = page.total();
        let resources = page.into_resources();
        let count = resources.len();

        debug!(
            "{} offset {} returned {} items (total {:?})",
            endpoint, offset, count, total
        );

        all.extend(resources);

        let done = match strategy {
            PageStrategy::ShortPage => count < page_size,
            PageStrategy::TotalCount => {
                // A missing total means nothing further is known to exist
                let total = total.unwrap_or(0) as usize;
                count == 0 || offset + count >= total
            }
        };

        if done {
            break;
        }
        offset += page_size;
    }

    Ok(all)
}

/// Read only `meta.pagination.total` of a listing, requesting a single record.
///
/// A missing total counts as zero.
pub async fn fetch_total<A>(api: &A, endpoint: &str) -> Result<u64>
where
    A: FalconApi + ?Sized,
{
    let fetch_err = |source: ApiError| ExportError::Fetch {
        endpoint: endpoint.to_string(),
        offset: 0,
        source,
    };

    let body = match api.get_json(endpoint, &[("limit", "1".to_string())]).await {
        Ok(body) => body,
        Err(Error::Api(source)) => return Err(fetch_err(source).into()),
        Err(other) => return Err(other),
    };
    let total = Page::from_value(body).map_err(fetch_err)?.total().unwrap_or(0);
    debug!("{} reports {} records", endpoint, total);
    Ok(total)
}
