//! Batched detail hydration for id listings
//!
//! Query endpoints return bare identifiers; the matching entities endpoint
//! takes repeated `ids` parameters. Some entities endpoints cap the total
//! query length, so callers choose the batch size per endpoint.

use log::{debug, warn};
use serde_json::Value;

use super::FalconApi;
use super::pagination::Page;
use crate::error::{ApiError, Error, ExportError};

/// Outcome of a hydration pass
#[derive(Debug, Default)]
pub struct Hydrated {
    /// Records returned, in request order
    pub resources: Vec<Value>,

    /// Number of identifiers asked for
    pub requested: usize,

    /// One entry per failed batch
    pub failures: Vec<ExportError>,
}

impl Hydrated {
    /// Number of identifiers whose batch failed
    pub fn failed_ids(&self) -> usize {
        self.failures
            .iter()
            .map(|f| match f {
                ExportError::Hydration { ids, .. } => ids.split(',').count(),
                _ => 0,
            })
            .sum()
    }
}

/// Keep the string identifiers of a query listing, dropping anything else.
pub fn ids_of(listing: Vec<Value>) -> Vec<String> {
    listing
        .into_iter()
        .filter_map(|v| match v {
            Value::String(id) => Some(id),
            _ => None,
        })
        .collect()
}

/// Fetch full records for `ids`, `batch_size` identifiers per request.
///
/// A failing batch is logged and skipped; it never aborts the remaining
/// batches.
pub async fn hydrate<A>(api: &A, ids: &[String], endpoint: &str, batch_size: usize) -> Hydrated
where
    A: FalconApi + ?Sized,
{
    let mut hydrated = Hydrated {
        requested: ids.len(),
        ..Default::default()
    };

    for chunk in ids.chunks(batch_size.max(1)) {
        let query: Vec<(&'static str, String)> =
            chunk.iter().map(|id| ("ids", id.clone())).collect();

        let result = match api.get_json(endpoint, &query).await {
            Ok(body) => Page::from_value(body).map(Page::into_resources),
            Err(Error::Api(source)) => Err(source),
            Err(other) => Err(ApiError::InvalidResponse(other.to_string())),
        };

        match result {
            Ok(resources) => {
                debug!(
                    "{} returned {} records for {} ids",
                    endpoint,
                    resources.len(),
                    chunk.len()
                );
                hydrated.resources.extend(resources);
            }
            Err(source) => {
                let failure = ExportError::Hydration {
                    endpoint: endpoint.to_string(),
                    ids: chunk.join(","),
                    source,
                };
                warn!("{}", failure);
                hydrated.failures.push(failure);
            }
        }
    }

    hydrated
}
