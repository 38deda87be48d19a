//! CrowdStrike Falcon API client

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Credential;
use crate::error::Result;

pub mod auth;
pub mod falcon;
pub mod hydrate;
#[cfg(test)]
pub mod mock;
pub mod pagination;

pub use auth::{Token, TokenProvider};
pub use falcon::{FalconClient, HttpConnector};
pub use hydrate::{Hydrated, hydrate, ids_of};
#[cfg(test)]
pub use mock::MockFalconClient;
pub use pagination::{PageStrategy, fetch_all, fetch_total};

/// Query string pairs; a key may repeat (e.g. `ids=a&ids=b`).
pub type Query = [(&'static str, String)];

/// Read access to the Falcon REST API with an already acquired bearer token.
///
/// Implementations issue exactly one request per call and return the decoded
/// JSON body of a `200 OK` response. Any other status is an error.
#[async_trait]
pub trait FalconApi: Send + Sync {
    async fn get_json(&self, path: &str, query: &Query) -> Result<Value>;
}

#[async_trait]
impl<T: FalconApi + ?Sized> FalconApi for Arc<T> {
    async fn get_json(&self, path: &str, query: &Query) -> Result<Value> {
        (**self).get_json(path, query).await
    }
}

/// Turns a credential into an authenticated API handle.
#[async_trait]
pub trait Connector: Send + Sync {
    type Api: FalconApi;

    async fn connect(&self, credential: &Credential) -> Result<Self::Api>;
}
