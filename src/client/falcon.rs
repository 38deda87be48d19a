//! Falcon API client implementation

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;

use super::{Connector, FalconApi, Query, Token, TokenProvider};
use crate::config::Credential;
use crate::error::{ApiError, Result};

/// Authenticated Falcon REST client bound to one tenant
pub struct FalconClient {
    http: HttpClient,
    base_url: String,
    token: Token,
}

impl FalconClient {
    /// Create a client that sends `token` on every request.
    pub fn new(token: Token) -> Result<Self> {
        let http = HttpClient::builder()
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: token.base_url.clone(),
            token,
        })
    }

    /// Base URL requests are issued against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FalconApi for FalconClient {
    async fn get_json(&self, path: &str, query: &Query) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", path, query);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token.access_token)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::from)?;

        match status {
            StatusCode::OK => serde_json::from_str(&body).map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into()
            }),
            // Tokens are never refreshed mid-run
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized {
                status: status.as_u16(),
                body,
            }
            .into()),
            _ => Err(ApiError::Status {
                status: status.as_u16(),
                body,
            }
            .into()),
        }
    }
}

/// Connects over HTTPS: one token request, then a bearer-authenticated client
pub struct HttpConnector;

#[async_trait]
impl Connector for HttpConnector {
    type Api = FalconClient;

    async fn connect(&self, credential: &Credential) -> Result<FalconClient> {
        let token = TokenProvider::new()?.acquire(credential).await?;
        let client = FalconClient::new(token)?;
        debug!("Authenticated against {}", client.base_url());
        Ok(client)
    }
}
