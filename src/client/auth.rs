//! OAuth2 client-credentials token acquisition

use std::fmt;

use log::debug;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;

use crate::config::Credential;
use crate::error::{ApiError, ExportError, Result};

/// Token endpoint, relative to the tenant base URL
pub const TOKEN_PATH: &str = "/oauth2/token";

/// Opaque bearer token for one run. Expiry is not tracked.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub base_url: String,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Exchanges a credential pair for a bearer token
pub struct TokenProvider {
    http: HttpClient,
}

impl TokenProvider {
    pub fn new() -> Result<Self> {
        let http = HttpClient::builder()
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { http })
    }

    /// Request a token. Only `201 Created` counts as success.
    pub async fn acquire(&self, credential: &Credential) -> Result<Token> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let endpoint = format!("{}{}", credential.base_url, TOKEN_PATH);
        let auth_err = |source: ApiError| ExportError::Authentication {
            endpoint: endpoint.clone(),
            source,
        };

        debug!(
            "Requesting token for client '{}' from {}",
            credential.client_name, endpoint
        );

        let response = self
            .http
            .post(&endpoint)
            .form(&[
                ("client_id", credential.client_id.as_str()),
                ("client_secret", credential.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| auth_err(ApiError::from(e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| auth_err(ApiError::from(e)))?;

        if status != StatusCode::CREATED {
            let source = if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                ApiError::Unauthorized {
                    status: status.as_u16(),
                    body,
                }
            } else {
                ApiError::Status {
                    status: status.as_u16(),
                    body,
                }
            };
            return Err(auth_err(source).into());
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            auth_err(ApiError::InvalidResponse(format!(
                "Failed to parse token response: {}. Body was: {}",
                e, body
            )))
        })?;

        Ok(Token {
            access_token: parsed.access_token,
            base_url: credential.base_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn credential(base_url: &str) -> Credential {
        Credential::new(Some("Acme"), Some("id-1"), Some("s3cret"), Some(base_url)).unwrap()
    }

    #[tokio::test]
    async fn test_acquire_success_on_created() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth2/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("client_id".into(), "id-1".into()),
                mockito::Matcher::UrlEncoded("client_secret".into(), "s3cret".into()),
                mockito::Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
            ]))
            .with_status(201)
            .with_body(r#"{"access_token":"tok-abc","token_type":"bearer","expires_in":1799}"#)
            .create_async()
            .await;

        let provider = TokenProvider::new().unwrap();
        let token = provider.acquire(&credential(&server.url())).await.unwrap();

        assert_eq!(token.access_token, "tok-abc");
        assert_eq!(token.base_url, server.url());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_acquire_rejects_ok_status() {
        // 200 is not the defined success status for this endpoint
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth2/token")
            .with_status(200)
            .with_body(r#"{"access_token":"tok"}"#)
            .create_async()
            .await;

        let provider = TokenProvider::new().unwrap();
        let err = provider
            .acquire(&credential(&server.url()))
            .await
            .unwrap_err();

        match err {
            Error::Export(ExportError::Authentication { source, .. }) => {
                assert_eq!(source.status(), Some(200));
            }
            other => panic!("Expected authentication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_acquire_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth2/token")
            .with_status(401)
            .with_body(r#"{"errors":[{"message":"access denied, invalid bearer token"}]}"#)
            .create_async()
            .await;

        let provider = TokenProvider::new().unwrap();
        let err = provider
            .acquire(&credential(&server.url()))
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid bearer token"));
        assert!(msg.contains("/oauth2/token"));
    }

    #[tokio::test]
    async fn test_acquire_unparseable_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth2/token")
            .with_status(201)
            .with_body("not json")
            .create_async()
            .await;

        let provider = TokenProvider::new().unwrap();
        let err = provider
            .acquire(&credential(&server.url()))
            .await
            .unwrap_err();

        match err {
            Error::Export(ExportError::Authentication {
                source: ApiError::InvalidResponse(msg),
                ..
            }) => assert!(msg.contains("not json")),
            other => panic!("Expected invalid response, got {:?}", other),
        }
    }

    #[test]
    fn test_token_debug_hides_secret() {
        let token = Token {
            access_token: "very-secret".to_string(),
            base_url: "https://api.crowdstrike.com".to_string(),
        };
        assert!(!format!("{:?}", token).contains("very-secret"));
    }
}
