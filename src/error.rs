//! Error types for the CSExport CLI

use thiserror::Error;

/// Result type alias for CSExport operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Transport and HTTP status errors from the Falcon API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. } | ApiError::Status { status, .. } => {
                Some(*status)
            }
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration and client store errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `csexport client create` to add a client.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Missing required credential field: {0}")]
    MissingCredential(&'static str),

    #[error("Client '{0}' not found. Run `csexport client list` to see configured clients.")]
    ClientNotFound(String),

    #[error("Client '{0}' already exists. Use `csexport client edit` to modify it.")]
    ClientExists(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Failures of one export pipeline, each carrying enough context to diagnose
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Token request to {endpoint} failed: {source}")]
    Authentication {
        endpoint: String,
        #[source]
        source: ApiError,
    },

    #[error("Listing {endpoint} at offset {offset} failed: {source}")]
    Fetch {
        endpoint: String,
        offset: usize,
        #[source]
        source: ApiError,
    },

    #[error("Hydrating {endpoint} for ids [{ids}] failed: {source}")]
    Hydration {
        endpoint: String,
        ids: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
}
