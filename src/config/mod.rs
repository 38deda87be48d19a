//! Client store and credential resolution for CSExport

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Production API endpoint, used when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://api.crowdstrike.com";

/// Falcon cloud regions with a known API endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Cloud {
    /// US-1 (api.crowdstrike.com)
    #[value(name = "us-1")]
    Us1,
    /// US-2 (api.us-2.crowdstrike.com)
    #[value(name = "us-2")]
    Us2,
}

impl Cloud {
    /// All clouds, in prompt order.
    pub const ALL: [Cloud; 2] = [Cloud::Us1, Cloud::Us2];

    /// API base URL for the cloud.
    pub fn base_url(&self) -> &'static str {
        match self {
            Cloud::Us1 => DEFAULT_BASE_URL,
            Cloud::Us2 => "https://api.us-2.crowdstrike.com",
        }
    }

    /// Reverse lookup of a base URL, if it belongs to a known cloud.
    pub fn from_base_url(url: &str) -> Option<Cloud> {
        let url = url.trim_end_matches('/');
        Cloud::ALL.into_iter().find(|c| c.base_url() == url)
    }
}

impl fmt::Display for Cloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cloud::Us1 => write!(f, "us-1"),
            Cloud::Us2 => write!(f, "us-2"),
        }
    }
}

/// Stored API client entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// OAuth2 client id
    pub client_id: String,

    /// OAuth2 client secret
    pub client_secret: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// User preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Directory exports are written to (defaults to the working directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

/// Persisted client store: client name to credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientStore {
    /// Configured clients keyed by their human-chosen name
    #[serde(default)]
    pub clients: BTreeMap<String, ClientConfig>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

impl ClientStore {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".csexport").join("config.yaml"))
    }

    /// Resolve an optional override to a concrete path.
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load the store from an optional override path (or the default location).
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::resolve_path(path)?)
    }

    /// Load the store, treating a missing file as an empty store.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match Self::load_at(path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Load the store from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let store: ClientStore = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(store)
    }

    /// Save the store to an optional override path (or the default location).
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(&Self::resolve_path(path)?)
    }

    /// Save the store to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Secrets live in this file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Look up a client by name
    pub fn get(&self, name: &str) -> Result<&ClientConfig> {
        self.clients
            .get(name)
            .ok_or_else(|| ConfigError::ClientNotFound(name.to_string()).into())
    }

    /// Add a new client, refusing to overwrite an existing one
    pub fn create(&mut self, name: &str, client: ClientConfig) -> Result<()> {
        if self.clients.contains_key(name) {
            return Err(ConfigError::ClientExists(name.to_string()).into());
        }
        validate_name(name)?;
        self.clients.insert(name.to_string(), client);
        Ok(())
    }

    /// Replace an existing client's credentials
    pub fn update(&mut self, name: &str, client: ClientConfig) -> Result<()> {
        let entry = self
            .clients
            .get_mut(name)
            .ok_or_else(|| ConfigError::ClientNotFound(name.to_string()))?;
        *entry = client;
        Ok(())
    }

    /// Remove a client, returning its former configuration
    pub fn delete(&mut self, name: &str) -> Result<ClientConfig> {
        self.clients
            .remove(name)
            .ok_or_else(|| ConfigError::ClientNotFound(name.to_string()).into())
    }

    /// Resolve a credential for `name` from the store.
    pub fn credential(&self, name: &str) -> Result<Credential> {
        let client = self.get(name)?;
        Credential::new(
            Some(name),
            Some(&client.client_id),
            Some(&client.client_secret),
            Some(&client.base_url),
        )
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::Invalid("client name cannot be empty".to_string()).into());
    }
    Ok(())
}

/// Resolved tenant identity for one export run
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub client_name: String,
}

impl Credential {
    /// Build a credential, failing on any missing identity field.
    ///
    /// Only `base_url` may fall back to a default (the production endpoint).
    pub fn new(
        client_name: Option<&str>,
        client_id: Option<&str>,
        client_secret: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<Self> {
        let client_name = required(client_name, "client_name")?;
        let client_id = required(client_id, "client_id")?;
        let client_secret = required(client_secret, "client_secret")?;
        let base_url = base_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client_id,
            client_secret,
            base_url,
            client_name,
        })
    }

    /// Client name made safe for file names (spaces become underscores).
    pub fn file_slug(&self) -> String {
        self.client_name.replace(' ', "_")
    }
}

// The secret must never reach logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("base_url", &self.base_url)
            .field("client_name", &self.client_name)
            .finish()
    }
}

fn required(value: Option<&str>, field: &'static str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingCredential(field).into()),
    }
}
