//! Common CLI types shared across commands

use clap::Args;

use crate::cli::completions::client_name_candidates;

/// Output format for terminal summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON for scripts
    Json,
}

/// Where the tenant credential for a run comes from
///
/// Explicit `--client-id`/`--client-secret` win over a stored client.
#[derive(Debug, Clone, Args, Default)]
pub struct CredentialArgs {
    /// Client name; selects a stored client or labels explicit credentials
    #[arg(long, env = "CLIENT_NAME", add = client_name_candidates())]
    pub client: Option<String>,

    /// API client id (bypasses the client store)
    #[arg(long = "client-id", env = "FALCON_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// API client secret
    #[arg(
        long = "client-secret",
        env = "FALCON_CLIENT_SECRET",
        hide_env_values = true
    )]
    pub client_secret: Option<String>,

    /// API base URL override
    #[arg(long = "base-url", env = "FALCON_BASE_URL")]
    pub base_url: Option<String>,
}

impl CredentialArgs {
    /// True when identity fields were given directly rather than by client name.
    pub fn is_explicit(&self) -> bool {
        self.client_id.is_some() || self.client_secret.is_some()
    }
}
