//! Command execution context
//!
//! Resolves the credential and output directory for an export run before any
//! network call is made.

use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;

use log::debug;

use crate::cli::ExportArgs;
use crate::cli::args::{CredentialArgs, GlobalOptions};
use crate::config::{ClientStore, Credential};
use crate::error::{ConfigError, Result};
use crate::export::RunContext;

/// Resolve the credential for one run.
///
/// Explicit id/secret (flags, environment or `.env`) win and take their label
/// from `--client`. Otherwise `--client` names a stored client. A `--base-url`
/// override applies to both.
pub fn resolve_credential(store: &ClientStore, args: &CredentialArgs) -> Result<Credential> {
    if args.is_explicit() {
        debug!("Using explicit credentials");
        return Credential::new(
            args.client.as_deref(),
            args.client_id.as_deref(),
            args.client_secret.as_deref(),
            args.base_url.as_deref(),
        );
    }

    let name = args
        .client
        .as_deref()
        .ok_or(ConfigError::MissingCredential("client_name"))?;
    let mut credential = store.credential(name)?;
    if let Some(base_url) = args.base_url.as_deref() {
        credential = Credential::new(
            Some(&credential.client_name),
            Some(&credential.client_id),
            Some(&credential.client_secret),
            Some(base_url),
        )?;
    }
    debug!("Using stored client '{}'", name);
    Ok(credential)
}

/// Build the run context, creating the output directory if needed.
pub fn run_context(opts: &GlobalOptions, args: &ExportArgs) -> Result<RunContext> {
    let store = ClientStore::load_or_default(opts.config_ref())?;
    let credential = resolve_credential(&store, &args.credentials)?;

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| store.preferences.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    Ok(RunContext {
        credential,
        output_dir,
        progress: !opts.debug && std::io::stderr().is_terminal(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, Cloud, DEFAULT_BASE_URL};
    use crate::error::Error;

    fn store() -> ClientStore {
        let mut store = ClientStore::default();
        store
            .create(
                "Acme Corp",
                ClientConfig {
                    client_id: "stored-id".to_string(),
                    client_secret: "stored-secret".to_string(),
                    base_url: Cloud::Us2.base_url().to_string(),
                },
            )
            .unwrap();
        store
    }

    #[test]
    fn test_explicit_credentials_win() {
        let args = CredentialArgs {
            client: Some("Acme Corp".to_string()),
            client_id: Some("env-id".to_string()),
            client_secret: Some("env-secret".to_string()),
            base_url: None,
        };

        let credential = resolve_credential(&store(), &args).unwrap();

        assert_eq!(credential.client_id, "env-id");
        assert_eq!(credential.base_url, DEFAULT_BASE_URL);
        assert_eq!(credential.file_slug(), "Acme_Corp");
    }

    #[test]
    fn test_stored_client_with_base_url_override() {
        let args = CredentialArgs {
            client: Some("Acme Corp".to_string()),
            base_url: Some("https://api.eu-1.crowdstrike.com/".to_string()),
            ..Default::default()
        };

        let credential = resolve_credential(&store(), &args).unwrap();

        assert_eq!(credential.client_id, "stored-id");
        assert_eq!(credential.base_url, "https://api.eu-1.crowdstrike.com");
    }

    #[test]
    fn test_missing_fields_are_config_errors() {
        let no_secret = CredentialArgs {
            client: Some("Acme Corp".to_string()),
            client_id: Some("id".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_credential(&store(), &no_secret),
            Err(Error::Config(ConfigError::MissingCredential("client_secret")))
        ));

        assert!(matches!(
            resolve_credential(&store(), &CredentialArgs::default()),
            Err(Error::Config(ConfigError::MissingCredential("client_name")))
        ));

        let unknown = CredentialArgs {
            client: Some("Globex".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_credential(&store(), &unknown),
            Err(Error::Config(ConfigError::ClientNotFound(_)))
        ));
    }
}
