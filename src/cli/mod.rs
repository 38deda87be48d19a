//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
pub use clap_complete::Shell;

use crate::config::Cloud;
use crate::export::ExportTarget;
use completions::client_name_candidates;

pub mod args;
pub mod client;
pub mod completions;
pub mod context;
pub mod export;

pub use args::{CredentialArgs, GlobalOptions, OutputFormat};

/// CSExport - export CrowdStrike Falcon policies, exclusions and indicators to Excel
#[derive(Parser, Debug)]
#[command(name = "csexport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Summary output format (table, json)
    #[arg(
        long,
        global = true,
        env = "CSEXPORT_FORMAT",
        default_value = "table",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Override client store location
    #[arg(long, global = true, env = "CSEXPORT_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "CSEXPORT_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export one resource kind, or all of them, to .xlsx workbooks
    #[command(after_help = "\
EXAMPLES:
  csexport export prevention --client \"Acme Corp\"
  csexport export all --client acme -o ./reports
  FALCON_CLIENT_ID=... FALCON_CLIENT_SECRET=... csexport export iocs --client acme")]
    Export(ExportArgs),

    /// Manage stored API clients
    #[command(subcommand)]
    Client(ClientCommands),

    /// Generate shell completions (static)
    #[command(after_help = "\
Static completions (subcommands/flags only):
  bash:   csexport completion bash > /etc/bash_completion.d/csexport
  zsh:    csexport completion zsh > \"${fpath[1]}/_csexport\"
  fish:   csexport completion fish > ~/.config/fish/completions/csexport.fish

Dynamic completions (includes stored client names):
  bash:   echo 'source <(COMPLETE=bash csexport)' >> ~/.bashrc
  zsh:    echo 'source <(COMPLETE=zsh csexport)' >> ~/.zshrc
  fish:   echo 'COMPLETE=fish csexport | source' >> ~/.config/fish/config.fish")]
    Completion {
        /// Shell to generate completions for (static only)
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `csexport export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Resource kind to export, or `all`
    #[arg(value_enum)]
    pub target: ExportTarget,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Directory for the workbooks (default: store preference, else current directory)
    #[arg(long = "output-dir", short = 'o')]
    pub output_dir: Option<PathBuf>,
}

/// Client store subcommands
#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// Add a client; missing values are prompted for
    Create {
        /// Name to store the client under
        name: Option<String>,

        #[command(flatten)]
        fields: ClientFields,
    },

    /// Change a stored client; with no flags every field is prompted for
    Edit {
        /// Client to edit
        #[arg(add = client_name_candidates())]
        name: String,

        #[command(flatten)]
        fields: ClientFields,
    },

    /// List stored clients
    List,

    /// Remove a stored client
    Delete {
        /// Client to delete
        #[arg(add = client_name_candidates())]
        name: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Client fields settable from flags
#[derive(Args, Debug, Clone, Default)]
pub struct ClientFields {
    /// API client id
    #[arg(long = "client-id")]
    pub client_id: Option<String>,

    /// API client secret
    #[arg(long = "client-secret")]
    pub client_secret: Option<String>,

    /// Falcon cloud
    #[arg(long, value_enum, conflicts_with = "base_url")]
    pub cloud: Option<Cloud>,

    /// Custom API base URL
    #[arg(long = "base-url")]
    pub base_url: Option<String>,
}

impl ClientFields {
    pub fn is_empty(&self) -> bool {
        self.client_id.is_none()
            && self.client_secret.is_none()
            && self.cloud.is_none()
            && self.base_url.is_none()
    }

    /// Base URL chosen by `--cloud` or `--base-url`
    pub fn chosen_base_url(&self) -> Option<String> {
        self.cloud
            .map(|c| c.base_url().to_string())
            .or_else(|| self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ResourceKind;

    #[test]
    fn test_export_parses_target_and_flags() {
        let cli = Cli::try_parse_from([
            "csexport",
            "export",
            "usb",
            "--client",
            "Acme Corp",
            "-o",
            "/tmp/out",
        ])
        .unwrap();

        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.target, ExportTarget::Kind(ResourceKind::DeviceControl));
                assert_eq!(args.credentials.client.as_deref(), Some("Acme Corp"));
                assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/out")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_export_all() {
        let cli = Cli::try_parse_from(["csexport", "export", "all"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Export(ExportArgs {
                target: ExportTarget::All,
                ..
            })
        ));
    }

    #[test]
    fn test_cloud_and_base_url_conflict() {
        let parsed = Cli::try_parse_from([
            "csexport",
            "client",
            "create",
            "acme",
            "--cloud",
            "us-2",
            "--base-url",
            "https://example.test",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_client_fields_base_url() {
        let fields = ClientFields {
            cloud: Some(Cloud::Us2),
            ..Default::default()
        };
        assert_eq!(
            fields.chosen_base_url().as_deref(),
            Some("https://api.us-2.crowdstrike.com")
        );
        assert!(!fields.is_empty());
        assert!(ClientFields::default().is_empty());
    }
}
