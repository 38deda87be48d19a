//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};

/// Global flags, captured once in `main.rs` and passed to every handler.
///
/// Precedence is CLI flag > environment variable > client store > default.
/// This struct holds the first two layers; the store is consulted later.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Summary output format
    pub format: OutputFormat,

    /// Client store path (defaults to ~/.csexport/config.yaml)
    pub config: Option<String>,

    /// Debug logging requested
    pub debug: bool,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            debug: cli.debug,
        }
    }

    /// Config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_cli_copies_globals() {
        let cli = Cli::try_parse_from([
            "csexport",
            "--format",
            "json",
            "--config",
            "/tmp/store.yaml",
            "client",
            "list",
        ])
        .unwrap();

        let opts = GlobalOptions::from_cli(&cli);

        assert_eq!(opts.format, OutputFormat::Json);
        assert_eq!(opts.config_ref(), Some("/tmp/store.yaml"));
        assert!(!opts.debug);
    }
}
