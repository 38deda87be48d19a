//! Dynamic shell completions for CSExport
//!
//! Completes client names from the local client store. No network access.
//!
//! Shell support:
//! - Fish/Zsh: names with the client's cloud as description
//! - Bash: names only

use clap_complete::engine::{ArgValueCandidates, CompletionCandidate};

use crate::config::{ClientStore, Cloud};

/// Environment variable naming an alternative client store
const CONFIG_ENV: &str = "CSEXPORT_CONFIG";

/// Find a `--config` override on the partial command line.
///
/// Completers run before argument parsing, so the flag is located by hand.
fn config_from_args(args: &[String]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            return iter.next().cloned();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

fn candidates(store: &ClientStore) -> Vec<CompletionCandidate> {
    store
        .clients
        .iter()
        .map(|(name, client)| {
            let cloud = Cloud::from_base_url(&client.base_url)
                .map(|c| c.to_string())
                .unwrap_or_else(|| client.base_url.clone());
            CompletionCandidate::new(name.clone()).help(Some(cloud.into()))
        })
        .collect()
}

/// Complete stored client names.
///
/// A missing or unreadable store yields no candidates; completion must never
/// break the shell.
pub fn complete_client_names() -> Vec<CompletionCandidate> {
    let args: Vec<String> = std::env::args().collect();
    let path = config_from_args(&args).or_else(|| std::env::var(CONFIG_ENV).ok());

    match ClientStore::load_at(path.as_deref()) {
        Ok(store) => candidates(&store),
        Err(_) => vec![],
    }
}

/// Create completion candidates for client names.
pub fn client_name_candidates() -> ArgValueCandidates {
    ArgValueCandidates::new(complete_client_names)
}
