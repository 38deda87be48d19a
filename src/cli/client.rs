//! Client store command implementations
//!
//! Manages the named API clients exports authenticate with.

use std::io::IsTerminal;

use colored::Colorize;
use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};
use serde::Serialize;

use crate::cli::args::GlobalOptions;
use crate::cli::{ClientFields, OutputFormat};
use crate::config::{ClientConfig, ClientStore, Cloud};
use crate::error::{ConfigError, Result};
use crate::output::json::format_json;
use crate::output::table::format_table;

/// Display model for `client list`
#[derive(Debug, Clone, Serialize, tabled::Tabled)]
pub struct ClientListItem {
    #[tabled(rename = "CLIENT")]
    pub name: String,
    #[tabled(rename = "CLOUD")]
    pub cloud: String,
    #[tabled(rename = "BASE URL")]
    pub base_url: String,
    #[tabled(rename = "CLIENT ID")]
    pub client_id: String,
}

impl ClientListItem {
    fn new(name: &str, client: &ClientConfig) -> Self {
        Self {
            name: name.to_string(),
            cloud: Cloud::from_base_url(&client.base_url)
                .map(|c| c.to_string())
                .unwrap_or_else(|| "custom".to_string()),
            base_url: client.base_url.clone(),
            client_id: mask(&client.client_id),
        }
    }
}

fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "****".to_string()
    }
}

fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

fn prompt_text(prompt: &str, current: Option<&str>) -> Result<String> {
    let theme = theme();
    let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt);
    if let Some(current) = current {
        input = input.default(current.to_string());
    }
    Ok(input.interact_text()?)
}

fn prompt_secret(prompt: &str, allow_empty: bool) -> Result<String> {
    Ok(Password::with_theme(&theme())
        .with_prompt(prompt)
        .allow_empty_password(allow_empty)
        .interact()?)
}

/// Pick a cloud, or enter a custom base URL.
fn prompt_base_url(current: Option<&str>) -> Result<String> {
    let mut items: Vec<String> = Cloud::ALL
        .iter()
        .map(|c| format!("{} ({})", c, c.base_url()))
        .collect();
    items.push("custom base URL".to_string());

    let default = current
        .and_then(Cloud::from_base_url)
        .and_then(|c| Cloud::ALL.iter().position(|x| *x == c))
        .unwrap_or(if current.is_some() { Cloud::ALL.len() } else { 0 });

    let selection = Select::with_theme(&theme())
        .with_prompt("Falcon cloud")
        .items(&items)
        .default(default)
        .interact()?;

    match Cloud::ALL.get(selection) {
        Some(cloud) => Ok(cloud.base_url().to_string()),
        None => prompt_text("Base URL", current),
    }
}

/// Add a client. Prompts for anything not given on the command line.
pub fn create(name: Option<&str>, fields: &ClientFields, opts: &GlobalOptions) -> Result<()> {
    let mut store = ClientStore::load_or_default(opts.config_ref())?;

    let name = match name {
        Some(name) => name.to_string(),
        None => prompt_text("Client name", None)?,
    };
    if store.clients.contains_key(&name) {
        return Err(ConfigError::ClientExists(name).into());
    }

    let client_id = match &fields.client_id {
        Some(id) => id.clone(),
        None => prompt_text("Client ID", None)?,
    };
    let client_secret = match &fields.client_secret {
        Some(secret) => secret.clone(),
        None => prompt_secret("Client secret", false)?,
    };
    let base_url = match fields.chosen_base_url() {
        Some(url) => url,
        // Scripted runs get the production cloud
        None if !std::io::stdin().is_terminal() => Cloud::Us1.base_url().to_string(),
        None => prompt_base_url(None)?,
    };

    store.create(
        &name,
        ClientConfig {
            client_id,
            client_secret,
            base_url,
        },
    )?;
    store.save_at(opts.config_ref())?;

    println!("{} Created client: {}", "✓".green(), name.bold());
    println!(
        "\n{} Export with: {}",
        "→".cyan(),
        format!("csexport export all --client \"{}\"", name).cyan()
    );
    Ok(())
}

/// Change a stored client. Flags update only what they name; without flags
/// every field is prompted for, keeping the current value on empty input.
pub fn edit(name: &str, fields: &ClientFields, opts: &GlobalOptions) -> Result<()> {
    let mut store = ClientStore::load_at(opts.config_ref())?;
    let current = store.get(name)?.clone();

    let updated = if fields.is_empty() {
        println!("{}", format!("Editing client: {}", name).bold());
        let client_id = prompt_text("Client ID", Some(&current.client_id))?;
        let secret = prompt_secret("Client secret (leave empty to keep)", true)?;
        let base_url = prompt_base_url(Some(&current.base_url))?;
        ClientConfig {
            client_id,
            client_secret: if secret.is_empty() {
                current.client_secret
            } else {
                secret
            },
            base_url,
        }
    } else {
        ClientConfig {
            client_id: fields.client_id.clone().unwrap_or(current.client_id),
            client_secret: fields.client_secret.clone().unwrap_or(current.client_secret),
            base_url: fields.chosen_base_url().unwrap_or(current.base_url),
        }
    };

    store.update(name, updated)?;
    store.save_at(opts.config_ref())?;

    println!("{} Updated client: {}", "✓".green(), name.bold());
    Ok(())
}

/// List stored clients
pub fn list(opts: &GlobalOptions) -> Result<()> {
    let store = ClientStore::load_or_default(opts.config_ref())?;
    let items: Vec<ClientListItem> = store
        .clients
        .iter()
        .map(|(name, client)| ClientListItem::new(name, client))
        .collect();

    match opts.format {
        OutputFormat::Json => println!("{}", format_json(&items)?),
        OutputFormat::Table => {
            println!("{}", "Stored Clients".bold());
            println!();
            if items.is_empty() {
                println!(
                    "No clients configured. Run {} to add one.",
                    "csexport client create".cyan()
                );
            } else {
                println!("{}", format_table(&items));
            }
        }
    }
    Ok(())
}

/// Delete a stored client
pub fn delete(name: &str, yes: bool, opts: &GlobalOptions) -> Result<()> {
    let mut store = ClientStore::load_at(opts.config_ref())?;
    store.get(name)?;

    if !yes {
        let confirmed = Confirm::with_theme(&theme())
            .with_prompt(format!("Delete client '{}'?", name))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(name)?;
    store.save_at(opts.config_ref())?;

    println!("{} Deleted client: {}", "✓".green(), name);
    Ok(())
}
