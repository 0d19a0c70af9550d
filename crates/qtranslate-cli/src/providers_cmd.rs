//! `qtranslate providers` — inspect and switch provider profiles.
//!
//! - `qtranslate providers list` — show configured providers
//! - `qtranslate providers use <ID>` — make a provider active
//! - `qtranslate providers validate` — check the configuration

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;

use qtranslate_core::config::{load_config, save_config, validate_config, Config};
use qtranslate_core::utils::{mask_secret, truncate_string};
use qtranslate_providers::registry::policy_for;

// ─────────────────────────────────────────────
// Subcommand enum
// ─────────────────────────────────────────────

/// Providers subcommands.
#[derive(Subcommand)]
pub enum ProvidersCommands {
    /// List configured providers
    List,

    /// Make a provider active (by id or name)
    Use {
        /// Provider id or name
        id: String,
    },

    /// Validate the configuration file
    Validate,
}

/// Dispatch a providers subcommand.
pub fn dispatch(cmd: ProvidersCommands, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        ProvidersCommands::List => list_providers(&load_config(config_path)),
        ProvidersCommands::Use { id } => use_provider(&id, config_path),
        ProvidersCommands::Validate => validate(&load_config(config_path)),
    }
}

// ─────────────────────────────────────────────
// Command implementations
// ─────────────────────────────────────────────

/// `qtranslate providers list`
fn list_providers(config: &Config) -> Result<()> {
    let active_id = config.active_provider().map(|p| p.id.clone());

    println!();
    println!("{}", "  Providers".cyan().bold());
    println!();
    println!(
        "    {:<10} {:<18} {:<20} {:<22} {}",
        "ID".bold(),
        "Name".bold(),
        "Family".bold(),
        "Model".bold(),
        "Key".bold(),
    );
    println!("  {}", "─".repeat(84));

    for p in &config.providers {
        let marker = if active_id.as_deref() == Some(p.id.as_str()) {
            "●".green().to_string()
        } else {
            " ".to_string()
        };
        let key = if p.has_credential() {
            mask_secret(&p.api_key)
        } else if p.is_configured() {
            "not needed".dimmed().to_string()
        } else {
            "missing".red().to_string()
        };

        println!(
            "  {} {:<10} {:<18} {:<20} {:<22} {}",
            marker,
            truncate_string(&p.id, 8),
            truncate_string(&p.name, 18),
            policy_for(p.family).display_name,
            truncate_string(&p.model, 22),
            key
        );
    }

    println!();
    Ok(())
}

/// `qtranslate providers use <ID>`
fn use_provider(key: &str, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path);
    if !select_provider(&mut config, key) {
        bail!("No provider matches '{}'. See `qtranslate providers list`.", key);
    }

    save_config(&config, config_path).context("failed to save config")?;
    let name = config
        .active_provider()
        .map(|p| p.name.clone())
        .unwrap_or_default();
    println!("  {} active provider: {}", "✓".green(), name.bold());
    Ok(())
}

/// Activate the provider whose id, id prefix or name matches `key`.
fn select_provider(config: &mut Config, key: &str) -> bool {
    if config.set_active_provider(key) {
        return true;
    }

    let mut by_prefix = config.providers.iter().filter(|p| p.id.starts_with(key));
    match (by_prefix.next().map(|p| p.id.clone()), by_prefix.next()) {
        (Some(id), None) if !key.is_empty() => config.set_active_provider(&id),
        _ => false,
    }
}

/// `qtranslate providers validate`
fn validate(config: &Config) -> Result<()> {
    match validate_config(config) {
        Ok(()) => {
            println!("  {} configuration is valid", "✓".green());
            Ok(())
        }
        Err(errors) => {
            for e in &errors {
                println!("  {} {}", "✗".red(), e);
            }
            bail!("{} validation error(s)", errors.len())
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
