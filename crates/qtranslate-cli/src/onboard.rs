//! `qtranslate onboard` — initialize configuration and data directory.
//!
//! - Creates `~/.qtranslate/config.json` with defaults (one provider per
//!   family whose API key is found in the environment, else OpenAI)
//! - Creates the data directory used for history

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use qtranslate_core::config::{get_config_path, load_config, save_config, Config, ProviderFamily};
use qtranslate_core::utils::get_data_path;
use qtranslate_providers::registry::{new_profile, policy_for, FAMILIES};

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🌐 qtranslate — Setup".cyan().bold());
    println!();

    let data_dir = get_data_path();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    println!("  {} data dir at {}", "✓".green(), data_dir.display());

    let config_path = get_config_path();
    if write_initial_config(&config_path)? {
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let config = load_config(Some(&config_path));
    for p in &config.providers {
        let key = if p.has_credential() {
            "key set".green().to_string()
        } else {
            "no key".yellow().to_string()
        };
        println!("    {:<20} {}", p.name, key);
    }

    println!();
    println!(
        "{}",
        "  Setup complete! Add an API key to the config, then run `qtranslate probe`.".green()
    );
    println!();

    Ok(())
}

/// Write a fresh config unless one exists. Returns `true` if written.
fn write_initial_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    let config = initial_config(|var| std::env::var(var).ok());
    save_config(&config, Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

/// Default config, with a provider for every family whose key is in the env.
fn initial_config(var: impl Fn(&str) -> Option<String>) -> Config {
    let providers: Vec<_> = FAMILIES
        .iter()
        .filter_map(|policy| {
            let key = var(policy.env_key?).filter(|k| !k.is_empty())?;
            Some(new_profile(policy.family, policy.display_name, &key))
        })
        .collect();

    if providers.is_empty() {
        let openai = policy_for(ProviderFamily::OpenAi);
        return Config {
            providers: vec![new_profile(openai.family, "OpenAI", "")],
            ..Config::default()
        };
    }

    Config {
        providers,
        ..Config::default()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
