//! `qtranslate status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use qtranslate_core::config::{get_config_path, load_config};
use qtranslate_core::history::HistoryStore;
use qtranslate_core::profiles;
use qtranslate_core::utils::get_history_path;
use qtranslate_providers::registry::policy_for;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🌐 qtranslate Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    match config.active_provider() {
        Some(p) => {
            println!("  {:<18} {}", "Provider:".bold(), p.name);
            println!("  {:<18} {}", "Model:".bold(), p.model);
            println!(
                "  {:<18} {} | max_tokens: {} | timeout: {}s",
                "Parameters:".bold(),
                format!("temp: {}", p.temperature).dimmed(),
                format!("{}", p.max_tokens).dimmed(),
                format!("{}", p.timeout_seconds).dimmed(),
            );
        }
        None => println!("  {:<18} {}", "Provider:".bold(), "(none)".red()),
    }

    let profile = profiles::find(&config.translation.active_profile_id)
        .map(|p| p.display_name)
        .unwrap_or("(unknown)");
    println!(
        "  {:<18} {}",
        "Target language:".bold(),
        config.translation.target_language
    );
    println!("  {:<18} {}", "Profile:".bold(), profile);
    println!("  {:<18} {}", "Speech service:".bold(), config.speech.endpoint);

    let history = if !config.history.enabled {
        "disabled".dimmed().to_string()
    } else if get_history_path().exists() {
        match HistoryStore::open(None, config.history.max_items) {
            Ok(store) => format!("{} / {} entries", store.len(), config.history.max_items),
            Err(e) => format!("{} ({e})", "unavailable".red()),
        }
    } else {
        "empty".dimmed().to_string()
    };
    println!("  {:<18} {}", "History:".bold(), history);

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    for p in &config.providers {
        let status = if p.has_credential() {
            format!("{} (key set)", "✓".green())
        } else if p.is_configured() {
            format!("{} (no key needed)", "✓".green())
        } else {
            format!("{}", "· not configured".dimmed())
        };
        println!(
            "    {:<20} {:<20} {}",
            p.name,
            policy_for(p.family).display_name.dimmed(),
            status
        );
    }

    println!();

    Ok(())
}
