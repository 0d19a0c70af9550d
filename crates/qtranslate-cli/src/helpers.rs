//! Shared CLI helpers — path expansion, output formatting, Ctrl-C handling.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use qtranslate_core::types::TranslationOutcome;
use qtranslate_providers::{HealthStatus, TranslationRequest, TranslationService};
use tokio_util::sync::CancellationToken;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print a translation outcome.
pub fn print_outcome(outcome: &TranslationOutcome) {
    println!();
    match (&outcome.translated_text, &outcome.error_message) {
        (Some(text), _) if outcome.success => println!("{text}"),
        (_, Some(err)) => eprintln!("{} {}", "✗".red().bold(), err),
        _ => eprintln!("{}", "(no translation)".dimmed()),
    }
    println!();
}

/// One line of probe output.
pub fn print_health(label: &str, status: &HealthStatus) {
    let mark = if status.is_healthy() {
        "✓".green()
    } else {
        "✗".red()
    };
    println!("  {} {:<24} {}", mark, label, status.message());
}

/// Print the banner shown at REPL start.
pub fn print_banner(target_language: &str, provider: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🌐 qtranslate".cyan().bold(), version.dimmed());
    println!(
        "{}",
        format!("→ {target_language} via {provider}").dimmed()
    );
    println!(
        "{}",
        "Type text to translate, /to LANG, /profile ID, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "translating" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ translating...".dimmed());
}

/// Clear the "translating" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Run a translation that Ctrl-C cancels.
pub async fn translate_cancellable(
    service: &TranslationService,
    request: &TranslationRequest,
) -> Result<TranslationOutcome> {
    let cancel = cancel_on_ctrl_c();
    let outcome = service.translate(request, &cancel).await;
    cancel.cancel();
    Ok(outcome?)
}

/// A token that fires on Ctrl-C. Cancelling the token also stops the watcher.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = watcher.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    watcher.cancel();
                }
            }
        }
    });
    cancel
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
