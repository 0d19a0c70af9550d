//! `qtranslate history` — browse and manage remembered translations.
//!
//! - `qtranslate history list [--limit N] [--favorites]`
//! - `qtranslate history clear` — remove everything except favorites
//! - `qtranslate history favorite <ID>` — toggle the favorite flag
//! - `qtranslate history remove <ID>`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Subcommand;
use colored::Colorize;

use qtranslate_core::config::load_config;
use qtranslate_core::history::{HistoryEntry, HistoryStore};
use qtranslate_core::utils::truncate_string;

// ─────────────────────────────────────────────
// Subcommand enum
// ─────────────────────────────────────────────

/// History subcommands.
#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List recent translations, newest first
    List {
        /// Maximum entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Only show favorites
        #[arg(short, long, default_value_t = false)]
        favorites: bool,
    },

    /// Remove all entries except favorites
    Clear,

    /// Toggle the favorite flag on an entry
    Favorite {
        /// Entry id (or a unique prefix)
        id: String,
    },

    /// Remove an entry
    Remove {
        /// Entry id (or a unique prefix)
        id: String,
    },
}

/// Dispatch a history subcommand.
pub fn dispatch(cmd: HistoryCommands) -> Result<()> {
    let config = load_config(None);
    let store = open_store(None, config.history.max_items)?;
    run(cmd, &store)
}

fn open_store(path: Option<PathBuf>, max_items: usize) -> Result<HistoryStore> {
    HistoryStore::open(path, max_items).context("failed to open history")
}

fn run(cmd: HistoryCommands, store: &HistoryStore) -> Result<()> {
    match cmd {
        HistoryCommands::List { limit, favorites } => {
            let entries: Vec<HistoryEntry> = if favorites {
                store.favorites().into_iter().take(limit).collect()
            } else {
                store.recent(limit)
            };
            print_entries(&entries);
            Ok(())
        }
        HistoryCommands::Clear => {
            let before = store.len();
            let kept = store.clear();
            println!(
                "  {} removed {} entries ({} favorites kept)",
                "✓".green(),
                before - kept,
                kept
            );
            Ok(())
        }
        HistoryCommands::Favorite { id } => {
            let id = resolve_id(store, &id)?;
            match store.toggle_favorite(&id) {
                Some(true) => println!("  {} {} marked as favorite", "★".yellow(), short_id(&id)),
                Some(false) => println!("  {} {} unmarked", "☆".dimmed(), short_id(&id)),
                None => bail!("No history entry '{}'", id),
            }
            Ok(())
        }
        HistoryCommands::Remove { id } => {
            let id = resolve_id(store, &id)?;
            if !store.remove(&id) {
                bail!("No history entry '{}'", id);
            }
            println!("  {} removed {}", "✓".green(), short_id(&id));
            Ok(())
        }
    }
}

/// Expand an id prefix to a full id, requiring exactly one match.
fn resolve_id(store: &HistoryStore, prefix: &str) -> Result<String> {
    let matches: Vec<String> = store
        .recent(usize::MAX)
        .into_iter()
        .map(|e| e.id)
        .filter(|id| !prefix.is_empty() && id.starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [one] => Ok(one.clone()),
        [] => bail!("No history entry '{}'", prefix),
        _ => bail!("'{}' matches {} entries; use a longer id", prefix, matches.len()),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn print_entries(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("  No translations yet.");
        return;
    }

    println!();
    println!("{}", "  Translation History".cyan().bold());
    println!();

    for e in entries {
        let star = if e.is_favorite {
            "★".yellow().to_string()
        } else {
            " ".to_string()
        };
        let when = e.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        println!(
            "  {} {} {}  {}",
            star,
            short_id(&e.id).dimmed(),
            when.to_string().dimmed(),
            format!("→ {}", e.target_language).dimmed()
        );
        println!("      {}", truncate_string(&e.source_text, 70));
        println!("      {}", truncate_string(&e.translated_text, 70).green());
    }

    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
