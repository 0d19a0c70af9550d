//! Interactive REPL — translate line by line.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Ctrl-C at the prompt exits; Ctrl-C during a translation cancels it.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use crate::helpers;
use crate::translator::{resolve_profile, Translator};

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// What a REPL line asks for.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Exit,
    SetTarget(&'a str),
    SetProfile(&'a str),
    Translate(&'a str),
}

/// Run the interactive REPL loop.
pub async fn run(mut translator: Translator) -> Result<()> {
    helpers::print_banner(&translator.options.target_language, &translator.provider_name());

    let mut editor = create_editor()?;

    loop {
        let prompt = format!("[→ {}] ", translator.options.target_language);
        let input = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&input);

        match parse_command(trimmed) {
            ReplCommand::Exit => {
                println!("\nGoodbye! 👋");
                break;
            }
            ReplCommand::SetTarget(lang) => {
                translator.options.target_language = lang.to_string();
                println!("{}", format!("Target language: {lang}").dimmed());
            }
            ReplCommand::SetProfile(id) => match resolve_profile(id) {
                Ok(profile) => {
                    translator.options.profile = profile;
                    println!("{}", format!("Profile: {}", profile.display_name).dimmed());
                }
                Err(e) => eprintln!("{} {e}", "✗".red()),
            },
            ReplCommand::Translate(text) => {
                debug!(chars = text.chars().count(), "translating input");
                helpers::print_thinking();
                let result = translator.translate(text).await;
                helpers::clear_thinking();
                match result {
                    Ok(outcome) => helpers::print_outcome(&outcome),
                    Err(e) => eprintln!("\n❌ Error: {e}\n"),
                }
            }
        }
    }

    save_history(&mut editor);
    Ok(())
}

fn parse_command(input: &str) -> ReplCommand<'_> {
    if EXIT_COMMANDS.contains(&input.to_lowercase().as_str()) {
        return ReplCommand::Exit;
    }
    if let Some(lang) = input.strip_prefix("/to ").map(str::trim).filter(|l| !l.is_empty()) {
        return ReplCommand::SetTarget(lang);
    }
    if let Some(id) = input.strip_prefix("/profile ").map(str::trim).filter(|p| !p.is_empty()) {
        return ReplCommand::SetProfile(id);
    }
    ReplCommand::Translate(input)
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the readline history file (separate from translation history).
fn history_path() -> std::path::PathBuf {
    qtranslate_core::utils::get_data_path().join("repl_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert_eq!(parse_command("exit"), ReplCommand::Exit);
        assert_eq!(parse_command("EXIT"), ReplCommand::Exit);
        assert_eq!(parse_command("/quit"), ReplCommand::Exit);
        assert_eq!(parse_command(":q"), ReplCommand::Exit);
    }

    #[test]
    fn switch_commands() {
        assert_eq!(parse_command("/to French"), ReplCommand::SetTarget("French"));
        assert_eq!(parse_command("/profile  legal "), ReplCommand::SetProfile("legal"));
    }

    #[test]
    fn everything_else_is_translated() {
        assert_eq!(parse_command("hello"), ReplCommand::Translate("hello"));
        assert_eq!(parse_command("/to "), ReplCommand::Translate("/to "));
        assert_eq!(parse_command("exit now"), ReplCommand::Translate("exit now"));
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".qtranslate"));
        assert!(path.to_string_lossy().ends_with("repl_history"));
    }
}
