//! qtranslate CLI — entry point.
//!
//! # Commands
//!
//! - `qtranslate translate [TEXT]` — translate once, or start the REPL
//! - `qtranslate probe` — test provider / speech-service connectivity
//! - `qtranslate providers list|use|validate` — manage provider profiles
//! - `qtranslate history list|clear|favorite|remove` — translation history
//! - `qtranslate speak TEXT --lang L --out FILE` — synthesize speech to a file
//! - `qtranslate status` — show configuration and provider status
//! - `qtranslate onboard` — initialize config

mod helpers;
mod history_cmd;
mod onboard;
mod probe_cmd;
mod providers_cmd;
mod repl;
mod status;
mod translator;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use qtranslate_core::config::load_config;
use qtranslate_providers::{PiperSpeechClient, SpeechSynthesizer};

use crate::translator::{TranslateOptions, Translator};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🌐 qtranslate — LLM-backed translation from the terminal
#[derive(Parser)]
#[command(name = "qtranslate", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate text (single-shot, or interactive REPL when TEXT is omitted)
    Translate {
        /// Text to translate. Omit for REPL mode.
        text: Option<String>,

        /// Target language (defaults to the configured one)
        #[arg(short, long)]
        to: Option<String>,

        /// Source language (auto-detected when omitted)
        #[arg(short, long)]
        from: Option<String>,

        /// Translation profile: general, technical, literary, legal, medical, casual
        #[arg(short, long)]
        profile: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,

        /// Do not record the translation in history
        #[arg(long, default_value_t = false)]
        no_history: bool,
    },

    /// Check that providers and the speech service respond
    Probe {
        /// Provider id or name (defaults to the active provider)
        #[arg(short, long)]
        provider: Option<String>,

        /// Probe every provider and the speech service
        #[arg(short, long, default_value_t = false)]
        all: bool,

        /// Probe the speech service
        #[arg(short, long, default_value_t = false)]
        speech: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Manage provider profiles
    Providers {
        #[command(subcommand)]
        action: providers_cmd::ProvidersCommands,
    },

    /// Browse and manage translation history
    History {
        #[command(subcommand)]
        action: history_cmd::HistoryCommands,
    },

    /// Synthesize speech and write the audio to a file
    Speak {
        /// Text to speak
        text: String,

        /// Language name or code (e.g. "English", "de")
        #[arg(short, long, default_value = "ru")]
        lang: String,

        /// Output WAV file
        #[arg(short, long, default_value = "speech.wav")]
        out: String,
    },

    /// Show configuration and provider status
    Status,

    /// Initialize configuration
    Onboard,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Translate {
            text,
            to,
            from,
            profile,
            logs,
            no_history,
        } => {
            init_logging(logs);
            run_translate(text, to, from, profile, no_history).await
        }
        Commands::Probe {
            provider,
            all,
            speech,
            logs,
        } => {
            init_logging(logs);
            probe_cmd::run(probe_cmd::ProbeTargets {
                provider,
                all,
                speech,
            })
            .await
        }
        Commands::Providers { action } => {
            init_logging(false);
            providers_cmd::dispatch(action, None)
        }
        Commands::History { action } => {
            init_logging(false);
            history_cmd::dispatch(action)
        }
        Commands::Speak { text, lang, out } => {
            init_logging(false);
            run_speak(&text, &lang, &out).await
        }
        Commands::Status => status::run(),
        Commands::Onboard => onboard::run(),
    }
}

// ─────────────────────────────────────────────
// Translate command
// ─────────────────────────────────────────────

async fn run_translate(
    text: Option<String>,
    to: Option<String>,
    from: Option<String>,
    profile: Option<String>,
    no_history: bool,
) -> Result<()> {
    let config = load_config(None);
    let options = TranslateOptions::resolve(&config, to, from, profile, no_history)?;
    let translator = Translator::from_config(&config, options)?;

    match text {
        Some(text) => {
            info!(provider = %translator.provider_name(), "translating single input");
            let outcome = translator.translate(&text).await?;
            helpers::print_outcome(&outcome);
            if !outcome.success {
                std::process::exit(1);
            }
        }
        None => repl::run(translator).await?,
    }

    Ok(())
}

// ─────────────────────────────────────────────
// Speak command
// ─────────────────────────────────────────────

async fn run_speak(text: &str, lang: &str, out: &str) -> Result<()> {
    let config = load_config(None);
    let client = PiperSpeechClient::new(Some(&config.speech.endpoint));

    if !client.is_language_supported(lang) {
        eprintln!(
            "{}",
            format!("No voice for '{lang}', using the fallback voice.").yellow()
        );
    }

    let cancel = helpers::cancel_on_ctrl_c();
    let audio = client.synthesize(text, lang, &cancel).await;
    cancel.cancel();
    let audio = audio.context("speech synthesis failed")?;

    let path = helpers::expand_tilde(out);
    tokio::fs::write(&path, &audio)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "  {} wrote {} bytes to {}",
        "✓".green(),
        audio.len(),
        path.display()
    );
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("qtranslate=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
