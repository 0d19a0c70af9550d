//! Configuration schema — typed settings persisted as JSON.
//!
//! Hierarchy: `Config` → `Vec<ProviderProfile>`, `TranslationConfig`,
//! `SpeechConfig`, `HistoryConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.qtranslate/config.json` + env vars.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub providers: Vec<ProviderProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_provider_id: Option<String>,
    pub translation: TranslationConfig,
    pub speech: SpeechConfig,
    pub history: HistoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: vec![ProviderProfile::default()],
            active_provider_id: None,
            translation: TranslationConfig::default(),
            speech: SpeechConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl Config {
    /// The active provider: the one matching `active_provider_id`, else the first.
    pub fn active_provider(&self) -> Option<&ProviderProfile> {
        self.active_provider_id
            .as_deref()
            .and_then(|id| self.find_provider(id))
            .or_else(|| self.providers.first())
    }

    /// Look up a provider by id, falling back to a case-insensitive name match.
    pub fn find_provider(&self, key: &str) -> Option<&ProviderProfile> {
        self.providers
            .iter()
            .find(|p| p.id == key)
            .or_else(|| self.providers.iter().find(|p| p.name.eq_ignore_ascii_case(key)))
    }

    /// Mark a provider as active. Returns `false` if no provider matches.
    pub fn set_active_provider(&mut self, key: &str) -> bool {
        match self.find_provider(key).map(|p| p.id.clone()) {
            Some(id) => {
                self.active_provider_id = Some(id);
                true
            }
            None => false,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Backend dialect tag.
///
/// Every family is served by the same OpenAI-compatible client today; the tag
/// only selects per-family policy (auth, defaults).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    /// OpenAI and compatible APIs (Groq, Together, z.ai, …).
    #[default]
    #[serde(alias = "openaicompatible", alias = "generic")]
    OpenAi,
    Anthropic,
    Google,
    /// Local inference; commonly runs without auth.
    Ollama,
    Custom,
}

impl ProviderFamily {
    pub const ALL: [ProviderFamily; 5] = [
        ProviderFamily::OpenAi,
        ProviderFamily::Anthropic,
        ProviderFamily::Google,
        ProviderFamily::Ollama,
        ProviderFamily::Custom,
    ];

    /// Whether the endpoint may be called with no API key (local inference).
    pub fn allows_anonymous(self) -> bool {
        matches!(self, ProviderFamily::Ollama)
    }

    /// Parse a family name as written in config or on the command line.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "generic" | "openaicompatible" => Some(ProviderFamily::OpenAi),
            "anthropic" => Some(ProviderFamily::Anthropic),
            "google" | "gemini" => Some(ProviderFamily::Google),
            "ollama" | "local" => Some(ProviderFamily::Ollama),
            "custom" => Some(ProviderFamily::Custom),
            _ => None,
        }
    }
}

/// One configured backend endpoint + credential + model parameters.
///
/// Mutated only by full replacement once handed to the gateway.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderProfile {
    /// Opaque id, stable across edits.
    pub id: String,
    pub name: String,
    pub base_url: String,
    /// API key. May be empty for local providers.
    pub api_key: String,
    pub model: String,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    #[serde(rename = "type", alias = "family")]
    pub family: ProviderFamily,
}

impl Default for ProviderProfile {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: "OpenAI".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 4096,
            timeout_seconds: 60,
            family: ProviderFamily::OpenAi,
        }
    }
}

impl ProviderProfile {
    /// Whether an API key is set.
    pub fn has_credential(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Whether this profile can be called as-is: a key is set, or the family
    /// allows anonymous calls.
    pub fn is_configured(&self) -> bool {
        self.has_credential() || self.family.allows_anonymous()
    }

    /// Per-attempt request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

// ─────────────────────────────────────────────
// Translation
// ─────────────────────────────────────────────

/// Prompt-side translation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationConfig {
    /// Target language name (e.g. `"Russian"`).
    pub target_language: String,
    /// Built-in translation profile id (e.g. `"technical"`).
    pub active_profile_id: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_language: "Russian".to_string(),
            active_profile_id: "general".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Speech
// ─────────────────────────────────────────────

/// Text-to-speech side service settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechConfig {
    /// Base URL of the speech service.
    pub endpoint: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://tts.rox-net.ru".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// History
// ─────────────────────────────────────────────

/// Translation history settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryConfig {
    pub enabled: bool,
    /// Non-favorite entries kept before the oldest are evicted.
    pub max_items: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items: 100,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
