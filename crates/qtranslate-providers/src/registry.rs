//! Provider family registry — static policy for each supported family.
//!
//! Every family is served by the same OpenAI-compatible client. What differs
//! per family is captured here as data: display names and the defaults offered
//! when a new profile is created. Anonymous access is a property of
//! [`ProviderFamily`] itself.

use qtranslate_core::config::{ProviderFamily, ProviderProfile};

// ─────────────────────────────────────────────
// FamilyPolicy — static metadata for one family
// ─────────────────────────────────────────────

/// Static policy describing one provider family.
#[derive(Clone, Debug)]
pub struct FamilyPolicy {
    pub family: ProviderFamily,
    /// Internal name (e.g. `"ollama"`).
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"Ollama"`.
    pub display_name: &'static str,
    /// Base URL offered for new profiles. Empty when there is no sensible default.
    pub default_base_url: &'static str,
    /// Model offered for new profiles.
    pub default_model: &'static str,
    /// Environment variable consulted for a key when creating a profile.
    pub env_key: Option<&'static str>,
}

/// All family policies, in display order.
pub static FAMILIES: &[FamilyPolicy] = &[
    FamilyPolicy {
        family: ProviderFamily::OpenAi,
        name: "openai",
        display_name: "OpenAI-compatible",
        default_base_url: "https://api.openai.com/v1",
        default_model: "gpt-4o-mini",
        env_key: Some("OPENAI_API_KEY"),
    },
    // Anthropic and Google are reached through their OpenAI-compatible endpoints.
    FamilyPolicy {
        family: ProviderFamily::Anthropic,
        name: "anthropic",
        display_name: "Anthropic",
        default_base_url: "https://api.anthropic.com/v1",
        default_model: "claude-3-5-haiku-latest",
        env_key: Some("ANTHROPIC_API_KEY"),
    },
    FamilyPolicy {
        family: ProviderFamily::Google,
        name: "google",
        display_name: "Google",
        default_base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
        default_model: "gemini-2.0-flash",
        env_key: Some("GEMINI_API_KEY"),
    },
    FamilyPolicy {
        family: ProviderFamily::Ollama,
        name: "ollama",
        display_name: "Ollama",
        default_base_url: "http://localhost:11434/v1",
        default_model: "llama3.2",
        env_key: None,
    },
    FamilyPolicy {
        family: ProviderFamily::Custom,
        name: "custom",
        display_name: "Custom",
        default_base_url: "",
        default_model: "",
        env_key: None,
    },
];

/// Policy for a family.
pub fn policy_for(family: ProviderFamily) -> &'static FamilyPolicy {
    FAMILIES
        .iter()
        .find(|p| p.family == family)
        .unwrap_or(&FAMILIES[0])
}

/// Build a new profile pre-filled with the family defaults.
///
/// The key falls back to the family's env var when `api_key` is empty.
pub fn new_profile(family: ProviderFamily, name: &str, api_key: &str) -> ProviderProfile {
    let policy = policy_for(family);
    let key = if api_key.is_empty() {
        policy
            .env_key
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    } else {
        api_key.to_string()
    };

    ProviderProfile {
        name: name.to_string(),
        base_url: policy.default_base_url.to_string(),
        api_key: key,
        model: policy.default_model.to_string(),
        family,
        ..Default::default()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
