//! Config loader — reads `~/.qtranslate/config.json`, applies legacy
//! migrations, and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.qtranslate/config.json`
//! 3. Environment variables `QTRANSLATE_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderProfile};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    migrate_config(&mut raw);

    let mut config: Config = match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    if config.providers.is_empty() {
        info!("Config has no providers, adding the default one");
        config.providers.push(ProviderProfile::default());
    }

    debug!(providers = config.providers.len(), "Config loaded");
    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!(
        providers = config.providers.len(),
        "Config saved to {}",
        config_path.display()
    );
    Ok(())
}

/// Apply legacy config migrations.
///
/// Older configs stored a single flat `provider` object that also carried
/// `targetLanguage`. It becomes a one-element `providers` list and
/// `translation.targetLanguage`.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };
    let Some(mut legacy) = obj.remove("provider") else {
        return;
    };

    if let Some(lang) = legacy
        .as_object_mut()
        .and_then(|p| p.remove("targetLanguage"))
    {
        let translation = obj
            .entry("translation")
            .or_insert_with(|| serde_json::json!({}));
        if translation.get("targetLanguage").is_none() {
            translation["targetLanguage"] = lang;
        }
    }

    let has_providers = obj
        .get("providers")
        .and_then(|p| p.as_array())
        .is_some_and(|list| !list.is_empty());
    if !has_providers {
        if let Some(p) = legacy.as_object_mut() {
            p.entry("name").or_insert_with(|| "Provider".into());
        }
        obj.insert("providers".into(), serde_json::Value::Array(vec![legacy]));
        debug!("Migrated legacy provider → providers[0]");
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `QTRANSLATE_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `QTRANSLATE_TRANSLATION__TARGET_LANGUAGE` → `translation.target_language`
/// - `QTRANSLATE_TRANSLATION__PROFILE` → `translation.active_profile_id`
/// - `QTRANSLATE_SPEECH__ENDPOINT` → `speech.endpoint`
/// - `QTRANSLATE_ACTIVE_PROVIDER` → `active_provider_id` (id or name)
/// - `QTRANSLATE_PROVIDER__API_KEY` / `__BASE_URL` / `__MODEL` → active provider fields
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(val) = var("QTRANSLATE_TRANSLATION__TARGET_LANGUAGE") {
        config.translation.target_language = val;
    }
    if let Some(val) = var("QTRANSLATE_TRANSLATION__PROFILE") {
        config.translation.active_profile_id = val;
    }
    if let Some(val) = var("QTRANSLATE_SPEECH__ENDPOINT") {
        config.speech.endpoint = val;
    }
    if let Some(val) = var("QTRANSLATE_ACTIVE_PROVIDER") {
        if !config.set_active_provider(&val) {
            warn!("QTRANSLATE_ACTIVE_PROVIDER={} matches no provider", val);
        }
    }

    apply_provider_overrides(&mut config, &var);

    config
}

/// Apply provider overrides to the active provider.
fn apply_provider_overrides(config: &mut Config, var: &impl Fn(&str) -> Option<String>) {
    let Some(active_id) = config.active_provider().map(|p| p.id.clone()) else {
        return;
    };
    let Some(provider) = config.providers.iter_mut().find(|p| p.id == active_id) else {
        return;
    };

    if let Some(val) = var("QTRANSLATE_PROVIDER__API_KEY") {
        provider.api_key = val;
    }
    if let Some(val) = var("QTRANSLATE_PROVIDER__BASE_URL") {
        provider.base_url = val;
    }
    if let Some(val) = var("QTRANSLATE_PROVIDER__MODEL") {
        provider.model = val;
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
