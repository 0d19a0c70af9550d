//! Translator — wires config, gateway, translation service and history
//! together for the `translate` command and the REPL.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use qtranslate_core::config::Config;
use qtranslate_core::history::{HistoryEntry, HistoryStore};
use qtranslate_core::profiles::{self, TranslationProfile};
use qtranslate_core::types::TranslationOutcome;
use qtranslate_providers::{ProviderGateway, TranslationRequest, TranslationService};

use crate::helpers;

/// Per-invocation translation settings.
#[derive(Clone, Debug)]
pub struct TranslateOptions {
    pub target_language: String,
    pub source_language: Option<String>,
    pub profile: &'static TranslationProfile,
    pub record_history: bool,
}

impl TranslateOptions {
    /// Resolve CLI overrides against the config.
    pub fn resolve(
        config: &Config,
        to: Option<String>,
        from: Option<String>,
        profile: Option<String>,
        no_history: bool,
    ) -> Result<Self> {
        let profile_id = profile.unwrap_or_else(|| config.translation.active_profile_id.clone());
        let profile = resolve_profile(&profile_id)?;

        Ok(Self {
            target_language: to.unwrap_or_else(|| config.translation.target_language.clone()),
            source_language: from.filter(|f| !f.trim().is_empty()),
            profile,
            record_history: config.history.enabled && !no_history,
        })
    }
}

/// Look up a built-in translation profile or fail with the valid ids.
pub fn resolve_profile(id: &str) -> Result<&'static TranslationProfile> {
    match profiles::find(id) {
        Some(p) => Ok(p),
        None => bail!(
            "Unknown translation profile '{}' (available: {})",
            id,
            profiles::ids().join(", ")
        ),
    }
}

/// Everything needed to translate and remember the result.
pub struct Translator {
    service: TranslationService,
    history: Option<HistoryStore>,
    pub options: TranslateOptions,
}

impl Translator {
    /// Build from the loaded config. Fails if no provider is configured.
    pub fn from_config(config: &Config, options: TranslateOptions) -> Result<Self> {
        let profile = config
            .active_provider()
            .cloned()
            .context("No provider configured. Run `qtranslate onboard` first.")?;
        debug!(provider = %profile.name, model = %profile.model, "Using provider");

        let gateway = ProviderGateway::new(Some(profile));
        let service = TranslationService::new(Arc::new(gateway));

        let history = if options.record_history {
            match HistoryStore::open(None, config.history.max_items) {
                Ok(store) => Some(store),
                Err(e) => {
                    warn!(error = %e, "History unavailable, continuing without it");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            service,
            history,
            options,
        })
    }

    /// Name of the provider new translations go to.
    pub fn provider_name(&self) -> String {
        self.service
            .backend()
            .current_profile()
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    /// Translate `text`; Ctrl-C cancels. Successful results go to history.
    pub async fn translate(&self, text: &str) -> Result<TranslationOutcome> {
        let request = self.request_for(text);
        let outcome = helpers::translate_cancellable(&self.service, &request).await?;

        if outcome.success {
            self.remember(text, &outcome);
        }
        Ok(outcome)
    }

    fn request_for(&self, text: &str) -> TranslationRequest {
        let mut request = TranslationRequest::new(text, self.options.target_language.clone())
            .with_profile(Some(self.options.profile));
        if let Some(from) = &self.options.source_language {
            request = request.from_language(from.clone());
        }
        request
    }

    fn remember(&self, text: &str, outcome: &TranslationOutcome) {
        let Some(history) = &self.history else {
            return;
        };

        let mut entry = HistoryEntry::new(text.trim(), outcome.text(), &self.options.target_language)
            .with_provider(self.provider_name())
            .with_profile(self.options.profile.id);
        if let Some(from) = &self.options.source_language {
            entry = entry.with_source_language(from.clone());
        }
        history.add(entry);
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
