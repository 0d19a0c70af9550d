//! Settings validation — rules applied before a config is saved or a
//! provider is activated from the CLI.
//!
//! The gateway does not call these; it enforces only the credential
//! precondition at call time.

use thiserror::Error;

use super::schema::{Config, ProviderProfile};
use crate::profiles;

/// A single failed validation rule.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate one provider profile.
pub fn validate_profile(profile: &ProviderProfile) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if profile.name.trim().is_empty() {
        errors.push(ValidationError::new("name", "Provider name is required"));
    } else if profile.name.chars().count() > 100 {
        errors.push(ValidationError::new(
            "name",
            "Provider name must not exceed 100 characters",
        ));
    }

    if profile.base_url.trim().is_empty() {
        errors.push(ValidationError::new("baseUrl", "Base URL is required"));
    } else if !is_http_url(&profile.base_url) {
        errors.push(ValidationError::new("baseUrl", "Base URL must be a valid URL"));
    }

    if !profile.is_configured() {
        errors.push(ValidationError::new("apiKey", "API key is required"));
    }

    if profile.model.trim().is_empty() {
        errors.push(ValidationError::new("model", "Model name is required"));
    } else if profile.model.chars().count() > 100 {
        errors.push(ValidationError::new(
            "model",
            "Model name must not exceed 100 characters",
        ));
    }

    if !(0.0..=2.0).contains(&profile.temperature) {
        errors.push(ValidationError::new(
            "temperature",
            "Temperature must be between 0 and 2",
        ));
    }

    if profile.max_tokens == 0 || profile.max_tokens > 32_000 {
        errors.push(ValidationError::new(
            "maxTokens",
            "Max tokens must be between 1 and 32000",
        ));
    }

    if profile.timeout_seconds == 0 || profile.timeout_seconds > 300 {
        errors.push(ValidationError::new(
            "timeoutSeconds",
            "Timeout must be between 1 and 300 seconds",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the whole configuration, including every provider.
///
/// Provider errors are reported with a `providers[i].` field prefix.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.providers.is_empty() {
        errors.push(ValidationError::new(
            "providers",
            "At least one provider must be configured",
        ));
    }

    let mut any_valid = false;
    for (i, provider) in config.providers.iter().enumerate() {
        match validate_profile(provider) {
            Ok(()) => any_valid = true,
            Err(list) => errors.extend(list.into_iter().map(|e| {
                ValidationError::new(format!("providers[{i}].{}", e.field), e.message)
            })),
        }
    }
    if !config.providers.is_empty() && !any_valid {
        errors.push(ValidationError::new(
            "providers",
            "At least one provider must have valid configuration",
        ));
    }

    if let Some(id) = config.active_provider_id.as_deref() {
        if !config.providers.iter().any(|p| p.id == id) {
            errors.push(ValidationError::new(
                "activeProviderId",
                "Active provider must reference an existing provider",
            ));
        }
    }

    let target = config.translation.target_language.trim();
    if target.is_empty() {
        errors.push(ValidationError::new(
            "translation.targetLanguage",
            "Target language is required",
        ));
    } else if target.chars().count() > 50 {
        errors.push(ValidationError::new(
            "translation.targetLanguage",
            "Target language must not exceed 50 characters",
        ));
    }

    if profiles::find(&config.translation.active_profile_id).is_none() {
        errors.push(ValidationError::new(
            "translation.activeProfileId",
            format!("Profile must be one of: {}", profiles::ids().join(", ")),
        ));
    }

    if config.speech.endpoint.trim().is_empty() {
        errors.push(ValidationError::new(
            "speech.endpoint",
            "Speech endpoint is required",
        ));
    } else if !is_http_url(&config.speech.endpoint) {
        errors.push(ValidationError::new(
            "speech.endpoint",
            "Speech endpoint must be a valid URL",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}
