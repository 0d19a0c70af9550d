//! Health prober — single-attempt "test connection" checks.
//!
//! Provider probes reuse the normalizer's endpoint and auth rules but send a
//! tiny fixed request, never retry, and cap the timeout. The speech service
//! gets an independent plain GET against its health path.

use std::time::Duration;

use qtranslate_core::config::ProviderProfile;
use qtranslate_core::types::{ChatMessage, ChatRequest};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::normalizer::{auth_header, build_endpoint, probe_body_error};

/// Upper bound on a provider probe, whatever the profile's own timeout.
pub const PROBE_TIMEOUT_CAP: Duration = Duration::from_secs(30);

/// Fixed timeout for the speech service probe.
pub const SPEECH_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Health path appended to the speech service base URL.
pub const SPEECH_HEALTH_PATH: &str = "/ru/api/health";

/// Speech service used when no endpoint is configured.
pub const DEFAULT_SPEECH_ENDPOINT: &str = "https://tts.rox-net.ru";

const PROBE_SYSTEM_PROMPT: &str = "You are a health check assistant.";
const PROBE_USER_PROMPT: &str = "Respond with exactly 'OK' and nothing else.";
const PROBE_MAX_TOKENS: u32 = 10;

/// Result of a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy(_))
    }

    /// The human-readable description, healthy or not.
    pub fn message(&self) -> &str {
        match self {
            HealthStatus::Healthy(m) | HealthStatus::Unhealthy(m) => m,
        }
    }
}

/// One labelled line of a bulk probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub label: String,
    pub status: HealthStatus,
}

// ─────────────────────────────────────────────
// HealthProber
// ─────────────────────────────────────────────

/// Runs provider and speech-service probes. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct HealthProber {
    client: reqwest::Client,
}

impl HealthProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Check that `profile` is reachable, authorized and knows its model.
    pub async fn probe_provider(
        &self,
        profile: &ProviderProfile,
        cancel: &CancellationToken,
    ) -> HealthStatus {
        if !profile.is_configured() {
            return HealthStatus::Unhealthy("API key is not configured".into());
        }

        let endpoint = build_endpoint(&profile.base_url);
        let timeout = profile.timeout().min(PROBE_TIMEOUT_CAP);
        let request = ChatRequest {
            model: profile.model.clone(),
            messages: vec![
                ChatMessage::system(PROBE_SYSTEM_PROMPT),
                ChatMessage::user(PROBE_USER_PROMPT),
            ],
            temperature: 0.0,
            max_tokens: PROBE_MAX_TOKENS,
        };

        debug!(provider = %profile.name, endpoint = %endpoint, "Probing provider");

        let mut builder = self.client.post(&endpoint).timeout(timeout).json(&request);
        if let Some(value) = auth_header(profile) {
            builder = builder.header(reqwest::header::AUTHORIZATION, value);
        }

        let call = async {
            let response = builder.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return HealthStatus::Unhealthy("Request was cancelled".into());
            }
            result = call => match result {
                Ok(pair) => pair,
                Err(e) => {
                    let reason = transport_reason(&e, "Request timed out");
                    warn!(provider = %profile.name, reason = %reason, "Provider probe failed");
                    return HealthStatus::Unhealthy(reason);
                }
            },
        };

        if !status.is_success() {
            let reason = format!("API returned status {}", status);
            warn!(provider = %profile.name, reason = %reason, "Provider probe failed");
            return HealthStatus::Unhealthy(reason);
        }

        match probe_body_error(&body) {
            Some(reason) => {
                warn!(provider = %profile.name, reason = %reason, "Provider probe failed");
                HealthStatus::Unhealthy(reason)
            }
            None => {
                debug!(provider = %profile.name, "Provider probe passed");
                HealthStatus::Healthy(format!(
                    "Provider '{}' is responding normally",
                    profile.name
                ))
            }
        }
    }

    /// Plain reachability check of the speech service.
    pub async fn probe_side_service(
        &self,
        endpoint: Option<&str>,
        cancel: &CancellationToken,
    ) -> HealthStatus {
        let base = endpoint
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_SPEECH_ENDPOINT)
            .trim_end_matches('/');
        let url = format!("{}{}", base, SPEECH_HEALTH_PATH);

        let call = self.client.get(&url).timeout(SPEECH_PROBE_TIMEOUT).send();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return HealthStatus::Unhealthy("Request was cancelled".into());
            }
            result = call => result,
        };

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(url = %url, "Speech service probe passed");
                HealthStatus::Healthy("TTS service is available".into())
            }
            Ok(response) => {
                let reason = format!("TTS service returned status {}", response.status());
                warn!(url = %url, reason = %reason, "Speech service probe failed");
                HealthStatus::Unhealthy(reason)
            }
            Err(e) => {
                let reason = transport_reason(&e, "TTS service request timed out");
                warn!(url = %url, reason = %reason, "Speech service probe failed");
                HealthStatus::Unhealthy(reason)
            }
        }
    }

    /// Probe every profile and the speech service concurrently.
    ///
    /// Reports come back in input order, speech service last.
    pub async fn probe_all(
        &self,
        profiles: &[ProviderProfile],
        speech_endpoint: Option<&str>,
        cancel: &CancellationToken,
    ) -> Vec<ProbeReport> {
        let mut set = JoinSet::new();

        for (index, profile) in profiles.iter().cloned().enumerate() {
            let prober = self.clone();
            let cancel = cancel.clone();
            set.spawn(async move {
                let status = prober.probe_provider(&profile, &cancel).await;
                (index, format!("Provider: {}", profile.name), status)
            });
        }

        {
            let prober = self.clone();
            let cancel = cancel.clone();
            let endpoint = speech_endpoint.map(String::from);
            let index = profiles.len();
            set.spawn(async move {
                let status = prober
                    .probe_side_service(endpoint.as_deref(), &cancel)
                    .await;
                (index, "Speech service".to_string(), status)
            });
        }

        let mut results = Vec::with_capacity(profiles.len() + 1);
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(entry) => results.push(entry),
                Err(e) => warn!(error = %e, "Probe task failed"),
            }
        }

        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, label, status)| ProbeReport { label, status })
            .collect()
    }
}

/// Reason string for a reqwest failure on the probe path.
fn transport_reason(err: &reqwest::Error, timeout_reason: &str) -> String {
    if err.is_timeout() {
        timeout_reason.to_string()
    } else if err.is_builder() {
        format!("Unexpected error: {}", err)
    } else {
        format!("Network error: {}", err)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
