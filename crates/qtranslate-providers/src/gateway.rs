//! Provider gateway — resilient translation calls against a swappable profile.
//!
//! Every call takes an immutable snapshot of the active profile, so a
//! concurrent [`update_profile`](TranslationBackend::update_profile) only
//! affects calls that start after it. Transient failures are retried by
//! [`RetryPolicy`]; everything that goes wrong at runtime is reported as a
//! failed [`TranslationOutcome`] rather than an error.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use async_trait::async_trait;
use qtranslate_core::config::ProviderProfile;
use qtranslate_core::types::{ChatRequest, TranslationOutcome};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::classifier::AttemptError;
use crate::events::{CallStatus, EventSink, GatewayEvent, TracingSink};
use crate::normalizer::{
    auth_header, build_endpoint, build_request, error_message_from_body, extract_translation,
    parse_response,
};
use crate::retry::RetryPolicy;
use crate::traits::TranslationBackend;

/// Programming errors surfaced by the gateway.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("No provider profile is configured")]
    NoActiveProfile,
}

// ─────────────────────────────────────────────
// ProviderGateway
// ─────────────────────────────────────────────

/// Talks to the active provider's chat-completion endpoint.
pub struct ProviderGateway {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    active: RwLock<Option<Arc<ProviderProfile>>>,
    retry: RetryPolicy,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for ProviderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let active = self.current_profile();
        f.debug_struct("ProviderGateway")
            .field("provider", &active.as_ref().map(|p| p.name.clone()))
            .field("retry", &self.retry)
            .finish()
    }
}

impl ProviderGateway {
    pub fn new(profile: Option<ProviderProfile>) -> Self {
        Self {
            client: reqwest::Client::new(),
            active: RwLock::new(profile.map(Arc::new)),
            retry: RetryPolicy::default(),
            events: Arc::new(TracingSink),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// One POST against `endpoint`. Returns the cleaned translation text.
    async fn send_once(
        &self,
        endpoint: &str,
        request: &ChatRequest,
        auth: Option<&str>,
        profile: &ProviderProfile,
    ) -> Result<String, AttemptError> {
        let mut builder = self
            .client
            .post(endpoint)
            .timeout(profile.timeout())
            .json(request);
        if let Some(value) = auth {
            builder = builder.header(reqwest::header::AUTHORIZATION, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AttemptError::from_reqwest(&e, profile.timeout_seconds))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::from_reqwest(&e, profile.timeout_seconds))?;

        if !status.is_success() {
            debug!(status = %status, body = %body, "Provider returned an error status");
            return Err(AttemptError::Status {
                status: status.as_u16(),
                message: error_message_from_body(&body),
            });
        }

        let parsed = parse_response(&body).map_err(|e| {
            AttemptError::Protocol(format!("Invalid response format from API: {}", e))
        })?;

        extract_translation(&parsed).map_err(AttemptError::Protocol)
    }

    fn finish(&self, profile: &ProviderProfile, attempts: u32, status: CallStatus, started: Instant) {
        self.events.emit(&GatewayEvent::Completed {
            provider: profile.name.clone(),
            attempts,
            status,
            elapsed: started.elapsed(),
        });
    }
}

#[async_trait]
impl TranslationBackend for ProviderGateway {
    async fn translate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<TranslationOutcome, GatewayError> {
        let profile = self.current_profile().ok_or(GatewayError::NoActiveProfile)?;
        let started = Instant::now();

        if !profile.is_configured() {
            self.finish(&profile, 0, CallStatus::Failed, started);
            return Ok(TranslationOutcome::failure(format!(
                "API key not configured for provider '{}'",
                profile.name
            )));
        }

        let endpoint = build_endpoint(&profile.base_url);
        let request = build_request(&profile, system_prompt, user_prompt);
        let auth = auth_header(&profile);

        self.events.emit(&GatewayEvent::RequestStarted {
            provider: profile.name.clone(),
            endpoint: endpoint.clone(),
            model: profile.model.clone(),
        });

        let result = self
            .retry
            .run(cancel, self.events.as_ref(), |_| {
                self.send_once(&endpoint, &request, auth.as_deref(), &profile)
            })
            .await;

        let outcome = match result {
            Ok(done) => {
                self.finish(&profile, done.attempts, CallStatus::Success, started);
                TranslationOutcome::success(done.value, None)
            }
            Err(err) => {
                let status = if err.is_cancelled() {
                    CallStatus::Cancelled
                } else {
                    CallStatus::Failed
                };
                self.finish(&profile, err.attempts(), status, started);
                TranslationOutcome::failure(err.to_string())
            }
        };

        Ok(outcome)
    }

    fn update_profile(&self, profile: ProviderProfile) {
        let event = GatewayEvent::ProfileUpdated {
            provider: profile.name.clone(),
            family: profile.family,
        };
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(profile));
        self.events.emit(&event);
    }

    fn current_profile(&self) -> Option<Arc<ProviderProfile>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use qtranslate_core::config::ProviderFamily;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_profile(base_url: &str, key: &str) -> ProviderProfile {
        ProviderProfile {
            name: "Test".into(),
            base_url: base_url.to_string(),
            api_key: key.to_string(),
            model: "gpt-4o-mini".into(),
            timeout_seconds: 5,
            ..Default::default()
        }
    }

    fn fast_gateway(profile: ProviderProfile) -> ProviderGateway {
        ProviderGateway::new(Some(profile))
            .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)))
    }

    fn completion(text: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-test",
            "choices": [{
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }]
        })
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.map_or(0, |r| r.len())
    }

    // ── Happy path ──

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("\"Bonjour\"")))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = fast_gateway(make_profile(&server.uri(), "test-key-123"));
        let outcome = gateway
            .translate("Translate to French", "Hello", &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.translated_text.as_deref(), Some("Bonjour"));
        assert!(outcome.error_message.is_none());
    }

    #[tokio::test]
    async fn test_translate_sends_correct_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 4096,
                "messages": [
                    { "role": "system", "content": "Translate to French" },
                    { "role": "user", "content": "Hello" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Bonjour")))
            .mount(&server)
            .await;

        let gateway = fast_gateway(make_profile(&server.uri(), "k"));
        let outcome = gateway
            .translate("  Translate to French ", "Hello\n", &CancellationToken::new())
            .await
            .unwrap();

        // A body mismatch would 404 and fail permanently.
        assert!(outcome.success, "{:?}", outcome.error_message);
    }

    #[tokio::test]
    async fn test_base_url_with_full_path_is_not_doubled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .mount(&server)
            .await;

        let base = format!("{}/v1/chat/completions/", server.uri());
        let gateway = fast_gateway(make_profile(&base, "k"));
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_data_field_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "message": { "content": "Hola" } }]
            })))
            .mount(&server)
            .await;

        let gateway = fast_gateway(make_profile(&server.uri(), "k"));
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.text(), "Hola");
    }

    // ── Retry behaviour ──

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Bonjour")))
            .with_priority(2)
            .mount(&server)
            .await;

        let sink = Arc::new(MemorySink::new());
        let gateway = fast_gateway(make_profile(&server.uri(), "k")).with_event_sink(sink.clone());
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.text(), "Bonjour");
        assert_eq!(request_count(&server).await, 3);
        assert_eq!(sink.retry_count(), 2);
        assert!(sink.events().iter().any(|e| matches!(
            e,
            GatewayEvent::Completed {
                attempts: 3,
                status: CallStatus::Success,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_succeeds_on_last_allowed_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .up_to_n_times(3)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hallo")))
            .with_priority(2)
            .mount(&server)
            .await;

        let sink = Arc::new(MemorySink::new());
        let gateway = fast_gateway(make_profile(&server.uri(), "k")).with_event_sink(sink.clone());
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.success, "{:?}", outcome.error_message);
        assert_eq!(outcome.text(), "Hallo");
        assert_eq!(request_count(&server).await, 4);
        assert_eq!(sink.retry_count(), 3);
        assert!(sink.events().iter().any(|e| matches!(
            e,
            GatewayEvent::Completed {
                attempts: 4,
                status: CallStatus::Success,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_exhausts_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Rate limit exceeded" }
            })))
            .expect(4)
            .mount(&server)
            .await;

        let gateway = fast_gateway(make_profile(&server.uri(), "k"));
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("Request failed after 4 attempts (3 retries exhausted): API Error (429): Rate limit exceeded")
        );
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = fast_gateway(make_profile(&server.uri(), "bad"));
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome.error_message.as_deref(),
            Some("API Error (401): Incorrect API key provided")
        );
    }

    #[tokio::test]
    async fn test_error_envelope_with_200_fails_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": { "message": "model overloaded", "type": "server_error" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = fast_gateway(make_profile(&server.uri(), "k"));
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome.error_message.as_deref(),
            Some("API Error (server_error): model overloaded")
        );
    }

    #[tokio::test]
    async fn test_unparseable_body_fails_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = fast_gateway(make_profile(&server.uri(), "k"));
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome
            .error_message
            .unwrap()
            .starts_with("Invalid response format from API:"));
    }

    #[tokio::test]
    async fn test_empty_choices_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = fast_gateway(make_profile(&server.uri(), "k"));
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.error_message.as_deref(), Some("Empty response from API"));
    }

    #[tokio::test]
    async fn test_quotes_around_blank_text_fail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("\" \"")))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = fast_gateway(make_profile(&server.uri(), "k"));
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.translated_text.is_none());
        assert_eq!(outcome.error_message.as_deref(), Some("Empty response from API"));
    }

    #[tokio::test]
    async fn test_timeout_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("late"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut profile = make_profile(&server.uri(), "k");
        profile.timeout_seconds = 1;
        let gateway = ProviderGateway::new(Some(profile))
            .with_retry_policy(RetryPolicy::new(1, Duration::from_millis(10)));
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome.error_message.as_deref(),
            Some("Request failed after 2 attempts (1 retries exhausted): Request timed out after 1s")
        );
        assert_eq!(request_count(&server).await, 2);
    }

    #[tokio::test]
    async fn test_network_error_is_retried() {
        let sink = Arc::new(MemorySink::new());
        let gateway = fast_gateway(make_profile("http://127.0.0.1:1", "k")).with_event_sink(sink.clone());
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();

        let message = outcome.error_message.unwrap();
        assert!(message.starts_with("Request failed after 4 attempts"), "{message}");
        assert!(message.contains("Network error:"), "{message}");
        assert_eq!(sink.attempt_count(), 4);
    }

    // ── Credentials ──

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("x")))
            .expect(0)
            .mount(&server)
            .await;

        let gateway = fast_gateway(make_profile(&server.uri(), ""));
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome.error_message.as_deref(),
            Some("API key not configured for provider 'Test'")
        );
    }

    #[tokio::test]
    async fn test_local_provider_without_key_sends_no_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hallo")))
            .mount(&server)
            .await;

        let mut profile = make_profile(&server.uri(), "");
        profile.family = ProviderFamily::Ollama;
        let gateway = fast_gateway(profile);
        let outcome = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.text(), "Hallo");
        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    // ── Profile management ──

    #[tokio::test]
    async fn test_no_profile_is_an_error() {
        let gateway = ProviderGateway::new(None);
        assert!(gateway.current_profile().is_none());
        let err = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::NoActiveProfile);
    }

    #[tokio::test]
    async fn test_update_profile_emits_event() {
        let sink = Arc::new(MemorySink::new());
        let gateway = ProviderGateway::new(None).with_event_sink(sink.clone());

        let mut profile = make_profile("http://localhost:11434/v1", "");
        profile.name = "Local".into();
        profile.family = ProviderFamily::Ollama;
        gateway.update_profile(profile.clone());

        assert_eq!(gateway.current_profile().as_deref(), Some(&profile));
        assert_eq!(
            sink.events(),
            vec![GatewayEvent::ProfileUpdated {
                provider: "Local".into(),
                family: ProviderFamily::Ollama,
            }]
        );
    }

    #[tokio::test]
    async fn test_in_flight_call_keeps_its_snapshot() {
        let slow = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer key-a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("from A"))
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(1)
            .mount(&slow)
            .await;

        let fast = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer key-b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("from B")))
            .expect(1)
            .mount(&fast)
            .await;

        let gateway = Arc::new(fast_gateway(make_profile(&slow.uri(), "key-a")));

        let first = {
            let gateway = gateway.clone();
            tokio::spawn(async move {
                gateway
                    .translate("s", "u", &CancellationToken::new())
                    .await
                    .unwrap()
            })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        gateway.update_profile(make_profile(&fast.uri(), "key-b"));

        let second = gateway
            .translate("s", "u", &CancellationToken::new())
            .await
            .unwrap();
        let first = first.await.unwrap();

        assert_eq!(first.text(), "from A");
        assert_eq!(second.text(), "from B");
        assert_eq!(gateway.current_profile().unwrap().api_key, "key-b");
    }

    // ── Cancellation ──

    #[tokio::test]
    async fn test_cancel_in_flight_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("too late"))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let sink = Arc::new(MemorySink::new());
        let gateway = fast_gateway(make_profile(&server.uri(), "k")).with_event_sink(sink.clone());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let outcome = gateway.translate("s", "u", &cancel).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.error_message.as_deref(), Some("Request was cancelled"));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(request_count(&server).await, 1);
        assert_eq!(sink.retry_count(), 0);
        assert!(sink.events().iter().any(|e| matches!(
            e,
            GatewayEvent::Completed {
                status: CallStatus::Cancelled,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_cancel_during_backoff_stops_retrying() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let gateway = ProviderGateway::new(Some(make_profile(&server.uri(), "k")))
            .with_retry_policy(RetryPolicy::new(3, Duration::from_secs(10)));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            trigger.cancel();
        });

        let outcome = gateway.translate("s", "u", &cancel).await.unwrap();
        assert_eq!(outcome.error_message.as_deref(), Some("Request was cancelled"));
        assert_eq!(request_count(&server).await, 1);
    }
}
