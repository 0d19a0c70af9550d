//! Translation service — turns a user request into prompts for the backend.

use std::sync::Arc;

use qtranslate_core::profiles::TranslationProfile;
use qtranslate_core::types::TranslationOutcome;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::gateway::GatewayError;
use crate::traits::TranslationBackend;

/// What the user wants translated.
#[derive(Clone, Debug)]
pub struct TranslationRequest {
    pub source_text: String,
    /// `None` asks the model to detect the language.
    pub source_language: Option<String>,
    pub target_language: String,
    pub profile: Option<&'static TranslationProfile>,
}

impl TranslationRequest {
    pub fn new(source_text: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            source_language: None,
            target_language: target_language.into(),
            profile: None,
        }
    }

    pub fn from_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        self.source_language = (!language.trim().is_empty()).then_some(language);
        self
    }

    pub fn with_profile(mut self, profile: Option<&'static TranslationProfile>) -> Self {
        self.profile = profile;
        self
    }
}

/// Builds prompts and hands them to a [`TranslationBackend`].
#[derive(Clone)]
pub struct TranslationService {
    backend: Arc<dyn TranslationBackend>,
}

impl TranslationService {
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn TranslationBackend> {
        &self.backend
    }

    pub async fn translate(
        &self,
        request: &TranslationRequest,
        cancel: &CancellationToken,
    ) -> Result<TranslationOutcome, GatewayError> {
        if request.source_text.trim().is_empty() {
            return Ok(TranslationOutcome::failure("Source text is empty"));
        }

        info!(
            target_language = %request.target_language,
            profile = request.profile.map_or("general", |p| p.id),
            "Starting translation"
        );

        let system_prompt = build_system_prompt(request);
        self.backend
            .translate(&system_prompt, &request.source_text, cancel)
            .await
    }
}

/// System prompt for a request, including the profile hint when there is one.
pub fn build_system_prompt(request: &TranslationRequest) -> String {
    let target = &request.target_language;

    let head = match request.source_language.as_deref() {
        Some(source) => format!(
            "You are a professional translator. Translate the following text from {source} to {target}."
        ),
        None => format!(
            "You are a professional translator. Detect the language of the following text and translate it to {target}.\n\
             If the text is already in {target}, translate it to English instead."
        ),
    };

    let mut prompt = format!(
        "{head}\n\
         Provide ONLY the translation without any explanations, notes, or additional text.\n\
         Preserve the original formatting, including line breaks and paragraphs.\n\
         If the text contains technical terms, translate them appropriately for the context."
    );

    if let Some(profile) = request.profile.filter(|p| !p.hint.is_empty()) {
        prompt.push_str("\n\nAdditional context: ");
        prompt.push_str(profile.hint);
    }

    prompt
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use qtranslate_core::config::ProviderProfile;
    use qtranslate_core::profiles;
    use std::sync::Mutex;

    /// Records prompts and echoes a fixed translation.
    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl TranslationBackend for FakeBackend {
        async fn translate(
            &self,
            system_prompt: &str,
            user_prompt: &str,
            _cancel: &CancellationToken,
        ) -> Result<TranslationOutcome, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_prompt.to_string()));
            Ok(TranslationOutcome::success("Bonjour", None))
        }

        fn update_profile(&self, _profile: ProviderProfile) {}

        fn current_profile(&self) -> Option<Arc<ProviderProfile>> {
            None
        }
    }

    #[tokio::test]
    async fn test_empty_source_skips_backend() {
        let backend = Arc::new(FakeBackend::default());
        let service = TranslationService::new(backend.clone());

        let outcome = service
            .translate(&TranslationRequest::new("  \n", "French"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.error_message.as_deref(), Some("Source text is empty"));
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_translate_passes_prompts() {
        let backend = Arc::new(FakeBackend::default());
        let service = TranslationService::new(backend.clone());

        let outcome = service
            .translate(&TranslationRequest::new("Hello", "French"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.text(), "Bonjour");
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "Hello");
        assert!(calls[0].0.contains("translate it to French"));
    }

    #[test]
    fn test_prompt_with_source_language() {
        let req = TranslationRequest::new("Hallo", "English").from_language("German");
        let prompt = build_system_prompt(&req);
        assert!(prompt.starts_with(
            "You are a professional translator. Translate the following text from German to English."
        ));
        assert!(prompt.contains("Provide ONLY the translation"));
        assert!(!prompt.contains("Additional context"));
    }

    #[test]
    fn test_prompt_auto_detect() {
        let req = TranslationRequest::new("Hallo", "Russian").from_language(" ");
        assert!(req.source_language.is_none());
        let prompt = build_system_prompt(&req);
        assert!(prompt.contains("Detect the language"));
        assert!(prompt.contains("If the text is already in Russian, translate it to English instead."));
    }

    #[test]
    fn test_prompt_profile_hint() {
        let technical = profiles::find("technical");
        let req = TranslationRequest::new("fn main()", "Russian").with_profile(technical);
        let prompt = build_system_prompt(&req);
        assert!(prompt.contains("\n\nAdditional context: This is technical documentation."));

        let general = profiles::find("general");
        let req = TranslationRequest::new("hi", "Russian").with_profile(general);
        assert!(!build_system_prompt(&req).contains("Additional context"));
    }
}
