//! Translation backend trait — the seam between the translation service
//! and whatever actually talks to a provider.
//!
//! [`ProviderGateway`](crate::gateway::ProviderGateway) is the production
//! implementation; tests substitute fakes.

use std::sync::Arc;

use async_trait::async_trait;
use qtranslate_core::config::ProviderProfile;
use qtranslate_core::types::TranslationOutcome;
use tokio_util::sync::CancellationToken;

use crate::gateway::GatewayError;

/// A provider that can translate with a swappable active profile.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Send one translation request against the current profile snapshot.
    ///
    /// Runtime failures (network, HTTP, bad bodies, cancellation) come back
    /// as a failed [`TranslationOutcome`]. `Err` is reserved for calling the
    /// backend before any profile is installed.
    async fn translate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<TranslationOutcome, GatewayError>;

    /// Replace the active profile. In-flight calls keep their snapshot.
    fn update_profile(&self, profile: ProviderProfile);

    /// The profile new calls will use.
    fn current_profile(&self) -> Option<Arc<ProviderProfile>>;
}
