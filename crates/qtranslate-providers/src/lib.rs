//! Provider layer for qtranslate.
//!
//! # Architecture
//!
//! - [`registry`] — static per-family policy (anonymous access, defaults)
//! - [`normalizer`] — request/endpoint/auth building and response interpretation
//! - [`classifier`] — retryable vs. permanent attempt failures
//! - [`retry::RetryPolicy`] — exponential backoff driver with cancellation
//! - [`events`] — gateway events and sinks
//! - [`gateway::ProviderGateway`] — resilient translation calls, hot-swappable profile
//! - [`health::HealthProber`] — single-attempt provider and speech-service probes
//! - [`speech::PiperSpeechClient`] — text-to-speech client
//! - [`translation::TranslationService`] — prompt building on top of a backend

pub mod classifier;
pub mod events;
pub mod gateway;
pub mod health;
pub mod normalizer;
pub mod registry;
pub mod retry;
pub mod speech;
pub mod traits;
pub mod translation;

// Re-export main types for convenience
pub use classifier::{AttemptError, FailureClass};
pub use events::{CallStatus, EventSink, GatewayEvent, MemorySink, TracingSink};
pub use gateway::{GatewayError, ProviderGateway};
pub use health::{HealthProber, HealthStatus, ProbeReport};
pub use registry::{FamilyPolicy, FAMILIES};
pub use retry::{RetryError, RetryPolicy};
pub use speech::{PiperSpeechClient, SpeechSynthesizer};
pub use traits::TranslationBackend;
pub use translation::{TranslationRequest, TranslationService};
