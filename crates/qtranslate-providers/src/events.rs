//! Gateway events — structured notifications about call progress.
//!
//! The gateway never writes logs on its own behalf; it emits events into an
//! injected [`EventSink`]. The default sink forwards to `tracing`; tests use
//! [`MemorySink`].

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use qtranslate_core::config::ProviderFamily;
use tracing::{debug, info, warn};

/// Final state of a gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Success,
    Failed,
    Cancelled,
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CallStatus::Success => "success",
            CallStatus::Failed => "failed",
            CallStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Something observable happened inside the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    RequestStarted {
        provider: String,
        endpoint: String,
        model: String,
    },
    AttemptStarted {
        attempt: u32,
        max_attempts: u32,
    },
    RetryScheduled {
        /// The attempt that just failed (1-based).
        attempt: u32,
        delay: Duration,
        reason: String,
    },
    Completed {
        provider: String,
        attempts: u32,
        status: CallStatus,
        elapsed: Duration,
    },
    ProfileUpdated {
        provider: String,
        family: ProviderFamily,
    },
}

/// Receiver of gateway events. Must be cheap and non-blocking.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &GatewayEvent);
}

// ─────────────────────────────────────────────
// TracingSink
// ─────────────────────────────────────────────

/// Default sink: forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &GatewayEvent) {
        match event {
            GatewayEvent::RequestStarted {
                provider,
                endpoint,
                model,
            } => debug!(provider = %provider, endpoint = %endpoint, model = %model, "Translation request"),
            GatewayEvent::AttemptStarted {
                attempt,
                max_attempts,
            } => debug!(attempt, max_attempts, "Attempt started"),
            GatewayEvent::RetryScheduled {
                attempt,
                delay,
                reason,
            } => warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                reason = %reason,
                "Attempt failed, retrying"
            ),
            GatewayEvent::Completed {
                provider,
                attempts,
                status,
                elapsed,
            } => info!(
                provider = %provider,
                attempts,
                status = %status,
                elapsed_ms = elapsed.as_millis() as u64,
                "Translation finished"
            ),
            GatewayEvent::ProfileUpdated { provider, family } => {
                info!(provider = %provider, family = ?family, "Provider profile updated")
            }
        }
    }
}

// ─────────────────────────────────────────────
// MemorySink
// ─────────────────────────────────────────────

/// Records events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<GatewayEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<GatewayEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `RetryScheduled` events seen.
    pub fn retry_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, GatewayEvent::RetryScheduled { .. }))
            .count()
    }

    /// Number of `AttemptStarted` events seen.
    pub fn attempt_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, GatewayEvent::AttemptStarted { .. }))
            .count()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &GatewayEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
