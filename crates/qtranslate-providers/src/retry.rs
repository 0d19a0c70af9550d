//! Retry driver with exponential backoff and cancellation.
//!
//! Runs an attempt closure up to `max_retries + 1` times. Each attempt and
//! each backoff sleep is raced against a [`CancellationToken`]; cancellation
//! wins immediately and is never retried.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::classifier::{classify, AttemptError, FailureClass};
use crate::events::{EventSink, GatewayEvent};

/// Retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubles each time.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`.
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exp)
    }

    /// Drive `attempt` until it succeeds, fails permanently, runs out of
    /// attempts, or `cancel` fires.
    ///
    /// The closure receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        events: &dyn EventSink,
        mut attempt: F,
    ) -> Result<Attempted<T>, RetryError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let max_attempts = self.max_attempts();
        let mut number = 0u32;

        loop {
            number += 1;

            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled {
                    attempts: number - 1,
                });
            }

            events.emit(&GatewayEvent::AttemptStarted {
                attempt: number,
                max_attempts,
            });

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(AttemptError::Cancelled),
                r = attempt(number) => r,
            };

            let err = match result {
                Ok(value) => {
                    return Ok(Attempted {
                        value,
                        attempts: number,
                    })
                }
                Err(e) => e,
            };

            match classify(&err) {
                FailureClass::Cancelled => {
                    return Err(RetryError::Cancelled { attempts: number });
                }
                FailureClass::Permanent => {
                    return Err(RetryError::Permanent {
                        attempts: number,
                        source: err,
                    });
                }
                FailureClass::Retryable if number >= max_attempts => {
                    return Err(RetryError::Exhausted {
                        attempts: number,
                        retries: self.max_retries,
                        last: err,
                    });
                }
                FailureClass::Retryable => {}
            }

            let delay = self.backoff_delay(number);
            events.emit(&GatewayEvent::RetryScheduled {
                attempt: number,
                delay,
                reason: err.to_string(),
            });

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(RetryError::Cancelled { attempts: number });
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

/// A successful value plus how many attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// Terminal failure of a retried call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RetryError {
    #[error("Request was cancelled")]
    Cancelled { attempts: u32 },

    #[error("{source}")]
    Permanent { attempts: u32, source: AttemptError },

    #[error("Request failed after {attempts} attempts ({retries} retries exhausted): {last}")]
    Exhausted {
        attempts: u32,
        retries: u32,
        last: AttemptError,
    },
}

impl RetryError {
    /// Attempts actually sent before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Cancelled { attempts }
            | RetryError::Permanent { attempts, .. }
            | RetryError::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
