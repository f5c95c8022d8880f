//! Email delivery with bounded exponential-backoff retries.
//!
//! Delivery failures are the caller's problem to tolerate, not to propagate:
//! the ticket purchase path logs and moves on.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::services::metrics::EMAILS_SENT_TOTAL;
use crate::services::providers::{EmailMessage, EmailProvider, ProviderError, ProviderResponse};

/// Configuration for retry behavior.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Initial backoff duration before first retry.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to backoff duration.
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Calculate backoff duration for a given attempt.
    fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff =
            self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let mut backoff = Duration::from_millis(backoff as u64).min(self.max_backoff);

        if self.add_jitter {
            let jitter_ms = rand::thread_rng().gen_range(0..=backoff.as_millis() as u64 / 4 + 1);
            backoff += Duration::from_millis(jitter_ms);
        }

        backoff
    }
}

/// Provider wrapper that retries transient send failures.
#[derive(Clone)]
pub struct EmailDelivery {
    provider: Arc<dyn EmailProvider>,
    retry: RetryConfig,
}

impl EmailDelivery {
    pub fn new(provider: Arc<dyn EmailProvider>, retry: RetryConfig) -> Self {
        Self { provider, retry }
    }

    pub fn provider(&self) -> &Arc<dyn EmailProvider> {
        &self.provider
    }

    /// Send a message, retrying up to the configured attempt count.
    /// A disabled provider is not retried.
    pub async fn send(&self, message: &EmailMessage) -> Result<ProviderResponse, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.provider.send(message).await {
                Ok(response) => {
                    EMAILS_SENT_TOTAL.with_label_values(&["ok"]).inc();
                    return Ok(response);
                }
                Err(ProviderError::NotEnabled(msg)) => {
                    EMAILS_SENT_TOTAL.with_label_values(&["failed"]).inc();
                    return Err(ProviderError::NotEnabled(msg));
                }
                Err(err) if attempt < self.retry.max_retries => {
                    let backoff = self.retry.backoff_duration(attempt);
                    tracing::warn!(
                        to = %message.to,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        "Email send failed, retrying: {}",
                        err
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    EMAILS_SENT_TOTAL.with_label_values(&["failed"]).inc();
                    tracing::error!(
                        to = %message.to,
                        attempts = attempt + 1,
                        "Email send failed permanently: {}",
                        err
                    );
                    return Err(err);
                }
            }
        }
    }
}
