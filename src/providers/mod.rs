/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported backends:
 * - Google: the public Google Translate web endpoint
 * - Ollama: Local LLM server
 * - Mock: scripted behaviors for tests and benchmarks
 */

use async_trait::async_trait;
use rand::Rng;
use std::fmt::Debug;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate one piece of text
    ///
    /// # Arguments
    /// * `text` - The text to translate, never longer than the configured chunk size
    /// * `source_language` - Service language code of the text
    /// * `target_language` - Service language code to translate into
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short name used in log lines
    fn name(&self) -> &str;
}

/// Spaces requests to one backend so that at most `rate_limit` start per minute
#[derive(Debug)]
pub struct RequestThrottle {
    interval: Option<Duration>,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    /// Create a throttle from a requests-per-minute limit; `None` or 0 disables it
    pub fn new(rate_limit: Option<u32>) -> Self {
        let interval = rate_limit
            .filter(|rpm| *rpm > 0)
            .map(|rpm| Duration::from_millis(60_000 / rpm as u64));

        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait until the next request slot is free and claim it
    pub async fn acquire(&self) {
        let Some(interval) = self.interval else {
            return;
        };

        let wait_until = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            *next_slot = Some(slot + interval);
            slot
        };

        tokio::time::sleep_until(wait_until).await;
    }
}

/// Exponential backoff before retry `attempt` (1-based), with up to 25% jitter
pub fn backoff_delay(backoff_base_ms: u64, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let base = backoff_base_ms.saturating_mul(1u64 << exponent);
    let jitter = if base >= 4 {
        rand::rng().random_range(0..=base / 4)
    } else {
        0
    };
    Duration::from_millis(base + jitter)
}

pub mod google;
pub mod mock;
pub mod ollama;
