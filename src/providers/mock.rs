/*!
 * Scripted provider for tests and benchmarks.
 *
 * Every instance records the texts it receives. Available behaviors:
 * - `MockProvider::working()` - Always succeeds with tagged text
 * - `MockProvider::uppercase()` - Succeeds with the text upper-cased
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::failing()` - Every request fails with a 500
 * - `MockProvider::empty()` - Answers with an empty string
 * - `MockProvider::slow(ms)` - Waits, then upper-cases
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// How the mock answers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, prefixing the text with the target language
    Working,
    /// Always succeeds, returning the text upper-cased
    Uppercase,
    /// Every `fail_every`-th request fails, the others upper-case
    Intermittent { fail_every: usize },
    /// Every request fails
    Failing,
    /// Succeeds with an empty string
    Empty,
    /// Simulates slow response, then upper-cases
    Slow { delay_ms: u64 },
}

/// Provider double that needs no network
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every text received, shared between clones
    received: Arc<Mutex<Vec<String>>>,
    /// Replaces the default answer of `Working`
    custom_response: Option<fn(&str, &str) -> String>,
}

impl MockProvider {
    /// Mock with the given behavior and an empty history
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Mock answering `[target] text`
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock provider that upper-cases its input
    pub fn uppercase() -> Self {
        Self::new(MockBehavior::Uppercase)
    }

    /// Mock failing every `fail_every`-th request
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Mock that never succeeds
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Mock answering with nothing
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that waits before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator, called with `(text, target_language)`
    pub fn with_custom_response(mut self, generator: fn(&str, &str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of translate calls made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Texts received so far, in call order
    pub fn received_texts(&self) -> Vec<String> {
        self.received.lock().clone()
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            received: Arc::clone(&self.received),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.received.lock().push(text.to_string());

        match self.behavior {
            MockBehavior::Working => Ok(match self.custom_response {
                Some(generator) => generator(text, target_language),
                None => format!("[{}] {}", target_language, text),
            }),

            MockBehavior::Uppercase => Ok(text.to_uppercase()),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("mock failure on request {}", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(text.to_uppercase())
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "mock backend unavailable".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(text.to_uppercase())
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
