/*!
 * Provider-specific concurrency tuning.
 *
 * Every document task sends its chunks one after the other, so the number of
 * concurrent documents is also the number of requests in flight. These
 * profiles say how many of those each backend tolerates.
 */

use crate::app_config::TranslationProvider;

/// Provider-specific concurrency profile with tuned defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Documents that can be processed at once without being throttled
    pub max_concurrent_documents: usize,
    /// Target requests per minute (for rate limiting)
    pub target_rpm: Option<u32>,
}

impl ProviderProfile {
    /// Get the profile for a given provider
    pub fn for_provider(provider: TranslationProvider) -> Self {
        match provider {
            TranslationProvider::Google => Self {
                // The public endpoint starts answering 429 on bursts
                max_concurrent_documents: 4,
                target_rpm: Some(120),
            },
            TranslationProvider::Ollama => Self {
                // Local model, bounded by the server's parallel slots
                max_concurrent_documents: 8,
                target_rpm: None,
            },
        }
    }

    /// Whether a pool of `concurrency` documents stays within the profile
    pub fn allows(&self, concurrency: usize) -> bool {
        concurrency <= self.max_concurrent_documents
    }
}
