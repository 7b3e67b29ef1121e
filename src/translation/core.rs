/*!
 * Core translation service implementation.
 *
 * This module contains the chunked translator: long text is cut into pieces no
 * longer than the backend accepts, each piece is translated in order, and the
 * results are joined back together. A piece that cannot be translated is kept
 * in its original language, so translating text never fails.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

use super::cache::TranslationCache;
use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::providers::google::Google;
use crate::providers::ollama::Ollama;
use crate::providers::Provider;

/// Split text into contiguous pieces of at most `max_chars` characters.
///
/// Boundaries depend on length only and always fall on character boundaries.
/// Joining the pieces in order gives back `text` exactly; empty text has no pieces.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (index, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..index]);
            start = index;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

/// Counters of chunk outcomes, shared by every document of a batch
#[derive(Debug, Default)]
pub struct ChunkCounters {
    translated: AtomicUsize,
    cached: AtomicUsize,
    fallback: AtomicUsize,
}

/// Point-in-time copy of the chunk counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkStats {
    /// Chunks translated by the provider
    pub translated: usize,
    /// Chunks answered from the cache
    pub cached: usize,
    /// Chunks left in the source language after a provider failure
    pub fallback: usize,
}

impl ChunkCounters {
    fn snapshot(&self) -> ChunkStats {
        ChunkStats {
            translated: self.translated.load(Ordering::Relaxed),
            cached: self.cached.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
        }
    }
}

/// Main translation service: chunking, caching and fallback around one provider
#[derive(Debug)]
pub struct TranslationService {
    /// Backend that translates single chunks
    provider: Arc<dyn Provider>,

    /// Largest chunk handed to the provider, in characters
    max_chunk_size: usize,

    /// Translation cache for storing and retrieving translations
    pub cache: TranslationCache,

    counters: ChunkCounters,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let settings = config.resolved_provider();
        Url::parse(&settings.endpoint)
            .with_context(|| format!("Invalid provider endpoint: {}", settings.endpoint))?;

        let common = &config.common;
        let provider: Arc<dyn Provider> = match config.provider {
            TranslationProvider::Google => Arc::new(Google::new_with_config(
                settings.endpoint,
                settings.timeout_secs,
                common.retry_count,
                common.retry_backoff_ms,
                settings.rate_limit,
            )),
            TranslationProvider::Ollama => {
                if settings.model.is_empty() {
                    return Err(anyhow!("A model name is required for the Ollama provider"));
                }
                Arc::new(Ollama::new_with_config(
                    settings.endpoint,
                    settings.model,
                    settings.timeout_secs,
                    common.temperature,
                    common.retry_count,
                    common.retry_backoff_ms,
                    settings.rate_limit,
                ))
            }
        };

        Ok(Self::with_provider(
            provider,
            settings.max_chars_per_request,
            common.enable_cache,
        ))
    }

    /// Create a service around an existing provider
    pub fn with_provider(provider: Arc<dyn Provider>, max_chunk_size: usize, enable_cache: bool) -> Self {
        Self {
            provider,
            max_chunk_size: max_chunk_size.max(1),
            cache: TranslationCache::new(enable_cache),
            counters: ChunkCounters::default(),
        }
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Largest chunk handed to the provider, in characters
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Chunk outcome counters so far
    pub fn stats(&self) -> ChunkStats {
        self.counters.snapshot()
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<()> {
        self.provider
            .test_connection()
            .await
            .map_err(|e| anyhow!("Failed to connect to {}: {}", self.provider.name(), e))
    }

    /// Translate one chunk through the cache and the provider.
    ///
    /// A blank answer for a chunk with content counts as a failure.
    pub async fn try_translate_chunk(
        &self,
        chunk: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        if let Some(cached) = self.cache.get(chunk, source_language, target_language) {
            self.counters.cached.fetch_add(1, Ordering::Relaxed);
            return Ok(cached);
        }

        let translated = self
            .provider
            .translate(chunk, source_language, target_language)
            .await?;

        if translated.trim().is_empty() && !chunk.trim().is_empty() {
            return Err(ProviderError::EmptyResponse(chunk.chars().count()));
        }

        self.cache.store(chunk, source_language, target_language, &translated);
        self.counters.translated.fetch_add(1, Ordering::Relaxed);
        Ok(translated)
    }

    /// Translate text of any length. Never fails.
    ///
    /// Chunks are translated one after the other; a chunk whose translation
    /// fails is kept as-is in the output.
    pub async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let chunks = split_into_chunks(text, self.max_chunk_size);
        debug!(
            "Translating {} characters in {} chunk(s) ({} -> {})",
            text.len(),
            chunks.len(),
            source_language,
            target_language
        );

        let mut translated = String::with_capacity(text.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let result = self
                .try_translate_chunk(chunk, source_language, target_language)
                .await
                .unwrap_or_else(|e| {
                    warn!(
                        "Translation of chunk {}/{} failed, keeping source text: {}",
                        index + 1,
                        chunks.len(),
                        e
                    );
                    self.counters.fallback.fetch_add(1, Ordering::Relaxed);
                    chunk.to_string()
                });
            translated.push_str(&result);
        }

        translated
    }
}
