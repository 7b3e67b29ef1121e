/*!
 * Application configuration.
 *
 * Settings are read from a JSON file (`conf.json` by default). Every section
 * and most fields may be left out; missing values fall back to the built-in
 * defaults of the selected provider.
 */

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::language_utils;
use crate::translation::concurrency::ProviderProfile;

/// Top-level settings of a translation run
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Language of the site, ISO 639-1 or 639-2 with an optional region
    pub source_language: String,

    /// Language to translate into
    pub target_language: String,

    pub translation: TranslationConfig,

    pub batch: BatchConfig,

    pub log_level: LogLevel,
}

/// Supported translation backends
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Public Google Translate web endpoint, no key needed
    #[default]
    Google,
    // @provider: Local Ollama server
    Ollama,
}

impl TranslationProvider {
    /// Name shown to users
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google Translate",
            Self::Ollama => "Ollama",
        }
    }

    /// Identifier used in the config file
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Ollama => "ollama",
        }
    }
}

impl fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        [Self::Google, Self::Ollama]
            .into_iter()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("Unknown translation provider '{}' (expected google or ollama)", s))
    }
}

/// Per-provider connection settings, one entry per backend in `available_providers`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Backend this entry belongs to ("google" or "ollama")
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: LLM model, empty for Google
    #[serde(default)]
    pub model: String,

    // @field: Base URL, empty means the provider default
    #[serde(default)]
    pub endpoint: String,

    // @field: Chunk size in characters
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    // @field: Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Requests started per minute, unlimited when absent
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    /// Built-in settings for a backend
    pub fn new(provider: TranslationProvider) -> Self {
        let (model, endpoint, max_chars_per_request, timeout_secs) = match provider {
            TranslationProvider::Google => (
                String::new(),
                "https://translate.googleapis.com",
                default_max_chars_per_request(),
                default_timeout_secs(),
            ),
            TranslationProvider::Ollama => ("llama3.2:3b".to_string(), "http://localhost:11434", 2000, 120),
        };
        let rate_limit = ProviderProfile::for_provider(provider).target_rpm;

        Self {
            provider_type: provider.as_str().to_string(),
            model,
            endpoint: endpoint.to_string(),
            max_chars_per_request,
            timeout_secs,
            rate_limit,
        }
    }
}

/// Backend selection and shared request settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Settings per backend; only the entry of `provider` is used
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Request settings that apply whatever the backend
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Retries after a transient failure
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Delay before the first retry, doubled for each further one
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Sampling temperature, LLM backends only
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Reuse translations of identical chunks across documents
    #[serde(default = "default_true")]
    pub enable_cache: bool,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            enable_cache: true,
        }
    }
}

/// Settings for the concurrent batch run
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchConfig {
    /// Directory to scan when none is given on the command line
    #[serde(default)]
    pub root_directory: Option<PathBuf>,

    /// Number of documents processed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Extension of the documents to translate
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            root_directory: None,
            concurrency: default_concurrency(),
            file_extension: default_file_extension(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter for the `log` facade
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_file_extension() -> String {
    "html".to_string()
}

fn default_max_chars_per_request() -> usize {
    5000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Check the settings before any document is touched
    pub fn validate(&self) -> Result<()> {
        for (role, code) in [("source", &self.source_language), ("target", &self.target_language)] {
            language_utils::get_language_name(code)
                .map_err(|e| anyhow!("Invalid {} language: {}", role, e))?;
        }

        if self.batch.concurrency == 0 {
            return Err(anyhow!("Batch concurrency must be at least 1"));
        }

        if self.batch.file_extension.trim_start_matches('.').is_empty() {
            return Err(anyhow!("File extension cannot be empty"));
        }

        let provider = self.translation.resolved_provider();
        if provider.max_chars_per_request == 0 {
            return Err(anyhow!("Maximum chunk size must be at least 1 character"));
        }
        if self.translation.provider == TranslationProvider::Ollama && provider.model.is_empty() {
            return Err(anyhow!("A model name is required for the Ollama provider"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_language: "hi".to_string(),
            translation: TranslationConfig::default(),
            batch: BatchConfig::default(),
            log_level: LogLevel::Info,
        }
    }
}

impl TranslationConfig {
    /// Entry for one backend, if the file has one
    pub fn get_provider_config(&self, provider: &TranslationProvider) -> Option<&ProviderConfig> {
        self.available_providers
            .iter()
            .find(|entry| entry.provider_type.eq_ignore_ascii_case(provider.as_str()))
    }

    /// Entry for the selected backend, if the file has one
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Entry for the selected backend, added with its defaults when missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider = self.provider;
        let position = self
            .available_providers
            .iter()
            .position(|entry| entry.provider_type.eq_ignore_ascii_case(provider.as_str()));

        let index = position.unwrap_or_else(|| {
            self.available_providers.push(ProviderConfig::new(provider));
            self.available_providers.len() - 1
        });
        &mut self.available_providers[index]
    }

    /// Effective settings of the selected backend.
    ///
    /// Empty strings and a zero timeout in the file entry mean "use the default".
    pub fn resolved_provider(&self) -> ProviderConfig {
        let defaults = ProviderConfig::new(self.provider);
        let Some(entry) = self.get_active_provider_config() else {
            return defaults;
        };

        let or_default = |value: &str, default: String| {
            if value.is_empty() { default } else { value.to_string() }
        };

        ProviderConfig {
            provider_type: defaults.provider_type.clone(),
            model: or_default(&entry.model, defaults.model),
            endpoint: or_default(&entry.endpoint, defaults.endpoint),
            max_chars_per_request: entry.max_chars_per_request,
            timeout_secs: if entry.timeout_secs > 0 { entry.timeout_secs } else { defaults.timeout_secs },
            rate_limit: entry.rate_limit,
        }
    }

    pub fn get_model(&self) -> String {
        self.resolved_provider().model
    }

    pub fn get_endpoint(&self) -> String {
        self.resolved_provider().endpoint
    }

    /// Chunk size in characters
    pub fn get_max_chars_per_request(&self) -> usize {
        self.resolved_provider().max_chars_per_request
    }

    pub fn get_timeout_secs(&self) -> u64 {
        self.resolved_provider().timeout_secs
    }

    pub fn get_rate_limit(&self) -> Option<u32> {
        self.resolved_provider().rate_limit
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::Google,
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Google),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
