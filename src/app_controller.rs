use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::translation::concurrency::ProviderProfile;
use crate::translation::{BatchReport, BatchTranslator, TranslationService};

// @module: Application controller for site translation

/// Main application controller for batch HTML translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Translation service shared by every document task
    service: Arc<TranslationService>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::new(&config.translation)
            .context("Failed to create translation service")?;

        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }

    // @method: Create a controller around an existing service
    pub fn with_service(config: Config, service: Arc<TranslationService>) -> Self {
        Self { config, service }
    }

    /// The configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check that the translation provider is reachable
    pub async fn test_connection(&self) -> Result<()> {
        self.service.test_connection().await
    }

    /// Translate a single document or every document under a directory
    pub async fn run(&self, input: PathBuf) -> Result<BatchReport> {
        if FileManager::dir_exists(&input) {
            self.run_folder(input).await
        } else if FileManager::file_exists(&input) {
            self.run_files(vec![input]).await
        } else {
            Err(anyhow!("Input path does not exist: {:?}", input))
        }
    }

    /// Run the workflow in folder mode, processing all matching documents
    /// below `input_dir` at any depth
    pub async fn run_folder(&self, input_dir: PathBuf) -> Result<BatchReport> {
        let extension = &self.config.batch.file_extension;
        let files = FileManager::find_files(&input_dir, extension)?;

        if files.is_empty() {
            warn!("No .{} files found in {:?}", extension.trim_start_matches('.'), input_dir);
            return Ok(BatchReport::default());
        }

        info!("Found {} documents in {:?}", files.len(), input_dir);
        self.run_files(files).await
    }

    /// Translate the given documents on the bounded pool and report progress
    async fn run_files(&self, files: Vec<PathBuf>) -> Result<BatchReport> {
        let source_language = language_utils::to_service_code(&self.config.source_language)?;
        let target_language = language_utils::to_service_code(&self.config.target_language)?;

        let concurrency = self.config.batch.concurrency;
        let profile = ProviderProfile::for_provider(self.config.translation.provider);
        if !profile.allows(concurrency) {
            warn!(
                "{} documents at once may be throttled by {} (suggested at most {})",
                concurrency,
                self.config.translation.provider.display_name(),
                profile.max_concurrent_documents
            );
        }

        info!(
            "Translating {} documents from {} to {} with {} ({} at a time)",
            files.len(),
            language_utils::get_language_name(&source_language).unwrap_or_else(|_| source_language.clone()),
            language_utils::get_language_name(&target_language).unwrap_or_else(|_| target_language.clone()),
            self.service.provider_name(),
            concurrency
        );

        let progress_bar = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let batch = BatchTranslator::new(Arc::clone(&self.service), concurrency);
        let report = batch
            .translate_documents(&files, &source_language, &target_language, |done, _, outcome| {
                progress_bar.set_position(done as u64);
                progress_bar.set_message(display_name(&outcome.path));
            })
            .await;

        progress_bar.finish_and_clear();
        self.log_summary(&report);

        Ok(report)
    }

    fn log_summary(&self, report: &BatchReport) {
        let nodes = report.node_stats();
        let chunks = self.service.stats();

        info!(
            "Translation complete: {} translated, {} failed out of {} documents",
            report.succeeded(),
            report.failed(),
            report.total()
        );
        for path in report.failed_paths() {
            warn!("Not translated: {:?}", path);
        }

        debug!(
            "Elements: {} translated, {} skipped, {} without text, {} failed",
            nodes.translated, nodes.skipped, nodes.without_text, nodes.failed
        );
        if chunks.fallback > 0 {
            warn!("{} text chunks were left untranslated after provider errors", chunks.fallback);
        }

        let (hits, misses, hit_rate) = self.service.cache.stats();
        debug!(
            "Cache: {} hits, {} misses ({:.1}% hit rate)",
            hits,
            misses,
            hit_rate * 100.0
        );

        info!("Total time: {}", Self::format_duration(report.elapsed));
    }

    /// Format a duration for the summary line
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// File name for the progress message, the full path when there is none
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
