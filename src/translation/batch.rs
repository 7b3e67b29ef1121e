/*!
 * Batch translation processing.
 *
 * This module runs one task per document on a bounded pool: every task reads,
 * parses, transforms, serializes and writes back its own document. A failing
 * task is recorded and logged; it never stops the others.
 */

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use log::{debug, error};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::core::TranslationService;
use super::document::{DocumentStats, DocumentTransformer};
use crate::errors::AppError;
use crate::html_processor::HtmlDocument;

/// Result of one document task
#[derive(Debug, Clone)]
pub enum DocumentStatus {
    /// The document was translated and written back
    Translated(DocumentStats),
    /// The task failed; the message names the cause
    Failed(String),
}

/// Outcome of one document task
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    /// Document that was processed
    pub path: PathBuf,
    /// What happened to it
    pub status: DocumentStatus,
    /// Time spent on this document
    pub duration: Duration,
}

impl DocumentOutcome {
    /// Whether the document was written back
    pub fn is_success(&self) -> bool {
        matches!(self.status, DocumentStatus::Translated(_))
    }
}

/// Outcomes of a whole batch, in completion order
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One outcome per attempted document
    pub outcomes: Vec<DocumentOutcome>,
    /// Wall-clock time of the batch
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of attempted documents
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of documents translated and written
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed documents
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Paths of the failed documents
    pub fn failed_paths(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.path.as_path())
            .collect()
    }

    /// Element statistics summed over the successful documents
    pub fn node_stats(&self) -> DocumentStats {
        let mut total = DocumentStats::default();
        for outcome in &self.outcomes {
            if let DocumentStatus::Translated(stats) = outcome.status {
                total += stats;
            }
        }
        total
    }
}

/// Text of a panic payload, when it carries one
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Batch translator for processing many documents concurrently
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// Transformer shared by every task
    transformer: DocumentTransformer,

    /// Maximum number of documents processed at the same time
    concurrency: usize,
}

impl BatchTranslator {
    /// Create a new batch translator; a concurrency of 0 is treated as 1
    pub fn new(service: Arc<TranslationService>, concurrency: usize) -> Self {
        Self {
            transformer: DocumentTransformer::new(service),
            concurrency: concurrency.max(1),
        }
    }

    /// Maximum number of documents processed at the same time
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Translate one document file in place
    pub async fn process_document(
        &self,
        path: &Path,
        source_language: &str,
        target_language: &str,
    ) -> Result<DocumentStats, AppError> {
        let content = tokio::fs::read(path).await?;
        let document = HtmlDocument::parse(&content)?;

        let stats = self
            .transformer
            .transform(&document, source_language, target_language)
            .await;

        let html = document.serialize()?;
        tokio::fs::write(path, html).await?;

        Ok(stats)
    }

    /// Translate every document, at most `concurrency` at a time.
    ///
    /// Each path is attempted exactly once. A task that fails, even by panicking,
    /// is recorded as failed and the others carry on. `progress_callback` is
    /// called after every completed task with `(completed, total, outcome)`.
    pub async fn translate_documents<F>(
        &self,
        files: &[PathBuf],
        source_language: &str,
        target_language: &str,
        progress_callback: F,
    ) -> BatchReport
    where
        F: Fn(usize, usize, &DocumentOutcome),
    {
        let start_time = Instant::now();
        let total = files.len();
        let completed = AtomicUsize::new(0);

        let outcomes: Vec<DocumentOutcome> = stream::iter(files)
            .map(|path| {
                let completed = &completed;
                let progress_callback = &progress_callback;

                async move {
                    let started = Instant::now();
                    let result = AssertUnwindSafe(self.process_document(path, source_language, target_language))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|payload| Err(AppError::Panicked(panic_message(&*payload))));

                    let status = match result {
                        Ok(stats) => {
                            debug!("Translated {:?} in {:?}", path, started.elapsed());
                            DocumentStatus::Translated(stats)
                        }
                        Err(e) => {
                            let e = e.in_document(path);
                            error!("{}", e);
                            DocumentStatus::Failed(e.to_string())
                        }
                    };

                    let outcome = DocumentOutcome {
                        path: path.clone(),
                        status,
                        duration: started.elapsed(),
                    };

                    let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total, &outcome);
                    outcome
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        BatchReport {
            outcomes,
            elapsed: start_time.elapsed(),
        }
    }
}
