/*!
 * Document transformation.
 *
 * Walks the primary content of one parsed document and replaces the own text of
 * every translatable element with its translation. The tree is edited in place.
 */

use log::{debug, warn};
use std::ops::AddAssign;
use std::sync::Arc;

use super::core::TranslationService;
use crate::errors::TranslationError;
use crate::html_processor::{ElementNode, HtmlDocument};

/// What happened to the elements of one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// Elements whose text was sent for translation
    pub translated: usize,
    /// Elements skipped because they hold code or styling
    pub skipped: usize,
    /// Translatable elements without text of their own
    pub without_text: usize,
    /// Elements left unchanged after an error
    pub failed: usize,
}

impl AddAssign for DocumentStats {
    fn add_assign(&mut self, other: Self) {
        self.translated += other.translated;
        self.skipped += other.skipped;
        self.without_text += other.without_text;
        self.failed += other.failed;
    }
}

/// Split text into leading whitespace, content and trailing whitespace
fn split_edges(text: &str) -> (&str, &str, &str) {
    let content_start = text.len() - text.trim_start().len();
    let content_end = text.trim_end().len().max(content_start);
    (
        &text[..content_start],
        &text[content_start..content_end],
        &text[content_end..],
    )
}

/// Translates the text of one document at a time
#[derive(Debug, Clone)]
pub struct DocumentTransformer {
    service: Arc<TranslationService>,
}

impl DocumentTransformer {
    /// Create a transformer around a shared translation service
    pub fn new(service: Arc<TranslationService>) -> Self {
        Self { service }
    }

    /// The translation service in use
    pub fn service(&self) -> &Arc<TranslationService> {
        &self.service
    }

    /// Translate every translatable element of `document` in place.
    ///
    /// A failure on one element is logged and leaves that element as it was;
    /// the remaining elements are still processed.
    pub async fn transform(
        &self,
        document: &HtmlDocument,
        source_language: &str,
        target_language: &str,
    ) -> DocumentStats {
        let mut stats = DocumentStats::default();

        for node in document.primary_content_nodes() {
            if !node.is_translatable() {
                stats.skipped += 1;
                continue;
            }

            match self.transform_node(&node, source_language, target_language).await {
                Ok(true) => stats.translated += 1,
                Ok(false) => stats.without_text += 1,
                Err(e) => {
                    warn!("Leaving <{}> unchanged: {}", node.tag(), e);
                    stats.failed += 1;
                }
            }
        }

        debug!(
            "Document transformed: {} translated, {} skipped, {} failed",
            stats.translated, stats.skipped, stats.failed
        );
        stats
    }

    /// Returns `Ok(false)` when the element has no text of its own
    async fn transform_node(
        &self,
        node: &ElementNode,
        source_language: &str,
        target_language: &str,
    ) -> Result<bool, TranslationError> {
        let Some(text) = node.direct_text() else {
            return Ok(false);
        };

        let (leading, content, trailing) = split_edges(&text);
        let translated = self
            .service
            .translate(content, source_language, target_language)
            .await;

        node.set_direct_text(&format!("{}{}{}", leading, translated, trailing))?;
        Ok(true)
    }
}
