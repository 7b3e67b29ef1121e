/*!
 * Translation of HTML documents through a translation provider.
 *
 * This module is split into several submodules:
 *
 * - `core`: Chunked translation service with fallback to the source text
 * - `document`: Translation of the elements of one parsed document
 * - `batch`: Concurrent processing of many document files
 * - `cache`: Caching of chunk translations shared across documents
 * - `concurrency`: Provider-specific concurrency profiles
 */

// Re-export main types for easier usage
pub use self::batch::{BatchReport, BatchTranslator, DocumentOutcome, DocumentStatus};
pub use self::core::{split_into_chunks, ChunkStats, TranslationService};
pub use self::document::{DocumentStats, DocumentTransformer};

// Submodules
pub mod batch;
pub mod cache;
pub mod concurrency;
pub mod core;
pub mod document;
