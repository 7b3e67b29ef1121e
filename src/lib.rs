/*!
 * # sitetrans - batch translation of static HTML sites
 *
 * A Rust library for translating the human-visible text of a tree of HTML
 * documents in place.
 *
 * ## Features
 *
 * - Recursive discovery of documents below a root directory
 * - Lenient HTML5 parsing; markup, attributes, scripts and styles are kept as they are
 * - Translation through interchangeable providers:
 *   - Google Translate web endpoint
 *   - Ollama (local LLM)
 * - Text longer than a provider accepts is sent in ordered chunks
 * - Failed chunks, elements and documents are logged and skipped, never fatal
 * - Several documents processed at the same time on a bounded pool
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `html_processor`: Parsed document model (elements, own text, serialization)
 * - `translation`: Translation pipeline:
 *   - `translation::core`: Chunked translation with fallback to the source text
 *   - `translation::document`: Translation of one parsed document
 *   - `translation::batch`: Concurrent processing of document files
 *   - `translation::cache`: Caching of chunk translations
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for translation backends
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod html_processor;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, MarkupError, ProviderError, TranslationError};
pub use html_processor::{ElementKind, ElementNode, HtmlDocument};
pub use language_utils::{get_language_name, language_codes_match, to_service_code};
pub use translation::{BatchReport, BatchTranslator, DocumentTransformer, TranslationService};
