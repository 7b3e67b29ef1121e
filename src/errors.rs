/*!
 * Error types for the sitetrans application.
 *
 * Each layer of the pipeline has its own error type so that failures can be
 * absorbed at the right boundary:
 * - `ProviderError` never leaves the chunked translator
 * - `TranslationError` never leaves the document transformer
 * - `AppError` is recorded per document by the batch driver
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when calling a translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend throttled or blocked the caller
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The backend answered with nothing usable for a non-empty input
    #[error("Empty translation returned for {0} characters of input")]
    EmptyResponse(usize),
}

impl ProviderError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::EmptyResponse(_) => false,
        }
    }
}

/// Errors raised by the markup model
#[derive(Error, Debug)]
pub enum MarkupError {
    /// Content could not be turned into a tree at all
    #[error("Document could not be parsed: {0}")]
    Parse(String),

    /// The tree could not be rendered back to text
    #[error("Document could not be serialized: {0}")]
    Serialize(String),

    /// A node no longer has the single text run it was read from
    #[error("Element <{0}> has no replaceable direct text")]
    NoDirectText(String),
}

/// Errors that can occur while translating a single element.
///
/// Provider failures never get here: the chunked translator falls back to the
/// source text instead.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error while reading or replacing node text
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),
}

/// Main application error type, one per failed document task
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the markup layer
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    /// The task panicked before producing a result
    #[error("Task panicked: {0}")]
    Panicked(String),

    /// A whole document task failed
    #[error("Failed to process {path:?}: {source}")]
    Document {
        /// Document that failed
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Attach the document path to an error raised inside its task
    pub fn in_document(self, path: impl Into<PathBuf>) -> Self {
        Self::Document {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
