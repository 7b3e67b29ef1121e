/*!
 * Tests for error types and conversions
 */

use std::error::Error;
use std::io;

use sitetrans::errors::{AppError, MarkupError, ProviderError, TranslationError};

/// Test that node edit failures keep their cause
#[test]
fn test_error_conversion_withMarkupError_shouldNameElement() {
    let translation_error: TranslationError = MarkupError::NoDirectText("p".to_string()).into();

    let message = translation_error.to_string();
    assert!(message.starts_with("Markup error"));
    assert!(message.contains("<p>"));
}

/// Test that I/O errors become file errors
#[test]
fn test_error_conversion_withIoError_shouldBecomeFileError() {
    let error: AppError = io::Error::new(io::ErrorKind::NotFound, "missing.html").into();
    assert!(matches!(error, AppError::File(ref m) if m.contains("missing.html")));
}

/// Test that a panicked task names its document
#[test]
fn test_in_document_withPanic_shouldKeepMessage() {
    let error = AppError::Panicked("index out of bounds".to_string()).in_document("site/index.html");
    let message = error.to_string();
    assert!(message.contains("site/index.html"));
    assert!(message.contains("index out of bounds"));
}

/// Test that document errors expose their cause as source
#[test]
fn test_in_document_withMarkupError_shouldExposeSource() {
    let error = AppError::from(MarkupError::Parse("content is not valid UTF-8".to_string()))
        .in_document("site/bad.html");

    match &error {
        AppError::Document { path, .. } => assert_eq!(path.to_str(), Some("site/bad.html")),
        other => panic!("unexpected error: {:?}", other),
    }

    let source = error.source().expect("document error should have a source");
    assert!(source.to_string().contains("not valid UTF-8"));
}

/// Test which provider errors are worth retrying
#[test]
fn test_is_transient_withEachKind_shouldMatchRetryPolicy() {
    assert!(ProviderError::RequestFailed("reset".to_string()).is_transient());
    assert!(ProviderError::ApiError { status_code: 502, message: String::new() }.is_transient());
    assert!(!ProviderError::ApiError { status_code: 403, message: String::new() }.is_transient());
    assert!(!ProviderError::EmptyResponse(5).is_transient());
}
