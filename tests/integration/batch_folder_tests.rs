/*!
 * Integration tests for translating whole folders of documents
 */

use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sitetrans::file_utils::FileManager;
use sitetrans::providers::mock::MockProvider;
use sitetrans::translation::{BatchTranslator, DocumentStatus, TranslationService};
use crate::common;

async fn run_site(page_count: usize, concurrency: usize) -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_nested_site(temp_dir.path(), page_count)?;
    let files = FileManager::find_files(temp_dir.path(), "html")?;
    assert_eq!(files.len(), page_count);

    let provider = MockProvider::uppercase();
    let batch = BatchTranslator::new(common::mock_service(&provider, false), concurrency);

    let report = batch.translate_documents(&files, "en", "hi", |_, _, _| {}).await;

    // One attempt per document, one request per paragraph
    assert_eq!(report.total(), page_count);
    assert_eq!(report.succeeded(), page_count);
    assert_eq!(provider.request_count(), page_count);

    let attempted: HashSet<&PathBuf> = report.outcomes.iter().map(|o| &o.path).collect();
    assert_eq!(attempted.len(), page_count);
    for path in &files {
        assert!(attempted.contains(path), "{:?} was never attempted", path);
    }

    for i in 0..page_count {
        let expected = format!("PAGE NUMBER {}", i);
        let matches = files
            .iter()
            .filter(|path| fs::read_to_string(path).map(|c| c.contains(&expected)).unwrap_or(false))
            .count();
        assert_eq!(matches, 1, "page {} should be translated exactly once", i);
    }
    Ok(())
}

/// Test exactly-once processing with a single worker
#[tokio::test]
async fn test_translate_documents_withOneWorker_shouldProcessEachFileOnce() -> Result<()> {
    run_site(6, 1).await
}

/// Test exactly-once processing with the default pool size
#[tokio::test]
async fn test_translate_documents_withFourWorkers_shouldProcessEachFileOnce() -> Result<()> {
    run_site(10, 4).await
}

/// Test exactly-once processing with one worker per file
#[tokio::test]
async fn test_translate_documents_withWorkerPerFile_shouldProcessEachFileOnce() -> Result<()> {
    run_site(9, 9).await
}

/// Test exactly-once processing with more workers than files
#[tokio::test]
async fn test_translate_documents_withMoreWorkersThanFiles_shouldProcessEachFileOnce() -> Result<()> {
    run_site(3, 16).await
}

/// Test that one unreadable document does not stop the others
#[tokio::test]
async fn test_translate_documents_withOneInvalidDocument_shouldReportOnlyThatFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_nested_site(temp_dir.path(), 6)?;
    let bad_path = temp_dir.path().join("docs/bad.html");
    let bad_bytes: &[u8] = b"<html><body><p>caf\xe9 cr\xe8me</p></body></html>";
    fs::write(&bad_path, bad_bytes)?;

    let files = FileManager::find_files(temp_dir.path(), "html")?;
    assert_eq!(files.len(), 7);

    let provider = MockProvider::uppercase();
    let batch = BatchTranslator::new(common::mock_service(&provider, false), 4);
    let report = batch.translate_documents(&files, "en", "hi", |_, _, _| {}).await;

    assert_eq!(report.total(), 7);
    assert_eq!(report.succeeded(), 6);
    assert_eq!(report.failed_paths(), vec![bad_path.as_path()]);

    let failed = report.outcomes.iter().find(|o| !o.is_success()).unwrap();
    match &failed.status {
        DocumentStatus::Failed(message) => {
            assert!(message.contains("bad.html"));
            assert!(message.contains("UTF-8"));
        }
        DocumentStatus::Translated(_) => unreachable!(),
    }

    // The bad document is left exactly as it was
    assert_eq!(fs::read(&bad_path)?, bad_bytes);
    assert_eq!(provider.request_count(), 6);
    Ok(())
}

/// Test that a task panicking on one document does not take the batch down
#[tokio::test]
async fn test_translate_documents_withPanickingTask_shouldReportOnlyThatFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let files = common::create_nested_site(temp_dir.path(), 5)?;

    let provider = MockProvider::working().with_custom_response(|text, _| {
        if text == "page number 2" {
            panic!("backend crashed on {}", text);
        }
        text.to_uppercase()
    });
    let batch = BatchTranslator::new(common::mock_service(&provider, false), 2);
    let report = batch.translate_documents(&files, "en", "hi", |_, _, _| {}).await;

    assert_eq!(report.total(), 5);
    assert_eq!(report.succeeded(), 4);
    assert_eq!(report.failed_paths(), vec![files[2].as_path()]);

    let failed = report.outcomes.iter().find(|o| !o.is_success()).unwrap();
    match &failed.status {
        DocumentStatus::Failed(message) => assert!(message.contains("backend crashed on page number 2")),
        DocumentStatus::Translated(_) => unreachable!(),
    }

    // The panicked document was never written
    assert!(fs::read_to_string(&files[2])?.contains("<p>page number 2</p>"));
    assert!(fs::read_to_string(&files[4])?.contains("<p>PAGE NUMBER 4</p>"));
    Ok(())
}

/// Test that a dead provider still lets every document complete
#[tokio::test]
async fn test_translate_documents_withFailingProvider_shouldKeepSourceText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let files = common::create_nested_site(temp_dir.path(), 4)?;

    let service = Arc::new(TranslationService::with_provider(Arc::new(MockProvider::failing()), 5000, true));
    let batch = BatchTranslator::new(Arc::clone(&service), 4);
    let report = batch.translate_documents(&files, "en", "hi", |_, _, _| {}).await;

    assert_eq!(report.succeeded(), 4);
    assert_eq!(service.stats().fallback, 4);
    for (i, path) in files.iter().enumerate() {
        assert!(fs::read_to_string(path)?.contains(&format!("<p>page number {}</p>", i)));
    }
    Ok(())
}

/// Test that progress is reported once per document and reaches the total
#[tokio::test]
async fn test_translate_documents_withProgressCallback_shouldCountEveryCompletion() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let files = common::create_nested_site(temp_dir.path(), 8)?;
    fs::write(&files[3], [0xffu8, 0xfe])?;

    let calls = AtomicUsize::new(0);
    let last_seen = AtomicUsize::new(0);
    let provider = MockProvider::uppercase();
    let batch = BatchTranslator::new(common::mock_service(&provider, true), 3);

    let report = batch
        .translate_documents(&files, "en", "hi", |done, total, _| {
            assert_eq!(total, 8);
            assert!(done > last_seen.load(Ordering::SeqCst));
            last_seen.store(done, Ordering::SeqCst);
            calls.fetch_add(1, Ordering::SeqCst);
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 8);
    assert_eq!(last_seen.load(Ordering::SeqCst), 8);
    assert_eq!(report.failed(), 1);
    Ok(())
}

/// Test that the pool bound limits how many documents run together
#[tokio::test]
async fn test_translate_documents_withSlowProvider_shouldRespectPoolBound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let files = common::create_nested_site(temp_dir.path(), 8)?;

    let service = Arc::new(TranslationService::with_provider(Arc::new(MockProvider::slow(50)), 5000, false));
    let batch = BatchTranslator::new(service, 4);
    let report = batch.translate_documents(&files, "en", "hi", |_, _, _| {}).await;

    // Eight documents through four slots take at least two rounds
    assert_eq!(report.succeeded(), 8);
    assert!(report.elapsed >= Duration::from_millis(100));
    assert_eq!(batch.concurrency(), 4);
    Ok(())
}
