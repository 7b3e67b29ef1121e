/*!
 * Integration tests for the application controller
 */

use anyhow::Result;
use std::fs;

use sitetrans::app_config::Config;
use sitetrans::app_controller::Controller;
use sitetrans::providers::mock::MockProvider;
use crate::common;

fn test_config(concurrency: usize) -> Config {
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_language = "hin".to_string();
    config.batch.concurrency = concurrency;
    config
}

/// Test a full folder run through the controller
#[tokio::test]
async fn test_run_withSiteDirectory_shouldTranslateEveryPage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let files = common::create_nested_site(temp_dir.path(), 7)?;

    let provider = MockProvider::working();
    let controller = Controller::with_service(test_config(4), common::mock_service(&provider, true));

    let report = controller.run(temp_dir.path().to_path_buf()).await?;

    assert_eq!(report.total(), 7);
    assert_eq!(report.failed(), 0);
    for path in &files {
        // Language codes are normalized before reaching the provider
        assert!(fs::read_to_string(path)?.contains("<p>[hi] page number"));
    }
    assert_eq!(fs::read_to_string(temp_dir.path().join("notes.txt"))?, "not markup");
    Ok(())
}

/// Test translating a single file
#[tokio::test]
async fn test_run_withSingleFile_shouldTranslateOnlyThatFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let files = common::create_nested_site(temp_dir.path(), 3)?;

    let provider = MockProvider::uppercase();
    let controller = Controller::with_service(test_config(4), common::mock_service(&provider, false));

    let report = controller.run(files[1].clone()).await?;

    assert_eq!(report.total(), 1);
    assert!(fs::read_to_string(&files[1])?.contains("PAGE NUMBER 1"));
    assert!(fs::read_to_string(&files[0])?.contains("page number 0"));
    assert_eq!(provider.request_count(), 1);
    Ok(())
}

/// Test that a missing input is an error
#[tokio::test]
async fn test_run_withMissingPath_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let provider = MockProvider::uppercase();
    let controller = Controller::with_service(test_config(4), common::mock_service(&provider, false));

    let result = controller.run(temp_dir.path().join("missing")).await;

    assert!(result.is_err());
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

/// Test that a folder without documents gives an empty report
#[test]
fn test_run_folder_withNoDocuments_shouldReturnEmptyReport() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "readme.txt", "nothing here")?;

    let provider = MockProvider::uppercase();
    let controller = Controller::with_service(test_config(4), common::mock_service(&provider, false));

    let report = tokio_test::block_on(controller.run_folder(temp_dir.path().to_path_buf()))?;

    assert_eq!(report.total(), 0);
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

/// Test that the configured extension selects the documents
#[tokio::test]
async fn test_run_folder_withCustomExtension_shouldOnlyPickMatchingFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "a.htm", &common::page("alpha"))?;
    common::create_test_file(temp_dir.path(), "b.html", &common::page("beta"))?;

    let mut config = test_config(2);
    config.batch.file_extension = "htm".to_string();
    let provider = MockProvider::uppercase();
    let controller = Controller::with_service(config, common::mock_service(&provider, false));

    let report = controller.run_folder(temp_dir.path().to_path_buf()).await?;

    assert_eq!(report.total(), 1);
    assert!(fs::read_to_string(temp_dir.path().join("a.htm"))?.contains("ALPHA"));
    assert!(fs::read_to_string(temp_dir.path().join("b.html"))?.contains("beta"));
    Ok(())
}

/// Test that an invalid language code stops the run before any work
#[tokio::test]
async fn test_run_withInvalidTargetLanguage_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_nested_site(temp_dir.path(), 2)?;

    let mut config = test_config(4);
    config.target_language = "klingon".to_string();
    let provider = MockProvider::uppercase();
    let controller = Controller::with_service(config, common::mock_service(&provider, false));

    assert!(controller.run(temp_dir.path().to_path_buf()).await.is_err());
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

/// Test controller construction from configuration
#[tokio::test]
async fn test_with_config_withDefaults_shouldKeepConfig() -> Result<()> {
    let controller = Controller::with_config(test_config(3))?;
    assert_eq!(controller.config().batch.concurrency, 3);
    assert_eq!(controller.config().target_language, "hin");
    Ok(())
}

/// Test the connection check through the controller
#[tokio::test]
async fn test_test_connection_withFailingProvider_shouldFail() -> Result<()> {
    let provider = MockProvider::failing();
    let controller = Controller::with_service(test_config(1), common::mock_service(&provider, false));
    assert!(controller.test_connection().await.is_err());
    Ok(())
}
