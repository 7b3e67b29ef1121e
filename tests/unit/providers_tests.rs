/*!
 * Tests for translation provider implementations
 */

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use sitetrans::errors::ProviderError;
use sitetrans::providers::google::Google;
use sitetrans::providers::mock::{MockBehavior, MockProvider};
use sitetrans::providers::ollama::{GenerationRequest, GenerationResponse, Ollama};
use sitetrans::providers::{backoff_delay, Provider, RequestThrottle};
use sitetrans::translation::TranslationService;
use crate::common;

/// Address nothing listens on
const CLOSED_ENDPOINT: &str = "http://127.0.0.1:9";

/// Test extraction of a multi-sentence Google response
#[test]
fn test_google_parse_response_withSeveralSegments_shouldConcatenate() {
    let body = r#"[[["नमस्ते। ","Hello. ",null,null,3],["आप कैसे हैं?","How are you?",null,null,3]],null,"en",null,null,null,1]"#;
    assert_eq!(Google::parse_response(body).unwrap(), "नमस्ते। आप कैसे हैं?");
}

/// Test that a response without segments is an error, not an empty translation
#[test]
fn test_google_parse_response_withNullSegments_shouldFail() {
    assert!(matches!(
        Google::parse_response("[null,null,\"en\"]"),
        Err(ProviderError::ParseError(_))
    ));
}

/// Test that an unreachable Google endpoint is reported
#[tokio::test]
async fn test_google_translate_withUnreachableEndpoint_shouldFail() {
    let google = Google::new_with_config(CLOSED_ENDPOINT, 2, 0, 0, None);

    let result = google.translate("Hello", "en", "hi").await;

    assert!(result.is_err());
    assert!(google.test_connection().await.is_err());
    assert_eq!(google.name(), "google");
}

/// Test the JSON body sent to Ollama
#[test]
fn test_ollama_generation_request_withOptions_shouldSerializeExpectedFields() {
    let request = GenerationRequest::new("llama3.2:3b", "Hello")
        .system("Translate")
        .temperature(0.3)
        .no_stream();

    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["model"], "llama3.2:3b");
    assert_eq!(json["prompt"], "Hello");
    assert_eq!(json["system"], "Translate");
    assert_eq!(json["stream"], false);
    assert!(json["options"]["temperature"].is_number());
}

/// Test that unset request fields are left out
#[test]
fn test_ollama_generation_request_withDefaults_shouldOmitOptionalFields() {
    let json = serde_json::to_value(GenerationRequest::new("m", "p")).unwrap();
    let object = json.as_object().unwrap();

    assert_eq!(object.len(), 2);
    assert!(!object.contains_key("system"));
    assert!(!object.contains_key("stream"));
}

/// Test decoding of a minimal Ollama reply
#[test]
fn test_ollama_generation_response_withMinimalJson_shouldDecode() {
    let response: GenerationResponse = serde_json::from_str(r#"{"response":"Bonjour"}"#).unwrap();
    assert_eq!(response.response, "Bonjour");
    assert!(!response.done);
}

/// Test that an unreachable Ollama server is reported
#[tokio::test]
async fn test_ollama_translate_withUnreachableServer_shouldFail() {
    let ollama = Ollama::new_with_config(CLOSED_ENDPOINT, "llama3.2:3b", 2, 0.3, 0, 0, None);

    assert!(ollama.translate("Hello", "en", "hi").await.is_err());
    assert!(matches!(
        ollama.test_connection().await,
        Err(ProviderError::ConnectionError(_))
    ));
    assert_eq!(ollama.name(), "ollama");
}

/// Test that a blank model reply is an error, not a translation
#[tokio::test]
async fn test_ollama_translate_withBlankReply_shouldReturnEmptyResponse() -> Result<()> {
    let endpoint = common::serve_json(r#"{"model":"llama3.2:3b","response":"  \n","done":true}"#).await?;
    let ollama = Ollama::new_with_config(endpoint, "llama3.2:3b", 5, 0.3, 0, 0, None);

    let result = ollama.translate("hello ", "en", "hi").await;

    assert!(matches!(result, Err(ProviderError::EmptyResponse(6))));
    Ok(())
}

/// Test that blank Ollama replies leave every chunk in the source language
#[tokio::test]
async fn test_service_withBlankOllamaReplies_shouldKeepEveryChunk() -> Result<()> {
    let endpoint = common::serve_json(r#"{"response":""}"#).await?;
    let ollama = Ollama::new_with_config(endpoint, "llama3.2:3b", 5, 0.3, 0, 0, None);
    let service = TranslationService::with_provider(Arc::new(ollama), 6, true);

    let result = service.translate("hello world", "en", "hi").await;

    assert_eq!(result, "hello world");
    assert_eq!(service.stats().fallback, 2);
    assert_eq!(service.stats().translated, 0);
    Ok(())
}

/// Test that the slow mock still answers
#[tokio::test]
async fn test_mock_slow_withDelay_shouldUppercase() {
    let provider = MockProvider::slow(5);
    assert_eq!(provider.translate("hi", "en", "fr").await.unwrap(), "HI");
}

/// Test the empty mock behavior
#[tokio::test]
async fn test_mock_empty_withAnyInput_shouldReturnEmptyString() {
    let provider = MockProvider::new(MockBehavior::Empty);
    assert_eq!(provider.translate("Hello", "en", "fr").await.unwrap(), "");
    assert_eq!(provider.request_count(), 1);
}

/// Test that backoff grows with the attempt number
#[test]
fn test_backoff_delay_withIncreasingAttempts_shouldGrow() {
    let delays: Vec<Duration> = (1..=4).map(|attempt| backoff_delay(200, attempt)).collect();

    for (index, delay) in delays.iter().enumerate() {
        let base = 200u64 << index;
        assert!(*delay >= Duration::from_millis(base));
        assert!(*delay <= Duration::from_millis(base + base / 4));
    }
}

/// Test the rate limit spacing under paused time
#[tokio::test(start_paused = true)]
async fn test_request_throttle_withRateLimit_shouldSpaceRequests() {
    let throttle = RequestThrottle::new(Some(120));
    let start = tokio::time::Instant::now();

    for _ in 0..5 {
        throttle.acquire().await;
    }

    // 120 per minute is one slot every 500ms; the first is immediate
    assert!(start.elapsed() >= Duration::from_millis(2000));
    assert!(start.elapsed() < Duration::from_millis(2500));
}

/// Test that a zero rate limit disables throttling
#[tokio::test(start_paused = true)]
async fn test_request_throttle_withZeroLimit_shouldNotWait() {
    let throttle = RequestThrottle::new(Some(0));
    let start = tokio::time::Instant::now();

    throttle.acquire().await;
    throttle.acquire().await;

    assert_eq!(start.elapsed(), Duration::ZERO);
}
