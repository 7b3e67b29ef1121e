use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{backoff_delay, Provider, RequestThrottle};

/// Path of the public translate endpoint, relative to the configured base URL
const TRANSLATE_PATH: &str = "/translate_a/single";

/// Google client for the public Google Translate web endpoint
#[derive(Debug)]
pub struct Google {
    /// HTTP client for API requests
    client: Client,
    /// Base URL, e.g. `https://translate.googleapis.com`
    endpoint: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    /// Request spacing derived from the rate limit
    throttle: RequestThrottle,
}

impl Google {
    /// Create a new Google client with default retry settings
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self::new_with_config(endpoint, timeout_secs, 3, 1000, None)
    }

    /// Create a new Google client with configuration
    pub fn new_with_config(
        endpoint: impl Into<String>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        rate_limit: Option<u32>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            max_retries,
            backoff_base_ms,
            throttle: RequestThrottle::new(rate_limit),
        }
    }

    /// Build the request URL; the text itself goes in the form body
    fn request_url(&self, source_language: &str, target_language: &str) -> Result<Url, ProviderError> {
        let base = format!("{}{}", self.endpoint, TRANSLATE_PATH);
        Url::parse_with_params(
            &base,
            &[
                ("client", "gtx"),
                ("sl", source_language),
                ("tl", target_language),
                ("dt", "t"),
            ],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint {}: {}", base, e)))
    }

    /// One request, no retries
    async fn send_once(&self, url: &Url, text: &str) -> Result<String, ProviderError> {
        self.throttle.acquire().await;

        let response = self
            .client
            .post(url.clone())
            .form(&[("q", text)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read response body: {}", e)))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimitExceeded(format!("Google answered {}", status)));
        }

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Self::parse_response(&body)
    }

    /// Extract the translated text from a `translate_a/single` response.
    ///
    /// The body is a nested JSON array whose first element lists the translated
    /// segments; the first entry of each segment is the translated text.
    pub fn parse_response(body: &str) -> Result<String, ProviderError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ProviderError::ParseError(format!("Response is not JSON: {}", e)))?;

        let segments = value
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::ParseError("Missing translation segments".to_string()))?;

        let translated: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();

        Ok(translated)
    }
}

#[async_trait]
impl Provider for Google {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let url = self.request_url(source_language, target_language)?;

        let mut attempt = 0;
        loop {
            match self.send_once(&url, text).await {
                Ok(translated) => return Ok(translated),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = backoff_delay(self.backoff_base_ms, attempt);
                    warn!(
                        "Google request failed: {} - retrying in {:?} (attempt {}/{})",
                        e,
                        delay,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!("Google request failed: {}", e);
                    return Err(e);
                }
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        debug!("Testing connection to {}", self.endpoint);
        self.translate("Hello", "en", "fr").await.map(|_| ())
    }

    fn name(&self) -> &str {
        "google"
    }
}
