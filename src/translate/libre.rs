//! LibreTranslate-backed translation.

use crate::error::{CallError, MultiTranslateError, Result};
use crate::translate::{LanguagePair, TranslationClient, TranslationEngine};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Maximum attempts for a translate call.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const BASE_DELAY_MS: u64 = 1000;

/// A language offered by the server and the targets it can translate into.
#[derive(Debug, Clone, Deserialize)]
pub struct LibreLanguage {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Translator using a LibreTranslate server.
pub struct LibreTranslateEngine {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
    base_delay: Duration,
    // Language list, downloaded on first prepare and reused afterwards
    languages: Arc<OnceCell<Vec<LibreLanguage>>>,
}

impl LibreTranslateEngine {
    /// Create an engine talking to the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
            languages: Arc::new(OnceCell::new()),
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Apply a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Override retry behaviour. `max_retries` counts total attempts.
    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.base_delay = base_delay;
        self
    }
}

impl TranslationEngine for LibreTranslateEngine {
    fn name(&self) -> &'static str {
        "LibreTranslate"
    }

    fn client(&self, pair: &LanguagePair) -> Box<dyn TranslationClient> {
        Box::new(LibreClient {
            http: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            max_retries: self.max_retries,
            base_delay: self.base_delay,
            languages: self.languages.clone(),
            pair: pair.clone(),
        })
    }
}

struct LibreClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
    base_delay: Duration,
    languages: Arc<OnceCell<Vec<LibreLanguage>>>,
    pair: LanguagePair,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize, Debug)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    error: String,
}

impl LibreClient {
    async fn fetch_languages(&self) -> Result<Vec<LibreLanguage>> {
        let url = format!("{}/languages", self.base_url);
        debug!("Fetching language list from {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| MultiTranslateError::Api(format!("Language list request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MultiTranslateError::Api(format!(
                "Language list error ({}): {}",
                status,
                error_message(&body)
            )));
        }

        let languages: Vec<LibreLanguage> = serde_json::from_str(&body)?;
        debug!("Server offers {} languages", languages.len());
        Ok(languages)
    }

    async fn call_api(&self, text: &str) -> std::result::Result<String, CallError> {
        let url = format!("{}/translate", self.base_url);
        let request = TranslateRequest {
            q: text,
            source: &self.pair.source,
            target: &self.pair.target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                CallError::Transient(MultiTranslateError::Api(format!(
                    "Translation request failed: {}",
                    e
                )))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            CallError::Transient(MultiTranslateError::Api(format!(
                "Failed to read response: {}",
                e
            )))
        })?;

        if !status.is_success() {
            let err = MultiTranslateError::Api(format!(
                "LibreTranslate error ({}): {}",
                status,
                error_message(&body)
            ));
            return Err(CallError::from_status(status, err));
        }

        let parsed: TranslateResponse = serde_json::from_str(&body).map_err(|e| {
            CallError::Fatal(MultiTranslateError::Api(format!(
                "Failed to parse translation response: {}",
                e
            )))
        })?;

        if let Some(error) = parsed.error {
            return Err(CallError::Fatal(MultiTranslateError::Api(error)));
        }

        Ok(parsed.translated_text.unwrap_or_default())
    }
}

#[async_trait]
impl TranslationClient for LibreClient {
    async fn prepare(&self) -> Result<()> {
        let languages = self
            .languages
            .get_or_try_init(|| self.fetch_languages())
            .await?;

        let source = languages
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(&self.pair.source))
            .ok_or_else(|| {
                MultiTranslateError::Preparation(format!(
                    "source language '{}' is not offered by the server",
                    self.pair.source
                ))
            })?;

        // Older servers omit `targets`; any listed code is then a valid target.
        let available = if source.targets.is_empty() {
            languages
                .iter()
                .any(|l| l.code.eq_ignore_ascii_case(&self.pair.target))
        } else {
            source
                .targets
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&self.pair.target))
        };

        if !available {
            return Err(MultiTranslateError::Preparation(format!(
                "no model for {}",
                self.pair
            )));
        }

        Ok(())
    }

    async fn translate(&self, text: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!("Retry attempt {} after {:?} delay", attempt, delay);
                tokio::time::sleep(delay).await;
            }

            match self.call_api(text).await {
                Ok(translated) => return Ok(translated),
                Err(CallError::Fatal(e)) => return Err(e),
                Err(CallError::Transient(e)) => {
                    warn!("Attempt {} for {} failed: {}", attempt + 1, self.pair, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| MultiTranslateError::Api("Unknown error".to_string())))
    }
}

/// Pull the `error` field out of a LibreTranslate error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation() {
        let engine = LibreTranslateEngine::new("http://localhost:5000/");
        assert_eq!(engine.name(), "LibreTranslate");
        assert_eq!(engine.base_url, "http://localhost:5000");
        assert_eq!(engine.max_retries, MAX_RETRIES);
    }

    #[test]
    fn test_with_retries_floors_at_one() {
        let engine = LibreTranslateEngine::new("http://localhost:5000")
            .with_retries(0, Duration::from_millis(1));
        assert_eq!(engine.max_retries, 1);
    }

    #[test]
    fn test_request_serialization_omits_missing_key() {
        let request = TranslateRequest {
            q: "Hello",
            source: "en",
            target: "fr",
            format: "text",
            api_key: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["q"], "Hello");
        assert_eq!(json["format"], "text");
        assert!(json.get("api_key").is_none());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"error":"Invalid API key"}"#), "Invalid API key");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
