//! Gemini-based translation using the Generative AI API.

use crate::error::{MultiTranslateError, Result};
use crate::translate::{LanguagePair, TranslationClient, TranslationEngine};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Translator using Google Gemini API.
pub struct GeminiEngine {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiEngine {
    /// Create a new Gemini engine with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: "gemini-2.0-flash".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a different model (e.g., "gemini-1.5-pro").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the engine at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }
}

impl TranslationEngine for GeminiEngine {
    fn name(&self) -> &'static str {
        "Google Gemini"
    }

    fn client(&self, pair: &LanguagePair) -> Box<dyn TranslationClient> {
        Box::new(GeminiClient {
            http: self.client.clone(),
            url: format!("{}/models/{}:generateContent", self.base_url, self.model),
            api_key: self.api_key.clone(),
            pair: pair.clone(),
        })
    }
}

struct GeminiClient {
    http: Client,
    url: String,
    api_key: String,
    pair: LanguagePair,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize, Debug)]
struct GeminiResponseContent {
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Deserialize, Debug)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GeminiError {
    message: String,
}

impl GeminiClient {
    fn build_prompt(&self, text: &str) -> String {
        let source = language_code_to_name(&self.pair.source);
        let target = language_code_to_name(&self.pair.target);

        format!(
            r#"Translate the following {source} text to {target}.
Return ONLY the translated text, nothing else. Preserve all formatting and line breaks.

Text to translate:
{text}"#
        )
    }
}

#[async_trait]
impl TranslationClient for GeminiClient {
    async fn prepare(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(MultiTranslateError::Config(
                "Gemini API key is empty".to_string(),
            ));
        }
        for code in [&self.pair.source, &self.pair.target] {
            if !is_supported(code) {
                return Err(MultiTranslateError::Preparation(format!(
                    "Gemini does not support language '{}'",
                    code
                )));
            }
        }
        Ok(())
    }

    async fn translate(&self, text: &str) -> Result<String> {
        debug!("Translating {} chars {}", text.len(), self.pair);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: self.build_prompt(text),
                }],
            }],
        };

        let response = self
            .http
            .post(&self.url)
            // header, not query string: reqwest errors echo the URL
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MultiTranslateError::Api(format!("Translation request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MultiTranslateError::Api(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(MultiTranslateError::Api(format!(
                "Translation API error ({}): {}",
                status, body
            )));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            MultiTranslateError::Api(format!("Failed to parse translation response: {}", e))
        })?;

        if let Some(error) = gemini_response.error {
            return Err(MultiTranslateError::Api(format!(
                "Gemini error: {}",
                error.message
            )));
        }

        let translated_text = gemini_response
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|p| p.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default();

        Ok(translated_text.trim().to_string())
    }
}

fn is_supported(code: &str) -> bool {
    let lowercase = code.to_lowercase();
    SUPPORTED_LANGUAGES.contains(&lowercase.as_str())
}

/// Convert language code to human-readable name for better prompting.
fn language_code_to_name(code: &str) -> &'static str {
    let lowercase = code.to_lowercase();
    match lowercase.as_str() {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "bn" => "Bengali",
        "ur" => "Urdu",
        "th" => "Thai",
        "vi" => "Vietnamese",
        "id" => "Indonesian",
        "nl" => "Dutch",
        "pl" => "Polish",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        _ => "the requested language",
    }
}

const SUPPORTED_LANGUAGES: [&str; 21] = [
    "en", "es", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh", "ar", "hi", "bn", "ur", "th", "vi",
    "id", "nl", "pl", "tr", "uk",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(source: &str, target: &str, key: &str) -> GeminiClient {
        GeminiClient {
            http: Client::new(),
            url: String::new(),
            api_key: key.to_string(),
            pair: LanguagePair::new(source, target),
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = GeminiEngine::new("test-key".to_string());
        assert_eq!(engine.name(), "Google Gemini");
        assert_eq!(engine.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_with_model() {
        let engine = GeminiEngine::new("test-key".to_string()).with_model("gemini-1.5-pro");
        assert_eq!(engine.model, "gemini-1.5-pro");
    }

    #[test]
    fn test_build_prompt() {
        let client = client_for("en", "bn", "k");
        let prompt = client.build_prompt("Hello, world!");
        assert!(prompt.contains("English text to Bengali"));
        assert!(prompt.contains("Hello, world!"));
    }

    #[tokio::test]
    async fn test_prepare_rejects_unsupported_language() {
        assert!(client_for("en", "tlh", "k").prepare().await.is_err());
        assert!(client_for("en", "HI", "k").prepare().await.is_ok());
    }

    #[tokio::test]
    async fn test_prepare_rejects_empty_key() {
        assert!(client_for("en", "fr", "").prepare().await.is_err());
    }

    #[test]
    fn test_language_code_to_name() {
        assert_eq!(language_code_to_name("ar"), "Arabic");
        assert_eq!(language_code_to_name("ES"), "Spanish");
        assert_eq!(language_code_to_name("xyz"), "the requested language");
    }
}
