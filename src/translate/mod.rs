pub mod adapter;
pub mod gemini;
pub mod libre;
pub mod orchestrator;

pub use adapter::TranslationAdapter;
pub use gemini::GeminiEngine;
pub use libre::LibreTranslateEngine;
pub use orchestrator::MultiTranslator;

use crate::config::{Config, Provider};
use crate::error::{MultiTranslateError, Result};
use async_trait::async_trait;

/// Source and target engine codes for one translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// A translation backend. Hands out one client per language pair.
pub trait TranslationEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Create a client bound to `pair`. The client is dropped after one use.
    fn client(&self, pair: &LanguagePair) -> Box<dyn TranslationClient>;
}

/// Client for a single language pair.
#[async_trait]
pub trait TranslationClient: Send + Sync {
    /// Make the pair's model or dictionary available.
    async fn prepare(&self) -> Result<()>;

    async fn translate(&self, text: &str) -> Result<String>;
}

/// Build the engine for `provider` from configuration.
pub fn create_engine(provider: Provider, config: &Config) -> Result<Box<dyn TranslationEngine>> {
    match provider {
        Provider::Libre => {
            let mut engine = LibreTranslateEngine::new(config.libretranslate_url.clone())
                .with_timeout(config.timeout())?;
            if let Some(ref key) = config.libretranslate_api_key {
                engine = engine.with_api_key(key.clone());
            }
            Ok(Box::new(engine))
        }
        Provider::Gemini => {
            let api_key = config.gemini_api_key.as_ref().ok_or_else(|| {
                MultiTranslateError::Config(
                    "Gemini API key not set. Set GEMINI_API_KEY environment variable.".to_string(),
                )
            })?;
            Ok(Box::new(
                GeminiEngine::new(api_key.clone()).with_timeout(config.timeout())?,
            ))
        }
    }
}
