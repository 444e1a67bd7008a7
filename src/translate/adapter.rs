//! Turns one engine call into a [`TranslationOutcome`].

use crate::error::{MultiTranslateError, Result};
use crate::result::TranslationOutcome;
use crate::translate::{LanguagePair, TranslationEngine};
use std::sync::Arc;
use tracing::{debug, warn};

/// Wraps a [`TranslationEngine`] so that no error escapes a single
/// per-language call.
#[derive(Clone)]
pub struct TranslationAdapter {
    engine: Arc<dyn TranslationEngine>,
}

impl TranslationAdapter {
    pub fn new(engine: Box<dyn TranslationEngine>) -> Self {
        Self {
            engine: Arc::from(engine),
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Prepare the pair and translate `source_text` into `target_code`.
    ///
    /// Preparation and translation errors collapse into the same
    /// [`TranslationOutcome::Failure`].
    pub async fn translate(
        &self,
        source_text: &str,
        source_code: &str,
        target_code: &str,
    ) -> TranslationOutcome {
        let pair = LanguagePair::new(source_code, target_code);

        match self.run(source_text, &pair).await {
            Ok(text) => {
                debug!("Translated {} with {}", pair, self.engine.name());
                TranslationOutcome::Success { text }
            }
            Err(e) => {
                warn!("Translation {} failed: {}", pair, e);
                TranslationOutcome::Failure {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn run(&self, source_text: &str, pair: &LanguagePair) -> Result<String> {
        // client lives for this call only
        let client = self.engine.client(pair);

        client.prepare().await.map_err(|e| match e {
            MultiTranslateError::Preparation(_) => e,
            other => MultiTranslateError::Preparation(format!("{}: {}", pair, other)),
        })?;

        let translated = client.translate(source_text).await?;
        let translated = translated.trim();
        if translated.is_empty() {
            return Err(MultiTranslateError::Translation(format!(
                "{} returned an empty translation",
                self.engine.name()
            )));
        }

        Ok(translated.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::TranslationClient;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Mode {
        Echo,
        FailPrepare,
        FailTranslate,
        Blank,
    }

    struct StubEngine {
        mode: Mode,
        opened: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
    }

    impl StubEngine {
        fn new(mode: Mode) -> Self {
            Self {
                mode,
                opened: Arc::new(AtomicUsize::new(0)),
                closed: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct StubClient {
        mode: Mode,
        pair: LanguagePair,
        closed: Arc<AtomicUsize>,
    }

    impl Drop for StubClient {
        fn drop(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl TranslationEngine for StubEngine {
        fn name(&self) -> &'static str {
            "Stub"
        }

        fn client(&self, pair: &LanguagePair) -> Box<dyn TranslationClient> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Box::new(StubClient {
                mode: self.mode,
                pair: pair.clone(),
                closed: self.closed.clone(),
            })
        }
    }

    #[async_trait]
    impl TranslationClient for StubClient {
        async fn prepare(&self) -> Result<()> {
            match self.mode {
                Mode::FailPrepare => Err(MultiTranslateError::Api("no network".to_string())),
                _ => Ok(()),
            }
        }

        async fn translate(&self, text: &str) -> Result<String> {
            match self.mode {
                Mode::FailTranslate => {
                    Err(MultiTranslateError::Translation("engine crashed".to_string()))
                }
                Mode::Blank => Ok("   ".to_string()),
                _ => Ok(format!(" {}:{} ", self.pair.target, text)),
            }
        }
    }

    #[tokio::test]
    async fn test_success_is_trimmed() {
        let adapter = TranslationAdapter::new(Box::new(StubEngine::new(Mode::Echo)));
        let outcome = adapter.translate("Hello", "en", "fr").await;
        assert_eq!(outcome, TranslationOutcome::success("fr:Hello"));
    }

    #[tokio::test]
    async fn test_prepare_failure_becomes_outcome() {
        let adapter = TranslationAdapter::new(Box::new(StubEngine::new(Mode::FailPrepare)));
        let outcome = adapter.translate("Hello", "en", "fr").await;
        match outcome {
            TranslationOutcome::Failure { reason } => {
                assert!(reason.contains("not ready"));
                assert!(reason.contains("en->fr"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_failure_becomes_outcome() {
        let adapter = TranslationAdapter::new(Box::new(StubEngine::new(Mode::FailTranslate)));
        let outcome = adapter.translate("Hello", "en", "hi").await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.display_text(), "Error");
    }

    #[tokio::test]
    async fn test_blank_translation_is_failure() {
        let adapter = TranslationAdapter::new(Box::new(StubEngine::new(Mode::Blank)));
        let outcome = adapter.translate("Hello", "en", "hi").await;
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_client_released_after_each_call() {
        let engine = StubEngine::new(Mode::Echo);
        let opened = engine.opened.clone();
        let closed = engine.closed.clone();
        let adapter = TranslationAdapter::new(Box::new(engine));

        adapter.translate("a", "en", "fr").await;
        adapter.translate("b", "en", "hi").await;

        assert_eq!(opened.load(Ordering::SeqCst), 2);
        assert_eq!(closed.load(Ordering::SeqCst), 2);
    }
}
