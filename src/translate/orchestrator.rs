use crate::catalog::LanguageCatalog;
use crate::config::Config;
use crate::request::TranslationRequest;
use crate::result::{FanOutStats, TranslationOutcome, TranslationResult};
use crate::translate::{TranslationAdapter, TranslationEngine};
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// A selected language that resolved to an engine code.
#[derive(Debug)]
struct PlannedLanguage {
    name: String,
    code: String,
}

/// Fans one text out to every selected target language.
pub struct MultiTranslator {
    catalog: Arc<LanguageCatalog>,
    adapter: TranslationAdapter,
    source_language: String,
    concurrency: usize,
    show_progress: bool,
}

impl MultiTranslator {
    /// Create a translator over `catalog`, translating from `source_language`.
    pub fn new(
        catalog: Arc<LanguageCatalog>,
        engine: Box<dyn TranslationEngine>,
        source_language: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            adapter: TranslationAdapter::new(engine),
            source_language: source_language.into(),
            concurrency: 4,
            show_progress: false,
        }
    }

    /// Build from configuration: catalog, source language and concurrency.
    pub fn from_config(config: &Config, engine: Box<dyn TranslationEngine>) -> Self {
        Self::new(
            Arc::new(config.catalog()),
            engine,
            config.source_language.clone(),
        )
        .with_concurrency(config.concurrency)
    }

    /// Limit the number of languages translated at once. 1 runs them in order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enable or disable progress bar display.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub async fn translate_request(&self, request: &TranslationRequest) -> TranslationResult {
        self.translate_to_selected(request.source_text(), request.target_languages())
            .await
    }

    /// Translate `source_text` into every language in `selected`.
    ///
    /// Never fails: unknown names are skipped and per-language failures are
    /// recorded as [`TranslationOutcome::Failure`].
    pub async fn translate_to_selected<S: AsRef<str>>(
        &self,
        source_text: &str,
        selected: &[S],
    ) -> TranslationResult {
        self.translate_with_stats(source_text, selected).await.0
    }

    pub async fn translate_with_stats<S: AsRef<str>>(
        &self,
        source_text: &str,
        selected: &[S],
    ) -> (TranslationResult, FanOutStats) {
        let start_time = Instant::now();
        let requested: Vec<String> = selected.iter().map(|s| s.as_ref().to_string()).collect();
        let (planned, skipped, duplicates) = self.plan(&requested);
        let resolved = planned.len();

        info!(
            "Translating into {} language(s) with {} (concurrency: {})",
            resolved,
            self.adapter.engine_name(),
            self.concurrency
        );

        let progress_bar = if self.show_progress && resolved > 0 {
            let pb = ProgressBar::new(resolved as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} languages {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let semaphore = Semaphore::new(self.concurrency);
        let mut futures = FuturesUnordered::new();

        for language in planned {
            let semaphore = &semaphore;
            let adapter = &self.adapter;
            let source_language = self.source_language.as_str();
            let pb = progress_bar.as_ref();

            futures.push(async move {
                // never closed, so acquire only waits
                let _permit = semaphore.acquire().await.ok();

                debug!("Starting {} ({})", language.name, language.code);
                let outcome = adapter
                    .translate(source_text, source_language, &language.code)
                    .await;

                if let Some(pb) = pb {
                    pb.set_message(language.name.clone());
                    pb.inc(1);
                }

                (language, outcome)
            });
        }

        let mut translations: BTreeMap<String, TranslationOutcome> = BTreeMap::new();
        while let Some((language, outcome)) = futures.next().await {
            translations.insert(language.name, outcome);
        }

        if let Some(pb) = progress_bar.as_ref() {
            pb.finish_with_message("done");
        }

        let successful = translations.values().filter(|o| o.is_success()).count();
        let stats = FanOutStats {
            requested: requested.len(),
            resolved,
            skipped,
            duplicates,
            successful,
            failed: resolved - successful,
            total_time: start_time.elapsed(),
        };

        info!(
            "Translation complete: {}/{} languages successful in {:.2}s",
            stats.successful,
            stats.resolved,
            stats.total_time.as_secs_f64()
        );

        if successful == 0 {
            warn!(
                "No translation produced for a {}-character text ({} language(s) attempted)",
                source_text.chars().count(),
                resolved
            );
        }

        let result = TranslationResult::new(source_text.to_string(), requested, translations);
        (result, stats)
    }

    /// Drop repeated names (first occurrence wins) and names the catalog
    /// does not know. Returns the plan plus skipped and duplicate counts.
    fn plan(&self, requested: &[String]) -> (Vec<PlannedLanguage>, usize, usize) {
        let mut seen: HashSet<&str> = HashSet::with_capacity(requested.len());
        let mut planned = Vec::with_capacity(requested.len());
        let mut skipped = 0;
        let mut duplicates = 0;

        for name in requested {
            if !seen.insert(name.as_str()) {
                duplicates += 1;
                continue;
            }
            match self.catalog.lookup(name) {
                Some(code) => planned.push(PlannedLanguage {
                    name: name.clone(),
                    code: code.to_string(),
                }),
                None => {
                    debug!("Skipping unknown language '{}'", name);
                    skipped += 1;
                }
            }
        }

        (planned, skipped, duplicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MultiTranslateError, Result};
    use crate::translate::{LanguagePair, TranslationClient};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock engine that answers `"<code>:<text>"` and fails on chosen codes.
    struct MockEngine {
        calls: Arc<AtomicUsize>,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        fail_codes: Vec<&'static str>,
    }

    impl MockEngine {
        fn new() -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                in_flight: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
                fail_codes: Vec::new(),
            }
        }

        fn failing_on(codes: Vec<&'static str>) -> Self {
            Self {
                fail_codes: codes,
                ..Self::new()
            }
        }
    }

    struct MockClient {
        pair: LanguagePair,
        fail: bool,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl TranslationEngine for MockEngine {
        fn name(&self) -> &'static str {
            "Mock"
        }

        fn client(&self, pair: &LanguagePair) -> Box<dyn TranslationClient> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::new(MockClient {
                pair: pair.clone(),
                fail: self.fail_codes.contains(&pair.target.as_str()),
                in_flight: self.in_flight.clone(),
                peak: self.peak.clone(),
            })
        }
    }

    #[async_trait]
    impl TranslationClient for MockClient {
        async fn prepare(&self) -> Result<()> {
            Ok(())
        }

        async fn translate(&self, text: &str) -> Result<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail {
                return Err(MultiTranslateError::Translation("Mock error".to_string()));
            }
            Ok(format!("{}:{}", self.pair.target, text))
        }
    }

    fn catalog() -> Arc<LanguageCatalog> {
        Arc::new(LanguageCatalog::from_pairs([("Hindi", "hi"), ("French", "fr")]))
    }

    #[tokio::test]
    async fn test_skips_unknown_language() {
        let translator = MultiTranslator::new(catalog(), Box::new(MockEngine::new()), "en");

        let result = translator
            .translate_to_selected("Hello", &["Hindi", "French", "Klingon"])
            .await;

        let expected: BTreeMap<String, String> = [
            ("Hindi".to_string(), "hi:Hello".to_string()),
            ("French".to_string(), "fr:Hello".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(result.display_map(), expected);
        assert_eq!(result.original_text(), "Hello");
        assert_eq!(result.requested_languages().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_selection_makes_no_calls() {
        let engine = MockEngine::new();
        let calls = engine.calls.clone();
        let translator = MultiTranslator::new(catalog(), Box::new(engine), "en");

        let result = translator
            .translate_to_selected::<&str>("Hello", &[])
            .await;

        assert!(result.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicates_translated_once() {
        let engine = MockEngine::new();
        let calls = engine.calls.clone();
        let translator = MultiTranslator::new(catalog(), Box::new(engine), "en");

        let (result, stats) = translator
            .translate_with_stats("Hi", &["French", "French", "Hindi"])
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.len(), 2);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.requested, 3);
    }

    #[tokio::test]
    async fn test_handles_partial_failure() {
        let translator = MultiTranslator::new(
            catalog(),
            Box::new(MockEngine::failing_on(vec!["fr"])),
            "en",
        );

        let (result, stats) = translator
            .translate_with_stats("Hello", &["Hindi", "French"])
            .await;

        assert_eq!(result.get("Hindi").and_then(|o| o.text()), Some("hi:Hello"));
        assert_eq!(result.get("French").map(|o| o.display_text()), Some("Error"));
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn test_all_failed_still_returns() {
        let translator = MultiTranslator::new(
            catalog(),
            Box::new(MockEngine::failing_on(vec!["fr", "hi"])),
            "en",
        );

        let result = translator
            .translate_to_selected("Hello", &["Hindi", "French"])
            .await;

        assert_eq!(result.len(), 2);
        assert!(result.is_degraded());
        assert!(result.translations().values().all(|o| !o.is_success()));
    }

    #[tokio::test]
    async fn test_concurrency_one_is_sequential() {
        let engine = MockEngine::new();
        let peak = engine.peak.clone();
        let translator =
            MultiTranslator::new(catalog(), Box::new(engine), "en").with_concurrency(1);

        translator
            .translate_to_selected("Hello", &["Hindi", "French"])
            .await;

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_calls_overlap() {
        let engine = MockEngine::new();
        let peak = engine.peak.clone();
        let translator =
            MultiTranslator::new(catalog(), Box::new(engine), "en").with_concurrency(4);

        translator
            .translate_to_selected("Hello", &["Hindi", "French"])
            .await;

        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_degraded_warning_omits_source_text() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let translator = MultiTranslator::new(
            catalog(),
            Box::new(MockEngine::failing_on(vec!["fr", "hi"])),
            "en",
        );
        translator
            .translate_to_selected("my bank pin is 4321", &["Hindi", "French"])
            .await;

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("No translation produced for a 19-character text"));
        assert!(!output.contains("4321"));
    }

    #[test]
    fn test_plan_counts() {
        let translator = MultiTranslator::new(catalog(), Box::new(MockEngine::new()), "en");
        let requested: Vec<String> = ["Hindi", "Klingon", "Hindi", "Elvish", "French"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let (planned, skipped, duplicates) = translator.plan(&requested);
        let names: Vec<&str> = planned.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Hindi", "French"]);
        assert_eq!(skipped, 2);
        assert_eq!(duplicates, 1);
    }
}
