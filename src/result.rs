//! Aggregated outcome of one fan-out translation.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Placeholder shown in place of translated text when a language failed.
pub const FAILURE_MARKER: &str = "Error";

/// Outcome of translating into a single target language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TranslationOutcome {
    Success { text: String },
    Failure { reason: String },
}

impl TranslationOutcome {
    pub fn success(text: impl Into<String>) -> Self {
        TranslationOutcome::Success { text: text.into() }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        TranslationOutcome::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TranslationOutcome::Success { .. })
    }

    /// Translated text, if this outcome is a success.
    pub fn text(&self) -> Option<&str> {
        match self {
            TranslationOutcome::Success { text } => Some(text),
            TranslationOutcome::Failure { .. } => None,
        }
    }

    /// Text to show the user: the translation or [`FAILURE_MARKER`].
    pub fn display_text(&self) -> &str {
        self.text().unwrap_or(FAILURE_MARKER)
    }
}

/// Immutable result handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationResult {
    original_text: String,
    requested_languages: Vec<String>,
    translations: BTreeMap<String, TranslationOutcome>,
}

impl TranslationResult {
    pub(crate) fn new(
        original_text: String,
        requested_languages: Vec<String>,
        translations: BTreeMap<String, TranslationOutcome>,
    ) -> Self {
        Self {
            original_text,
            requested_languages,
            translations,
        }
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// The caller's language list, verbatim.
    pub fn requested_languages(&self) -> &[String] {
        &self.requested_languages
    }

    pub fn translations(&self) -> &BTreeMap<String, TranslationOutcome> {
        &self.translations
    }

    pub fn get(&self, display_name: &str) -> Option<&TranslationOutcome> {
        self.translations.get(display_name)
    }

    /// Display name to translated text or failure marker.
    pub fn display_map(&self) -> BTreeMap<String, String> {
        self.translations
            .iter()
            .map(|(name, outcome)| (name.clone(), outcome.display_text().to_string()))
            .collect()
    }

    /// Entries in the order the caller requested them, each language once.
    pub fn in_requested_order(&self) -> Vec<(&str, &TranslationOutcome)> {
        let mut seen: Vec<(&str, &TranslationOutcome)> =
            Vec::with_capacity(self.translations.len());
        for name in &self.requested_languages {
            if let Some((key, outcome)) = self.translations.get_key_value(name.as_str()) {
                if !seen.iter().any(|(k, _)| *k == key.as_str()) {
                    seen.push((key.as_str(), outcome));
                }
            }
        }
        seen
    }

    pub fn success_count(&self) -> usize {
        self.translations.values().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.translations.len() - self.success_count()
    }

    /// True when no language produced a genuine translation.
    pub fn is_degraded(&self) -> bool {
        self.success_count() == 0
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }
}

/// Statistics from one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutStats {
    /// Languages the caller passed in, duplicates included.
    pub requested: usize,
    /// Distinct languages that resolved to an engine code.
    pub resolved: usize,
    /// Distinct languages absent from the catalog.
    pub skipped: usize,
    /// Repeated names dropped before dispatch.
    pub duplicates: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_time: Duration,
}
