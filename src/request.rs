//! Caller-side request validation.
//!
//! The orchestrator trusts its input; callers build a [`TranslationRequest`]
//! to reject blank text and empty language selections before dispatch.

use crate::error::{MultiTranslateError, Result};

pub const BLANK_TEXT_MESSAGE: &str = "Please enter or speak some text.";
pub const NO_LANGUAGES_MESSAGE: &str = "Please select at least one language.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    source_text: String,
    target_languages: Vec<String>,
}

impl TranslationRequest {
    pub fn new<I, S>(source_text: impl Into<String>, target_languages: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source_text = source_text.into();
        if source_text.trim().is_empty() {
            return Err(MultiTranslateError::InvalidRequest(
                BLANK_TEXT_MESSAGE.to_string(),
            ));
        }

        let target_languages: Vec<String> = target_languages.into_iter().map(Into::into).collect();
        if target_languages.is_empty() {
            return Err(MultiTranslateError::InvalidRequest(
                NO_LANGUAGES_MESSAGE.to_string(),
            ));
        }

        Ok(Self {
            source_text,
            target_languages,
        })
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn target_languages(&self) -> &[String] {
        &self.target_languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let request = TranslationRequest::new("Hello", ["Hindi", "French"]).unwrap();
        assert_eq!(request.source_text(), "Hello");
        assert_eq!(request.target_languages(), &["Hindi", "French"]);
    }

    #[test]
    fn test_blank_text_rejected() {
        let err = TranslationRequest::new("   \n", ["Hindi"]).unwrap_err();
        assert_eq!(err.to_string(), BLANK_TEXT_MESSAGE);
    }

    #[test]
    fn test_empty_languages_rejected() {
        let err = TranslationRequest::new("Hello", Vec::<String>::new()).unwrap_err();
        assert_eq!(err.to_string(), NO_LANGUAGES_MESSAGE);
    }

    #[test]
    fn test_duplicates_allowed() {
        let request = TranslationRequest::new("Hello", ["Hindi", "Hindi"]).unwrap();
        assert_eq!(request.target_languages().len(), 2);
    }
}
