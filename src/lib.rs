pub mod catalog;
pub mod config;
pub mod error;
pub mod interactive;
pub mod request;
pub mod result;
pub mod speech;
pub mod translate;

pub use catalog::LanguageCatalog;
pub use config::{Config, Provider};
pub use error::{MultiTranslateError, Result};
pub use request::TranslationRequest;
pub use result::{FanOutStats, TranslationOutcome, TranslationResult, FAILURE_MARKER};
pub use translate::{create_engine, MultiTranslator, TranslationAdapter};
