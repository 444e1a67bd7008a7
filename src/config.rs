use crate::catalog::LanguageCatalog;
use crate::error::{MultiTranslateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Default LibreTranslate endpoint.
pub const DEFAULT_LIBRETRANSLATE_URL: &str = "https://libretranslate.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Libre,
    Gemini,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Libre => write!(f, "libre"),
            Provider::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "libre" | "libretranslate" => Ok(Provider::Libre),
            "gemini" => Ok(Provider::Gemini),
            _ => Err(format!("Unknown provider: {}. Use 'libre' or 'gemini'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Provider,
    /// Engine code of the language the input text is written in.
    pub source_language: String,
    pub libretranslate_url: String,
    pub libretranslate_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub concurrency: usize,
    pub timeout_secs: u64,
    /// Extra catalog entries, display name to engine code.
    pub languages: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            source_language: "en".to_string(),
            libretranslate_url: DEFAULT_LIBRETRANSLATE_URL.to_string(),
            libretranslate_api_key: None,
            gemini_api_key: None,
            openai_api_key: None,
            concurrency: 4,
            timeout_secs: 30,
            languages: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Read a config file. A file that does not parse falls back to defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        match toml::from_str::<Config>(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LIBRETRANSLATE_URL") {
            self.libretranslate_url = url;
        }
        if let Some(key) = lookup("LIBRETRANSLATE_API_KEY") {
            self.libretranslate_api_key = Some(key);
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(provider) = lookup("MULTITRANSLATE_PROVIDER") {
            if let Ok(p) = provider.parse() {
                self.provider = p;
            }
        }
        if let Some(lang) = lookup("MULTITRANSLATE_SOURCE_LANGUAGE") {
            self.source_language = lang;
        }
        if let Some(concurrency) = lookup("MULTITRANSLATE_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                self.concurrency = c;
            }
        }
        if let Some(timeout) = lookup("MULTITRANSLATE_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }
    }

    pub fn validate(&self, provider: Provider) -> Result<()> {
        match provider {
            Provider::Libre => {
                if self.libretranslate_url.trim().is_empty() {
                    return Err(MultiTranslateError::Config(
                        "LIBRETRANSLATE_URL is empty".to_string(),
                    ));
                }
            }
            Provider::Gemini => {
                if self.gemini_api_key.is_none() {
                    return Err(MultiTranslateError::Config(
                        "GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey"
                            .to_string(),
                    ));
                }
            }
        }

        if self.concurrency == 0 {
            return Err(MultiTranslateError::Config(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(MultiTranslateError::Config(
                "Timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.source_language.trim().is_empty() {
            return Err(MultiTranslateError::Config(
                "Source language must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Built-in catalog plus any languages from the config file.
    pub fn catalog(&self) -> LanguageCatalog {
        LanguageCatalog::builtin().with_extra(
            self.languages
                .iter()
                .map(|(name, code)| (name.clone(), code.clone())),
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path().ok_or_else(|| {
            MultiTranslateError::Config("No config directory on this platform".to_string())
        })?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| MultiTranslateError::Config(e.to_string()))?;
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("multitranslate").join("config.toml"))
    }
}
