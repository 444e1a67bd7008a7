use thiserror::Error;

#[derive(Error, Debug)]
pub enum MultiTranslateError {
    #[error("Language pair not ready: {0}")]
    Preparation(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Speech recognition failed: {0}")]
    Speech(String),

    #[error("Listening cancelled")]
    Cancelled,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Audio error: {0}")]
    Audio(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MultiTranslateError>;

/// Failure of one HTTP attempt, split by whether another attempt may help.
pub(crate) enum CallError {
    Transient(MultiTranslateError),
    Fatal(MultiTranslateError),
}

impl CallError {
    /// Classify a non-success HTTP status: server errors and rate limits
    /// are retried, everything else is final.
    pub(crate) fn from_status(status: reqwest::StatusCode, err: MultiTranslateError) -> Self {
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            CallError::Transient(err)
        } else {
            CallError::Fatal(err)
        }
    }
}
